//! 特效引擎
//!
//! 无窗口的宿主循环：加载配置、初始化日志、创建粒子特效和补间，
//! 然后以固定帧率驱动调度器。渲染器接入时只需要替换帧循环里的上传部分。

use super::error::EngineResult;
use super::logging::init_logging;
use super::scheduler::{ticks_to_seconds, FrameScheduler, SharedTask};
use crate::animation::{Easing, Tween};
use crate::config::EffectsConfig;
use crate::render::particles::{FireEmitter, InstanceBatch, ParticleDefaults, ParticleSystem};
use crate::resources::TextureRegistry;
use std::cell::RefCell;
use std::rc::Rc;

/// 演示场景的运行时长（秒）
const DEMO_SECONDS: f32 = 3.0;

/// 发射点来回扫动的范围
const SWEEP_FROM: f32 = 200.0;
const SWEEP_TO: f32 = 600.0;

/// 特效引擎
///
/// 持有调度器和所有特效，特效以 `Rc<RefCell<_>>` 的形式同时注册到调度器。
pub struct Engine {
    config: EffectsConfig,
    scheduler: FrameScheduler,
    textures: TextureRegistry,
    particles: Rc<RefCell<ParticleSystem<InstanceBatch>>>,
    fire: Rc<RefCell<FireEmitter>>,
    sweep: Option<Tween<ParticleSystem<InstanceBatch>>>,
    uploaded_bytes: usize,
}

impl Engine {
    /// 运行演示场景
    ///
    /// 加载配置（文件 + 环境变量），初始化日志，运行固定时长后退出。
    pub fn run() -> EngineResult<()> {
        let mut config = EffectsConfig::load_or_default();
        config.apply_env_overrides();
        config.validate()?;

        init_logging(&config.logging)?;
        tracing::info!(target: "engine", "Engine starting");

        let mut engine = Self::new(config)?;
        engine.start_sweep()?;

        let dt = ticks_to_seconds(1.0, engine.config.scheduler.target_fps as f32);
        let frames = if dt > 0.0 {
            (DEMO_SECONDS / dt).ceil() as u32
        } else {
            0
        };
        engine.run_frames(frames, dt);

        tracing::info!(
            target: "engine",
            frames,
            particles = engine.particles.borrow().count(),
            fire = engine.fire.borrow().count(),
            uploaded_bytes = engine.uploaded_bytes,
            "Engine shutting down"
        );
        engine.shutdown();
        Ok(())
    }

    /// 按配置创建特效并注册到调度器
    ///
    /// # 错误
    ///
    /// 纹理路径无法解析时返回 `EngineError::Asset`。
    pub fn new(config: EffectsConfig) -> EngineResult<Self> {
        let textures = Self::initialize_textures(&config);
        let scheduler = FrameScheduler::new();

        let mut system = ParticleSystem::from_config(InstanceBatch::new(), &textures, &config.particles)?;
        if config.particles.defaults == ParticleDefaults::default() {
            system.set_default_config(ParticleDefaults::phoenix_flame());
        }
        system.set_emitter_position(SWEEP_FROM, 500.0);
        let particles = Rc::new(RefCell::new(system));

        let mut emitter = FireEmitter::from_provider(&textures, config.fire.clone())?;
        emitter.set_position(400.0, 520.0);
        let fire = Rc::new(RefCell::new(emitter));

        let task: SharedTask = particles.clone();
        scheduler.add_task(task);
        let task: SharedTask = fire.clone();
        scheduler.add_task(task);

        tracing::debug!(target: "engine", textures = textures.len(), "Effects initialized");

        Ok(Self {
            config,
            scheduler,
            textures,
            particles,
            fire,
            sweep: None,
            uploaded_bytes: 0,
        })
    }

    /// 注册配置中用到的所有纹理
    fn initialize_textures(config: &EffectsConfig) -> TextureRegistry {
        let mut textures = TextureRegistry::new();
        textures.register(config.particles.texture.as_str());
        for frame in &config.fire.frames {
            textures.register(frame.as_str());
        }
        textures
    }

    /// 让粒子发射点在两端之间来回移动
    pub fn start_sweep(&mut self) -> EngineResult<()> {
        let x = self.particles.borrow().emitter_position().x;
        let to = if x < SWEEP_TO { SWEEP_TO } else { SWEEP_FROM };

        let tween = Tween::new(&self.scheduler, &self.particles, [("emitter_x", to)], 1.5)?
            .with_easing(Easing::EaseInOutSine);
        let next = Rc::downgrade(&self.particles);
        let scheduler = self.scheduler.clone();
        let tween = tween.with_on_complete(move || {
            // 回调链：到达一端后反向
            let Some(particles) = next.upgrade() else {
                return;
            };
            let back = if to == SWEEP_TO { SWEEP_FROM } else { SWEEP_TO };
            match Tween::new(&scheduler, &particles, [("emitter_x", back)], 1.5) {
                Ok(tween) => tween.with_easing(Easing::EaseInOutSine).start(),
                Err(e) => tracing::warn!(target: "engine", "Failed to reverse sweep: {}", e),
            }
        });
        tween.start();
        self.sweep = Some(tween);
        Ok(())
    }

    /// 以固定 `dt` 运行若干帧
    pub fn run_frames(&mut self, frames: u32, dt: f32) {
        for _ in 0..frames {
            self.scheduler.step(dt);
            self.flush();
        }
    }

    /// 取出本帧的实例数据（渲染器在这里上传）
    fn flush(&mut self) {
        if let Some(bytes) = self.particles.borrow_mut().take_dirty() {
            self.uploaded_bytes += bytes.len();
        }
    }

    /// 清空特效并关闭调度器
    pub fn shutdown(&mut self) {
        if let Some(sweep) = self.sweep.take() {
            sweep.stop();
        }
        self.particles.borrow_mut().clear();
        self.fire.borrow_mut().clear();
        self.scheduler.teardown();
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn particles(&self) -> &Rc<RefCell<ParticleSystem<InstanceBatch>>> {
        &self.particles
    }

    pub fn fire(&self) -> &Rc<RefCell<FireEmitter>> {
        &self.fire
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    /// 累计上传的实例字节数
    pub fn uploaded_bytes(&self) -> usize {
        self.uploaded_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        let mut config = EffectsConfig::default();
        config.particles.max_particles = 32;
        config.fire.frames = vec!["fire_0.png".to_string(), "fire_1.png".to_string()];
        Engine::new(config).unwrap()
    }

    #[test]
    fn test_engine_registers_effects() {
        let engine = engine();
        assert_eq!(engine.scheduler().task_count(), 2);
        assert_eq!(engine.textures().len(), 3);
        assert_eq!(
            engine.particles().borrow().default_config(),
            &ParticleDefaults::phoenix_flame()
        );
    }

    #[test]
    fn test_frames_drive_effects() {
        let mut engine = engine();
        engine.run_frames(30, 1.0 / 60.0);
        assert!(engine.particles().borrow().count() > 0);
        assert!(engine.fire().borrow().count() > 0);
        assert!(engine.uploaded_bytes() > 0);
    }

    #[test]
    fn test_sweep_reverses() {
        let mut engine = engine();
        engine.start_sweep().unwrap();

        engine.run_frames(17, 0.1);
        let x = engine.particles().borrow().emitter_position().x;
        assert!(x > SWEEP_FROM && x < SWEEP_TO, "x = {}", x);
        // 第一段结束后反向补间已经注册
        assert_eq!(engine.scheduler().task_count(), 3);
    }

    #[test]
    fn test_shutdown_clears_everything() {
        let mut engine = engine();
        engine.start_sweep().unwrap();
        engine.run_frames(10, 1.0 / 60.0);
        engine.shutdown();
        assert_eq!(engine.scheduler().task_count(), 0);
        assert_eq!(engine.particles().borrow().count(), 0);
        assert_eq!(engine.fire().borrow().count(), 0);
    }
}
