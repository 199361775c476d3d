//! 火焰/烟雾精灵发射器
//!
//! 与粒子池不同，每次发射都创建一个独立拥有的精灵对象，
//! 精灵自己播放帧动画、累计年龄、上升、淡出和缩小，寿命结束时被移除并释放。
//! 适合粒子数量少、需要逐对象帧动画的效果。

use super::effect::ParticleEffect;
use crate::config::FireEmitterConfig;
use crate::core::error::AssetResult;
use crate::core::scheduler::{FrameTask, TaskStatus};
use crate::core::utils::{life_fraction, random_range};
use crate::resources::{TextureHandle, TextureProvider};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 精灵帧动画
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAnimation {
    /// 帧纹理
    frames: Vec<TextureHandle>,
    /// 帧率（帧/秒）
    frame_rate: f32,
    /// 已播放时间
    elapsed: f32,
    /// 是否循环
    looping: bool,
}

impl SpriteAnimation {
    pub fn new(frames: Vec<TextureHandle>, frame_rate: f32) -> Self {
        Self {
            frames,
            frame_rate,
            elapsed: 0.0,
            looping: true,
        }
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// 推进动画
    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    /// 当前帧索引
    pub fn frame_index(&self) -> usize {
        if self.frames.is_empty() || !(self.frame_rate > 0.0) {
            return 0;
        }
        let frame = (self.elapsed * self.frame_rate).max(0.0) as usize;
        if self.looping {
            frame % self.frames.len()
        } else {
            frame.min(self.frames.len() - 1)
        }
    }

    /// 当前帧纹理
    pub fn current_frame(&self) -> Option<TextureHandle> {
        self.frames.get(self.frame_index()).copied()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// 火焰精灵的渲染数据
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireSprite {
    pub position: Vec2,
    pub scale: f32,
    pub alpha: f32,
    /// 锚点在底部中心
    pub anchor: Vec2,
    pub texture: Option<TextureHandle>,
}

/// 火焰精灵
#[derive(Debug, Clone)]
pub struct FireParticle {
    /// 相对发射器的位置
    position: Vec2,
    base_scale: f32,
    scale: f32,
    alpha: f32,
    age: f32,
    lifetime: f32,
    rise_speed: f32,
    animation: SpriteAnimation,
}

impl FireParticle {
    pub fn new(
        position: Vec2,
        base_scale: f32,
        lifetime: f32,
        rise_speed: f32,
        animation: SpriteAnimation,
    ) -> Self {
        Self {
            position,
            base_scale,
            scale: base_scale,
            alpha: 1.0,
            age: 0.0,
            lifetime,
            rise_speed,
            animation,
        }
    }

    /// 推进 `dt` 秒，寿命结束返回 `false`
    pub fn update(&mut self, dt: f32) -> bool {
        self.age += dt;
        let t = life_fraction(self.age, self.lifetime);

        self.position.y -= self.rise_speed * dt;
        self.alpha = 1.0 - t;
        self.scale = self.base_scale * (1.0 - t * 0.5);
        self.animation.update(dt);

        self.age < self.lifetime
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn sprite(&self, origin: Vec2) -> FireSprite {
        FireSprite {
            position: origin + self.position,
            scale: self.scale,
            alpha: self.alpha,
            anchor: Vec2::new(0.5, 1.0),
            texture: self.animation.current_frame(),
        }
    }
}

/// 火焰精灵发射器
///
/// 每隔 `spawn_rate` 秒发射一个精灵。计时器到点后归零，每次更新最多发射一个。
pub struct FireEmitter {
    /// 发射器原点
    origin: Vec2,
    /// 配置
    config: FireEmitterConfig,
    /// 动画帧
    frames: Vec<TextureHandle>,
    /// 存活的精灵
    particles: Vec<FireParticle>,
    /// 发射计时器
    timer: f32,
    /// 随机数生成器
    rng: StdRng,
    /// 总发射数
    spawned: u64,
}

impl FireEmitter {
    /// 创建发射器
    pub fn new(frames: Vec<TextureHandle>, config: FireEmitterConfig) -> Self {
        tracing::debug!(target: "particles", frames = frames.len(), "Fire emitter created");
        Self {
            origin: Vec2::ZERO,
            config,
            frames,
            particles: Vec::new(),
            timer: 0.0,
            rng: StdRng::from_entropy(),
            spawned: 0,
        }
    }

    /// 通过纹理提供者解析配置中的动画帧后创建
    pub fn from_provider<P: TextureProvider + ?Sized>(
        provider: &P,
        config: FireEmitterConfig,
    ) -> AssetResult<Self> {
        let frames = provider.resolve_all(&config.frames)?;
        Ok(Self::new(frames, config))
    }

    /// 使用固定随机种子
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.origin = Vec2::new(x, y);
    }

    pub fn position(&self) -> Vec2 {
        self.origin
    }

    pub fn config(&self) -> &FireEmitterConfig {
        &self.config
    }

    /// 立即发射一个精灵
    pub fn spawn(&mut self) {
        let x = (self.rng.gen::<f32>() - 0.5) * self.config.spread;
        let lifetime = self.config.lifetime + self.rng.gen::<f32>() * self.config.lifetime_jitter;
        let scale = random_range(&mut self.rng, self.config.scale_min, self.config.scale_max);
        let animation = SpriteAnimation::new(self.frames.clone(), self.config.frame_rate);

        self.particles.push(FireParticle::new(
            Vec2::new(x, 0.0),
            scale,
            lifetime,
            self.config.rise_speed,
            animation,
        ));
        self.spawned += 1;
    }

    /// 更新发射计时器和所有精灵
    pub fn update(&mut self, dt: f32) {
        self.timer += dt;
        if self.timer >= self.config.spawn_rate {
            self.timer = 0.0;
            self.spawn();
        }

        self.particles.retain_mut(|p| p.update(dt));
    }

    /// 移除所有精灵
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }

    /// 总发射数
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    pub fn particles(&self) -> &[FireParticle] {
        &self.particles
    }

    /// 渲染数据（世界坐标）
    pub fn sprites(&self) -> impl Iterator<Item = FireSprite> + '_ {
        self.particles.iter().map(move |p| p.sprite(self.origin))
    }
}

impl ParticleEffect for FireEmitter {
    fn update(&mut self, dt: f32) {
        FireEmitter::update(self, dt);
    }

    fn clear(&mut self) {
        FireEmitter::clear(self);
    }

    fn count(&self) -> usize {
        FireEmitter::count(self)
    }
}

impl FrameTask for FireEmitter {
    fn tick(&mut self, dt: f32) -> TaskStatus {
        self.update(dt);
        TaskStatus::Continue
    }
}
