//! 粒子池与发射器
//!
//! 固定容量的粒子槽位数组。每个槽位在构造时绑定一个批次中的实例，
//! 之后只修改实例属性，稳定运行期间不分配内存。
//!
//! 池满时回收 `age` 最大的槽位（最接近自然消亡的粒子）。

use super::batch::{
    InstanceBatch, ParticleBatch, ParticleHandle, ParticleInstance, ParticleTemplate,
};
use super::color::{lerp_color, WHITE};
use super::config::{ParticleConfig, ParticleDefaults, ResolvedSpawn};
use super::effect::ParticleEffect;
use crate::config::ParticleSystemConfig;
use crate::core::error::AssetResult;
use crate::core::scheduler::{Completion, FrameTask, TaskStatus};
use crate::core::utils::{lerp, life_fraction, random_range};
use crate::resources::TextureProvider;
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// 默认发射间隔（秒/粒子）
pub const DEFAULT_EMITTER_RATE: f32 = 0.05;

/// 粒子系统统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParticleSystemStats {
    /// 总生成数（手动 + 发射器）
    pub total_spawned: u64,
    /// 发射器生成数
    pub total_emitted: u64,
    /// 池满时被回收的粒子数
    pub recycled: u64,
    /// 自然消亡的粒子数
    pub expired: u64,
    /// 当前存活数
    pub alive: usize,
}

/// 槽位状态快照
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotState {
    pub active: bool,
    pub age: f32,
    pub lifetime: f32,
    pub velocity: Vec2,
}

/// 粒子槽位
struct ParticleSlot {
    handle: ParticleHandle,
    velocity: Vec2,
    age: f32,
    lifetime: f32,
    start_color: u32,
    end_color: u32,
    start_alpha: f32,
    end_alpha: f32,
    start_scale: f32,
    end_scale: f32,
    rotation_speed: f32,
    active: bool,
    on_complete: Option<Completion>,
}

impl ParticleSlot {
    fn new(handle: ParticleHandle) -> Self {
        Self {
            handle,
            velocity: Vec2::ZERO,
            age: 0.0,
            lifetime: 0.0,
            start_color: WHITE,
            end_color: WHITE,
            start_alpha: 1.0,
            end_alpha: 0.0,
            start_scale: 0.3,
            end_scale: 0.0,
            rotation_speed: 0.0,
            active: false,
            on_complete: None,
        }
    }

    fn state(&self) -> SlotState {
        SlotState {
            active: self.active,
            age: self.age,
            lifetime: self.lifetime,
            velocity: self.velocity,
        }
    }
}

/// 连续发射器
///
/// 时间累加器：每累计 `rate` 秒发射一个粒子，余数保留到下一帧，发射速率与帧率无关。
#[derive(Debug, Clone, Copy, PartialEq)]
struct Emitter {
    position: Vec2,
    rate: f32,
    timer: f32,
    enabled: bool,
    jitter: f32,
}

impl Emitter {
    /// 累加 `dt` 并返回本帧应发射的数量
    ///
    /// 非正数或 NaN 的间隔视为停止发射。
    fn advance(&mut self, dt: f32) -> u32 {
        if !self.enabled || !(self.rate > 0.0) {
            return 0;
        }

        self.timer += dt;
        let mut count = 0;
        while self.timer >= self.rate {
            let next = self.timer - self.rate;
            if next >= self.timer {
                // 精度不足以继续扣减，丢弃积压
                self.timer = 0.0;
                break;
            }
            self.timer = next;
            count += 1;
        }
        count
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rate: DEFAULT_EMITTER_RATE,
            timer: 0.0,
            enabled: true,
            jitter: 0.0,
        }
    }
}

/// 粒子池
///
/// # 示例
///
/// ```rust
/// use flame_fx::render::particles::{
///     InstanceBatch, ParticleConfig, ParticleSystem, ParticleTemplate,
/// };
/// use flame_fx::resources::TextureHandle;
///
/// let template = ParticleTemplate::new(TextureHandle::new(0));
/// let mut particles = ParticleSystem::new(InstanceBatch::new(), template, 10);
/// particles.set_emitter_rate(0.0);
///
/// particles.spawn(ParticleConfig::at(100.0, 100.0).with_lifetime(0.5));
/// assert_eq!(particles.count(), 1);
///
/// particles.update(0.5);
/// assert_eq!(particles.count(), 0);
/// ```
pub struct ParticleSystem<B: ParticleBatch = InstanceBatch> {
    /// 粒子槽位（容量固定）
    slots: Vec<ParticleSlot>,
    /// 渲染批次
    batch: B,
    /// 外观模板
    template: ParticleTemplate,
    /// 发射器
    emitter: Emitter,
    /// 默认生成参数
    defaults: ParticleDefaults,
    /// 随机数生成器
    rng: StdRng,
    /// 本帧待执行的完成回调（复用缓冲区）
    pending: Vec<Completion>,
    /// 统计信息
    stats: ParticleSystemStats,
}

impl<B: ParticleBatch> ParticleSystem<B> {
    /// 创建粒子池
    ///
    /// # 参数
    ///
    /// * `batch` - 渲染批次，所有槽位的实例在这里一次性加入
    /// * `template` - 外观模板
    /// * `max_particles` - 池容量
    pub fn new(mut batch: B, template: ParticleTemplate, max_particles: usize) -> Self {
        batch.set_blend_mode(template.blend_mode);

        let mut slots = Vec::with_capacity(max_particles);
        for _ in 0..max_particles {
            let handle = batch.add_particle(ParticleInstance::hidden(&template));
            slots.push(ParticleSlot::new(handle));
        }
        batch.mark_dirty();

        tracing::debug!(target: "particles", max_particles, "Particle pool created");

        Self {
            slots,
            batch,
            template,
            emitter: Emitter::default(),
            defaults: ParticleDefaults::default(),
            rng: StdRng::from_entropy(),
            pending: Vec::new(),
            stats: ParticleSystemStats::default(),
        }
    }

    /// 通过纹理提供者解析纹理后创建
    ///
    /// # 错误
    ///
    /// 纹理路径无法解析时返回 `AssetError`。
    pub fn from_provider<P: TextureProvider + ?Sized>(
        batch: B,
        provider: &P,
        texture_path: &str,
        max_particles: usize,
    ) -> AssetResult<Self> {
        let texture = provider.resolve(texture_path)?;
        Ok(Self::new(batch, ParticleTemplate::new(texture), max_particles))
    }

    /// 按配置创建
    pub fn from_config<P: TextureProvider + ?Sized>(
        batch: B,
        provider: &P,
        config: &ParticleSystemConfig,
    ) -> AssetResult<Self> {
        let texture = provider.resolve(&config.texture)?;
        let template = ParticleTemplate::new(texture).with_blend_mode(config.blend_mode);
        let mut system = Self::new(batch, template, config.max_particles);
        system.set_emitter_rate(config.emitter_rate);
        system.set_emitter_enabled(config.emitter_enabled);
        system.set_emitter_jitter(config.emitter_jitter);
        system.set_default_config(config.defaults.clone());
        Ok(system)
    }

    /// 使用固定随机种子（测试、回放）
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_seed(seed);
        self
    }

    /// 重新设置随机种子
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// 设置默认生成参数
    pub fn set_default_config(&mut self, defaults: ParticleDefaults) {
        self.defaults = defaults;
    }

    pub fn default_config(&self) -> &ParticleDefaults {
        &self.defaults
    }

    /// 设置发射器位置
    pub fn set_emitter_position(&mut self, x: f32, y: f32) {
        self.emitter.position = Vec2::new(x, y);
    }

    pub fn emitter_position(&self) -> Vec2 {
        self.emitter.position
    }

    /// 设置发射间隔（秒/粒子），非正数停止连续发射
    pub fn set_emitter_rate(&mut self, rate: f32) {
        self.emitter.rate = rate;
    }

    pub fn emitter_rate(&self) -> f32 {
        self.emitter.rate
    }

    /// 开关连续发射，不影响手动 `spawn`
    pub fn set_emitter_enabled(&mut self, enabled: bool) {
        self.emitter.enabled = enabled;
    }

    pub fn emitter_enabled(&self) -> bool {
        self.emitter.enabled
    }

    /// 发射点水平抖动宽度（像素）
    pub fn set_emitter_jitter(&mut self, jitter: f32) {
        self.emitter.jitter = jitter;
    }

    /// 生成一个粒子
    ///
    /// 优先使用第一个空闲槽位，池满时回收 `age` 最大的槽位。
    /// 被回收粒子的完成回调不会被调用。容量为 0 时什么也不做。
    ///
    /// # 返回
    ///
    /// 返回使用的槽位索引。
    pub fn spawn(&mut self, mut config: ParticleConfig) -> Option<usize> {
        let spawn = ResolvedSpawn::resolve(&config, &self.defaults);
        self.spawn_resolved(spawn, config.on_complete.take())
    }

    fn select_slot(&self) -> Option<(usize, bool)> {
        if let Some(index) = self.slots.iter().position(|s| !s.active) {
            return Some((index, false));
        }

        let mut oldest: Option<usize> = None;
        for (index, slot) in self.slots.iter().enumerate() {
            match oldest {
                Some(current) if slot.age <= self.slots[current].age => {}
                _ => oldest = Some(index),
            }
        }
        oldest.map(|index| (index, true))
    }

    fn spawn_resolved(&mut self, spawn: ResolvedSpawn, on_complete: Option<Completion>) -> Option<usize> {
        let (index, recycled) = self.select_slot()?;

        let velocity = Vec2::new(
            random_range(&mut self.rng, spawn.velocity_x.0, spawn.velocity_x.1),
            random_range(&mut self.rng, spawn.velocity_y.0, spawn.velocity_y.1),
        );
        let rotation = match spawn.rotation {
            Some(rotation) => rotation,
            None => self.rng.gen::<f32>() * TAU,
        };

        let slot = &mut self.slots[index];
        slot.velocity = velocity;
        slot.age = 0.0;
        slot.lifetime = spawn.lifetime;
        slot.start_color = spawn.start_color;
        slot.end_color = spawn.end_color;
        slot.start_alpha = spawn.start_alpha;
        slot.end_alpha = spawn.end_alpha;
        slot.start_scale = spawn.start_scale;
        slot.end_scale = spawn.end_scale;
        slot.rotation_speed = spawn.rotation_speed;
        slot.active = true;
        slot.on_complete = on_complete;

        if let Some(instance) = self.batch.instance_mut(&slot.handle) {
            instance.position = [spawn.x, spawn.y];
            instance.rotation = rotation;
            instance.alpha = spawn.start_alpha;
            instance.tint = spawn.start_color;
            instance.set_uniform_scale(spawn.start_scale);
        }
        self.batch.mark_dirty();

        self.stats.total_spawned += 1;
        if recycled {
            self.stats.recycled += 1;
            tracing::trace!(target: "particles", slot = index, "Pool saturated, recycled oldest particle");
        }

        Some(index)
    }

    /// 更新发射器和所有存活粒子
    ///
    /// `dt` 为秒，假定非负，这里不做截断。到期粒子的完成回调在所有槽位写完后执行。
    pub fn update(&mut self, dt: f32) {
        self.simulate(dt);

        let mut pending = std::mem::take(&mut self.pending);
        for callback in pending.drain(..) {
            callback();
        }
        self.pending = pending;
    }

    /// 推进模拟，到期回调留在 `pending` 中由调用方执行
    fn simulate(&mut self, dt: f32) {
        let emit_count = self.emitter.advance(dt);
        for _ in 0..emit_count {
            let mut x = self.emitter.position.x;
            if self.emitter.jitter > 0.0 {
                x += (self.rng.gen::<f32>() - 0.5) * self.emitter.jitter;
            }
            let spawn = ResolvedSpawn::resolve(
                &ParticleConfig::at(x, self.emitter.position.y),
                &self.defaults,
            );
            if self.spawn_resolved(spawn, None).is_some() {
                self.stats.total_emitted += 1;
            }
        }

        for slot in self.slots.iter_mut() {
            if !slot.active {
                continue;
            }

            slot.age += dt;
            let t = life_fraction(slot.age, slot.lifetime);
            let expired = !(slot.age < slot.lifetime);

            if let Some(instance) = self.batch.instance_mut(&slot.handle) {
                instance.position[0] += slot.velocity.x * dt;
                instance.position[1] += slot.velocity.y * dt;
                instance.rotation += slot.rotation_speed * dt;
                instance.alpha = lerp(slot.start_alpha, slot.end_alpha, t);
                instance.set_uniform_scale(lerp(slot.start_scale, slot.end_scale, t));
                instance.tint = lerp_color(slot.start_color, slot.end_color, t);

                if expired {
                    instance.alpha = 0.0;
                }
            }

            if expired {
                slot.active = false;
                self.stats.expired += 1;
                if let Some(callback) = slot.on_complete.take() {
                    self.pending.push(callback);
                }
            }
        }

        self.batch.mark_dirty();
    }

    /// 停用并隐藏所有粒子，容量不变
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.active = false;
            slot.on_complete = None;
            if let Some(instance) = self.batch.instance_mut(&slot.handle) {
                instance.alpha = 0.0;
            }
        }
        self.batch.mark_dirty();
        tracing::debug!(target: "particles", capacity = self.slots.len(), "Particle pool cleared");
    }

    /// 存活粒子数
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// 池容量
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn stats(&self) -> ParticleSystemStats {
        ParticleSystemStats {
            alive: self.count(),
            ..self.stats
        }
    }

    pub fn template(&self) -> &ParticleTemplate {
        &self.template
    }

    /// 渲染批次（只读）
    pub fn batch(&self) -> &B {
        &self.batch
    }

    /// 槽位状态
    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.slots.get(index).map(ParticleSlot::state)
    }

    /// 槽位对应的实例属性
    pub fn instance(&self, index: usize) -> Option<&ParticleInstance> {
        let slot = self.slots.get(index)?;
        self.batch.instance(&slot.handle)
    }
}

impl ParticleSystem<InstanceBatch> {
    /// 如果本帧有属性变化，返回需要上传的实例字节
    pub fn take_dirty(&mut self) -> Option<&[u8]> {
        self.batch.take_dirty()
    }
}

impl<B: ParticleBatch> ParticleEffect for ParticleSystem<B> {
    fn update(&mut self, dt: f32) {
        ParticleSystem::update(self, dt);
    }

    fn clear(&mut self) {
        ParticleSystem::clear(self);
    }

    fn count(&self) -> usize {
        ParticleSystem::count(self)
    }
}

impl<B: ParticleBatch> FrameTask for ParticleSystem<B> {
    /// 到期回调交给调度器，在释放粒子池借用后执行
    fn tick(&mut self, dt: f32) -> TaskStatus {
        self.simulate(dt);
        if self.pending.is_empty() {
            TaskStatus::Continue
        } else {
            TaskStatus::Deferred(std::mem::take(&mut self.pending))
        }
    }
}
