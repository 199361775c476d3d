use super::{ConfigError, ConfigResult};
use crate::impl_default;
use crate::render::particles::{BlendMode, ParticleDefaults};
use serde::{Deserialize, Serialize};

/// 单个粒子池允许的最大容量
pub const MAX_POOL_CAPACITY: usize = 1_000_000;

/// 粒子池配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSystemConfig {
    /// 池容量（构造时一次性分配）
    pub max_particles: usize,

    /// 发射间隔（秒/粒子）
    pub emitter_rate: f32,

    /// 是否连续发射
    pub emitter_enabled: bool,

    /// 发射点水平抖动宽度（像素）
    pub emitter_jitter: f32,

    /// 粒子纹理路径
    pub texture: String,

    /// 混合模式
    pub blend_mode: BlendMode,

    /// 粒子默认参数
    pub defaults: ParticleDefaults,
}

impl_default!(ParticleSystemConfig {
    max_particles: 500,
    emitter_rate: 0.05,
    emitter_enabled: true,
    emitter_jitter: 0.0,
    texture: "/particles/flame_04.png".to_string(),
    blend_mode: BlendMode::Add,
    defaults: ParticleDefaults::default(),
});

impl ParticleSystemConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_particles > MAX_POOL_CAPACITY {
            return Err(ConfigError::ValidationError(format!(
                "max_particles {} exceeds limit {}",
                self.max_particles, MAX_POOL_CAPACITY
            )));
        }
        if !self.emitter_rate.is_finite() || self.emitter_rate < 0.0 {
            return Err(ConfigError::ValidationError(
                "emitter_rate must be a non-negative number".to_string(),
            ));
        }
        if self.emitter_jitter < 0.0 {
            return Err(ConfigError::ValidationError(
                "emitter_jitter must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// 火焰精灵发射器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FireEmitterConfig {
    /// 发射间隔（秒）
    pub spawn_rate: f32,

    /// 基础寿命（秒）
    pub lifetime: f32,

    /// 寿命随机增量上限（秒）
    pub lifetime_jitter: f32,

    /// 上升速度（像素/秒）
    pub rise_speed: f32,

    /// 水平散布宽度（像素）
    pub spread: f32,

    /// 初始缩放下限
    pub scale_min: f32,

    /// 初始缩放上限
    pub scale_max: f32,

    /// 精灵动画帧率（帧/秒）
    pub frame_rate: f32,

    /// 精灵动画帧纹理路径
    pub frames: Vec<String>,
}

impl_default!(FireEmitterConfig {
    spawn_rate: 0.1,
    lifetime: 0.5,
    lifetime_jitter: 0.0083,
    rise_speed: 60.0,
    spread: 20.0,
    scale_min: 0.6,
    scale_max: 1.0,
    frame_rate: 24.0,
    frames: Vec::new(),
});

impl FireEmitterConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.lifetime > 0.0) {
            return Err(ConfigError::ValidationError(
                "fire lifetime must be positive".to_string(),
            ));
        }
        if self.scale_min > self.scale_max {
            return Err(ConfigError::ValidationError(
                "fire scale_min is larger than scale_max".to_string(),
            ));
        }
        if self.frame_rate < 0.0 {
            return Err(ConfigError::ValidationError(
                "fire frame_rate must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
