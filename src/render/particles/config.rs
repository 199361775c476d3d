//! 粒子生成参数
//!
//! `ParticleConfig` 是单次 `spawn` 的参数，`ParticleDefaults` 是粒子池级别的默认值。
//! 合并顺序：单次参数 → 池默认值 → 内置默认值。

use super::color::WHITE;
use crate::core::scheduler::Completion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 内置默认值
pub const DEFAULT_LIFETIME: f32 = 1.0;
pub const DEFAULT_START_ALPHA: f32 = 1.0;
pub const DEFAULT_END_ALPHA: f32 = 0.0;
pub const DEFAULT_START_SCALE: f32 = 0.3;
pub const DEFAULT_END_SCALE: f32 = 0.0;
pub const DEFAULT_ROTATION_SPEED: f32 = 0.1;

/// 单次生成参数
///
/// 未设置的字段取池默认值，再取内置默认值。不做范围校验。
#[derive(Default)]
pub struct ParticleConfig {
    pub x: f32,
    pub y: f32,
    pub velocity_x_min: Option<f32>,
    pub velocity_x_max: Option<f32>,
    pub velocity_y_min: Option<f32>,
    pub velocity_y_max: Option<f32>,
    pub lifetime: Option<f32>,
    pub start_color: Option<u32>,
    pub end_color: Option<u32>,
    pub start_alpha: Option<f32>,
    pub end_alpha: Option<f32>,
    pub start_scale: Option<f32>,
    pub end_scale: Option<f32>,
    /// 初始旋转（弧度），未设置时随机
    pub rotation: Option<f32>,
    /// 角速度（弧度/秒）
    pub rotation_speed: Option<f32>,
    /// 粒子自然消亡时调用一次
    pub on_complete: Option<Completion>,
}

impl ParticleConfig {
    /// 在 (x, y) 生成，其余取默认值
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn with_velocity_x(mut self, min: f32, max: f32) -> Self {
        self.velocity_x_min = Some(min);
        self.velocity_x_max = Some(max);
        self
    }

    pub fn with_velocity_y(mut self, min: f32, max: f32) -> Self {
        self.velocity_y_min = Some(min);
        self.velocity_y_max = Some(max);
        self
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    pub fn with_colors(mut self, start: u32, end: u32) -> Self {
        self.start_color = Some(start);
        self.end_color = Some(end);
        self
    }

    pub fn with_alpha(mut self, start: f32, end: f32) -> Self {
        self.start_alpha = Some(start);
        self.end_alpha = Some(end);
        self
    }

    pub fn with_scale(mut self, start: f32, end: f32) -> Self {
        self.start_scale = Some(start);
        self.end_scale = Some(end);
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_rotation_speed(mut self, speed: f32) -> Self {
        self.rotation_speed = Some(speed);
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for ParticleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleConfig")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("lifetime", &self.lifetime)
            .field("start_color", &self.start_color)
            .field("end_color", &self.end_color)
            .field("on_complete", &self.on_complete.is_some())
            .finish_non_exhaustive()
    }
}

/// 粒子池默认参数（部分配置）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_x_min: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_x_max: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_y_min: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub velocity_y_max: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_alpha: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_alpha: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_scale: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_speed: Option<f32>,
}

impl ParticleDefaults {
    /// 凤凰火焰预设：橙红到黄色，向上喷射
    pub fn phoenix_flame() -> Self {
        Self {
            velocity_x_min: Some(-50.0),
            velocity_x_max: Some(50.0),
            velocity_y_min: Some(-200.0),
            velocity_y_max: Some(-200.0),
            lifetime: Some(1.2),
            start_color: Some(0xff4500),
            end_color: Some(0xffff00),
            start_alpha: Some(1.0),
            end_alpha: Some(0.0),
            start_scale: Some(0.3),
            end_scale: Some(0.0),
            rotation: None,
            rotation_speed: None,
        }
    }

    /// 烟雾预设：灰色缓慢上升并扩散
    pub fn smoke() -> Self {
        Self {
            velocity_x_min: Some(-15.0),
            velocity_x_max: Some(15.0),
            velocity_y_min: Some(-60.0),
            velocity_y_max: Some(-30.0),
            lifetime: Some(2.5),
            start_color: Some(0x555555),
            end_color: Some(0x222222),
            start_alpha: Some(0.6),
            end_alpha: Some(0.0),
            start_scale: Some(0.2),
            end_scale: Some(0.6),
            rotation: None,
            rotation_speed: Some(0.3),
        }
    }
}

/// 合并后的生成参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ResolvedSpawn {
    pub x: f32,
    pub y: f32,
    pub velocity_x: (f32, f32),
    pub velocity_y: (f32, f32),
    pub lifetime: f32,
    pub start_color: u32,
    pub end_color: u32,
    pub start_alpha: f32,
    pub end_alpha: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    pub rotation: Option<f32>,
    pub rotation_speed: f32,
}

impl ResolvedSpawn {
    pub(crate) fn resolve(config: &ParticleConfig, defaults: &ParticleDefaults) -> Self {
        Self {
            x: config.x,
            y: config.y,
            velocity_x: (
                config.velocity_x_min.or(defaults.velocity_x_min).unwrap_or(0.0),
                config.velocity_x_max.or(defaults.velocity_x_max).unwrap_or(0.0),
            ),
            velocity_y: (
                config.velocity_y_min.or(defaults.velocity_y_min).unwrap_or(0.0),
                config.velocity_y_max.or(defaults.velocity_y_max).unwrap_or(0.0),
            ),
            lifetime: config
                .lifetime
                .or(defaults.lifetime)
                .unwrap_or(DEFAULT_LIFETIME),
            start_color: config.start_color.or(defaults.start_color).unwrap_or(WHITE),
            end_color: config.end_color.or(defaults.end_color).unwrap_or(WHITE),
            start_alpha: config
                .start_alpha
                .or(defaults.start_alpha)
                .unwrap_or(DEFAULT_START_ALPHA),
            end_alpha: config
                .end_alpha
                .or(defaults.end_alpha)
                .unwrap_or(DEFAULT_END_ALPHA),
            start_scale: config
                .start_scale
                .or(defaults.start_scale)
                .unwrap_or(DEFAULT_START_SCALE),
            end_scale: config
                .end_scale
                .or(defaults.end_scale)
                .unwrap_or(DEFAULT_END_SCALE),
            rotation: config.rotation.or(defaults.rotation),
            rotation_speed: config
                .rotation_speed
                .or(defaults.rotation_speed)
                .unwrap_or(DEFAULT_ROTATION_SPEED),
        }
    }
}
