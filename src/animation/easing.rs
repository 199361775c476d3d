//! 缓动函数
//!
//! 纯函数，把归一化进度 `t ∈ [0, 1]` 映射为曲线值。
//! back/elastic 类曲线会超出 `[0, 1]`，调用方不应截断结果。

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;

/// 缓动函数指针
pub type EasingFn = fn(f32) -> f32;

pub fn linear(t: f32) -> f32 {
    t
}

pub fn ease_in_quad(t: f32) -> f32 {
    t * t
}

pub fn ease_out_quad(t: f32) -> f32 {
    t * (2.0 - t)
}

pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

pub fn ease_in_cubic(t: f32) -> f32 {
    t * t * t
}

pub fn ease_out_cubic(t: f32) -> f32 {
    let u = t - 1.0;
    u * u * u + 1.0
}

pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

pub fn ease_in_quart(t: f32) -> f32 {
    t * t * t * t
}

pub fn ease_out_quart(t: f32) -> f32 {
    let u = t - 1.0;
    1.0 - u * u * u * u
}

pub fn ease_in_quint(t: f32) -> f32 {
    t * t * t * t * t
}

pub fn ease_out_quint(t: f32) -> f32 {
    let u = t - 1.0;
    1.0 + u * u * u * u * u
}

pub fn ease_in_sine(t: f32) -> f32 {
    1.0 - (t * PI / 2.0).cos()
}

pub fn ease_out_sine(t: f32) -> f32 {
    (t * PI / 2.0).sin()
}

pub fn ease_in_out_sine(t: f32) -> f32 {
    -((PI * t).cos() - 1.0) / 2.0
}

/// 末端回弹（会超过 1）
pub fn ease_out_back(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    let u = t - 1.0;
    1.0 + C3 * u.powi(3) + C1 * u.powi(2)
}

/// 末端弹性振荡
pub fn ease_out_elastic(t: f32) -> f32 {
    const C4: f32 = (2.0 * PI) / 3.0;
    if t == 0.0 {
        0.0
    } else if t == 1.0 {
        1.0
    } else {
        2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
    }
}

/// 具名缓动曲线
///
/// 可以从配置文件按名字读取；`Custom` 只能在代码里构造。
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseOutBack,
    EaseOutElastic,
    #[serde(skip)]
    Custom(EasingFn),
}

impl Easing {
    /// 对应的函数
    pub fn function(self) -> EasingFn {
        match self {
            Self::Linear => linear,
            Self::EaseInQuad => ease_in_quad,
            Self::EaseOutQuad => ease_out_quad,
            Self::EaseInOutQuad => ease_in_out_quad,
            Self::EaseInCubic => ease_in_cubic,
            Self::EaseOutCubic => ease_out_cubic,
            Self::EaseInOutCubic => ease_in_out_cubic,
            Self::EaseInQuart => ease_in_quart,
            Self::EaseOutQuart => ease_out_quart,
            Self::EaseInQuint => ease_in_quint,
            Self::EaseOutQuint => ease_out_quint,
            Self::EaseInSine => ease_in_sine,
            Self::EaseOutSine => ease_out_sine,
            Self::EaseInOutSine => ease_in_out_sine,
            Self::EaseOutBack => ease_out_back,
            Self::EaseOutElastic => ease_out_elastic,
            Self::Custom(f) => f,
        }
    }

    /// 计算曲线值
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        (self.function())(t)
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(..)"),
            other => {
                let name = serde_json::to_value(other)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_owned))
                    .unwrap_or_default();
                f.write_str(&name)
            }
        }
    }
}

impl From<EasingFn> for Easing {
    fn from(f: EasingFn) -> Self {
        Self::Custom(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 16] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInQuint,
        Easing::EaseOutQuint,
        Easing::EaseInSine,
        Easing::EaseOutSine,
        Easing::EaseInOutSine,
        Easing::EaseOutBack,
        Easing::EaseOutElastic,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-5, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_midpoints() {
        assert_eq!(linear(0.5), 0.5);
        assert_eq!(ease_in_quad(0.5), 0.25);
        assert_eq!(ease_out_quad(0.5), 0.75);
        assert_eq!(ease_in_out_quad(0.5), 0.5);
        assert_eq!(ease_in_cubic(0.5), 0.125);
        assert_eq!(ease_out_cubic(0.5), 0.875);
        assert!((ease_in_out_sine(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_back_overshoots() {
        let peak = (1..100)
            .map(|i| ease_out_back(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_elastic_leaves_unit_range() {
        assert!((1..100)
            .map(|i| ease_out_elastic(i as f32 / 100.0))
            .any(|v| v > 1.0));
    }

    #[test]
    fn test_names_round_trip() {
        let easing: Easing = serde_json::from_str("\"ease_out_back\"").unwrap();
        assert!(matches!(easing, Easing::EaseOutBack));
        assert_eq!(format!("{:?}", Easing::EaseInOutCubic), "ease_in_out_cubic");
    }

    #[test]
    fn test_custom_function() {
        fn step(t: f32) -> f32 {
            if t < 1.0 { 0.0 } else { 1.0 }
        }
        let easing = Easing::from(step as EasingFn);
        assert_eq!(easing.apply(0.9), 0.0);
        assert_eq!(format!("{:?}", easing), "Custom(..)");
    }
}
