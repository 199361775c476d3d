//! 动画系统模块
//!
//! 提供属性补间和缓动函数。
//!
//! ## 功能特性
//!
//! - 按属性名补间任意实现了 [`Tweenable`] 的对象
//! - 常用缓动曲线，可按名字从配置读取
//! - 由 [`FrameScheduler`](crate::core::FrameScheduler) 逐帧驱动，完成后自动注销
//!
//! ## 使用示例
//!
//! ```rust
//! use flame_fx::animation::{Easing, Tween};
//! use flame_fx::core::FrameScheduler;
//! use glam::Vec2;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let scheduler = FrameScheduler::new();
//! let position = Rc::new(RefCell::new(Vec2::ZERO));
//!
//! let tween = Tween::new(&scheduler, &position, [("x", 100.0)], 1.0)
//!     .unwrap()
//!     .with_easing(Easing::EaseInOutQuad);
//! tween.start();
//!
//! scheduler.step(0.5);
//! assert!((position.borrow().x - 50.0).abs() < 1e-4);
//! ```

pub mod easing;
pub mod tween;

pub use easing::{Easing, EasingFn};
pub use tween::{PropertyAccessor, Tween, Tweenable};
