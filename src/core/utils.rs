//! 核心工具函数
//!
//! 插值与随机采样，粒子系统和补间共用

use rand::Rng;

/// 线性插值
///
/// `t` 不做截断，调用方负责。
///
/// # 示例
///
/// ```rust
/// use flame_fx::core::utils::lerp;
///
/// assert_eq!(lerp(0.0, 100.0, 0.25), 25.0);
/// ```
#[inline]
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}

/// 生命周期比例 `age / lifetime`，截断到 `[0, 1]`
///
/// `lifetime <= 0` 时视为已经走完（返回 1），避免除零。
#[inline]
pub fn life_fraction(age: f32, lifetime: f32) -> f32 {
    if lifetime <= 0.0 {
        return 1.0;
    }
    (age / lifetime).clamp(0.0, 1.0)
}

/// 在 `[min, max)` 内均匀采样
///
/// 区间颠倒或退化时不会 panic：`min == max` 返回 `min`，颠倒的区间按同一段采样。
#[inline]
pub fn random_range<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + rng.gen::<f32>() * (max - min)
}
