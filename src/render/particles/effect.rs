//! 粒子特效的公共能力
//!
//! 两种实现的资源所有权模型不同：
//! - [`ParticleSystem`](super::ParticleSystem)：固定容量的槽位池，共享一个实例批次
//! - [`FireEmitter`](super::FireEmitter)：每个粒子是独立拥有的精灵对象，带逐帧动画

/// 粒子特效
pub trait ParticleEffect {
    /// 推进 `dt` 秒
    fn update(&mut self, dt: f32);

    /// 隐藏并停用所有粒子
    fn clear(&mut self);

    /// 当前存活粒子数
    fn count(&self) -> usize;
}
