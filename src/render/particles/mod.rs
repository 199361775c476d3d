//! 粒子系统模块
//!
//! 两种粒子特效实现，共享 [`ParticleEffect`] 接口。
//!
//! ## 架构设计
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Pooled Particle System                  │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Emission                                             │
//! │     - 时间累加器，按固定间隔发射，余数保留到下一帧        │
//! │     - 优先使用空闲槽位，池满时回收最老的粒子              │
//! │                                                          │
//! │  2. Simulation                                           │
//! │     - 速度积分（位置）、角速度积分（旋转）                │
//! │     - 透明度/缩放/颜色随生命周期线性插值                  │
//! │                                                          │
//! │  3. Flush                                                │
//! │     - 每帧一次脏标记，渲染器整批上传                      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 使用示例
//!
//! ```ignore
//! let mut particles = ParticleSystem::from_config(InstanceBatch::new(), &textures, &config.particles)?;
//! particles.set_default_config(ParticleDefaults::phoenix_flame());
//! particles.set_emitter_position(400.0, 300.0);
//! particles.set_emitter_rate(0.08);
//!
//! // 每帧
//! particles.update(dt);
//! if let Some(bytes) = particles.take_dirty() {
//!     upload(bytes);
//! }
//! ```

pub mod batch;
pub mod color;
pub mod config;
pub mod effect;
pub mod fire;
pub mod pool;

pub use batch::{
    BlendMode, InstanceBatch, ParticleBatch, ParticleHandle, ParticleInstance, ParticleTemplate,
};
pub use color::lerp_color;
pub use config::{ParticleConfig, ParticleDefaults};
pub use effect::ParticleEffect;
pub use fire::{FireEmitter, FireParticle, FireSprite, SpriteAnimation};
pub use pool::{ParticleSystem, ParticleSystemStats, SlotState, DEFAULT_EMITTER_RATE};
