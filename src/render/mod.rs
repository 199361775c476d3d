//! 渲染侧特效
//!
//! 只负责粒子属性的模拟与批次写入，GPU 上传与绘制由宿主渲染器完成。

pub mod particles;

// Re-export particle effect components
pub use particles::{
    FireEmitter, InstanceBatch, ParticleBatch, ParticleConfig, ParticleDefaults, ParticleEffect,
    ParticleSystem, ParticleTemplate,
};
