//! # Flame FX
//!
//! Pooled particle effects and property tweens for 2D games, built with Rust.
//!
//! ## Features
//!
//! - **Particle Pool**: Fixed-capacity particle system with continuous emission,
//!   oldest-particle recycling and per-frame attribute interpolation
//! - **Fire Emitter**: Owned-sprite fire/smoke emitter with frame animation
//! - **Tween**: Property tweens over any [`animation::Tweenable`] target with a library of easing curves
//! - **Scheduler**: Explicit single-threaded frame scheduler driving all effects
//! - **Configuration**: TOML/JSON configuration with environment overrides
//!
//! ## Architecture Design
//!
//! The crate is renderer-agnostic:
//! - **Simulation**: Particle pools and tweens only write attribute data
//! - **Batch**: [`render::ParticleBatch`] receives per-particle instances and a dirty flag
//! - **Host**: The renderer uploads the batch once per frame and draws it
//!
//! ### Example
//!
//! ```ignore
//! use flame_fx::core::FrameScheduler;
//! use flame_fx::render::{InstanceBatch, ParticleDefaults, ParticleSystem};
//!
//! let scheduler = FrameScheduler::new();
//! let mut particles = ParticleSystem::from_config(InstanceBatch::new(), &textures, &config.particles)?;
//! particles.set_default_config(ParticleDefaults::phoenix_flame());
//! let particles = Rc::new(RefCell::new(particles));
//! scheduler.add_task(particles.clone());
//!
//! loop {
//!     scheduler.step(clock.tick());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Scheduler, errors, logging and the headless engine loop
//! - [`render`]: Particle effects
//! - [`animation`]: Tweens and easing
//! - [`resources`]: Texture lookup
//! - [`config`]: Configuration

/// Core functionality including the frame scheduler and error types
pub mod core;
/// Particle effects and instance batches
pub mod render;
/// Texture lookup for effect construction
pub mod resources;
/// Configuration system
pub mod config;
/// Property tweens and easing functions
pub mod animation;
