//! # handfield
//!
//! Gesture-driven force fields for large particle clouds.
//!
//! A hand-tracking front end reports where the hand is and what gesture it is
//! making; handfield turns that into forces on hundreds of thousands of
//! particles. Physics runs on the CPU with a fixed per-frame budget: only one
//! chunk of particles is integrated each tick, so frame cost stays flat as the
//! particle count grows.
//!
//! ## Quick Start
//!
//! ```ignore
//! use handfield::prelude::*;
//!
//! let mut sim = Simulation::new(
//!     SimulationConfig::default()
//!         .with_particle_count(150_000)
//!         .with_formation(Formation::shells()),
//! )?;
//!
//! sim.set_hand(HandReading::at(Vec3::new(0.4, 0.1, 0.0), Gesture::Fist));
//! sim.tick();
//! sim.set_hand(HandReading::at(Vec3::new(0.4, 0.1, 0.0), Gesture::Open)); // boom
//! sim.tick();
//!
//! let positions: &[f32] = sim.store().positions_flat();
//! ```
//!
//! ## Core Concepts
//!
//! ### Formations
//!
//! Every particle has an origin it springs back to. A [`Formation`] computes
//! those origins deterministically from `(i, n)`. Switching formation either
//! rebuilds immediately or morphs the origins over a fixed number of ticks.
//!
//! ### Gestures
//!
//! | Gesture | Effect |
//! |---------|--------|
//! | OPEN | Attract toward the palm |
//! | POINT | Attract, never arms an explosion |
//! | FIST | Compress toward the world origin; releasing to OPEN explodes |
//! | PINCH | Tight capture that partially cancels the spring |
//! | SWIPE | Time-limited lateral scatter |
//! | PEACE | Standing wave |
//! | REPEL | Push away from the palm |
//!
//! ### Chunked integration
//!
//! [`ChunkScheduler`] hands out one index range per tick in round-robin order.
//! With `N` particles and chunk size `C`, each particle moves once every
//! `ceil(N / C)` ticks.

pub mod config;
pub mod error;
pub mod forces;
pub mod formation;
pub mod hand;
pub mod integrator;
pub mod scheduler;
pub mod simulation;
pub mod store;
pub mod time;

pub use bytemuck;
pub use config::{CappedKernel, ExplosionConfig, ForceConfig, SimulationConfig};
pub use error::{ConfigError, LoadError};
pub use formation::{Formation, Morph};
pub use glam::{Vec2, Vec3};
pub use hand::{Gesture, HandEvent, HandReading, HandState, FINGERTIP_COUNT};
pub use scheduler::ChunkScheduler;
pub use simulation::Simulation;
pub use store::{ParticleStore, ParticleVertex};
pub use time::FrameClock;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use handfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{ForceConfig, SimulationConfig};
    pub use crate::formation::Formation;
    pub use crate::hand::{Gesture, HandEvent, HandReading};
    pub use crate::simulation::Simulation;
    pub use crate::store::ParticleVertex;
    pub use crate::time::FrameClock;
    pub use crate::{Vec2, Vec3};
}
