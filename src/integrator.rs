//! Semi-implicit Euler integration with damping and a velocity cap.
//!
//! `v' = (v + F) * damping`, clamped to `max_velocity`, then `p' = p + v'`.
//! There is no substepping or collision; the cap and the bounded kernels in
//! [`forces`](crate::forces) are what keep the explicit step stable.

use glam::Vec3;
use std::ops::Range;

use crate::config::ForceConfig;
use crate::forces::{net_force, ParticleSample};
use crate::hand::HandState;
use crate::store::ParticleStore;

/// New velocity after applying `force`, damping and the cap.
///
/// The cap rescales the vector, so direction is preserved.
#[inline]
pub fn integrate(velocity: Vec3, force: Vec3, forces: &ForceConfig) -> Vec3 {
    let v = (velocity + force) * forces.damping;
    let max = forces.max_velocity;
    let speed2 = v.length_squared();
    if speed2 > max * max {
        v * (max / speed2.sqrt())
    } else {
        v
    }
}

/// Advance every particle in `range` by one tick.
///
/// Reads the live origin buffer and the hand state; writes position and
/// velocity. Particles outside `range` are untouched.
pub fn step_range(
    store: &mut ParticleStore,
    range: Range<usize>,
    hand: &HandState,
    time: f32,
    forces: &ForceConfig,
) {
    let (position, velocity, origin) = store.dynamics_mut();

    for i in range {
        let particle = ParticleSample {
            index: i,
            position: position[i],
            velocity: velocity[i],
            origin: origin[i],
        };
        let f = net_force(&particle, hand, time, forces);
        let v = integrate(particle.velocity, f, forces);
        velocity[i] = v;
        position[i] = particle.position + v;
    }
}
