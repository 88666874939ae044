//! Per-particle force terms.
//!
//! Net force is a plain sum of independent terms, each tunable on its own:
//!
//! | Term | Active when |
//! |------|-------------|
//! | [`spring`] | always |
//! | spring damping | `spring_damping` is set |
//! | [`turbulence`] | `turbulence` is set |
//! | [`explosion_force`] | hand present and an explosion is decaying |
//! | [`gesture_force`] | hand present, selected by gesture |
//! | [`fingertip_force`] | hand present, OPEN/POINT/PINCH, five fingertips |
//!
//! Every hand-relative term divides by `dist = |hand - p| + HAND_EPSILON` or by
//! a kernel with a positive bias, so a hand sitting exactly on a particle
//! still produces a finite force.

use glam::Vec3;

use crate::config::{CappedKernel, ForceConfig};
use crate::hand::{Gesture, HandState};

/// Added to hand distances to keep divisions finite.
pub const HAND_EPSILON: f32 = 0.001;

/// Softening added to squared fingertip distances.
const FINGERTIP_SOFTENING: f32 = 0.05;

/// Z attenuation of fingertip pulls.
const FINGERTIP_Z_SCALE: f32 = 0.3;

/// Slow clock multiplier for the turbulence field.
const TURBULENCE_RATE: f32 = 0.00035;

/// Z amplitude of the swipe scatter, relative to its strength.
const SCATTER_Z_SCALE: f32 = 0.35;

/// Snapshot of the particle being evaluated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSample {
    /// Particle id, used for per-particle phase offsets.
    pub index: usize,
    pub position: Vec3,
    pub velocity: Vec3,
    pub origin: Vec3,
}

/// Hooke pull toward the rest position.
#[inline]
pub fn spring(position: Vec3, origin: Vec3, forces: &ForceConfig) -> Vec3 {
    (origin - position) * forces.spring
}

/// Smooth pseudo-noise field. Depends only on position and time.
#[inline]
pub fn turbulence(position: Vec3, time: f32, strength: f32) -> Vec3 {
    let t = time * TURBULENCE_RATE;
    let Vec3 { x, y, z } = position;
    Vec3::new(
        (x * 1.7 + t * 1.1).sin() * (y * 1.3 + t).cos(),
        (y * 1.5 + t * 0.9).cos() * (z * 1.2 + t * 1.3).sin(),
        (z * 1.6 + t * 1.2).sin() * (x * 1.4 + t * 0.8).cos(),
    ) * strength
}

/// Forces that act with or without a hand: spring, spring damping, turbulence.
#[inline]
pub fn rest_force(particle: &ParticleSample, time: f32, forces: &ForceConfig) -> Vec3 {
    let mut f = spring(particle.position, particle.origin, forces);

    if let Some(factor) = forces.spring_damping {
        f -= particle.velocity * (1.0 - factor);
    }
    if let Some(strength) = forces.turbulence {
        f += turbulence(particle.position, time, strength);
    }

    f
}

/// Radial push away from the hand while an explosion decays.
///
/// Falls off linearly to zero at `explosion.falloff_radius`.
pub fn explosion_force(particle: &ParticleSample, hand: &HandState, forces: &ForceConfig) -> Vec3 {
    let magnitude = hand.explosion_force();
    if magnitude <= 0.0 {
        return Vec3::ZERO;
    }

    let explosion = &forces.explosion;
    let away = particle.position - hand.position();
    let dist = away.length() + HAND_EPSILON;
    let falloff = (1.0 - dist / explosion.falloff_radius).max(0.0);
    let push = away / dist * magnitude * falloff;
    Vec3::new(push.x, push.y, push.z * explosion.z_scale)
}

/// `d * kernel(|d|²)` with the kernel's Z attenuation.
#[inline]
fn capped_pull(d: Vec3, d2: f32, kernel: &CappedKernel) -> Vec3 {
    let k = kernel.eval(d2);
    Vec3::new(d.x * k, d.y * k, d.z * k * kernel.z_scale)
}

/// Gesture-specific kernel.
///
/// OPEN, POINT, PINCH and FIST take precedence over a running swipe; any
/// other gesture yields to the swipe scatter until its countdown ends.
pub fn gesture_force(
    particle: &ParticleSample,
    hand: &HandState,
    time: f32,
    forces: &ForceConfig,
) -> Vec3 {
    let p = particle.position;
    let d = hand.position() - p;
    let d2 = d.length_squared();
    let dist = d2.sqrt() + HAND_EPSILON;

    match hand.gesture() {
        Gesture::Open | Gesture::Point => {
            capped_pull(d, d2, &forces.attract)
                + Vec3::new(d.x, d.y, 0.0) * forces.attract_viscosity
        }

        Gesture::Pinch => {
            let release = spring(p, particle.origin, forces) * forces.pinch_spring_release;
            capped_pull(d, d2, &forces.pinch) - Vec3::new(release.x, release.y, 0.0)
        }

        Gesture::Fist => {
            let pull = (forces.compress_hand_pull / dist).min(forces.compress_hand_cap);
            -p * forces.compress + Vec3::new(d.x * pull, d.y * pull, 0.0)
        }

        gesture if gesture == Gesture::Swipe || hand.swipe_active() => {
            let phase = (particle.index & 7) as f32 * 0.8;
            let strength = forces.scatter * hand.swipe_strength();
            let v = hand.swipe_velocity();
            Vec3::new(
                v.x * strength * (0.6 + 0.4 * phase.sin()),
                v.y * strength * (0.6 + 0.4 * phase.cos()),
                SCATTER_Z_SCALE * (phase * 1.7).sin() * strength,
            )
        }

        Gesture::Peace => {
            let wave = Vec3::new(
                (p.y * 2.8 + time * 0.0018).cos(),
                (p.x * 2.8 + time * 0.0022).sin(),
                (p.z * 2.5 + time * 0.002).sin() * 0.5,
            ) * forces.wave;
            wave + Vec3::new(d.x, d.y, 0.0) * (forces.wave_hand_pull / dist)
        }

        Gesture::Repel => -capped_pull(d, d2, &forces.repel),

        Gesture::None | Gesture::Swipe => Vec3::ZERO,
    }
}

/// Local pulls toward each fingertip within `fingertip_radius`.
pub fn fingertip_force(particle: &ParticleSample, hand: &HandState, forces: &ForceConfig) -> Vec3 {
    if !hand.gesture().uses_fingertips() {
        return Vec3::ZERO;
    }
    let Some(tips) = hand.fingertips() else {
        return Vec3::ZERO;
    };

    let radius2 = forces.fingertip_radius * forces.fingertip_radius;
    let mut f = Vec3::ZERO;
    for tip in tips {
        let d = *tip - particle.position;
        let d2 = d.length_squared();
        if d2 < radius2 {
            let k = forces.fingertip_strength / (d2 + FINGERTIP_SOFTENING);
            f += Vec3::new(d.x * k, d.y * k, d.z * k * FINGERTIP_Z_SCALE);
        }
    }
    f
}

/// Every hand-dependent term. Zero when no hand is present.
pub fn hand_force(
    particle: &ParticleSample,
    hand: &HandState,
    time: f32,
    forces: &ForceConfig,
) -> Vec3 {
    if !hand.present() {
        return Vec3::ZERO;
    }

    explosion_force(particle, hand, forces)
        + gesture_force(particle, hand, time, forces)
        + fingertip_force(particle, hand, forces)
}

/// Total force on one particle for this tick.
#[inline]
pub fn net_force(
    particle: &ParticleSample,
    hand: &HandState,
    time: f32,
    forces: &ForceConfig,
) -> Vec3 {
    rest_force(particle, time, forces) + hand_force(particle, hand, time, forces)
}
