//! Formation builders and morph transitions.
//!
//! A [`Formation`] computes the rest position ("origin") each particle springs
//! toward. Every builder is a pure function of `(i, n, params)`: the same index
//! always lands on the same point, so origins can be generated in any order or
//! in parallel. Where a shape wants a little scatter, it comes from an RNG
//! seeded by the particle index, never from shared RNG state.
//!
//! # Example
//!
//! ```ignore
//! let sphere = Formation::Sphere { radius: 1.5 };
//! let origins = sphere.build(10_000);
//!
//! // Cross-fade to a galaxy over ~125 ticks
//! let mut morph = Morph::new(origins.clone(), Formation::galaxy(), 0.008);
//! ```

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU as TAU64;
use std::f32::consts::{PI, TAU};

use crate::error::ConfigError;

/// Golden angle in radians, `π(3 - √5)`.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Minimum lateral scatter of galaxy arms near the rim.
const GALAXY_MIN_SPREAD: f32 = 0.05;

/// Full-width scatter applied to helix strands.
const HELIX_JITTER: f32 = 0.05;

/// Target shapes particles are sprung toward.
///
/// Dispatch is by tag; each variant carries only its own parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Formation {
    /// Uniform sphere surface via the golden-angle spiral.
    Sphere {
        /// Sphere radius in world units.
        radius: f32,
    },

    /// Concentric golden-angle shells, giving the sphere visible depth.
    Shells {
        /// Radius of the innermost shell.
        radius: f32,
        /// Number of shells. Particle `i` lives on shell `i % layers`.
        layers: u32,
        /// Radial distance between consecutive shells.
        spacing: f32,
        /// Extra per-particle radial scatter (full width).
        jitter: f32,
    },

    /// Flat multi-arm spiral galaxy in the XZ plane.
    Galaxy {
        /// Number of spiral arms.
        arms: u32,
        /// Radius reached by the last particle, excluding `core`.
        radius: f32,
        /// Radius of the first particle.
        core: f32,
        /// Radians of arm rotation per world unit of radius.
        twist: f32,
        /// Lateral scatter near the core, shrinking toward the rim.
        spread: f32,
        /// Vertical thickness of the disk.
        thickness: f32,
    },

    /// Intertwined helices along the Y axis.
    Helix {
        /// Number of strands, evenly offset in phase.
        strands: u32,
        /// Total height along Y.
        height: f32,
        /// Full rotations over the height.
        turns: f32,
        /// Base strand radius.
        radius: f32,
        /// Amplitude of the slow radius modulation.
        ripple: f32,
    },

    /// Widening funnel spiral along Y.
    Vortex {
        /// Radius at the bottom of the funnel.
        inner: f32,
        /// Radius gained from bottom to top.
        growth: f32,
        /// Total height along Y.
        height: f32,
        /// Full rotations over the height.
        turns: f32,
        /// Scatter as a fraction of the local radius.
        spread: f32,
    },
}

impl Default for Formation {
    fn default() -> Self {
        Formation::Sphere { radius: 1.5 }
    }
}

impl Formation {
    /// Layered sphere with eight shells.
    pub fn shells() -> Self {
        Formation::Shells {
            radius: 1.4,
            layers: 8,
            spacing: 0.085,
            jitter: 0.12,
        }
    }

    /// Three-arm galaxy.
    pub fn galaxy() -> Self {
        Formation::Galaxy {
            arms: 3,
            radius: 2.2,
            core: 0.1,
            twist: 3.5,
            spread: 0.4,
            thickness: 0.15,
        }
    }

    /// Double helix.
    pub fn helix() -> Self {
        Formation::Helix {
            strands: 2,
            height: 4.0,
            turns: 6.0,
            radius: 0.6,
            ripple: 0.1,
        }
    }

    /// Ten-turn vortex funnel.
    pub fn vortex() -> Self {
        Formation::Vortex {
            inner: 0.2,
            growth: 2.0,
            height: 3.0,
            turns: 10.0,
            spread: 0.15,
        }
    }

    /// Short lowercase name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Formation::Sphere { .. } => "sphere",
            Formation::Shells { .. } => "shells",
            Formation::Galaxy { .. } => "galaxy",
            Formation::Helix { .. } => "helix",
            Formation::Vortex { .. } => "vortex",
        }
    }

    /// Reject parameters that collapse or cannot be evaluated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Formation::Sphere { radius } => positive(radius, "sphere radius must be positive"),
            Formation::Shells {
                radius,
                layers,
                spacing,
                jitter,
            } => {
                positive(radius, "shell radius must be positive")?;
                if layers == 0 {
                    return Err(ConfigError::InvalidFormation("shells need at least one layer"));
                }
                non_negative(spacing, "shell spacing must not be negative")?;
                non_negative(jitter, "shell jitter must not be negative")
            }
            Formation::Galaxy {
                arms,
                radius,
                core,
                twist,
                spread,
                thickness,
            } => {
                if arms == 0 {
                    return Err(ConfigError::InvalidFormation("galaxy needs at least one arm"));
                }
                positive(radius, "galaxy radius must be positive")?;
                non_negative(core, "galaxy core must not be negative")?;
                finite(twist, "galaxy twist must be finite")?;
                non_negative(spread, "galaxy spread must not be negative")?;
                non_negative(thickness, "galaxy thickness must not be negative")
            }
            Formation::Helix {
                strands,
                height,
                turns,
                radius,
                ripple,
            } => {
                if strands == 0 {
                    return Err(ConfigError::InvalidFormation("helix needs at least one strand"));
                }
                positive(height, "helix height must be positive")?;
                finite(turns, "helix turns must be finite")?;
                positive(radius, "helix radius must be positive")?;
                non_negative(ripple, "helix ripple must not be negative")
            }
            Formation::Vortex {
                inner,
                growth,
                height,
                turns,
                spread,
            } => {
                non_negative(inner, "vortex inner radius must not be negative")?;
                positive(inner + growth, "vortex must have a positive outer radius")?;
                positive(height, "vortex height must be positive")?;
                finite(turns, "vortex turns must be finite")?;
                non_negative(spread, "vortex spread must not be negative")
            }
        }
    }

    /// Rest position of particle `i` out of `n`.
    pub fn origin(&self, i: usize, n: usize) -> Vec3 {
        let progress = i as f32 / n.max(1) as f32;

        match *self {
            Formation::Sphere { radius } => golden_spiral(i, n) * radius,

            Formation::Shells {
                radius,
                layers,
                spacing,
                jitter,
            } => {
                let layers = layers.max(1) as usize;
                let layer = i % layers;
                let slot = i / layers;
                let slots = (n / layers).max(1);
                let y = (1.0 - 2.0 * slot as f32 / slots as f32).clamp(-1.0, 1.0);
                let ring = (1.0 - y * y).max(0.0).sqrt();
                let theta = spiral_angle(slot);
                let r = radius + layer as f32 * spacing + scatter01(i, 1) * jitter;
                Vec3::new(theta.cos() * ring, y, theta.sin() * ring) * r
            }

            Formation::Galaxy {
                arms,
                radius,
                core,
                twist,
                spread,
                thickness,
            } => {
                let arms = arms.max(1);
                let arm = (i % arms as usize) as f32;
                let r = progress * radius + core;
                let angle = arm / arms as f32 * TAU + r * twist;
                let lateral = (1.0 - progress) * spread + GALAXY_MIN_SPREAD;
                Vec3::new(
                    angle.cos() * r + centered(i, 2) * lateral,
                    centered(i, 3) * thickness * (1.0 - progress * 0.8),
                    angle.sin() * r + centered(i, 4) * lateral,
                )
            }

            Formation::Helix {
                strands,
                height,
                turns,
                radius,
                ripple,
            } => {
                let strands = strands.max(1);
                let strand = (i % strands as usize) as f32;
                let angle = progress * turns * TAU + strand * TAU / strands as f32;
                let r = radius + (progress * PI * 3.0).sin() * ripple;
                Vec3::new(
                    angle.cos() * r + centered(i, 5) * HELIX_JITTER,
                    (progress - 0.5) * height,
                    angle.sin() * r + centered(i, 6) * HELIX_JITTER,
                )
            }

            Formation::Vortex {
                inner,
                growth,
                height,
                turns,
                spread,
            } => {
                let r = inner + progress * growth;
                let angle = progress * turns * TAU;
                let scatter = r * spread;
                Vec3::new(
                    angle.cos() * r + centered(i, 7) * scatter,
                    (progress - 0.5) * height,
                    angle.sin() * r + centered(i, 8) * scatter,
                )
            }
        }
    }

    /// Compute all `n` origins.
    pub fn build(&self, n: usize) -> Vec<Vec3> {
        (0..n).map(|i| self.origin(i, n)).collect()
    }

    /// Overwrite `out` with this formation's origins, using `out.len()` as `n`.
    pub fn fill(&self, out: &mut [Vec3]) {
        let n = out.len();
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.origin(i, n);
        }
    }
}

fn positive(value: f32, reason: &'static str) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormation(reason))
    }
}

fn non_negative(value: f32, reason: &'static str) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormation(reason))
    }
}

fn finite(value: f32, reason: &'static str) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormation(reason))
    }
}

/// Golden-angle rotation for spiral slot `i`, reduced in f64 so large indices keep their precision.
fn spiral_angle(i: usize) -> f32 {
    (i as f64 * GOLDEN_ANGLE).rem_euclid(TAU64) as f32
}

/// Unit-sphere point `i` of `n` on the golden-angle spiral.
fn golden_spiral(i: usize, n: usize) -> Vec3 {
    // A lone particle sits at the north pole.
    let y = if n > 1 {
        1.0 - 2.0 * i as f32 / (n - 1) as f32
    } else {
        1.0
    };
    let ring = (1.0 - y * y).max(0.0).sqrt();
    let theta = spiral_angle(i);
    Vec3::new(theta.cos() * ring, y, theta.sin() * ring)
}

/// Per-particle scatter value in `[0, 1)`.
///
/// Each `(i, salt)` pair seeds its own RNG, so the value depends only on the
/// particle index and never on generation order.
pub(crate) fn scatter01(i: usize, salt: u64) -> f32 {
    let seed = (i as u64) ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    SmallRng::seed_from_u64(seed).gen::<f32>()
}

/// [`scatter01`] shifted to `[-0.5, 0.5)`.
fn centered(i: usize, salt: u64) -> f32 {
    scatter01(i, salt) - 0.5
}

#[inline]
fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Cross-fade between two origin buffers.
///
/// Each [`step`](Morph::step) advances `t` by a fixed increment and writes
/// `lerp(from, to, smoothstep(t))` into the live origin buffer. The force
/// evaluator only ever reads that live buffer, so it never sees the morph.
#[derive(Debug, Clone)]
pub struct Morph {
    from: Vec<Vec3>,
    to: Vec<Vec3>,
    target: Formation,
    ticks: u32,
    step: f32,
    t: f32,
}

impl Morph {
    /// Start a morph from the current origins toward `target`.
    ///
    /// `step` is the per-tick increment of `t`; `0.008` finishes in 125 ticks.
    pub fn new(from: Vec<Vec3>, target: Formation, step: f32) -> Self {
        let to = target.build(from.len());
        Self {
            from,
            to,
            target,
            ticks: 0,
            step,
            t: 0.0,
        }
    }

    /// Formation being morphed toward.
    pub fn target(&self) -> Formation {
        self.target
    }

    /// Linear progress in `[0, 1]`, before easing.
    pub fn progress(&self) -> f32 {
        self.t
    }

    /// Whether the blend has reached the target.
    pub fn is_finished(&self) -> bool {
        self.t >= 1.0
    }

    /// Advance one tick and write the blended origins into `origin`.
    ///
    /// Returns `true` on the tick the morph completes. On completion `origin`
    /// holds the target buffer exactly.
    pub fn step(&mut self, origin: &mut [Vec3]) -> bool {
        if self.is_finished() {
            return false;
        }

        self.ticks += 1;
        self.t = (self.ticks as f32 * self.step).min(1.0);

        if self.is_finished() {
            origin.copy_from_slice(&self.to);
            return true;
        }

        let s = smoothstep(self.t);
        for ((slot, from), to) in origin.iter_mut().zip(&self.from).zip(&self.to) {
            *slot = from.lerp(*to, s);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_points_on_radius() {
        let sphere = Formation::Sphere { radius: 0.75 };
        for &n in &[2usize, 3, 17, 1000] {
            for p in sphere.build(n) {
                assert!((p.length() - 0.75).abs() < 1e-4, "n={} len={}", n, p.length());
            }
        }
    }

    #[test]
    fn test_sphere_endpoints_are_poles() {
        let sphere = Formation::Sphere { radius: 2.0 };
        let first = sphere.origin(0, 100);
        let last = sphere.origin(99, 100);
        assert!((first - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
        assert!((last.y + 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_single_particle_sphere() {
        let p = Formation::Sphere { radius: 1.0 }.origin(0, 1);
        assert!(p.is_finite());
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_origin_is_pure() {
        for formation in [
            Formation::default(),
            Formation::shells(),
            Formation::galaxy(),
            Formation::helix(),
            Formation::vortex(),
        ] {
            let a = formation.build(500);
            let b: Vec<Vec3> = (0..500).rev().map(|i| formation.origin(i, 500)).rev().collect();
            assert_eq!(a, b, "{} is not order independent", formation.name());
        }
    }

    #[test]
    fn test_shells_radius_band() {
        let shells = Formation::shells();
        for p in shells.build(4000) {
            let r = p.length();
            // 1.4 .. 1.4 + 7 * 0.085 + 0.12
            assert!(r >= 1.4 - 1e-4 && r <= 2.115 + 1e-4, "r={}", r);
        }
    }

    #[test]
    fn test_helix_spans_height() {
        let points = Formation::helix().build(1000);
        let min_y = points.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        assert!((min_y + 2.0).abs() < 1e-4);
        assert!(max_y > 1.9 && max_y < 2.0);
    }

    #[test]
    fn test_validate_rejects_degenerate_shapes() {
        assert!(Formation::Sphere { radius: 0.0 }.validate().is_err());
        assert!(Formation::Sphere { radius: f32::NAN }.validate().is_err());
        assert!(Formation::Shells {
            radius: 1.0,
            layers: 0,
            spacing: 0.1,
            jitter: 0.0
        }
        .validate()
        .is_err());
        assert!(Formation::Galaxy {
            arms: 0,
            radius: 1.0,
            core: 0.0,
            twist: 1.0,
            spread: 0.1,
            thickness: 0.1
        }
        .validate()
        .is_err());
        assert!(Formation::galaxy().validate().is_ok());
        assert!(Formation::helix().validate().is_ok());
        assert!(Formation::vortex().validate().is_ok());
    }

    #[test]
    fn test_scatter_range_and_repeatable() {
        for i in 0..10_000 {
            let h = scatter01(i, 3);
            assert!((0.0..1.0).contains(&h));
            assert_eq!(h, scatter01(i, 3));
        }
    }

    #[test]
    fn test_scatter_differs_by_salt() {
        let same = (0..1_000)
            .filter(|&i| scatter01(i, 2) == scatter01(i, 3))
            .count();
        assert!(same < 10);
    }

    #[test]
    fn test_morph_reaches_target() {
        let n = 64;
        let from = Formation::default().build(n);
        let mut origin = from.clone();
        let mut morph = Morph::new(from, Formation::galaxy(), 0.008);

        let mut ticks = 0;
        while !morph.step(&mut origin) {
            ticks += 1;
            assert!(ticks < 200, "morph never finished");
        }
        ticks += 1;

        assert!((124..=126).contains(&ticks), "took {} ticks", ticks);
        assert_eq!(origin, Formation::galaxy().build(n));
        assert!(!morph.step(&mut origin));
    }

    #[test]
    fn test_morph_midpoint_is_eased() {
        let from = vec![Vec3::ZERO; 4];
        let target = Formation::Sphere { radius: 1.0 };
        let mut origin = from.clone();
        let mut morph = Morph::new(from, target, 0.25);

        morph.step(&mut origin); // t = 0.25
        morph.step(&mut origin); // t = 0.5, smoothstep = 0.5
        let expected = target.origin(0, 4) * 0.5;
        assert!((origin[0] - expected).length() < 1e-5);
    }
}
