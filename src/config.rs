//! Simulation configuration.
//!
//! All force coefficients are plain numbers, fixed once a
//! [`Simulation`](crate::Simulation) is built. Every section has a
//! `#[serde(default)]`, so a config file only needs the values it overrides:
//!
//! ```json
//! {
//!   "particle_count": 400000,
//!   "chunk_size": 25000,
//!   "formation": { "shape": "shells", "radius": 1.4, "layers": 8, "spacing": 0.085, "jitter": 0.12 },
//!   "forces": { "spring": 0.02, "explosion": { "peak": 28.0, "decay": 0.9 } }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, LoadError};
use crate::formation::Formation;

/// Capped inverse-square kernel: `min(strength / (d² * scale + bias), ceiling)`.
///
/// Shared shape of the attract, pinch and repel gestures. The ceiling keeps
/// the force bounded as the hand approaches a particle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CappedKernel {
    /// Numerator of the kernel.
    pub strength: f32,
    /// Multiplier on squared distance.
    pub scale: f32,
    /// Added to the denominator; must be positive.
    pub bias: f32,
    /// Upper bound on the kernel value.
    pub ceiling: f32,
    /// Attenuation of the Z component.
    pub z_scale: f32,
}

impl CappedKernel {
    /// Kernel value at squared distance `d2`.
    #[inline]
    pub fn eval(&self, d2: f32) -> f32 {
        (self.strength / (d2 * self.scale + self.bias)).min(self.ceiling)
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        finite(name, self.strength)?;
        non_negative(name, self.scale)?;
        positive(name, self.bias)?;
        non_negative(name, self.ceiling)?;
        non_negative(name, self.z_scale)
    }
}

/// Fist-to-open explosion impulse.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
    /// Force set on the FIST → OPEN edge.
    pub peak: f32,
    /// Multiplicative decay applied every tick.
    pub decay: f32,
    /// Force snaps to zero once it drops below this.
    pub cutoff: f32,
    /// Distance at which the linear falloff reaches zero.
    pub falloff_radius: f32,
    /// Attenuation of the Z component.
    pub z_scale: f32,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            peak: 35.0,
            decay: 0.92,
            cutoff: 0.5,
            falloff_radius: 6.0,
            z_scale: 0.5,
        }
    }
}

impl ExplosionConfig {
    /// Force one tick after `force`: scaled by `decay`, snapped to zero below `cutoff`.
    #[inline]
    pub fn decay_step(&self, force: f32) -> f32 {
        if force <= 0.0 {
            return 0.0;
        }
        let next = force * self.decay;
        if next < self.cutoff {
            0.0
        } else {
            next
        }
    }

    /// Number of decay ticks that take `peak` to exactly zero.
    ///
    /// Returns `u32::MAX` for a decay factor that never brings the force down.
    pub fn ticks_to_rest(&self) -> u32 {
        if self.decay.is_nan() || self.decay >= 1.0 {
            return u32::MAX;
        }
        let mut force = self.peak;
        let mut ticks = 0;
        while force > 0.0 && ticks < u32::MAX {
            force = self.decay_step(force);
            ticks += 1;
        }
        ticks
    }
}

/// Force coefficients read by the evaluator every tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Global velocity multiplier applied after each integration step.
    pub damping: f32,
    /// Spring constant toward the origin.
    pub spring: f32,
    /// Extra drag `velocity * (1 - factor)`. `None` disables it.
    pub spring_damping: Option<f32>,
    /// Strength of the trigonometric turbulence field. `None` disables it.
    pub turbulence: Option<f32>,
    /// Velocity magnitude cap.
    pub max_velocity: f32,

    /// OPEN / POINT attraction.
    pub attract: CappedKernel,
    /// Linear X/Y pull toward the hand on top of the attraction kernel.
    pub attract_viscosity: f32,
    /// PINCH capture.
    pub pinch: CappedKernel,
    /// Fraction of the X/Y spring term cancelled while pinching.
    pub pinch_spring_release: f32,
    /// REPEL push.
    pub repel: CappedKernel,

    /// FIST pull toward the world origin.
    pub compress: f32,
    /// FIST pull toward the hand, divided by distance.
    pub compress_hand_pull: f32,
    /// Cap on the FIST hand pull.
    pub compress_hand_cap: f32,

    /// SWIPE impulse scale.
    pub scatter: f32,
    /// Ticks a swipe stays active after detection.
    pub swipe_ticks: u32,
    /// Per-tick decay of the swipe velocity once the countdown ends.
    pub swipe_velocity_decay: f32,

    /// PEACE standing-wave amplitude.
    pub wave: f32,
    /// PEACE pull toward the hand.
    pub wave_hand_pull: f32,

    /// Fingertip interaction radius.
    pub fingertip_radius: f32,
    /// Fingertip pull strength.
    pub fingertip_strength: f32,

    /// Fist-to-open explosion.
    pub explosion: ExplosionConfig,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            damping: 0.975,
            spring: 0.014,
            spring_damping: Some(0.92),
            turbulence: Some(0.006),
            max_velocity: 0.35,

            attract: CappedKernel {
                strength: 0.45,
                scale: 0.5,
                bias: 0.08,
                ceiling: 0.9,
                z_scale: 0.35,
            },
            attract_viscosity: 0.012,
            pinch: CappedKernel {
                strength: 0.85,
                scale: 0.3,
                bias: 0.04,
                ceiling: 2.5,
                z_scale: 0.5,
            },
            pinch_spring_release: 0.75,
            repel: CappedKernel {
                strength: 0.6,
                scale: 1.0,
                bias: 0.1,
                ceiling: 1.5,
                z_scale: 1.0,
            },

            compress: 0.18,
            compress_hand_pull: 0.25,
            compress_hand_cap: 0.4,

            scatter: 22.0,
            swipe_ticks: 20,
            swipe_velocity_decay: 0.85,

            wave: 0.7,
            wave_hand_pull: 0.10,

            fingertip_radius: 0.9,
            fingertip_strength: 0.25,

            explosion: ExplosionConfig::default(),
        }
    }
}

impl ForceConfig {
    /// Check every coefficient is in a range the integrator can use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        unit_open_closed("damping", self.damping)?;
        non_negative("spring", self.spring)?;
        if let Some(factor) = self.spring_damping {
            unit_closed("spring_damping", factor)?;
        }
        if let Some(strength) = self.turbulence {
            non_negative("turbulence", strength)?;
        }
        positive("max_velocity", self.max_velocity)?;

        self.attract.validate("attract")?;
        non_negative("attract_viscosity", self.attract_viscosity)?;
        self.pinch.validate("pinch")?;
        unit_closed("pinch_spring_release", self.pinch_spring_release)?;
        self.repel.validate("repel")?;

        non_negative("compress", self.compress)?;
        non_negative("compress_hand_pull", self.compress_hand_pull)?;
        non_negative("compress_hand_cap", self.compress_hand_cap)?;

        non_negative("scatter", self.scatter)?;
        unit_closed("swipe_velocity_decay", self.swipe_velocity_decay)?;
        non_negative("wave", self.wave)?;
        non_negative("wave_hand_pull", self.wave_hand_pull)?;
        non_negative("fingertip_radius", self.fingertip_radius)?;
        non_negative("fingertip_strength", self.fingertip_strength)?;

        let explosion = &self.explosion;
        non_negative("explosion.peak", explosion.peak)?;
        unit_open("explosion.decay", explosion.decay)?;
        positive("explosion.cutoff", explosion.cutoff)?;
        positive("explosion.falloff_radius", explosion.falloff_radius)?;
        non_negative("explosion.z_scale", explosion.z_scale)
    }
}

/// Top-level session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of particles, fixed for the session.
    pub particle_count: usize,
    /// Particles advanced per tick.
    pub chunk_size: usize,
    /// Initial formation.
    pub formation: Formation,
    /// Full-width launch jitter around each origin (`0.05` = ±0.025 per axis).
    pub jitter: f32,
    /// Per-tick morph increment; `0.008` morphs in 125 ticks.
    pub morph_step: f32,
    /// Seed for launch jitter and the `life` scalar.
    pub seed: u64,
    /// Morph on a fully held FIST (galaxy) or PEACE (helix).
    pub auto_morph: bool,
    /// Force coefficients.
    pub forces: ForceConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: 150_000,
            chunk_size: 25_000,
            formation: Formation::default(),
            jitter: 0.05,
            morph_step: 0.008,
            seed: 0x5EED,
            auto_morph: true,
            forces: ForceConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Set how many particles are advanced per tick.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the initial formation.
    pub fn with_formation(mut self, formation: Formation) -> Self {
        self.formation = formation;
        self
    }

    /// Replace the force coefficients.
    pub fn with_forces(mut self, forces: ForceConfig) -> Self {
        self.forces = forces;
        self
    }

    /// Set the launch jitter width.
    pub fn with_jitter(mut self, jitter: f32) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable gesture-hold morphing.
    pub fn with_auto_morph(mut self, enabled: bool) -> Self {
        self.auto_morph = enabled;
        self
    }

    /// Fail fast on anything that would break the scheduler or integrator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        non_negative("jitter", self.jitter)?;
        unit_open_closed("morph_step", self.morph_step)?;
        self.formation.validate()?;
        self.forces.validate()
    }

    /// Write this config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let json = fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidCoefficient { name, value })
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidCoefficient { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidCoefficient { name, value })
    }
}

fn unit_closed(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidCoefficient { name, value })
    }
}

fn unit_open(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidCoefficient { name, value })
    }
}

fn unit_open_closed(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidCoefficient { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_particles() {
        let config = SimulationConfig::default().with_particle_count(0);
        assert_eq!(config.validate(), Err(ConfigError::NoParticles));
    }

    #[test]
    fn test_rejects_zero_chunk() {
        let config = SimulationConfig::default().with_chunk_size(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroChunkSize));
    }

    #[test]
    fn test_rejects_unstable_damping() {
        let mut forces = ForceConfig::default();
        forces.damping = 1.2;
        let err = SimulationConfig::default().with_forces(forces).validate();
        assert!(matches!(
            err,
            Err(ConfigError::InvalidCoefficient { name: "damping", .. })
        ));
    }

    #[test]
    fn test_rejects_non_decaying_explosion() {
        let mut forces = ForceConfig::default();
        forces.explosion.decay = 1.0;
        assert!(forces.validate().is_err());
    }

    #[test]
    fn test_kernel_ceiling() {
        let kernel = ForceConfig::default().attract;
        assert_eq!(kernel.eval(0.0), 0.9);
        assert!(kernel.eval(100.0) < 0.01);
    }

    #[test]
    fn test_ticks_to_rest() {
        let explosion = ExplosionConfig {
            peak: 28.0,
            decay: 0.9,
            cutoff: 0.5,
            ..Default::default()
        };
        assert_eq!(explosion.ticks_to_rest(), 39);
    }

    #[test]
    fn test_ticks_to_rest_matches_decay_loop() {
        let cases = [
            (28.0, 0.9, 0.5),
            (35.0, 0.92, 0.5),
            (0.3, 0.9, 0.5),
            (0.5, 0.9, 0.5),
            (1.0, 0.5, 0.5),
            (10.0, 0.5, 1.25),
            (0.0, 0.9, 0.5),
        ];
        for (peak, decay, cutoff) in cases {
            let explosion = ExplosionConfig {
                peak,
                decay,
                cutoff,
                ..Default::default()
            };
            let mut force = peak;
            let mut observed = 0;
            while force > 0.0 {
                force *= decay;
                if force < cutoff {
                    force = 0.0;
                }
                observed += 1;
            }
            assert_eq!(
                explosion.ticks_to_rest(),
                observed,
                "peak={} decay={} cutoff={}",
                peak,
                decay,
                cutoff
            );
        }
    }

    #[test]
    fn test_ticks_to_rest_below_cutoff() {
        let explosion = ExplosionConfig {
            peak: 0.3,
            ..Default::default()
        };
        assert_eq!(explosion.ticks_to_rest(), 1);
    }

    #[test]
    fn test_ticks_to_rest_never_for_non_decaying() {
        let explosion = ExplosionConfig {
            decay: 1.0,
            ..Default::default()
        };
        assert_eq!(explosion.ticks_to_rest(), u32::MAX);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "particle_count": 1000, "forces": { "spring": 0.02 } }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.particle_count, 1000);
        assert_eq!(config.chunk_size, 25_000);
        assert_eq!(config.forces.spring, 0.02);
        assert_eq!(config.forces.damping, 0.975);
    }

    #[test]
    fn test_formation_json_tag() {
        let json = r#"{ "formation": { "shape": "galaxy", "arms": 5, "radius": 2.0, "core": 0.1, "twist": 3.0, "spread": 0.3, "thickness": 0.1 } }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert!(matches!(config.formation, Formation::Galaxy { arms: 5, .. }));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("handfield-config-{}.json", std::process::id()));
        let config = SimulationConfig::default()
            .with_particle_count(321)
            .with_formation(Formation::vortex());
        config.save(&path).unwrap();
        let loaded = SimulationConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SimulationConfig::load("/nonexistent/handfield.json").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
