//! Simulation session.
//!
//! [`Simulation`] owns every piece of mutable state: the particle store, the
//! hand state, the chunk scheduler and any running morph. The host calls
//! [`set_hand`](Simulation::set_hand) whenever the gesture source has a new
//! reading and [`tick`](Simulation::tick) once per frame, then reads the store
//! for rendering. Everything runs on the caller's thread.
//!
//! # Example
//!
//! ```ignore
//! let mut sim = Simulation::new(
//!     SimulationConfig::default()
//!         .with_particle_count(400_000)
//!         .with_chunk_size(25_000),
//! )?;
//!
//! // Gesture callback
//! sim.set_hand(HandReading::at(Vec3::new(0.5, 0.2, 0.0), Gesture::Open));
//!
//! // Frame callback
//! sim.tick();
//! sim.store().write_vertices(&mut vertices);
//! ```

use glam::Vec3;
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::ops::Range;

use crate::config::SimulationConfig;
use crate::error::ConfigError;
use crate::formation::{Formation, Morph};
use crate::hand::{Gesture, HandEvent, HandReading, HandState};
use crate::integrator::step_range;
use crate::scheduler::ChunkScheduler;
use crate::store::ParticleStore;

/// A running particle session.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    store: ParticleStore,
    hand: HandState,
    scheduler: ChunkScheduler,
    formation: Formation,
    morph: Option<Morph>,
    rng: SmallRng,
    ticks: u64,
}

impl Simulation {
    /// Validate `config`, allocate the store and lay out the initial formation.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let scheduler = ChunkScheduler::new(config.particle_count, config.chunk_size)?;

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut store = ParticleStore::new(config.particle_count);
        store.rebuild(&config.formation, config.jitter, &mut rng);

        info!(
            "{} particles, {} chunk(s) of {}, formation {}",
            config.particle_count,
            scheduler.chunk_count(),
            config.chunk_size,
            config.formation.name()
        );

        Ok(Self {
            formation: config.formation,
            config,
            store,
            hand: HandState::new(),
            scheduler,
            morph: None,
            rng,
            ticks: 0,
        })
    }

    /// Feed a reading from the gesture source.
    ///
    /// A fully held FIST or PEACE starts a morph when `auto_morph` is on.
    pub fn set_hand(&mut self, reading: HandReading) -> Option<HandEvent> {
        let event = self.hand.apply(reading, &self.config.forces);

        if self.config.auto_morph && self.hand.present() && self.hand.hold_ratio() >= 1.0 {
            let target = match self.hand.gesture() {
                Gesture::Fist => Some(Formation::galaxy()),
                Gesture::Peace => Some(Formation::helix()),
                _ => None,
            };
            if let Some(target) = target {
                self.start_morph(target);
            }
        }

        event
    }

    /// Advance one frame and return the particle range that was updated.
    ///
    /// Order: morph blend, impulse decay, then one chunk through the integrator.
    pub fn tick(&mut self) -> Range<usize> {
        self.ticks += 1;

        if let Some(morph) = self.morph.as_mut() {
            if morph.step(self.store.origins_mut()) {
                info!("morph to {} complete", morph.target().name());
                self.morph = None;
            }
        }

        self.hand.decay(&self.config.forces);

        let range = self.scheduler.advance();
        step_range(
            &mut self.store,
            range.clone(),
            &self.hand,
            self.ticks as f32,
            &self.config.forces,
        );
        range
    }

    /// Cross-fade origins toward `target` over `1 / morph_step` ticks.
    ///
    /// Positions and velocities are left alone; particles follow their moving
    /// origins. Returns `Ok(false)` if `target` is already the active formation.
    pub fn morph_to(&mut self, target: Formation) -> Result<bool, ConfigError> {
        target.validate()?;
        Ok(self.start_morph(target))
    }

    fn start_morph(&mut self, target: Formation) -> bool {
        if self.formation == target {
            return false;
        }

        debug!("morph {} -> {}", self.formation.name(), target.name());
        let from = self.store.origins().to_vec();
        self.morph = Some(Morph::new(from, target, self.config.morph_step));
        self.formation = target;
        true
    }

    /// Switch formation immediately, relaunching every particle onto it.
    pub fn set_formation(&mut self, formation: Formation) -> Result<(), ConfigError> {
        formation.validate()?;
        self.morph = None;
        self.store
            .rebuild(&formation, self.config.jitter, &mut self.rng);
        self.formation = formation;
        info!("formation rebuilt as {}", formation.name());
        Ok(())
    }

    /// Particle buffers.
    #[inline]
    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    /// Mutable particle buffers, for seeding custom starting states.
    #[inline]
    pub fn store_mut(&mut self) -> &mut ParticleStore {
        &mut self.store
    }

    /// Current positions.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        self.store.positions()
    }

    /// Current velocities.
    #[inline]
    pub fn velocities(&self) -> &[Vec3] {
        self.store.velocities()
    }

    /// Hand state, for camera and HUD cues.
    #[inline]
    pub fn hand(&self) -> &HandState {
        &self.hand
    }

    /// Active formation, or the morph target while morphing.
    #[inline]
    pub fn formation(&self) -> Formation {
        self.formation
    }

    /// Whether origins are still blending.
    #[inline]
    pub fn is_morphing(&self) -> bool {
        self.morph.is_some()
    }

    /// Linear morph progress, if a morph is running.
    pub fn morph_progress(&self) -> Option<f32> {
        self.morph.as_ref().map(Morph::progress)
    }

    /// Fraction of the current full pass completed.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.scheduler.progress()
    }

    /// Chunk scheduler state.
    #[inline]
    pub fn scheduler(&self) -> &ChunkScheduler {
        &self.scheduler
    }

    /// Ticks run so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.ticks
    }

    /// Number of particles.
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.store.len()
    }

    /// Configuration the session was built with.
    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SimulationConfig {
        SimulationConfig::default()
            .with_particle_count(100)
            .with_chunk_size(30)
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(Simulation::new(small().with_chunk_size(0)).is_err());
        assert!(Simulation::new(small().with_particle_count(0)).is_err());
    }

    #[test]
    fn test_tick_rotates_chunks() {
        let mut sim = Simulation::new(small()).unwrap();
        assert_eq!(sim.tick(), 0..30);
        assert_eq!(sim.tick(), 30..60);
        assert_eq!(sim.tick(), 60..90);
        assert_eq!(sim.tick(), 90..100);
        assert_eq!(sim.tick(), 0..30);
        assert_eq!(sim.frame(), 5);
    }

    #[test]
    fn test_morph_to_same_is_noop() {
        let mut sim = Simulation::new(small()).unwrap();
        assert_eq!(sim.morph_to(Formation::default()), Ok(false));
        assert!(!sim.is_morphing());
        assert_eq!(sim.morph_to(Formation::galaxy()), Ok(true));
        assert_eq!(sim.morph_to(Formation::galaxy()), Ok(false));
    }

    #[test]
    fn test_morph_rejects_invalid_target() {
        let mut sim = Simulation::new(small()).unwrap();
        assert!(sim.morph_to(Formation::Sphere { radius: -1.0 }).is_err());
        assert!(!sim.is_morphing());
    }

    #[test]
    fn test_held_fist_morphs_to_galaxy() {
        let mut sim = Simulation::new(small()).unwrap();
        sim.set_hand(HandReading::at(Vec3::ZERO, Gesture::Fist).with_hold(0.5));
        assert!(!sim.is_morphing());
        sim.set_hand(HandReading::at(Vec3::ZERO, Gesture::Fist).with_hold(1.0));
        assert!(sim.is_morphing());
        assert_eq!(sim.formation(), Formation::galaxy());
    }

    #[test]
    fn test_auto_morph_can_be_disabled() {
        let mut sim = Simulation::new(small().with_auto_morph(false)).unwrap();
        sim.set_hand(HandReading::at(Vec3::ZERO, Gesture::Peace).with_hold(1.0));
        assert!(!sim.is_morphing());
    }

    #[test]
    fn test_set_formation_relaunches() {
        let mut sim = Simulation::new(small()).unwrap();
        for _ in 0..10 {
            sim.tick();
        }
        sim.set_formation(Formation::vortex()).unwrap();
        assert!(sim.velocities().iter().all(|v| *v == Vec3::ZERO));
        assert_eq!(sim.store().origins(), Formation::vortex().build(100).as_slice());
    }
}
