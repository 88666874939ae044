//! Flat particle buffers.
//!
//! Particles are stored structure-of-arrays: one contiguous buffer per
//! attribute, all co-indexed by particle id. The store has no behavior of its
//! own; the integrator writes it and the render boundary reads it.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::Rng;

use crate::formation::Formation;

/// Interleaved per-particle record for GPU upload.
///
/// Layout is 32 bytes: `position.xyz, life, velocity.xyz, index`, which keeps
/// both vec3 fields 16-byte aligned for std430 storage buffers.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub life: f32,
    pub velocity: [f32; 3],
    pub index: f32,
}

/// Per-particle state for a fixed number of particles.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    position: Vec<Vec3>,
    velocity: Vec<Vec3>,
    origin: Vec<Vec3>,
    life: Vec<f32>,
    index: Vec<f32>,
}

impl ParticleStore {
    /// Allocate `count` particles with every attribute zeroed.
    pub fn new(count: usize) -> Self {
        Self {
            position: vec![Vec3::ZERO; count],
            velocity: vec![Vec3::ZERO; count],
            origin: vec![Vec3::ZERO; count],
            life: vec![0.0; count],
            index: vec![0.0; count],
        }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.position.len()
    }

    /// Whether the store holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Lay out `formation` and reset every particle onto it.
    ///
    /// Positions start at their origin plus up to `±jitter / 2` per axis,
    /// velocities are zeroed, and `life` / `index` are reassigned.
    pub fn rebuild<R: Rng>(&mut self, formation: &Formation, jitter: f32, rng: &mut R) {
        formation.fill(&mut self.origin);

        let n = self.len();
        let half = jitter * 0.5;
        for i in 0..n {
            let offset = if half > 0.0 {
                Vec3::new(
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                )
            } else {
                Vec3::ZERO
            };
            self.position[i] = self.origin[i] + offset;
            self.velocity[i] = Vec3::ZERO;
            self.life[i] = rng.gen();
            self.index[i] = i as f32 / n as f32;
        }
    }

    /// Current positions.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.position
    }

    /// Current velocities.
    #[inline]
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocity
    }

    /// Rest positions the spring force pulls toward.
    #[inline]
    pub fn origins(&self) -> &[Vec3] {
        &self.origin
    }

    /// Per-particle render variation in `[0, 1)`.
    #[inline]
    pub fn life(&self) -> &[f32] {
        &self.life
    }

    /// `i / n` for each particle.
    #[inline]
    pub fn index(&self) -> &[f32] {
        &self.index
    }

    /// Positions as a flat `x, y, z, x, y, z, ...` buffer.
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.position)
    }

    /// Velocities as a flat `x, y, z, ...` buffer.
    pub fn velocities_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.velocity)
    }

    /// Mutable access to the origin buffer, for morphing.
    pub(crate) fn origins_mut(&mut self) -> &mut [Vec3] {
        &mut self.origin
    }

    /// Split borrow of the buffers the integrator touches.
    pub(crate) fn dynamics_mut(&mut self) -> (&mut [Vec3], &mut [Vec3], &[Vec3]) {
        (&mut self.position, &mut self.velocity, &self.origin)
    }

    /// Set a particle's position and velocity directly.
    pub fn set_particle(&mut self, i: usize, position: Vec3, velocity: Vec3) {
        self.position[i] = position;
        self.velocity[i] = velocity;
    }

    /// Average distance between each particle and its origin.
    pub fn mean_displacement(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let total: f32 = self
            .position
            .iter()
            .zip(&self.origin)
            .map(|(p, o)| p.distance(*o))
            .sum();
        total / self.len() as f32
    }

    /// Largest distance between a particle and its origin.
    pub fn max_displacement(&self) -> f32 {
        self.position
            .iter()
            .zip(&self.origin)
            .map(|(p, o)| p.distance(*o))
            .fold(0.0, f32::max)
    }

    /// Fill `out` with interleaved vertices, reusing its allocation.
    pub fn write_vertices(&self, out: &mut Vec<ParticleVertex>) {
        out.clear();
        out.reserve(self.len());
        out.extend((0..self.len()).map(|i| ParticleVertex {
            position: self.position[i].to_array(),
            life: self.life[i],
            velocity: self.velocity[i].to_array(),
            index: self.index[i],
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<ParticleVertex>(), 32);
        let v = ParticleVertex {
            position: [1.0, 2.0, 3.0],
            life: 0.5,
            velocity: [4.0, 5.0, 6.0],
            index: 0.25,
        };
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&v));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 0.5, 4.0, 5.0, 6.0, 0.25]);
    }

    #[test]
    fn test_rebuild_resets_state() {
        let mut store = ParticleStore::new(100);
        let mut rng = SmallRng::seed_from_u64(7);
        store.set_particle(3, Vec3::splat(9.0), Vec3::ONE);

        store.rebuild(&Formation::Sphere { radius: 1.0 }, 0.05, &mut rng);

        for i in 0..store.len() {
            let offset = store.positions()[i] - store.origins()[i];
            assert!(offset.abs().max_element() <= 0.025 + 1e-6);
            assert_eq!(store.velocities()[i], Vec3::ZERO);
            assert!((0.0..1.0).contains(&store.life()[i]));
        }
        assert_eq!(store.index()[50], 0.5);
    }

    #[test]
    fn test_flat_views_are_co_indexed() {
        let mut store = ParticleStore::new(4);
        store.set_particle(2, Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, 0.0, 1.0));
        assert_eq!(store.positions_flat().len(), 12);
        assert_eq!(&store.positions_flat()[6..9], &[1.0, 2.0, 3.0]);
        assert_eq!(&store.velocities_flat()[6..9], &[-1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_write_vertices_reuses_buffer() {
        let mut store = ParticleStore::new(10);
        let mut rng = SmallRng::seed_from_u64(1);
        store.rebuild(&Formation::default(), 0.0, &mut rng);

        let mut out = Vec::new();
        store.write_vertices(&mut out);
        store.write_vertices(&mut out);
        assert_eq!(out.len(), 10);
        assert_eq!(out[4].position, store.positions()[4].to_array());
        assert_eq!(out[4].index, 0.4);
    }
}
