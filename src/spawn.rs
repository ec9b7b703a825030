//! Spawn context: the random source handed to behaviours at initialization.
//!
//! A show owns one [`SpawnContext`] and passes it to every behaviour's
//! `initialize_particles`. Seeding it with a fixed value makes a whole show
//! reproducible, which the tests rely on.
//!
//! ```ignore
//! let mut ctx = SpawnContext::seeded(7);
//! let dir = ctx.random_direction();        // uniform on the unit sphere
//! let ring = ctx.random_planar_direction(); // uniform on the XY unit circle
//! let seed = ctx.particle_seed();           // [0, 1)
//! ```

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// Random helpers for particle initialization.
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Deterministic context from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Context seeded from the current time, different each run.
    pub fn from_time() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42);
        Self::seeded(seed)
    }

    // ========== Random primitives ==========

    /// Random f32 in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 between `min` and `max`.
    ///
    /// Returns `min` when the range is empty or inverted.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.random()
    }

    /// Random f32 in `[-extent, extent]`.
    #[inline]
    pub fn random_signed(&mut self, extent: f32) -> f32 {
        (self.random() * 2.0 - 1.0) * extent
    }

    /// Random index in `0..len`. `len` must be non-zero.
    #[inline]
    pub fn random_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Per-particle seed in `[0, 1)`.
    #[inline]
    pub fn particle_seed(&mut self) -> f32 {
        self.random()
    }

    // ========== Direction helpers ==========

    /// Unit vector uniformly distributed on the sphere.
    pub fn random_direction(&mut self) -> Vec3 {
        // Uniform z with uniform azimuth gives a uniform sphere
        let z = self.random_range(-1.0, 1.0);
        let theta = self.random() * TAU;
        let r = (1.0 - z * z).max(0.0).sqrt();
        Vec3::new(r * theta.cos(), r * theta.sin(), z)
    }

    /// Unit vector uniformly distributed on the circle in the XY plane.
    pub fn random_planar_direction(&mut self) -> Vec3 {
        let theta = self.random() * TAU;
        Vec3::new(theta.cos(), theta.sin(), 0.0)
    }

    /// Random point inside a sphere, uniform by volume.
    pub fn random_in_sphere(&mut self, radius: f32) -> Vec3 {
        let r = radius * self.random().cbrt();
        self.random_direction() * r
    }
}

impl Default for SpawnContext {
    fn default() -> Self {
        Self::from_time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SpawnContext::seeded(99);
        let mut b = SpawnContext::seeded(99);
        for _ in 0..16 {
            assert_eq!(a.random(), b.random());
        }
    }

    #[test]
    fn test_random_direction_is_unit() {
        let mut ctx = SpawnContext::seeded(1);
        for _ in 0..200 {
            let d = ctx.random_direction();
            assert!((d.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_planar_direction_stays_in_plane() {
        let mut ctx = SpawnContext::seeded(2);
        for _ in 0..200 {
            let d = ctx.random_planar_direction();
            assert_eq!(d.z, 0.0);
            assert!((d.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_random_range_degenerate() {
        let mut ctx = SpawnContext::seeded(3);
        assert_eq!(ctx.random_range(2.0, 2.0), 2.0);
        assert_eq!(ctx.random_range(5.0, 1.0), 5.0);
        for _ in 0..100 {
            let v = ctx.random_range(-1.0, 1.0);
            assert!((-1.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_random_in_sphere_bounds() {
        let mut ctx = SpawnContext::seeded(4);
        for _ in 0..100 {
            assert!(ctx.random_in_sphere(0.5).length() <= 0.5 + 1e-4);
        }
    }

    #[test]
    fn test_particle_seed_range() {
        let mut ctx = SpawnContext::seeded(5);
        for _ in 0..500 {
            let s = ctx.particle_seed();
            assert!((0.0..1.0).contains(&s));
        }
    }
}
