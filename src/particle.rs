//! Particle records and the grow-only buffers that hold them.
//!
//! Each behaviour in a show owns one [`ParticleBuffer`]. The behaviour writes
//! motion, lifetime and base appearance; the effects attached to it decorate
//! the same records afterwards. Nothing else touches a buffer between ticks.
//!
//! # Lifetime fields
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `life` | Remaining lifetime in seconds, dead at `<= 0` |
//! | `max_life` | Initial lifetime; also the shared timeline length for formations |
//! | `random_seed` | Fixed per-particle value in `[0, 1)` used for variation |

use glam::{Vec3, Vec4};

/// One simulated particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// World-space position.
    pub position: Vec3,
    /// Velocity in world units per second. Formation behaviours store a
    /// unit approach direction here instead.
    pub velocity: Vec3,
    /// Current RGBA color, as decorated by effects.
    pub color: Vec4,
    /// RGBA color assigned at spawn.
    pub base_color: Vec4,
    /// Render size in world units.
    pub size: f32,
    /// Remaining lifetime in seconds.
    pub life: f32,
    /// Lifetime at spawn in seconds.
    pub max_life: f32,
    /// Per-particle random value in `[0, 1)`, fixed at spawn.
    pub random_seed: f32,
    /// Where a convergence behaviour starts this particle.
    pub start_position: Vec3,
    /// Where a convergence behaviour sends this particle.
    pub target_position: Vec3,
    /// Vertical offset currently applied by gravity variance.
    pub gravity_displacement_y: f32,
}

impl Particle {
    /// A dead particle with every field zeroed.
    pub const DEAD: Particle = Particle {
        position: Vec3::ZERO,
        velocity: Vec3::ZERO,
        color: Vec4::ZERO,
        base_color: Vec4::ZERO,
        size: 0.0,
        life: 0.0,
        max_life: 0.0,
        random_seed: 0.0,
        start_position: Vec3::ZERO,
        target_position: Vec3::ZERO,
        gravity_displacement_y: 0.0,
    };

    /// Whether this particle still has lifetime left.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Normalized age in `[0, 1]`: 0 at spawn, 1 at death.
    ///
    /// A particle with no lifetime is treated as fully decayed.
    #[inline]
    pub fn progress(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 1.0;
        }
        ((self.max_life - self.life) / self.max_life).clamp(0.0, 1.0)
    }

    /// Seconds since spawn, derived from `max_life - life`.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        (self.max_life - self.life).max(0.0)
    }

    /// Consume `dt` seconds of lifetime, clamping at exactly zero.
    #[inline]
    pub fn age_by(&mut self, dt: f32) {
        self.life = (self.life - dt).max(0.0);
    }

    /// Overwrite the RGB channels, keeping alpha.
    #[inline]
    pub fn set_rgb(&mut self, rgb: Vec3) {
        self.color = rgb.extend(self.color.w);
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::DEAD
    }
}

/// Grow-only storage for one behaviour's particles.
///
/// The buffer is sized to the largest request seen so far and reused for
/// later requests. Only the first [`ParticleBuffer::live_count`] records
/// belong to the current request.
#[derive(Debug, Default, Clone)]
pub struct ParticleBuffer {
    particles: Vec<Particle>,
    live_count: usize,
}

impl ParticleBuffer {
    /// Create an empty buffer. Nothing is allocated until first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare the buffer for a request of `count` particles.
    ///
    /// Grows the allocation if it is too small, never shrinks it, and resets
    /// the active range to dead particles.
    pub fn prepare(&mut self, count: usize) {
        if self.particles.len() < count {
            self.particles.resize(count, Particle::DEAD);
        }
        self.particles[..count].fill(Particle::DEAD);
        self.live_count = count;
    }

    /// Number of records belonging to the current request.
    #[inline]
    pub fn live_count(&self) -> usize {
        self.live_count
    }

    /// Allocated length (largest request seen).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// The current request's particles.
    #[inline]
    pub fn active(&self) -> &[Particle] {
        &self.particles[..self.live_count]
    }

    /// The current request's particles, mutably.
    #[inline]
    pub fn active_mut(&mut self) -> &mut [Particle] {
        &mut self.particles[..self.live_count]
    }

    /// Number of particles in the active range that are still alive.
    pub fn alive_count(&self) -> usize {
        self.active().iter().filter(|p| p.is_alive()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bounds() {
        let mut p = Particle {
            life: 2.0,
            max_life: 2.0,
            ..Particle::DEAD
        };
        assert_eq!(p.progress(), 0.0);
        p.age_by(1.0);
        assert!((p.progress() - 0.5).abs() < 1e-6);
        p.age_by(5.0);
        assert_eq!(p.life, 0.0);
        assert_eq!(p.progress(), 1.0);
    }

    #[test]
    fn test_zero_max_life_is_fully_decayed() {
        let p = Particle::DEAD;
        assert_eq!(p.progress(), 1.0);
        assert!(!p.is_alive());
    }

    #[test]
    fn test_set_rgb_keeps_alpha() {
        let mut p = Particle {
            color: Vec4::new(0.1, 0.2, 0.3, 0.4),
            ..Particle::DEAD
        };
        p.set_rgb(Vec3::ONE);
        assert_eq!(p.color, Vec4::new(1.0, 1.0, 1.0, 0.4));
    }

    #[test]
    fn test_buffer_grows_but_never_shrinks() {
        let mut buffer = ParticleBuffer::new();
        assert_eq!(buffer.capacity(), 0);

        buffer.prepare(100);
        assert_eq!(buffer.capacity(), 100);
        assert_eq!(buffer.live_count(), 100);

        buffer.prepare(10);
        assert_eq!(buffer.capacity(), 100);
        assert_eq!(buffer.live_count(), 10);
        assert_eq!(buffer.active().len(), 10);
    }

    #[test]
    fn test_prepare_resets_active_range() {
        let mut buffer = ParticleBuffer::new();
        buffer.prepare(4);
        buffer.active_mut()[0].life = 3.0;
        assert_eq!(buffer.alive_count(), 1);

        buffer.prepare(4);
        assert_eq!(buffer.alive_count(), 0);
    }
}
