//! Burst and ring explosions colored by the drawn pattern.

use glam::Vec4;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Behaviour, ColorTable, DOWN};
use crate::curve::Curve;
use crate::particle::Particle;
use crate::request::Request;
use crate::spawn::SpawnContext;

/// Which directions a burst throws particles in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BurstShape {
    /// Uniform over the full sphere.
    #[default]
    Sphere,
    /// Uniform over the circle in the XY plane.
    Ring,
}

/// Configuration for a [`BurstBehaviour`].
///
/// # Example
///
/// ```ignore
/// BurstConfig::new()
///     .shape(BurstShape::Ring)
///     .count(600)
///     .speed(6.0, 1.5)              // 6 +/- 1.5 units/s
///     .extent_multiplier(0.12)      // never slower than radius_px * 0.12
///     .lifetime(1.2, 2.0)
///     .gravity(2.5)
///     .drag(0.985)
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BurstConfig {
    /// Emission shape.
    pub shape: BurstShape,
    /// Fixed particle count per request.
    pub count: usize,
    /// Base launch speed in units per second.
    pub speed: f32,
    /// Half-width of the random speed band around `speed`.
    pub speed_variance: f32,
    /// Minimum speed per pixel of pattern radius.
    pub extent_multiplier: f32,
    /// Shortest lifetime in seconds.
    pub lifetime_min: f32,
    /// Longest lifetime in seconds.
    pub lifetime_max: f32,
    /// Downward acceleration in units per second squared.
    pub gravity: f32,
    /// Velocity multiplier applied every update.
    pub drag: f32,
    /// Base render size in world units.
    pub size: f32,
    /// Fractional size spread, driven by each particle's seed.
    pub size_variance: f32,
    /// Size multiplier over normalized lifetime.
    pub size_curve: Curve,
    /// Alpha over normalized lifetime.
    pub alpha_curve: Curve,
    /// Color used when the pattern is empty.
    pub fallback_color: Vec4,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            shape: BurstShape::Sphere,
            count: 400,
            speed: 5.0,
            speed_variance: 1.0,
            extent_multiplier: 0.1,
            lifetime_min: 1.5,
            lifetime_max: 2.5,
            gravity: 2.0,
            drag: 0.98,
            size: 0.12,
            size_variance: 0.25,
            size_curve: Curve::linear(1.0, 0.2),
            alpha_curve: Curve::hold_then_fade(0.6),
            fallback_color: Vec4::ONE,
        }
    }
}

impl BurstConfig {
    /// Default burst configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the emission shape.
    pub fn shape(mut self, shape: BurstShape) -> Self {
        self.shape = shape;
        self
    }

    /// Set the particle count.
    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Set base speed and the +/- variance band.
    pub fn speed(mut self, speed: f32, variance: f32) -> Self {
        self.speed = speed;
        self.speed_variance = variance.abs();
        self
    }

    /// Set the per-pixel minimum speed factor.
    pub fn extent_multiplier(mut self, multiplier: f32) -> Self {
        self.extent_multiplier = multiplier;
        self
    }

    /// Set the lifetime range in seconds.
    pub fn lifetime(mut self, min: f32, max: f32) -> Self {
        self.lifetime_min = min.min(max);
        self.lifetime_max = max.max(min);
        self
    }

    /// Set gravity.
    pub fn gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set per-update drag.
    pub fn drag(mut self, drag: f32) -> Self {
        self.drag = drag;
        self
    }

    /// Set base size and fractional variance.
    pub fn size(mut self, size: f32, variance: f32) -> Self {
        self.size = size.max(0.0);
        self.size_variance = variance.clamp(0.0, 1.0);
        self
    }

    /// Set the size curve.
    pub fn size_curve(mut self, curve: Curve) -> Self {
        self.size_curve = curve;
        self
    }

    /// Set the alpha curve.
    pub fn alpha_curve(mut self, curve: Curve) -> Self {
        self.alpha_curve = curve;
        self
    }

    /// Set the color for empty patterns.
    pub fn fallback_color(mut self, color: Vec4) -> Self {
        self.fallback_color = color;
        self
    }
}

/// Explosion that reuses the pattern's palette.
///
/// Colors are drawn from a [`ColorTable`], so a pattern that is mostly red
/// produces a mostly red burst. Launch speed is floored by the pattern's
/// radius so the burst always covers the drawing.
#[derive(Debug, Clone)]
pub struct BurstBehaviour {
    config: BurstConfig,
}

impl BurstBehaviour {
    /// Create a burst from its configuration.
    pub fn new(config: BurstConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &BurstConfig {
        &self.config
    }

    /// Slowest launch speed allowed for `request`.
    pub fn effective_min_speed(&self, request: &Request) -> f32 {
        request.max_radius() * self.config.extent_multiplier
    }

    fn base_size(&self, seed: f32) -> f32 {
        let v = self.config.size_variance;
        self.config.size * (1.0 - v + 2.0 * v * seed)
    }
}

impl Behaviour for BurstBehaviour {
    fn name(&self) -> &str {
        match self.config.shape {
            BurstShape::Sphere => "burst",
            BurstShape::Ring => "ring",
        }
    }

    fn particle_count(&self, _request: &Request) -> usize {
        self.config.count
    }

    fn initialize_particles(
        &mut self,
        particles: &mut [Particle],
        request: &Request,
        ctx: &mut SpawnContext,
    ) {
        let table = ColorTable::from_request(request, self.config.fallback_color);
        let min_speed = self.effective_min_speed(request);
        let origin = request.origin();

        for p in particles.iter_mut() {
            let direction = match self.config.shape {
                BurstShape::Sphere => ctx.random_direction(),
                BurstShape::Ring => ctx.random_planar_direction(),
            };
            let speed = (self.config.speed + ctx.random_signed(self.config.speed_variance))
                .max(min_speed)
                .max(0.0);
            let color = table.sample(ctx);
            let seed = ctx.particle_seed();
            let life = ctx
                .random_range(self.config.lifetime_min, self.config.lifetime_max)
                .max(0.0);

            *p = Particle {
                position: origin,
                velocity: direction * speed,
                color: color.truncate().extend(self.config.alpha_curve.sample(0.0)),
                base_color: color,
                size: self.base_size(seed) * self.config.size_curve.sample(0.0),
                life,
                max_life: life,
                random_seed: seed,
                ..Particle::DEAD
            };
        }
    }

    fn update_particles(&mut self, particles: &mut [Particle], dt: f32) {
        if dt <= 0.0 {
            return;
        }

        let gravity = DOWN * self.config.gravity * dt;
        for p in particles.iter_mut().filter(|p| p.is_alive()) {
            p.velocity += gravity;
            p.velocity *= self.config.drag;
            p.position += p.velocity * dt;
            p.age_by(dt);

            let progress = p.progress();
            p.size = (self.base_size(p.random_seed) * self.config.size_curve.sample(progress)).max(0.0);
            p.color.w = self.config.alpha_curve.sample(progress);
        }
    }
}
