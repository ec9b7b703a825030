//! Pattern formation: particles fly to their pixel, hold the picture, then
//! drift apart and fade.
//!
//! Every particle shares one timeline so the picture appears and dissolves as
//! a whole:
//!
//! ```text
//! 0 ─── converge ───┬─── hold ───┬─ delay ─┬── fade ──┐
//!                   max_formation  hold_end   fade start  total_life
//! ```
//!
//! A particle whose target is close arrives early and waits; the slowest one
//! defines `max_formation_time`.

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{Behaviour, DOWN};
use crate::curve::Curve;
use crate::particle::Particle;
use crate::request::Request;
use crate::spawn::SpawnContext;

/// Where a formation particle is on its timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationState {
    /// Still travelling toward the target.
    Converge,
    /// Pinned at the target.
    Hold,
    /// Drifting away from the target under gravity.
    Drift,
}

/// Configuration for a [`PatternBehaviour`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatternConfig {
    /// World units per pattern pixel.
    pub pixel_scale: f32,
    /// Travel speed toward the target in units per second.
    pub converge_speed: f32,
    /// Eases the converge interpolation. Should map 0 to 0 and 1 to 1.
    pub formation_curve: Curve,
    /// Seconds the finished picture is held after the last arrival.
    pub hold_duration: f32,
    /// Speed along the approach direction once drifting.
    pub drift_speed: f32,
    /// Downward acceleration while drifting.
    pub gravity: f32,
    /// Seconds between hold end and the start of the fade.
    pub fade_delay: f32,
    /// Length of the fade in seconds.
    pub fade_duration: f32,
    /// Alpha over fade progress.
    pub alpha_curve: Curve,
    /// Base render size.
    pub size: f32,
    /// Size multiplier over the whole timeline.
    pub size_curve: Curve,
    /// Radius of random scatter around the origin at spawn.
    pub start_spread: f32,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            pixel_scale: 0.25,
            converge_speed: 8.0,
            formation_curve: Curve::ease_out(),
            hold_duration: 2.0,
            drift_speed: 0.6,
            gravity: 0.8,
            fade_delay: 0.3,
            fade_duration: 1.5,
            alpha_curve: Curve::linear(1.0, 0.0),
            size: 0.18,
            size_curve: Curve::constant(1.0),
            start_spread: 0.0,
        }
    }
}

impl PatternConfig {
    /// Default formation configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// World units per pattern pixel.
    pub fn pixel_scale(mut self, scale: f32) -> Self {
        self.pixel_scale = scale;
        self
    }

    /// Converge speed and easing.
    pub fn converge(mut self, speed: f32, curve: Curve) -> Self {
        self.converge_speed = speed;
        self.formation_curve = curve;
        self
    }

    /// Hold duration in seconds.
    pub fn hold(mut self, seconds: f32) -> Self {
        self.hold_duration = seconds.max(0.0);
        self
    }

    /// Drift speed and gravity after the hold.
    pub fn drift(mut self, speed: f32, gravity: f32) -> Self {
        self.drift_speed = speed;
        self.gravity = gravity;
        self
    }

    /// Fade delay, duration and alpha curve.
    pub fn fade(mut self, delay: f32, duration: f32, curve: Curve) -> Self {
        self.fade_delay = delay.max(0.0);
        self.fade_duration = duration.max(0.0);
        self.alpha_curve = curve;
        self
    }

    /// Base size and size curve.
    pub fn size(mut self, size: f32, curve: Curve) -> Self {
        self.size = size.max(0.0);
        self.size_curve = curve;
        self
    }

    /// Random scatter radius around the origin at spawn.
    pub fn start_spread(mut self, radius: f32) -> Self {
        self.start_spread = radius.max(0.0);
        self
    }
}

/// Draws the request's pattern in the sky, one particle per cell.
#[derive(Debug, Clone)]
pub struct PatternBehaviour {
    config: PatternConfig,
    max_formation_time: f32,
    hold_end: f32,
    total_life: f32,
}

impl PatternBehaviour {
    /// Create a formation from its configuration.
    pub fn new(config: PatternConfig) -> Self {
        Self {
            config,
            max_formation_time: 0.0,
            hold_end: 0.0,
            total_life: 0.0,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Time for the slowest particle to arrive, for the current request.
    pub fn max_formation_time(&self) -> f32 {
        self.max_formation_time
    }

    /// Shared end of the hold window.
    pub fn hold_end(&self) -> f32 {
        self.hold_end
    }

    /// Lifetime shared by every particle of the current request.
    pub fn total_life(&self) -> f32 {
        self.total_life
    }

    /// Seconds a particle needs to reach its target.
    pub fn formation_time(&self, particle: &Particle) -> f32 {
        let distance = particle.target_position.distance(particle.start_position);
        if distance <= 0.0 || self.config.converge_speed <= 0.0 {
            0.0
        } else {
            distance / self.config.converge_speed
        }
    }

    /// Timeline state of `particle` at its current elapsed time.
    pub fn formation_state(&self, particle: &Particle) -> FormationState {
        let elapsed = particle.elapsed();
        if elapsed < self.formation_time(particle) {
            FormationState::Converge
        } else if elapsed < self.hold_end {
            FormationState::Hold
        } else {
            FormationState::Drift
        }
    }

    fn position_at(&self, particle: &Particle, elapsed: f32) -> Vec3 {
        let formation_time = self.formation_time(particle);
        if elapsed < formation_time {
            let t = self.config.formation_curve.sample(elapsed / formation_time);
            particle.start_position.lerp(particle.target_position, t)
        } else if elapsed < self.hold_end {
            particle.target_position
        } else {
            let td = elapsed - self.hold_end;
            particle.target_position
                + particle.velocity * self.config.drift_speed * td
                + DOWN * 0.5 * self.config.gravity * td * td
        }
    }

    fn alpha_at(&self, elapsed: f32) -> f32 {
        let fade_start = self.hold_end + self.config.fade_delay;
        if elapsed < fade_start {
            return 1.0;
        }
        let fade_progress = if self.config.fade_duration > 0.0 {
            ((elapsed - fade_start) / self.config.fade_duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.config.alpha_curve.sample(fade_progress)
    }

    fn size_at(&self, elapsed: f32) -> f32 {
        let t = if self.total_life > 0.0 {
            (elapsed / self.total_life).clamp(0.0, 1.0)
        } else {
            1.0
        };
        (self.config.size * self.config.size_curve.sample(t)).max(0.0)
    }
}

impl Behaviour for PatternBehaviour {
    fn name(&self) -> &str {
        "pattern"
    }

    fn particle_count(&self, request: &Request) -> usize {
        request.cells().len()
    }

    fn initialize_particles(
        &mut self,
        particles: &mut [Particle],
        request: &Request,
        ctx: &mut SpawnContext,
    ) {
        let origin = request.origin();
        let mut max_formation_time = 0.0f32;

        for (p, cell) in particles.iter_mut().zip(request.cells()) {
            let offset = request.centered_offset(cell) * self.config.pixel_scale;
            let target = origin + offset.extend(0.0);
            let start = if self.config.start_spread > 0.0 {
                origin + ctx.random_in_sphere(self.config.start_spread)
            } else {
                origin
            };
            let color = cell.color_f32();

            *p = Particle {
                position: start,
                velocity: (target - start).normalize_or_zero(),
                color: color.truncate().extend(1.0),
                base_color: color,
                random_seed: ctx.particle_seed(),
                start_position: start,
                target_position: target,
                ..Particle::DEAD
            };
            max_formation_time = max_formation_time.max(self.formation_time(p));
        }

        self.max_formation_time = max_formation_time;
        self.hold_end = max_formation_time + self.config.hold_duration;
        self.total_life = self.hold_end + self.config.fade_delay + self.config.fade_duration;

        let size = self.size_at(0.0);
        for p in particles.iter_mut() {
            p.life = self.total_life;
            p.max_life = self.total_life;
            p.size = size;
        }
    }

    fn update_particles(&mut self, particles: &mut [Particle], dt: f32) {
        if dt <= 0.0 {
            return;
        }

        for p in particles.iter_mut().filter(|p| p.is_alive()) {
            p.age_by(dt);
            let elapsed = p.elapsed();
            p.position = self.position_at(p, elapsed);
            p.color.w = self.alpha_at(elapsed);
            p.size = self.size_at(elapsed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::PatternCell;

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn two_cell_request() -> Request {
        // Grid 0x0 so the midpoint is the origin: distances 0 and 8.
        Request::new(
            Vec3::ZERO,
            vec![PatternCell::new(0, 0, WHITE), PatternCell::new(8, 0, WHITE)],
            0,
            0,
        )
    }

    fn config() -> PatternConfig {
        PatternConfig::new()
            .pixel_scale(1.0)
            .converge(10.0, Curve::linear(0.0, 1.0))
            .hold(1.0)
            .drift(1.0, 2.0)
            .fade(0.5, 1.0, Curve::linear(1.0, 0.0))
            .size(0.2, Curve::constant(1.0))
    }

    fn spawn(config: PatternConfig, request: &Request) -> (PatternBehaviour, Vec<Particle>) {
        let mut behaviour = PatternBehaviour::new(config);
        let mut particles = vec![Particle::DEAD; behaviour.particle_count(request)];
        let mut ctx = SpawnContext::seeded(3);
        behaviour.initialize_particles(&mut particles, request, &mut ctx);
        (behaviour, particles)
    }

    #[test]
    fn test_count_matches_cells() {
        let req = two_cell_request();
        let behaviour = PatternBehaviour::new(config());
        assert_eq!(behaviour.particle_count(&req), 2);
    }

    #[test]
    fn test_shared_timeline() {
        let (behaviour, particles) = spawn(config(), &two_cell_request());
        assert!((behaviour.max_formation_time() - 0.8).abs() < 1e-5);
        assert!((behaviour.hold_end() - 1.8).abs() < 1e-5);
        assert!((behaviour.total_life() - 3.3).abs() < 1e-5);
        for p in &particles {
            assert_eq!(p.life, behaviour.total_life());
            assert_eq!(p.max_life, behaviour.total_life());
        }
    }

    #[test]
    fn test_near_pinned_far_still_travelling() {
        let (mut behaviour, mut particles) = spawn(config(), &two_cell_request());
        assert_eq!(behaviour.formation_time(&particles[0]), 0.0);
        assert!((behaviour.formation_time(&particles[1]) - 0.8).abs() < 1e-5);

        for _ in 0..4 {
            behaviour.update_particles(&mut particles, 0.1);
        }

        let near = &particles[0];
        let far = &particles[1];
        assert!(near.position.distance(near.target_position) < 1e-5);
        assert_eq!(behaviour.formation_state(near), FormationState::Hold);
        assert!(far.position.distance(far.target_position) > 0.0);
        assert_eq!(behaviour.formation_state(far), FormationState::Converge);
        assert!((far.position.x - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_life_clamps_and_dead_particles_untouched() {
        let (mut behaviour, mut particles) = spawn(config(), &two_cell_request());
        particles[0].life = 0.0;
        particles[0].position = Vec3::new(9.0, 9.0, 9.0);
        let dead = particles[0];

        let mut last_life = particles[1].life;
        for _ in 0..40 {
            behaviour.update_particles(&mut particles, 0.1);
            assert!(particles[1].life <= last_life);
            last_life = particles[1].life;
            assert_eq!(particles[0], dead);
        }

        assert_eq!(particles[1].life, 0.0);
        assert!(behaviour.is_complete(&particles));

        // A finished particle stays frozen where its last update left it.
        let finished = particles[1];
        behaviour.update_particles(&mut particles, 0.1);
        assert_eq!(particles[1], finished);
    }

    #[test]
    fn test_hold_then_drift_then_fade() {
        let (mut behaviour, mut particles) = spawn(config(), &two_cell_request());

        // Into the hold window: both pinned, fully opaque.
        for _ in 0..10 {
            behaviour.update_particles(&mut particles, 0.1);
        }
        for p in &particles {
            assert!(p.position.distance(p.target_position) < 1e-4);
            assert_eq!(p.color.w, 1.0);
        }

        // Past the fade start: the far particle drifts along +X and sinks.
        for _ in 0..15 {
            behaviour.update_particles(&mut particles, 0.1);
        }
        let far = &particles[1];
        assert_eq!(behaviour.formation_state(far), FormationState::Drift);
        assert!(far.position.x > far.target_position.x);
        assert!(far.position.y < far.target_position.y);
        assert!(far.color.w < 1.0);
    }

    #[test]
    fn test_zero_distance_particle_drifts_straight_down() {
        let (mut behaviour, mut particles) = spawn(config(), &two_cell_request());
        for _ in 0..25 {
            behaviour.update_particles(&mut particles, 0.1);
        }
        let near = &particles[0];
        assert_eq!(near.position.x, 0.0);
        assert!(near.position.y < 0.0);
    }

    #[test]
    fn test_zero_fade_duration() {
        let config = config().fade(0.0, 0.0, Curve::linear(1.0, 0.0));
        let (mut behaviour, mut particles) = spawn(config, &two_cell_request());
        assert!((behaviour.total_life() - 1.8).abs() < 1e-5);
        for _ in 0..19 {
            behaviour.update_particles(&mut particles, 0.1);
        }
        assert!(behaviour.is_complete(&particles));
    }

    #[test]
    fn test_non_positive_converge_speed_arrives_instantly() {
        let config = config().converge(0.0, Curve::linear(0.0, 1.0));
        let (behaviour, particles) = spawn(config, &two_cell_request());
        assert_eq!(behaviour.max_formation_time(), 0.0);
        assert_eq!(behaviour.formation_time(&particles[1]), 0.0);
    }

    #[test]
    fn test_start_spread_scatters_start() {
        let config = config().start_spread(2.0);
        let (_, particles) = spawn(config, &two_cell_request());
        for p in &particles {
            assert!(p.start_position.length() <= 2.0 + 1e-4);
            assert_eq!(p.position, p.start_position);
        }
    }
}
