//! Phase-driven firework: one self-contained entity that walks a flat buffer
//! through Burst, Steer, Hold and Fade.
//!
//! This is the lightweight alternative to a [`Show`](crate::Show): no behaviour
//! slots, no effects, one timeline for the whole entity.
//!
//! | Phase | Pattern particles | Debris |
//! |-------|-------------------|--------|
//! | Burst | Fly outward with drag | Fall with gravity and drag, decay |
//! | Steer | Blend velocity toward their formation target | same |
//! | Hold | Jitter around the target | same |
//! | Fade | Stay put, fade out | same, plus the fade |
//!
//! ```ignore
//! let mut firework = PhaseFirework::new(&request, PhaseConfig::default(), &mut ctx);
//! while firework.update(dt) {
//!     mesh.build_from(firework.particles(), None, &camera);
//! }
//! ```

use glam::{Vec3, Vec4};
use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::behaviour::ColorTable;
use crate::curve::Curve;
use crate::request::Request;
use crate::spawn::SpawnContext;

const DOWN: Vec3 = Vec3::NEG_Y;

/// Named stages of a [`PhaseFirework`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Everything flies outward from the origin.
    Burst,
    /// Pattern particles turn toward their targets.
    Steer,
    /// Pattern particles wobble around their targets.
    Hold,
    /// Everything dims and shrinks to nothing.
    Fade,
    /// Terminal. Nothing moves any more.
    Done,
}

impl Phase {
    /// The phase that follows this one.
    pub fn next(self) -> Phase {
        match self {
            Phase::Burst => Phase::Steer,
            Phase::Steer => Phase::Hold,
            Phase::Hold => Phase::Fade,
            Phase::Fade | Phase::Done => Phase::Done,
        }
    }
}

/// Tuning for a [`PhaseFirework`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseConfig {
    /// Seconds spent in each phase.
    pub burst_duration: f32,
    pub steer_duration: f32,
    pub hold_duration: f32,
    pub fade_duration: f32,
    /// Launch speed of pattern particles.
    pub burst_speed: f32,
    /// Extra particles that never join the pattern.
    pub debris_count: usize,
    /// Launch speed of debris.
    pub debris_speed: f32,
    /// Seconds for debris life to run from 1 to 0.
    pub debris_lifetime: f32,
    /// Downward acceleration on debris.
    pub gravity: f32,
    /// Velocity multiplier applied every update.
    pub drag: f32,
    /// World units per pattern pixel.
    pub pixel_scale: f32,
    /// Spawn size of every particle.
    pub size: f32,
    /// Steering strength over steer progress.
    pub steer_curve: Curve,
    /// Amplitude of the hold wobble in world units.
    pub hold_jitter: f32,
    /// Wobble cycles per second.
    pub jitter_frequency: f32,
}

impl Default for PhaseConfig {
    fn default() -> Self {
        Self {
            burst_duration: 0.6,
            steer_duration: 1.2,
            hold_duration: 2.0,
            fade_duration: 1.0,
            burst_speed: 6.0,
            debris_count: 120,
            debris_speed: 8.0,
            debris_lifetime: 2.0,
            gravity: 3.0,
            drag: 0.97,
            pixel_scale: 0.25,
            size: 0.15,
            steer_curve: Curve::ease_in(),
            hold_jitter: 0.02,
            jitter_frequency: 1.5,
        }
    }
}

impl PhaseConfig {
    /// Default phase timings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set all four phase durations.
    pub fn durations(mut self, burst: f32, steer: f32, hold: f32, fade: f32) -> Self {
        self.burst_duration = burst.max(0.0);
        self.steer_duration = steer.max(0.0);
        self.hold_duration = hold.max(0.0);
        self.fade_duration = fade.max(0.0);
        self
    }

    /// Launch speed of pattern particles.
    pub fn burst_speed(mut self, speed: f32) -> Self {
        self.burst_speed = speed;
        self
    }

    /// Debris count, speed and lifetime.
    pub fn debris(mut self, count: usize, speed: f32, lifetime: f32) -> Self {
        self.debris_count = count;
        self.debris_speed = speed;
        self.debris_lifetime = lifetime;
        self
    }

    /// Gravity and per-update drag.
    pub fn physics(mut self, gravity: f32, drag: f32) -> Self {
        self.gravity = gravity;
        self.drag = drag;
        self
    }

    /// World units per pattern pixel.
    pub fn pixel_scale(mut self, scale: f32) -> Self {
        self.pixel_scale = scale;
        self
    }

    /// Particle size.
    pub fn size(mut self, size: f32) -> Self {
        self.size = size.max(0.0);
        self
    }

    /// Steering strength curve.
    pub fn steer_curve(mut self, curve: Curve) -> Self {
        self.steer_curve = curve;
        self
    }

    /// Hold wobble amplitude and frequency.
    pub fn hold_jitter(mut self, amplitude: f32, frequency: f32) -> Self {
        self.hold_jitter = amplitude.max(0.0);
        self.jitter_frequency = frequency;
        self
    }

    fn duration(&self, phase: Phase) -> f32 {
        match phase {
            Phase::Burst => self.burst_duration,
            Phase::Steer => self.steer_duration,
            Phase::Hold => self.hold_duration,
            Phase::Fade => self.fade_duration,
            Phase::Done => 0.0,
        }
    }
}

/// A particle owned by a [`PhaseFirework`].
///
/// `life` is normalized: 1 at spawn, dead at 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Vec4,
    pub size: f32,
    pub base_size: f32,
    pub life: f32,
    /// Where this particle sits in the finished picture.
    pub formation_target: Vec3,
    /// False for debris.
    pub is_pattern: bool,
    /// Per-particle value in `[0, 1)`, offsets the hold wobble.
    pub seed: f32,
}

impl PhaseParticle {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Single firework entity driven by a phase timeline.
#[derive(Debug, Clone)]
pub struct PhaseFirework {
    config: PhaseConfig,
    particles: Vec<PhaseParticle>,
    phase: Phase,
    phase_elapsed: f32,
}

impl PhaseFirework {
    /// Spawn one pattern particle per cell plus the configured debris.
    pub fn new(request: &Request, config: PhaseConfig, ctx: &mut SpawnContext) -> Self {
        let origin = request.origin();
        let mut particles = Vec::with_capacity(request.cells().len() + config.debris_count);

        for cell in request.cells() {
            let target = origin + (request.centered_offset(cell) * config.pixel_scale).extend(0.0);
            particles.push(PhaseParticle {
                position: origin,
                velocity: ctx.random_direction() * config.burst_speed,
                color: cell.color_f32().truncate().extend(1.0),
                size: config.size,
                base_size: config.size,
                life: 1.0,
                formation_target: target,
                is_pattern: true,
                seed: ctx.particle_seed(),
            });
        }

        let table = ColorTable::from_request(request, Vec4::ONE);
        for _ in 0..config.debris_count {
            let speed = config.debris_speed * ctx.random_range(0.5, 1.0);
            let color = table.sample(ctx);
            particles.push(PhaseParticle {
                position: origin,
                velocity: ctx.random_direction() * speed,
                color: color.truncate().extend(1.0),
                size: config.size * 0.6,
                base_size: config.size * 0.6,
                life: 1.0,
                formation_target: origin,
                is_pattern: false,
                seed: ctx.particle_seed(),
            });
        }

        Self {
            config,
            particles,
            phase: Phase::Burst,
            phase_elapsed: 0.0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seconds spent in the current phase.
    pub fn phase_elapsed(&self) -> f32 {
        self.phase_elapsed
    }

    /// Normalized progress through the current phase. Zero-length phases
    /// report 1.
    pub fn phase_progress(&self) -> f32 {
        let duration = self.config.duration(self.phase);
        if duration <= 0.0 {
            1.0
        } else {
            (self.phase_elapsed / duration).clamp(0.0, 1.0)
        }
    }

    /// The particle buffer, pattern particles first.
    pub fn particles(&self) -> &[PhaseParticle] {
        &self.particles
    }

    /// The configuration in use.
    pub fn config(&self) -> &PhaseConfig {
        &self.config
    }

    /// True once the fade has finished.
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Advance by `dt` seconds. Returns false once finished.
    pub fn update(&mut self, dt: f32) -> bool {
        if self.is_finished() {
            return false;
        }
        if dt <= 0.0 {
            return true;
        }

        self.phase_elapsed += dt;
        let progress = self.phase_progress();
        let remaining = (self.config.duration(self.phase) - self.phase_elapsed).max(0.0);

        for p in self.particles.iter_mut().filter(|p| p.is_alive()) {
            if p.is_pattern {
                Self::step_pattern(&self.config, self.phase, p, dt, progress, remaining, self.phase_elapsed);
            } else {
                Self::step_debris(&self.config, p, dt);
            }
            if self.phase == Phase::Fade {
                Self::step_fade(&self.config, p, dt);
            }
        }

        if self.phase_elapsed >= self.config.duration(self.phase) {
            let next = self.phase.next();
            log::debug!("phase firework: {:?} -> {:?}", self.phase, next);
            self.phase = next;
            self.phase_elapsed = 0.0;
            if next == Phase::Done {
                // Fade steps may leave a rounding residue
                for p in &mut self.particles {
                    p.life = 0.0;
                    p.color.w = 0.0;
                    p.size = 0.0;
                }
            }
        }

        !self.is_finished()
    }

    fn step_debris(config: &PhaseConfig, p: &mut PhaseParticle, dt: f32) {
        p.velocity += DOWN * config.gravity * dt;
        p.velocity *= config.drag;
        p.position += p.velocity * dt;
        p.life = if config.debris_lifetime > 0.0 {
            (p.life - dt / config.debris_lifetime).max(0.0)
        } else {
            0.0
        };
        p.color.w = p.life;
    }

    fn step_pattern(
        config: &PhaseConfig,
        phase: Phase,
        p: &mut PhaseParticle,
        dt: f32,
        progress: f32,
        remaining: f32,
        phase_elapsed: f32,
    ) {
        match phase {
            Phase::Burst => {
                p.velocity *= config.drag;
                p.position += p.velocity * dt;
            }
            Phase::Steer => {
                let strength = config.steer_curve.sample(progress).clamp(0.0, 1.0);
                let desired = (p.formation_target - p.position) / remaining.max(dt);
                p.velocity = p.velocity.lerp(desired, strength);
                p.position += p.velocity * dt;
            }
            Phase::Hold => {
                p.velocity = Vec3::ZERO;
                p.position = p.formation_target + hold_jitter(config, p.seed, phase_elapsed);
            }
            Phase::Fade | Phase::Done => {}
        }
    }

    fn step_fade(config: &PhaseConfig, p: &mut PhaseParticle, dt: f32) {
        let k = if config.fade_duration > 0.0 {
            dt / config.fade_duration
        } else {
            1.0
        };
        p.color.w = (p.color.w - k).max(0.0);
        p.life = (p.life - k).max(0.0);
        p.size = (p.size - p.base_size * k).max(0.0);
    }
}

/// Two sinusoids per axis, phase-shifted per particle.
fn hold_jitter(config: &PhaseConfig, seed: f32, t: f32) -> Vec3 {
    if config.hold_jitter <= 0.0 {
        return Vec3::ZERO;
    }
    let w = t * config.jitter_frequency * TAU;
    let offset = seed * TAU;
    let axis = |shift: f32| {
        0.5 * ((w + offset + shift).sin() + (w * 1.7 + offset * 2.0 + shift).sin())
    };
    Vec3::new(axis(0.0), axis(2.1), axis(4.2)) * config.hold_jitter
}
