//! Effects: post-processors layered over a behaviour's own update.
//!
//! Each behaviour slot in a show carries an ordered list of effects. After the
//! behaviour moves its particles and the show resets their RGB to the spawn
//! color, the effects run in declared order on the same buffer. Later effects
//! see earlier writes.
//!
//! # Effects
//!
//! | Variant | Writes |
//! |---------|--------|
//! | [`Effect::ColorShift`] | RGB, toward a target color over life |
//! | [`Effect::FadeVariance`] | alpha and RGB, staggered per particle |
//! | [`Effect::GravityVariance`] | `position.y` and `gravity_displacement_y` |
//! | [`Effect::Breathing`] | size and RGB, oscillating |
//! | [`Effect::Trail`] | nothing; read by the mesh builder |
//!
//! `FadeVariance` scales RGB by its brightness, so keep it last in the list.
//!
//! # Example
//!
//! ```ignore
//! let effects = vec![
//!     Effect::color_shift(Vec3::new(1.0, 0.4, 0.1), Curve::ease_in()),
//!     Effect::gravity_variance(3.0, 0.5, 0.6, 1.4),
//!     Effect::trail(0.08, 0.6, 0.5),
//!     Effect::fade_variance(0.4, 0.8, Curve::linear(1.0, 0.0)),
//! ];
//! ```

use glam::Vec3;
use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::particle::Particle;

/// Velocity-stretch settings read by the mesh builder.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrailSettings {
    /// Stretch length per unit of speed.
    pub stretch_multiplier: f32,
    /// Upper bound on the stretch length.
    pub max_stretch_length: f32,
    /// Speeds at or below this render as plain billboards.
    pub min_velocity: f32,
}

impl TrailSettings {
    /// Stretch length for a particle moving at `speed`, or `None` when too slow.
    pub fn stretch_for(&self, speed: f32) -> Option<f32> {
        if speed <= self.min_velocity {
            return None;
        }
        Some((speed * self.stretch_multiplier).min(self.max_stretch_length))
    }
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self {
            stretch_multiplier: 0.05,
            max_stretch_length: 0.5,
            min_velocity: 0.5,
        }
    }
}

/// A post-processing step on a particle buffer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Effect {
    /// Blend RGB from the spawn color toward `target` over normalized life.
    ColorShift {
        /// RGB reached when the curve is 1.
        target: Vec3,
        /// Blend factor over normalized life.
        curve: Curve,
    },

    /// Fade each particle out starting at its own point in life.
    ///
    /// The start is `lerp(min_start, max_start, random_seed)` in normalized
    /// life. Before it alpha is held at 1. After it brightness follows
    /// `curve` over the remaining life and scales both alpha and RGB.
    FadeVariance {
        /// Earliest fade start, normalized.
        min_start: f32,
        /// Latest fade start, normalized.
        max_start: f32,
        /// Brightness over the remaining life.
        curve: Curve,
    },

    /// Extra fall with per-particle strength.
    ///
    /// Displacement is analytic in show time, so the show undoes it before
    /// each behaviour update and this effect reapplies it afterwards.
    GravityVariance {
        /// Acceleration in units per second squared.
        gravity: f32,
        /// Seconds after show start before the fall begins.
        start_delay: f32,
        /// Multiplier for `random_seed == 0`.
        min_multiplier: f32,
        /// Multiplier for `random_seed == 1`.
        max_multiplier: f32,
    },

    /// Pulse size and brightness.
    Breathing {
        /// Cycles per second.
        frequency: f32,
        /// Fractional size swing.
        size_amplitude: f32,
        /// Mean brightness multiplier.
        emissive_base: f32,
        /// Brightness swing.
        emissive_amplitude: f32,
    },

    /// Render-time velocity stretching.
    Trail(TrailSettings),
}

impl Effect {
    /// Color shift toward `target`.
    pub fn color_shift(target: Vec3, curve: Curve) -> Self {
        Effect::ColorShift { target, curve }
    }

    /// Staggered fade between `min_start` and `max_start`.
    pub fn fade_variance(min_start: f32, max_start: f32, curve: Curve) -> Self {
        Effect::FadeVariance {
            min_start: min_start.clamp(0.0, 1.0),
            max_start: max_start.clamp(0.0, 1.0),
            curve,
        }
    }

    /// Per-particle extra gravity.
    pub fn gravity_variance(
        gravity: f32,
        start_delay: f32,
        min_multiplier: f32,
        max_multiplier: f32,
    ) -> Self {
        Effect::GravityVariance {
            gravity,
            start_delay,
            min_multiplier,
            max_multiplier,
        }
    }

    /// Size and brightness pulse.
    pub fn breathing(
        frequency: f32,
        size_amplitude: f32,
        emissive_base: f32,
        emissive_amplitude: f32,
    ) -> Self {
        Effect::Breathing {
            frequency,
            size_amplitude,
            emissive_base,
            emissive_amplitude,
        }
    }

    /// Velocity stretch for the mesh builder.
    pub fn trail(stretch_multiplier: f32, max_stretch_length: f32, min_velocity: f32) -> Self {
        Effect::Trail(TrailSettings {
            stretch_multiplier,
            max_stretch_length,
            min_velocity,
        })
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Effect::ColorShift { .. } => "color_shift",
            Effect::FadeVariance { .. } => "fade_variance",
            Effect::GravityVariance { .. } => "gravity_variance",
            Effect::Breathing { .. } => "breathing",
            Effect::Trail(_) => "trail",
        }
    }

    /// Trail settings if this is a trail effect.
    pub fn trail_settings(&self) -> Option<&TrailSettings> {
        match self {
            Effect::Trail(settings) => Some(settings),
            _ => None,
        }
    }

    /// Prepare freshly spawned particles.
    pub fn initialize(&self, particles: &mut [Particle]) {
        if let Effect::GravityVariance { .. } = self {
            for p in particles.iter_mut() {
                p.gravity_displacement_y = 0.0;
            }
        }
    }

    /// Apply the effect to live particles.
    ///
    /// `elapsed` is seconds since the show started.
    pub fn update(&self, particles: &mut [Particle], _dt: f32, elapsed: f32) {
        match self {
            Effect::ColorShift { target, curve } => {
                for p in particles.iter_mut().filter(|p| p.is_alive()) {
                    let t = curve.sample(p.progress());
                    p.set_rgb(p.base_color.truncate().lerp(*target, t));
                }
            }

            Effect::FadeVariance {
                min_start,
                max_start,
                curve,
            } => {
                for p in particles.iter_mut().filter(|p| p.is_alive()) {
                    let start = min_start + (max_start - min_start) * p.random_seed;
                    let progress = p.progress();
                    if progress < start {
                        p.color.w = 1.0;
                        continue;
                    }
                    let span = 1.0 - start;
                    let local = if span > 0.0 {
                        ((progress - start) / span).clamp(0.0, 1.0)
                    } else {
                        1.0
                    };
                    let brightness = curve.sample(local);
                    let rgb = p.color.truncate() * brightness;
                    p.color = rgb.extend(brightness);
                }
            }

            Effect::GravityVariance {
                gravity,
                start_delay,
                min_multiplier,
                max_multiplier,
            } => {
                let t = (elapsed - start_delay).max(0.0);
                for p in particles.iter_mut().filter(|p| p.is_alive()) {
                    let multiplier = min_multiplier + (max_multiplier - min_multiplier) * p.random_seed;
                    let s = 0.5 * gravity * multiplier * t * t;
                    p.position.y -= s;
                    p.gravity_displacement_y = s;
                }
            }

            Effect::Breathing {
                frequency,
                size_amplitude,
                emissive_base,
                emissive_amplitude,
            } => {
                for p in particles.iter_mut().filter(|p| p.is_alive()) {
                    let phase = elapsed * frequency * TAU + p.random_seed * TAU;
                    let wave = phase.sin();
                    p.size = (p.size * (1.0 + size_amplitude * wave)).max(0.0);
                    let emissive = (emissive_base + emissive_amplitude * wave).max(0.0);
                    p.set_rgb(p.color.truncate() * emissive);
                }
            }

            Effect::Trail(_) => {}
        }
    }
}
