//! Behaviours: pluggable simulations that own one particle buffer per show.
//!
//! A show runs every configured behaviour side by side. Each one sizes its
//! buffer from the request, spawns its particles, and advances them once per
//! frame until they are all dead.
//!
//! # Built-in behaviours
//!
//! | Type | Description |
//! |------|-------------|
//! | [`BurstBehaviour`] | Explosion in a sphere or flat ring, colored from the pattern |
//! | [`PatternBehaviour`] | Particles converge on the drawn pattern, hold, then drift and fade |
//!
//! # Custom behaviours
//!
//! Implement [`Behaviour`] and hand it to [`Show::with_behaviour`](crate::Show::with_behaviour):
//!
//! ```ignore
//! struct Sparkle;
//!
//! impl Behaviour for Sparkle {
//!     fn particle_count(&self, request: &Request) -> usize { request.cells().len() }
//!     fn initialize_particles(&mut self, particles: &mut [Particle], request: &Request, ctx: &mut SpawnContext) { /* ... */ }
//!     fn update_particles(&mut self, particles: &mut [Particle], dt: f32) { /* ... */ }
//! }
//! ```

mod burst;
mod color_table;
mod formation;

pub use burst::{BurstBehaviour, BurstConfig, BurstShape};
pub use color_table::ColorTable;
pub use formation::{FormationState, PatternBehaviour, PatternConfig};

use crate::particle::Particle;
use crate::request::Request;
use crate::spawn::SpawnContext;

/// World-space down.
pub(crate) const DOWN: glam::Vec3 = glam::Vec3::NEG_Y;

/// A particle simulation strategy.
///
/// The show calls these in a fixed order: `particle_count` once per request,
/// then `initialize_particles` on a buffer of exactly that length, then
/// `update_particles` once per frame until `is_complete` reports true.
pub trait Behaviour {
    /// Short name used in log messages.
    fn name(&self) -> &str {
        "behaviour"
    }

    /// How many particles this behaviour needs for `request`.
    ///
    /// Must be deterministic for a given request.
    fn particle_count(&self, request: &Request) -> usize;

    /// Spawn every particle in `particles` with valid position, velocity,
    /// color, size and lifetime.
    fn initialize_particles(
        &mut self,
        particles: &mut [Particle],
        request: &Request,
        ctx: &mut SpawnContext,
    );

    /// Advance live particles by `dt` seconds.
    ///
    /// Dead particles must be left untouched and `dt <= 0` must be harmless.
    fn update_particles(&mut self, particles: &mut [Particle], dt: f32);

    /// True once every particle is dead.
    fn is_complete(&self, particles: &[Particle]) -> bool {
        particles.iter().all(|p| !p.is_alive())
    }
}

impl<B: Behaviour + ?Sized> Behaviour for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn particle_count(&self, request: &Request) -> usize {
        (**self).particle_count(request)
    }

    fn initialize_particles(
        &mut self,
        particles: &mut [Particle],
        request: &Request,
        ctx: &mut SpawnContext,
    ) {
        (**self).initialize_particles(particles, request, ctx)
    }

    fn update_particles(&mut self, particles: &mut [Particle], dt: f32) {
        (**self).update_particles(particles, dt)
    }

    fn is_complete(&self, particles: &[Particle]) -> bool {
        (**self).is_complete(particles)
    }
}
