//! # skyglyph
//!
//! Pattern-driven particle shows: draw a picture, launch it, and watch it
//! burst, form in the sky, hold, and fade.
//!
//! A [`Request`] carries a sparse pixel pattern and a launch point. A [`Show`]
//! runs several [`Behaviour`]s on it side by side, layers [`Effect`]s over each
//! one, and rebuilds a single camera-facing [`ParticleMesh`] every frame.
//!
//! ## Quick Start
//!
//! ```ignore
//! use skyglyph::prelude::*;
//!
//! let mut show = Show::new()
//!     .with_seed(7)
//!     .with_effects(
//!         BurstBehaviour::new(BurstConfig::new().shape(BurstShape::Ring)),
//!         vec![Effect::trail(0.06, 0.8, 1.0)],
//!     )
//!     .with_behaviour(PatternBehaviour::new(PatternConfig::new()));
//!
//! show.handle_request(Request::new(origin, cells, 32, 32));
//!
//! loop {
//!     let dt = clock.tick();
//!     if let Some(mesh) = show.update(dt, Some(&camera.frame())) {
//!         upload(mesh.vertices(), mesh.indices());
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Behaviours
//!
//! A behaviour sizes a particle buffer from the request, spawns its
//! particles, and moves them each frame until all are dead. See
//! [`behaviour`] for the built-in ones and how to write your own.
//!
//! ### Effects
//!
//! Effects decorate a behaviour's particles after it moves them: color
//! shifts, staggered fades, extra gravity, breathing, and trail stretching.
//! The show undoes gravity displacement and resets RGB before each behaviour
//! update, so effects never compound across frames.
//!
//! ### Queueing
//!
//! One request plays at a time. Requests arriving mid-show wait in a FIFO
//! queue and start as soon as every particle of the current one has died.
//!
//! ## Feature Overview
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`show`] | [`Show`], [`ShowEvent`], [`ShowStats`] |
//! | [`behaviour`] | [`BurstBehaviour`], [`PatternBehaviour`], [`Behaviour`] |
//! | [`effect`] | [`Effect`], [`TrailSettings`] |
//! | [`phase`] | [`PhaseFirework`]: standalone Burst/Steer/Hold/Fade entity |
//! | [`mesh`] | [`ParticleMesh`], [`Vertex`], [`BILLBOARD_WGSL`] |
//! | [`config`] | [`ShowConfig`] presets, serde-loadable with the `serde` feature |
//! | [`pattern`] | Requests from images |

pub mod behaviour;
pub mod camera;
pub mod config;
pub mod curve;
pub mod effect;
pub mod error;
pub mod mesh;
pub mod particle;
pub mod pattern;
pub mod phase;
pub mod request;
pub mod show;
pub mod spawn;
pub mod time;

pub use bytemuck;
pub use glam::{Vec2, Vec3, Vec4};

pub use behaviour::{
    Behaviour, BurstBehaviour, BurstConfig, BurstShape, ColorTable, FormationState,
    PatternBehaviour, PatternConfig,
};
pub use camera::{Camera, CameraFrame};
pub use config::{BehaviourConfig, Preset, ShowConfig, SlotConfig};
pub use curve::Curve;
pub use effect::{Effect, TrailSettings};
pub use error::{GpuError, PatternError, ViewerError};
pub use mesh::{MeshUniforms, ParticleMesh, Renderable, Vertex, BILLBOARD_WGSL};
pub use particle::{Particle, ParticleBuffer};
pub use phase::{Phase, PhaseConfig, PhaseFirework, PhaseParticle};
pub use request::{PatternCell, Request};
pub use show::{BehaviourSlot, Show, ShowEvent, ShowStats};
pub use spawn::SpawnContext;
pub use time::FrameClock;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use skyglyph::prelude::*;
/// ```
pub mod prelude {
    pub use crate::behaviour::{
        Behaviour, BurstBehaviour, BurstConfig, BurstShape, PatternBehaviour, PatternConfig,
    };
    pub use crate::camera::{Camera, CameraFrame};
    pub use crate::config::{Preset, ShowConfig};
    pub use crate::curve::Curve;
    pub use crate::effect::Effect;
    pub use crate::mesh::ParticleMesh;
    pub use crate::particle::Particle;
    pub use crate::phase::{PhaseConfig, PhaseFirework};
    pub use crate::request::{PatternCell, Request};
    pub use crate::show::{Show, ShowEvent};
    pub use crate::spawn::SpawnContext;
    pub use crate::time::FrameClock;
    pub use crate::{Vec2, Vec3, Vec4};
}
