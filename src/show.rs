//! The show orchestrator.
//!
//! A [`Show`] owns one slot per configured behaviour. Each slot holds the
//! behaviour, its effect chain, its grow-only particle buffer and the seconds
//! elapsed since the current request started. Only one request plays at a
//! time; requests arriving while a show is playing wait in a FIFO queue.
//!
//! # Frame order
//!
//! For every slot, in declared order, [`Show::tick`] runs:
//!
//! 1. Undo the previous frame's gravity-variance displacement.
//! 2. The behaviour's own update.
//! 3. Reset live particles' RGB to their spawn color, keeping alpha.
//! 4. Advance the slot's elapsed time.
//! 5. Every effect, in order.
//!
//! Steps 1 and 3 let effects be written as pure functions of the behaviour's
//! state: they never see their own output from the previous frame. A slot
//! skips the whole sequence when `dt <= 0`, so a paused show keeps its last
//! composed frame.
//!
//! # Example
//!
//! ```ignore
//! let mut show = Show::new()
//!     .with_behaviour(BurstBehaviour::new(BurstConfig::default()))
//!     .with_effects(
//!         PatternBehaviour::new(PatternConfig::default()),
//!         vec![Effect::trail(0.05, 0.5, 0.5)],
//!     );
//!
//! show.on_state_change(|event| println!("{event:?}"));
//! show.handle_request(request);
//!
//! // every frame
//! if let Some(mesh) = show.update(dt, Some(&camera.frame())) {
//!     upload(mesh.vertices());
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec3;

use crate::behaviour::Behaviour;
use crate::camera::CameraFrame;
use crate::effect::{Effect, TrailSettings};
use crate::mesh::ParticleMesh;
use crate::particle::{Particle, ParticleBuffer};
use crate::request::Request;
use crate::spawn::SpawnContext;

/// Outbound notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum ShowEvent {
    /// A request started playing.
    Started {
        /// Spawn point of the request.
        origin: Vec3,
        /// Total particles across every slot.
        particles: usize,
    },
    /// The last particle died and the queue is empty.
    Stopped,
}

/// Snapshot of a show's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShowStats {
    /// Particles still alive.
    pub alive: usize,
    /// Particles belonging to the current request, alive or not.
    pub active: usize,
    /// Allocated particle records across every slot.
    pub capacity: usize,
    /// Requests waiting in the queue.
    pub queued: usize,
    /// Whether a request is currently playing.
    pub playing: bool,
}

/// One behaviour with its effects and particle storage.
pub struct BehaviourSlot {
    behaviour: Box<dyn Behaviour>,
    effects: Vec<Effect>,
    buffer: ParticleBuffer,
    elapsed: f32,
}

impl BehaviourSlot {
    /// Slot for `behaviour` with an effect chain.
    pub fn new(behaviour: Box<dyn Behaviour>, effects: Vec<Effect>) -> Self {
        Self {
            behaviour,
            effects,
            buffer: ParticleBuffer::new(),
            elapsed: 0.0,
        }
    }

    /// The strategy driving this slot's particles.
    pub fn behaviour(&self) -> &dyn Behaviour {
        self.behaviour.as_ref()
    }

    /// Effects applied after each update, in order.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// The current request's particles.
    pub fn particles(&self) -> &[Particle] {
        self.buffer.active()
    }

    /// Backing storage, including records beyond the current request.
    pub fn buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    /// Seconds since the current request started.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// First trail effect in the chain, if any.
    pub fn trail(&self) -> Option<&TrailSettings> {
        self.effects.iter().find_map(Effect::trail_settings)
    }

    fn is_complete(&self) -> bool {
        self.behaviour.is_complete(self.buffer.active())
    }

    fn start(&mut self, request: &Request, ctx: &mut SpawnContext) -> usize {
        let count = self.behaviour.particle_count(request);
        self.buffer.prepare(count);
        self.elapsed = 0.0;
        if count == 0 {
            return 0;
        }

        self.behaviour
            .initialize_particles(self.buffer.active_mut(), request, ctx);
        for effect in &self.effects {
            effect.initialize(self.buffer.active_mut());
        }
        count
    }

    fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let particles = self.buffer.active_mut();

        for p in particles.iter_mut().filter(|p| p.is_alive()) {
            p.position.y += p.gravity_displacement_y;
            p.gravity_displacement_y = 0.0;
        }

        self.behaviour.update_particles(particles, dt);

        for p in particles.iter_mut().filter(|p| p.is_alive()) {
            p.set_rgb(p.base_color.truncate());
        }

        self.elapsed += dt;

        for effect in &self.effects {
            effect.update(particles, dt, self.elapsed);
        }
    }
}

type Listener = Box<dyn FnMut(&ShowEvent)>;

/// Plays requests one at a time through every configured behaviour.
pub struct Show {
    slots: Vec<BehaviourSlot>,
    queue: VecDeque<Request>,
    playing: bool,
    ctx: SpawnContext,
    listeners: Vec<Listener>,
    mesh: ParticleMesh,
}

impl Show {
    /// Empty show seeded from the clock.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            queue: VecDeque::new(),
            playing: false,
            ctx: SpawnContext::from_time(),
            listeners: Vec::new(),
            mesh: ParticleMesh::new(),
        }
    }

    // ========== Setup ==========

    /// Use a fixed random seed so every run is identical.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.ctx = SpawnContext::seeded(seed);
        self
    }

    /// Add a behaviour with no effects.
    pub fn with_behaviour<B: Behaviour + 'static>(self, behaviour: B) -> Self {
        self.with_effects(behaviour, Vec::new())
    }

    /// Add a behaviour with an effect chain.
    pub fn with_effects<B: Behaviour + 'static>(mut self, behaviour: B, effects: Vec<Effect>) -> Self {
        self.add_behaviour(Box::new(behaviour), effects);
        self
    }

    /// Add a slot. Takes effect from the next request.
    pub fn add_behaviour(&mut self, behaviour: Box<dyn Behaviour>, effects: Vec<Effect>) {
        self.slots.push(BehaviourSlot::new(behaviour, effects));
    }

    /// Vertex positions in built meshes are relative to `origin`.
    pub fn with_mesh_origin(mut self, origin: Vec3) -> Self {
        self.mesh.set_origin(origin);
        self
    }

    /// Register a listener for [`ShowEvent`]s.
    pub fn on_state_change<F: FnMut(&ShowEvent) + 'static>(&mut self, listener: F) {
        self.listeners.push(Box::new(listener));
    }

    // ========== Requests ==========

    /// Play `request` now if idle, otherwise queue it.
    pub fn handle_request(&mut self, request: Request) {
        if self.playing {
            log::debug!("show busy, queueing request ({} waiting)", self.queue.len() + 1);
            self.queue.push_back(request);
        } else {
            self.start_show(&request);
        }
    }

    /// Start `request` immediately, replacing whatever was playing.
    ///
    /// Returns true if at least one particle was spawned.
    pub fn start_show(&mut self, request: &Request) -> bool {
        if self.slots.is_empty() {
            log::warn!("show has no behaviours, ignoring request");
            self.playing = false;
            return false;
        }

        let mut total = 0;
        for slot in &mut self.slots {
            let count = slot.start(request, &mut self.ctx);
            log::debug!("{}: {} particles", slot.behaviour.name(), count);
            total += count;
        }

        self.playing = total > 0;
        if self.playing {
            self.emit(ShowEvent::Started {
                origin: request.origin(),
                particles: total,
            });
        } else {
            log::warn!("request produced no particles, skipping");
        }
        self.playing
    }

    // ========== Frame ==========

    /// Advance every slot by `dt` seconds. Does nothing while idle.
    pub fn tick(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        for slot in &mut self.slots {
            slot.tick(dt);
        }
    }

    /// Move to the next queued request once every slot is finished.
    pub fn check_completion(&mut self) {
        if !self.playing || !self.slots.iter().all(BehaviourSlot::is_complete) {
            return;
        }

        while let Some(next) = self.queue.pop_front() {
            if self.start_show(&next) {
                return;
            }
        }

        self.playing = false;
        log::debug!("show stopped");
        self.emit(ShowEvent::Stopped);
    }

    /// Tick, check completion, and rebuild the mesh.
    ///
    /// The mesh is only rebuilt while a show is playing, including the frame
    /// on which it stops, and only when a camera is available. Otherwise
    /// returns `None` and leaves the last mesh untouched.
    pub fn update(&mut self, dt: f32, camera: Option<&CameraFrame>) -> Option<&ParticleMesh> {
        let was_playing = self.playing;
        self.tick(dt);
        self.check_completion();
        if !was_playing {
            return None;
        }
        let camera = camera?;
        Some(self.build_mesh(camera))
    }

    /// Rebuild the mesh from every slot, in declared order.
    pub fn build_mesh(&mut self, camera: &CameraFrame) -> &ParticleMesh {
        let total = self.slots.iter().map(|s| s.buffer.live_count()).sum();
        self.mesh.begin(total);
        for slot in &self.slots {
            self.mesh.push(slot.particles(), slot.trail(), camera);
        }
        self.mesh.finish();
        &self.mesh
    }

    // ========== Queries ==========

    /// True from a successful start until the last queued request finishes.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Requests waiting behind the current one.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Behaviour slots in declared order.
    pub fn slots(&self) -> &[BehaviourSlot] {
        &self.slots
    }

    /// The most recently built mesh.
    pub fn mesh(&self) -> &ParticleMesh {
        &self.mesh
    }

    /// Counters summed over every slot.
    pub fn stats(&self) -> ShowStats {
        ShowStats {
            alive: self.slots.iter().map(|s| s.buffer.alive_count()).sum(),
            active: self.slots.iter().map(|s| s.buffer.live_count()).sum(),
            capacity: self.slots.iter().map(|s| s.buffer.capacity()).sum(),
            queued: self.queue.len(),
            playing: self.playing,
        }
    }

    fn emit(&mut self, event: ShowEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

impl Default for Show {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviour::{BurstBehaviour, BurstConfig, PatternBehaviour, PatternConfig};
    use crate::curve::Curve;
    use crate::request::PatternCell;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn quick_burst() -> BurstBehaviour {
        BurstBehaviour::new(BurstConfig::new().count(16).lifetime(0.3, 0.3))
    }

    fn recorder(show: &mut Show) -> Rc<RefCell<Vec<ShowEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        show.on_state_change(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    fn run_until_idle(show: &mut Show) {
        for _ in 0..1000 {
            show.tick(0.05);
            show.check_completion();
            if !show.is_playing() {
                return;
            }
        }
        panic!("show never finished");
    }

    #[test]
    fn test_no_behaviours_is_a_no_op() {
        let mut show = Show::new().with_seed(1);
        let events = recorder(&mut show);
        show.handle_request(Request::empty(Vec3::ZERO));
        assert!(!show.is_playing());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_zero_particle_request_does_not_play() {
        let mut show = Show::new()
            .with_seed(1)
            .with_behaviour(PatternBehaviour::new(PatternConfig::default()));
        assert!(!show.start_show(&Request::empty(Vec3::ZERO)));
        assert!(!show.is_playing());
    }

    #[test]
    fn test_requests_play_in_order() {
        let mut show = Show::new().with_seed(2).with_behaviour(quick_burst());
        let events = recorder(&mut show);

        let origins = [Vec3::X, Vec3::Y, Vec3::Z];
        for origin in origins {
            show.handle_request(Request::empty(origin));
        }
        assert!(show.is_playing());
        assert_eq!(show.queued(), 2);

        run_until_idle(&mut show);

        let started: Vec<Vec3> = events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                ShowEvent::Started { origin, .. } => Some(*origin),
                ShowEvent::Stopped => None,
            })
            .collect();
        assert_eq!(started, origins.to_vec());
        assert_eq!(events.borrow().last(), Some(&ShowEvent::Stopped));
        assert_eq!(
            events.borrow().iter().filter(|e| **e == ShowEvent::Stopped).count(),
            1
        );
    }

    #[test]
    fn test_queued_empty_requests_are_skipped() {
        let cell = PatternCell::new(0, 0, [255, 255, 255, 255]);
        let pattern = PatternConfig::new()
            .converge(10.0, Curve::linear(0.0, 1.0))
            .hold(0.1)
            .fade(0.0, 0.1, Curve::linear(1.0, 0.0));
        let mut show = Show::new()
            .with_seed(3)
            .with_behaviour(PatternBehaviour::new(pattern));
        let events = recorder(&mut show);

        show.handle_request(Request::new(Vec3::X, vec![cell], 1, 1));
        show.handle_request(Request::empty(Vec3::Y));
        show.handle_request(Request::new(Vec3::Z, vec![cell], 1, 1));
        run_until_idle(&mut show);

        let started = events
            .borrow()
            .iter()
            .filter(|e| matches!(e, ShowEvent::Started { .. }))
            .count();
        assert_eq!(started, 2);
    }

    #[test]
    fn test_rgb_reset_before_effects() {
        let mut show = Show::new().with_seed(4).with_effects(
            quick_burst(),
            vec![Effect::color_shift(Vec3::ZERO, Curve::constant(0.5))],
        );
        show.handle_request(Request::empty(Vec3::ZERO));
        for _ in 0..3 {
            show.tick(0.01);
            for p in show.slots()[0].particles() {
                let expected = p.base_color.truncate() * 0.5;
                assert!((p.color.truncate() - expected).length() < 1e-5);
            }
        }
    }

    #[test]
    fn test_stats_and_mesh() {
        let mut show = Show::new().with_seed(5).with_behaviour(quick_burst());
        show.handle_request(Request::empty(Vec3::ZERO));
        show.handle_request(Request::empty(Vec3::ONE));

        let stats = show.stats();
        assert!(stats.playing);
        assert_eq!(stats.alive, 16);
        assert_eq!(stats.capacity, 16);
        assert_eq!(stats.queued, 1);

        assert!(show.update(0.01, None).is_none());
        let mesh = show.update(0.01, Some(&CameraFrame::default()));
        assert_eq!(mesh.map(|m| m.quad_capacity()), Some(16));
    }

    #[test]
    fn test_idle_tick_does_nothing() {
        let mut show = Show::new().with_seed(6).with_behaviour(quick_burst());
        show.tick(1.0);
        show.check_completion();
        assert!(!show.is_playing());
        assert_eq!(show.stats(), ShowStats::default());
    }
}
