//! Integration tests for show orchestration.
//!
//! These drive a whole [`Show`] through the public API: queueing, frame
//! order, completion, and mesh output.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Vec3, Vec4};
use skyglyph::{
    Behaviour, BurstBehaviour, BurstConfig, CameraFrame, Curve, Effect, Particle, PatternBehaviour,
    PatternCell, PatternConfig, Request, Show, ShowEvent, SpawnContext,
};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn record(show: &mut Show) -> Rc<RefCell<Vec<ShowEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    show.on_state_change(move |e| sink.borrow_mut().push(e.clone()));
    events
}

fn run_to_idle(show: &mut Show, dt: f32) -> usize {
    for frame in 0..10_000 {
        show.update(dt, None);
        if !show.is_playing() {
            return frame;
        }
    }
    panic!("show never went idle");
}

// ============================================================================
// Queue ordering
// ============================================================================

#[test]
fn test_three_requests_play_in_order_without_interleaving() {
    let mut show = Show::new().with_seed(10).with_behaviour(BurstBehaviour::new(
        BurstConfig::new().count(32).lifetime(0.5, 0.5),
    ));
    let events = record(&mut show);

    let r1 = Request::empty(Vec3::new(1.0, 0.0, 0.0));
    let r2 = Request::empty(Vec3::new(2.0, 0.0, 0.0));
    let r3 = Request::empty(Vec3::new(3.0, 0.0, 0.0));

    show.handle_request(r1);
    show.tick(0.1);
    show.handle_request(r2);
    show.handle_request(r3);
    assert_eq!(show.queued(), 2);

    run_to_idle(&mut show, 0.05);

    let log = events.borrow();
    let origins: Vec<f32> = log
        .iter()
        .filter_map(|e| match e {
            ShowEvent::Started { origin, .. } => Some(origin.x),
            ShowEvent::Stopped => None,
        })
        .collect();
    assert_eq!(origins, vec![1.0, 2.0, 3.0]);
    assert_eq!(log.last(), Some(&ShowEvent::Stopped));
}

#[test]
fn test_next_request_waits_for_every_slot() {
    // The burst dies quickly, the formation holds; the queue must wait for both.
    let mut show = Show::new()
        .with_seed(11)
        .with_behaviour(BurstBehaviour::new(
            BurstConfig::new().count(8).lifetime(0.1, 0.1),
        ))
        .with_behaviour(PatternBehaviour::new(
            PatternConfig::new()
                .pixel_scale(1.0)
                .converge(100.0, Curve::linear(0.0, 1.0))
                .hold(1.0)
                .fade(0.0, 0.5, Curve::linear(1.0, 0.0)),
        ));
    let events = record(&mut show);

    let pattern = Request::new(Vec3::ZERO, vec![PatternCell::new(0, 0, RED)], 1, 1);
    show.handle_request(pattern.clone());
    show.handle_request(pattern.with_origin(Vec3::ONE));

    for _ in 0..10 {
        show.update(0.05, None);
    }
    assert_eq!(show.queued(), 1);
    assert!(show.slots()[0].behaviour().is_complete(show.slots()[0].particles()));
    assert_eq!(
        events
            .borrow()
            .iter()
            .filter(|e| matches!(e, ShowEvent::Started { .. }))
            .count(),
        1
    );

    run_to_idle(&mut show, 0.05);
    assert_eq!(events.borrow().len(), 3);
}

// ============================================================================
// Frame order
// ============================================================================

#[test]
fn test_gravity_undo_restores_pre_displacement_y() {
    // A motionless burst so only the effect moves particles.
    let mut show = Show::new().with_seed(12).with_effects(
        BurstBehaviour::new(
            BurstConfig::new()
                .count(16)
                .speed(0.0, 0.0)
                .gravity(0.0)
                .drag(1.0)
                .lifetime(10.0, 10.0),
        ),
        vec![Effect::gravity_variance(4.0, 0.0, 0.5, 1.5)],
    );
    let origin = Vec3::new(0.0, 50.0, 0.0);
    show.handle_request(Request::empty(origin));

    for _ in 0..20 {
        show.tick(0.1);
        for p in show.slots()[0].particles() {
            // Displacement never accumulates across frames.
            assert!((p.position.y + p.gravity_displacement_y - origin.y).abs() < 1e-3);
            assert!(p.gravity_displacement_y > 0.0);
        }
    }

    // Displacement follows s = 1/2 g m t^2 in show time.
    let elapsed = show.slots()[0].elapsed();
    for p in show.slots()[0].particles() {
        let m = 0.5 + p.random_seed;
        let expected = 0.5 * 4.0 * m * elapsed * elapsed;
        assert!((p.gravity_displacement_y - expected).abs() < 1e-3);
    }
}

#[test]
fn test_effects_see_reset_rgb_every_frame() {
    let mut show = Show::new().with_seed(13).with_effects(
        BurstBehaviour::new(BurstConfig::new().count(8).lifetime(5.0, 5.0)),
        vec![Effect::breathing(0.0, 0.0, 0.5, 0.0)],
    );
    show.handle_request(Request::new(Vec3::ZERO, vec![PatternCell::new(0, 0, BLUE)], 1, 1));
    for _ in 0..10 {
        show.tick(0.1);
    }
    // Halved once per frame, not compounded.
    for p in show.slots()[0].particles() {
        assert!((p.color.z - 0.5).abs() < 1e-5);
    }
}

#[test]
fn test_zero_dt_keeps_the_last_frame() {
    // Breathing scales the size it finds; a frame with no time step must
    // leave it alone instead of compounding.
    let mut show = Show::new().with_seed(16).with_effects(
        PatternBehaviour::new(
            PatternConfig::new()
                .pixel_scale(1.0)
                .converge(100.0, Curve::linear(0.0, 1.0))
                .hold(10.0),
        ),
        vec![Effect::breathing(1.0, 0.3, 1.0, 0.0)],
    );
    let cells = vec![PatternCell::new(0, 0, RED), PatternCell::new(3, 0, BLUE)];
    show.handle_request(Request::new(Vec3::ZERO, cells, 4, 1));

    show.tick(0.13);
    let before = show.slots()[0].particles().to_vec();
    let elapsed = show.slots()[0].elapsed();

    for _ in 0..30 {
        show.tick(0.0);
    }
    show.tick(-0.5);
    assert_eq!(show.slots()[0].particles(), &before[..]);
    assert_eq!(show.slots()[0].elapsed(), elapsed);

    show.tick(0.1);
    assert!((show.slots()[0].elapsed() - (elapsed + 0.1)).abs() < 1e-6);
}

// ============================================================================
// Color statistics
// ============================================================================

#[test]
fn test_burst_colors_follow_pattern_frequency() {
    // 3 red cells, 1 blue cell: expect ~75% red.
    let cells = vec![
        PatternCell::new(0, 0, RED),
        PatternCell::new(1, 0, RED),
        PatternCell::new(2, 0, RED),
        PatternCell::new(3, 0, BLUE),
    ];
    let request = Request::new(Vec3::ZERO, cells, 4, 1);
    let mut burst = BurstBehaviour::new(BurstConfig::new().count(20_000));
    let mut particles = vec![Particle::DEAD; burst.particle_count(&request)];
    let mut ctx = SpawnContext::seeded(99);
    burst.initialize_particles(&mut particles, &request, &mut ctx);

    let red = particles.iter().filter(|p| p.base_color.x > 0.5).count();
    let ratio = red as f32 / particles.len() as f32;
    assert!((ratio - 0.75).abs() < 0.02, "red ratio {}", ratio);
}

#[test]
fn test_empty_pattern_burst_is_white() {
    let mut burst = BurstBehaviour::new(BurstConfig::new().count(10));
    let request = Request::empty(Vec3::ZERO);
    let mut particles = vec![Particle::DEAD; 10];
    burst.initialize_particles(&mut particles, &request, &mut SpawnContext::seeded(1));
    assert!(particles.iter().all(|p| p.base_color == Vec4::ONE));
}

// ============================================================================
// Mesh output
// ============================================================================

#[test]
fn test_mesh_tracks_show_and_clears_dead() {
    let mut show = Show::new().with_seed(14).with_behaviour(BurstBehaviour::new(
        BurstConfig::new().count(4).lifetime(0.2, 0.2),
    ));
    let camera = CameraFrame::default();
    show.handle_request(Request::empty(Vec3::new(0.0, 5.0, 0.0)));

    let mesh = show.update(0.01, Some(&camera)).map(|m| m.vertices().to_vec());
    let vertices = mesh.unwrap_or_default();
    assert_eq!(vertices.len(), 16);
    assert!(vertices.iter().all(|v| v.color[3] > 0.0));

    for _ in 0..30 {
        show.update(0.05, Some(&camera));
    }
    assert!(!show.is_playing());
    let mesh = show.build_mesh(&camera);
    assert_eq!(mesh.quad_capacity(), 4);
    for v in mesh.vertices() {
        assert_eq!(v.position, [0.0; 3]);
        assert_eq!(v.color, [0.0; 4]);
    }
}

#[test]
fn test_missing_camera_still_simulates() {
    let mut show = Show::new().with_seed(15).with_behaviour(BurstBehaviour::new(
        BurstConfig::new().count(4).lifetime(0.1, 0.1),
    ));
    show.handle_request(Request::empty(Vec3::ZERO));
    let frames = run_to_idle(&mut show, 0.05);
    assert!(frames > 0);
    assert_eq!(show.mesh().quad_capacity(), 0);
}

#[test]
fn test_mesh_only_rebuilt_while_playing() {
    let mut show = Show::new().with_seed(17).with_behaviour(BurstBehaviour::new(
        BurstConfig::new().count(4).lifetime(0.2, 0.2),
    ));
    let camera = CameraFrame::default();
    assert!(show.update(0.05, Some(&camera)).is_none());

    show.handle_request(Request::empty(Vec3::ZERO));
    let mut last = None;
    for _ in 0..30 {
        last = show.update(0.05, Some(&camera)).map(|m| m.vertices().to_vec());
        if !show.is_playing() {
            break;
        }
    }
    assert!(!show.is_playing());

    // The stopping frame still clears the sky.
    let vertices = last.unwrap_or_default();
    assert_eq!(vertices.len(), 16);
    assert!(vertices.iter().all(|v| v.color == [0.0; 4]));

    assert!(show.update(0.05, Some(&camera)).is_none());
}
