//! # Headless Show
//!
//! Plays a preset without a window and prints counters as it goes.
//! Useful for checking timings and particle counts of a preset.
//!
//! Run with: `cargo run --example headless --release -- [peony|ring|willow|glyph]`

use skyglyph::pattern::smiley;
use skyglyph::prelude::*;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let preset = match std::env::args().nth(1).as_deref() {
        Some("ring") => Preset::Ring,
        Some("willow") => Preset::Willow,
        Some("glyph") => Preset::Glyph,
        _ => Preset::Peony,
    };

    let mut show = ShowConfig::preset(preset).with_seed(1).build();
    show.on_state_change(|event| println!("event: {:?}", event));

    show.handle_request(smiley(Vec3::new(0.0, 12.0, 0.0)));
    show.handle_request(smiley(Vec3::new(5.0, 14.0, -2.0)));

    let camera = Camera::new().frame();
    let mut clock = FrameClock::new().with_fixed_delta(1.0 / 60.0);
    let mut frame = 0u32;
    while show.is_playing() {
        let dt = clock.tick();
        show.update(dt, Some(&camera));
        if frame % 30 == 0 {
            let stats = show.stats();
            println!(
                "t={:5.2}s alive={:5} active={:5} capacity={:5} queued={}",
                clock.elapsed(),
                stats.alive,
                stats.active,
                stats.capacity,
                stats.queued
            );
        }
        frame += 1;
    }

    println!("=== {:?} finished after {} frames ===", preset, frame);
}
