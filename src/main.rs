//! Windowed viewer: launches shows of a pattern and renders the mesh.
//!
//! ```text
//! skyglyph [pattern.png]
//! ```
//!
//! Space or right click launches, 1-4 switch presets, P pauses, left drag
//! orbits, the wheel zooms. Set `RUST_LOG=debug` for show lifecycle logs.

mod renderer;
mod window;

use glam::Vec3;
use winit::event_loop::{ControlFlow, EventLoop};

use skyglyph::pattern::{load_request, smiley, DEFAULT_ALPHA_THRESHOLD};
use skyglyph::ViewerError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ViewerError> {
    let pattern = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading pattern from {}", path);
            load_request(&path, Vec3::ZERO, DEFAULT_ALPHA_THRESHOLD)?
        }
        None => smiley(Vec3::ZERO),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = window::App::new(pattern);
    event_loop.run_app(&mut app)?;
    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
