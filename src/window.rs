use std::sync::Arc;

use glam::Vec3;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use skyglyph::{Camera, FrameClock, Preset, Request, Show, ShowConfig, ShowEvent, ViewerError};

use crate::renderer::GpuState;

/// Seconds of idle sky before the next launch happens on its own.
const AUTO_LAUNCH_AFTER: f32 = 1.5;

/// Launch points cycle through these offsets from the camera target.
const LAUNCH_OFFSETS: [Vec3; 4] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(-6.0, 2.0, -3.0),
    Vec3::new(6.0, -1.0, -2.0),
    Vec3::new(0.0, 3.0, -6.0),
];

pub struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    camera: Camera,
    clock: FrameClock,
    show: Show,
    pattern: Request,
    idle_for: f32,
    launches: usize,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    error: Option<ViewerError>,
}

impl App {
    pub fn new(pattern: Request) -> Self {
        Self {
            window: None,
            gpu_state: None,
            camera: Camera::new(),
            clock: FrameClock::new().with_max_delta(0.1),
            show: build_show(Preset::Peony),
            pattern,
            idle_for: 0.0,
            launches: 0,
            mouse_pressed: false,
            last_mouse_pos: None,
            error: None,
        }
    }

    /// The setup failure that ended the event loop, if any.
    pub fn take_error(&mut self) -> Option<ViewerError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        self.error = Some(error);
        event_loop.exit();
    }

    fn launch(&mut self) {
        let offset = LAUNCH_OFFSETS[self.launches % LAUNCH_OFFSETS.len()];
        self.launches += 1;
        self.show
            .handle_request(self.pattern.with_origin(self.camera.target + offset));
        self.idle_for = 0.0;
    }

    fn switch_preset(&mut self, preset: Preset) {
        log::info!("preset: {:?}", preset);
        self.show = build_show(preset);
        self.idle_for = AUTO_LAUNCH_AFTER;
        if let Some(gpu_state) = &mut self.gpu_state {
            gpu_state.clear();
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::Space => self.launch(),
            KeyCode::KeyP => self.clock.toggle_pause(),
            KeyCode::Digit1 => self.switch_preset(Preset::Peony),
            KeyCode::Digit2 => self.switch_preset(Preset::Ring),
            KeyCode::Digit3 => self.switch_preset(Preset::Willow),
            KeyCode::Digit4 => self.switch_preset(Preset::Glyph),
            _ => {}
        }
    }

    fn frame(&mut self) {
        let dt = self.clock.tick();

        if !self.show.is_playing() && self.show.queued() == 0 {
            self.idle_for += dt;
            if self.idle_for >= AUTO_LAUNCH_AFTER {
                self.launch();
            }
        }

        let camera = self.camera.frame();
        let Some(gpu_state) = &mut self.gpu_state else {
            self.show.update(dt, None);
            return;
        };
        if let Some(mesh) = self.show.update(dt, Some(&camera)) {
            gpu_state.upload(mesh, &self.camera);
        }
    }
}

fn build_show(preset: Preset) -> Show {
    let mut show = ShowConfig::preset(preset).build();
    show.on_state_change(|event| match event {
        ShowEvent::Started { origin, particles } => {
            log::info!("show started at {:?} with {} particles", origin, particles)
        }
        ShowEvent::Stopped => log::info!("show stopped"),
    });
    show
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("skyglyph")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };

        match pollster::block_on(GpuState::new(window.clone())) {
            Ok(gpu_state) => self.gpu_state = Some(gpu_state),
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        }
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, event),
            WindowEvent::MouseInput { state, button, .. } => match button {
                MouseButton::Left => {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
                MouseButton::Right if state == ElementState::Pressed => self.launch(),
                _ => {}
            },
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = position.x - last_x;
                        let dy = position.y - last_y;
                        self.camera.orbit(-dx as f32 * 0.005, dy as f32 * 0.005);
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                self.camera.zoom(1.0 - scroll * 0.05);
            }
            WindowEvent::RedrawRequested => {
                self.frame();
                if let Some(gpu_state) = &mut self.gpu_state {
                    match gpu_state.render() {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => gpu_state.resize(winit::dpi::PhysicalSize {
                            width: gpu_state.config.width,
                            height: gpu_state.config.height,
                        }),
                        Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                        Err(e) => log::warn!("render error: {:?}", e),
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
