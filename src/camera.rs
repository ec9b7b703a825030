//! Orbit camera and the per-frame basis handed to the mesh builder.

use glam::{Mat4, Vec3};

/// Camera basis for one frame.
///
/// The mesh builder only needs these four vectors to face quads toward the
/// viewer and project velocities onto the screen plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    /// World-space eye position.
    pub position: Vec3,
    /// Unit vector pointing right on screen.
    pub right: Vec3,
    /// Unit vector pointing up on screen.
    pub up: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
}

impl CameraFrame {
    /// Basis for an eye at `position` looking at `target`.
    ///
    /// Falls back to looking down -Z when the two coincide, and picks a
    /// different reference axis when looking straight up or down.
    pub fn look_at(position: Vec3, target: Vec3) -> Self {
        let forward = (target - position).try_normalize().unwrap_or(Vec3::NEG_Z);
        let reference = if forward.y.abs() > 0.999 { Vec3::Z } else { Vec3::Y };
        let right = forward.cross(reference).normalize();
        let up = right.cross(forward);
        Self {
            position,
            right,
            up,
            forward,
        }
    }

    /// Project `v` onto the screen plane.
    #[inline]
    pub fn project_on_screen(&self, v: Vec3) -> Vec3 {
        v - self.forward * v.dot(self.forward)
    }
}

impl Default for CameraFrame {
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
    }
}

/// Orbit camera for viewing a show.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
}

impl Camera {
    /// Camera looking at the sky a little above the ground.
    pub fn new() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.1,
            distance: 30.0,
            target: Vec3::new(0.0, 12.0, 0.0),
            fov_y: 45f32.to_radians(),
        }
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Rotate by mouse deltas in radians. Pitch stays short of the poles.
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-1.5, 1.5);
    }

    /// Move closer or further; `factor < 1` zooms in.
    pub fn zoom(&mut self, factor: f32) {
        self.distance = (self.distance * factor).clamp(1.0, 500.0);
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Perspective projection for the given aspect ratio.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(1e-4), 0.1, 1000.0)
    }

    /// Combined view-projection matrix.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Basis for the mesh builder.
    pub fn frame(&self) -> CameraFrame {
        CameraFrame::look_at(self.position(), self.target)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_is_orthonormal() {
        let mut cam = Camera::new();
        cam.orbit(0.7, 0.4);
        let f = cam.frame();
        assert!((f.right.length() - 1.0).abs() < 1e-5);
        assert!((f.up.length() - 1.0).abs() < 1e-5);
        assert!(f.right.dot(f.up).abs() < 1e-5);
        assert!(f.right.dot(f.forward).abs() < 1e-5);
        assert!(f.up.y > 0.0);
    }

    #[test]
    fn test_default_frame_faces_negative_z() {
        let f = CameraFrame::default();
        assert!((f.forward - Vec3::NEG_Z).length() < 1e-6);
        assert!((f.right - Vec3::X).length() < 1e-6);
        assert!((f.up - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_look_straight_down() {
        let f = CameraFrame::look_at(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO);
        assert!(f.right.is_finite());
        assert!((f.right.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_project_on_screen_drops_depth() {
        let f = CameraFrame::default();
        let v = f.project_on_screen(Vec3::new(1.0, 2.0, 3.0));
        assert!((v - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut cam = Camera::new();
        cam.zoom(0.0);
        assert_eq!(cam.distance, 1.0);
    }
}
