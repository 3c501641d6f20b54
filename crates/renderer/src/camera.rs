//! Perspective camera with a smoothed third-person chase.

use engine_core::Transform;
use glam::{Mat4, Vec3};

/// Perspective camera with configurable FOV and clipping planes.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera transform (position and rotation).
    pub transform: Transform,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            fov_degrees: 45.0,
            near: 1.0,
            far: 2000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Camera {
    /// Create a new camera at the given position.
    pub fn new(position: Vec3) -> Self {
        Self {
            transform: Transform::from_position(position),
            ..Default::default()
        }
    }

    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Turn to face `target` immediately.
    pub fn look_at(&mut self, target: Vec3) {
        self.transform.look_at(target, Vec3::Y);
    }

    /// Chase a target: ease toward the target position plus `offset` in the
    /// target's orientation by `smoothing` (0..1) of the remaining distance,
    /// then look straight at the target. Position lags, gaze does not.
    pub fn chase(&mut self, target: &Transform, offset: Vec3, smoothing: f32) {
        let desired = target.position + target.rotate_vector(offset);
        self.transform.position = self.transform.position.lerp(desired, smoothing);
        self.look_at(target.position);
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        let eye = self.transform.position;
        let target = eye + self.transform.forward();
        Mat4::look_at_rh(eye, target, self.transform.up())
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Get camera position.
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Get camera forward direction.
    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn defaults_match_demo_lens() {
        let cam = Camera::new(Vec3::new(10.0, 100.0, 10.0));
        assert_eq!(cam.fov_degrees, 45.0);
        assert_eq!(cam.near, 1.0);
        assert_eq!(cam.far, 2000.0);
        assert_eq!(cam.position(), Vec3::new(10.0, 100.0, 10.0));
    }

    #[test]
    fn chase_moves_a_tenth_of_the_way() {
        let mut cam = Camera::new(Vec3::ZERO);
        let offset = Vec3::new(0.0, 5.0, 10.0);
        cam.chase(&Transform::default(), offset, 0.1);
        assert!(approx(cam.position(), Vec3::new(0.0, 0.5, 1.0)));
    }

    #[test]
    fn chase_offset_follows_target_rotation() {
        let mut cam = Camera::new(Vec3::ZERO);
        let target = Transform::from_position_rotation(
            Vec3::ZERO,
            glam::Quat::from_rotation_y(std::f32::consts::PI),
        );
        cam.chase(&target, Vec3::new(0.0, 5.0, 10.0), 1.0);
        assert!(approx(cam.position(), Vec3::new(0.0, 5.0, -10.0)));
    }

    #[test]
    fn chase_always_looks_at_target() {
        let mut cam = Camera::new(Vec3::new(10.0, 100.0, 10.0));
        let target = Vec3::new(3.0, 0.0, -7.0);
        cam.chase(&Transform::from_position(target), Vec3::new(0.0, 5.0, 10.0), 0.1);
        let to_target = (target - cam.position()).normalize();
        assert!(approx(cam.forward(), to_target));
    }

    #[test]
    fn repeated_chase_converges() {
        let mut cam = Camera::new(Vec3::new(10.0, 100.0, 10.0));
        let offset = Vec3::new(0.0, 5.0, 10.0);
        for _ in 0..500 {
            cam.chase(&Transform::default(), offset, 0.1);
        }
        assert!(approx(cam.position(), offset));
    }

    #[test]
    fn overhead_offset_keeps_view_finite() {
        let mut cam = Camera::new(Vec3::new(0.0, 40.0, 0.0));
        cam.chase(&Transform::default(), Vec3::new(0.0, 20.0, 0.0), 0.1);
        assert!(approx(cam.forward(), Vec3::NEG_Y));
        assert!(cam.view_projection_matrix().is_finite());
    }

    #[test]
    fn set_aspect_guards_zero_height() {
        let mut cam = Camera::default();
        cam.set_aspect(800, 0);
        assert_eq!(cam.aspect, 800.0);
    }
}
