//! Transform component and utilities for spatial positioning.

use glam::{Mat4, Quat, Vec3};

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Builder-style uniform scale.
    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Create the model matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the up direction (positive Y).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Rotate a local-space offset into world orientation (no translation).
    pub fn rotate_vector(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    /// Set orientation from heading and bank, Y first then local Z.
    /// Matches an XYZ Euler rotation with zero pitch, so the forward vector
    /// stays in the horizontal plane whatever the roll.
    pub fn set_yaw_roll(&mut self, yaw: f32, roll: f32) {
        self.rotation = Quat::from_rotation_y(yaw) * Quat::from_rotation_z(roll);
    }

    /// Look at a target position. When the view direction is parallel to
    /// `up`, a perpendicular axis stands in for it.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let Some(forward) = (target - self.position).try_normalize() else {
            return;
        };
        let up = if forward.cross(up).length_squared() > 1e-6 {
            up
        } else {
            up.any_orthonormal_vector()
        };
        self.rotation = Quat::from_mat4(&Mat4::look_at_rh(self.position, target, up)).inverse();
    }
}

/// Linear interpolation `a + (b - a) * t`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn yaw_pi_faces_positive_z() {
        let mut t = Transform::default();
        t.set_yaw_roll(PI, 0.0);
        assert!(approx(t.forward(), Vec3::Z));
    }

    #[test]
    fn rotate_vector_ignores_position() {
        let mut t = Transform::from_position(Vec3::new(4.0, 0.0, 0.0));
        t.set_yaw_roll(PI, 0.0);
        assert!(approx(t.rotate_vector(Vec3::new(0.0, 5.0, 10.0)), Vec3::new(0.0, 5.0, -10.0)));
    }

    #[test]
    fn roll_does_not_tilt_forward() {
        let mut t = Transform::default();
        t.set_yaw_roll(0.7, 0.2);
        let f = t.forward();
        assert!(f.y.abs() < 1e-6);
        assert!((f.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut t = Transform::from_position(Vec3::new(10.0, 100.0, 10.0));
        t.look_at(Vec3::ZERO, Vec3::Y);
        let expected = (Vec3::ZERO - t.position).normalize();
        assert!(approx(t.forward(), expected));
    }

    #[test]
    fn look_at_straight_down_stays_finite() {
        let mut t = Transform::from_position(Vec3::new(0.0, 15.0, 0.0));
        t.look_at(Vec3::ZERO, Vec3::Y);
        assert!(t.rotation.is_finite());
        assert!(approx(t.forward(), Vec3::NEG_Y));

        t.look_at(Vec3::new(0.0, 30.0, 0.0), Vec3::Y);
        assert!(t.rotation.is_finite());
        assert!(approx(t.forward(), Vec3::Y));
    }

    #[test]
    fn look_at_own_position_keeps_rotation() {
        let mut t = Transform::from_position(Vec3::ONE);
        t.set_yaw_roll(0.5, 0.0);
        let before = t.rotation;
        t.look_at(Vec3::ONE, Vec3::Y);
        assert_eq!(t.rotation, before);
    }

    #[test]
    fn lerp_moves_fraction_of_distance() {
        assert!((lerp(0.0, 0.2, 0.1) - 0.02).abs() < 1e-7);
        assert_eq!(lerp(3.0, 3.0, 0.1), 3.0);
    }

    #[test]
    fn matrix_applies_scale_rotation_translation() {
        let mut t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0)).with_uniform_scale(0.5);
        t.set_yaw_roll(PI, 0.0);
        let p = t.to_matrix().transform_point3(Vec3::new(0.0, 0.0, -2.0));
        assert!(approx(p, Vec3::new(1.0, 2.0, 4.0)));
    }
}
