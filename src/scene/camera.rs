//! Free-fly camera
//!
//! Movement is a fixed step per frame in which the key is held, applied
//! along the camera's forward axis or its horizontal strafe axis. The view
//! direction itself is fixed; there is no mouse look.

use glam::{Mat4, Vec3};

/// Default distance moved per frame per held movement key.
const DEFAULT_SPEED: f32 = 0.05;

/// Movement keys held this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl CameraInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Camera for viewing the scene
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Distance moved per frame per held movement key.
    pub speed: f32,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            forward: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::Y,
            speed: DEFAULT_SPEED,
            fov_y: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect: 16.0 / 9.0,
            near: 0.01,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            aspect,
            ..Self::default()
        }
    }

    /// Horizontal strafe axis, recomputed from the current orientation.
    pub fn strafe_axis(&self) -> Vec3 {
        self.up.cross(self.forward).normalize()
    }

    /// Apply one frame of movement. Each held key contributes an
    /// independent step, so opposite keys cancel and diagonals sum.
    pub fn update(&mut self, input: &CameraInput) {
        if input.forward {
            self.position += self.forward * self.speed;
        }
        if input.backward {
            self.position -= self.forward * self.speed;
        }
        if input.left {
            self.position += self.strafe_axis() * self.speed;
        }
        if input.right {
            self.position -= self.strafe_axis() * self.speed;
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Update aspect ratio after a resize
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect = width / height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_step_moves_along_view_axis() {
        let mut camera = Camera::default();
        let start = camera.position;

        camera.update(&CameraInput {
            forward: true,
            ..Default::default()
        });

        let expected = start + Vec3::new(0.0, 0.0, -DEFAULT_SPEED);
        assert!(camera.position.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_speed_scales_the_step() {
        let mut camera = Camera {
            speed: 0.2,
            ..Camera::default()
        };
        let start = camera.position;

        camera.update(&CameraInput {
            forward: true,
            ..Default::default()
        });

        let expected = start + Vec3::new(0.0, 0.0, -0.2);
        assert!(camera.position.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_strafe_axis_is_left() {
        // up x forward with the default orientation points along -X.
        let camera = Camera::default();
        assert!(camera
            .strafe_axis()
            .abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut camera = Camera::default();
        let start = camera.position;

        camera.update(&CameraInput {
            forward: true,
            backward: true,
            ..Default::default()
        });

        assert!(camera.position.abs_diff_eq(start, 1e-6));
    }

    #[test]
    fn test_diagonal_steps_are_additive() {
        let mut camera = Camera::default();
        let start = camera.position;

        camera.update(&CameraInput {
            forward: true,
            left: true,
            ..Default::default()
        });

        let expected =
            start + Vec3::new(0.0, 0.0, -DEFAULT_SPEED) + Vec3::new(-DEFAULT_SPEED, 0.0, 0.0);
        assert!(camera.position.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_view_matrix_looks_down_negative_z() {
        let camera = Camera::default();
        let view = camera.view_matrix();

        // A point straight ahead of the camera lands on the view-space -Z axis.
        let ahead = camera.position + camera.forward * 2.0;
        let in_view = view.transform_point3(ahead);
        assert!(in_view.abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-5));
    }

    #[test]
    fn test_projection_preserves_optical_axis() {
        let camera = Camera::new(1.0);
        let clip = camera.projection_matrix() * glam::Vec4::new(0.0, 0.0, -1.0, 1.0);

        // Points on the optical axis stay centered after projection.
        assert!((clip.x / clip.w).abs() < 1e-6);
        assert!((clip.y / clip.w).abs() < 1e-6);
    }

    #[test]
    fn test_set_aspect_ignores_zero_height() {
        let mut camera = Camera::new(2.0);
        camera.set_aspect(800.0, 0.0);
        assert_eq!(camera.aspect, 2.0);
        camera.set_aspect(800.0, 400.0);
        assert_eq!(camera.aspect, 2.0);
        camera.set_aspect(800.0, 800.0);
        assert_eq!(camera.aspect, 1.0);
    }
}
