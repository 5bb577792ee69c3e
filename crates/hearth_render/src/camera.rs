//! Perspective camera
//!
//! Placed every frame by the orbit controller through [`CameraControl`].
//! Produces the view-projection matrix plus the right/up basis the particle
//! shader uses to build camera-facing quads.

use hearth_input::CameraControl;
use hearth_math::{mat4, Mat4, Vec3};

/// Perspective camera looking from `eye` at `target` with +Y up
#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl PerspectiveCamera {
    /// Camera at the diorama's default viewpoint
    pub fn new() -> Self {
        Self {
            eye: Vec3::new(14.0, 11.0, 14.0),
            target: Vec3::new(0.0, 2.0, 0.0),
            fov: 42.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
        }
    }

    /// Set the projection parameters
    pub fn with_projection(mut self, fov: f32, near: f32, far: f32) -> Self {
        self.fov = fov;
        self.near = near;
        self.far = far;
        self
    }

    /// Update the aspect ratio. Non-finite or non-positive values are ignored.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Unit vector from the eye toward the target
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalized()
    }

    /// Camera-space +X in world space
    pub fn right(&self) -> Vec3 {
        let right = self.forward().cross(Vec3::Y);
        if right.length_squared() < 1e-12 {
            self.forward().cross(Vec3::Z).normalized()
        } else {
            right.normalized()
        }
    }

    /// Camera-space +Y in world space
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    pub fn view_matrix(&self) -> Mat4 {
        mat4::look_at(self.eye, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        mat4::perspective(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    /// Projection times view
    pub fn view_projection(&self) -> Mat4 {
        mat4::mul(self.projection_matrix(), self.view_matrix())
    }
}

impl CameraControl for PerspectiveCamera {
    fn look_from(&mut self, eye: Vec3, target: Vec3) {
        self.eye = eye;
        self.target = target;
    }
}
