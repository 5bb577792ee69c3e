//! Local transform (position, rotation, scale)
//!
//! A Transform places a scene node relative to its parent.

use hearth_math::{mat4, Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// A 3D transform with position, XYZ Euler rotation, and per-axis scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position relative to the parent node
    pub position: Vec3,
    /// XYZ Euler angles in radians
    pub rotation: Vec3,
    /// Per-axis scale
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Create an identity transform (no translation, rotation, or scale change)
    pub const fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    /// Create a transform with just a position
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    /// Create a transform from position coordinates
    pub const fn at(x: f32, y: f32, z: f32) -> Self {
        Self::from_position(Vec3::new(x, y, z))
    }

    /// Set the Euler rotation
    pub const fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vec3::new(x, y, z);
        self
    }

    /// Set a per-axis scale
    pub const fn with_scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = Vec3::new(x, y, z);
        self
    }

    /// Set a uniform scale
    pub const fn with_uniform_scale(self, s: f32) -> Self {
        self.with_scale(s, s, s)
    }

    /// Local-to-parent matrix: translation * rotation * scale
    pub fn to_matrix(&self) -> Mat4 {
        mat4::from_trs(self.position, self.rotation, self.scale)
    }

    /// Transform a point from local space to parent space
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        mat4::transform_point(self.to_matrix(), p)
    }
}
