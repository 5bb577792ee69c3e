//! Core types for the Hearth diorama
//!
//! This crate provides the CPU-side scene model. It knows nothing about the
//! GPU or windowing:
//!
//! - [`Transform`] - Position, Euler rotation, and scale relative to a parent
//! - [`Material`] / [`Color`] - Surface appearance
//! - [`SceneGraph`] - Arena of [`SceneNode`]s addressed by [`NodeKey`]
//! - [`ParticleSystem`] / [`ParticleSet`] - Recyclable rising particles
//! - [`LightSource`] / [`LightingRig`] - Flickering point lights and static lights

mod transform;
mod material;
mod graph;
pub mod particles;
pub mod lighting;

pub use transform::Transform;
pub use material::{srgb_to_linear, Color, DirtyFlags, Material};
pub use graph::{Drawable, NodeContent, NodeKey, SceneError, SceneGraph, SceneNode};
pub use particles::{
    BlendMode, ParticleConfigError, ParticleKey, ParticleSet, ParticleSystem, ParticleSystemConfig, Volume,
};
pub use lighting::{DirectionalLight, Flicker, HemisphereLight, HueSwap, LightKey, LightSource, LightingRig};

// Re-export commonly used types from hearth_math for convenience
pub use hearth_math::{Mat4, MeshData, Vec3};
