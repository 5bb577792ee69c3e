//! Diorama Rendering Library
//!
//! This crate provides the wgpu-based pipelines that draw the scene graph,
//! its particle emitters and its lights.
//!
//! ## Key Components
//!
//! - [`context::RenderContext`] - WGPU device, queue, and surface management
//! - [`camera::PerspectiveCamera`] - Perspective camera driven by the orbit controller
//! - [`pipeline::MeshPipeline`] - Lit, fogged, tone-mapped triangle meshes
//! - [`pipeline::ParticlePipeline`] - Camera-facing particle billboards
//! - [`renderable::RenderableScene`] - Flattens the scene graph into GPU batches

pub mod context;
pub mod camera;
pub mod pipeline;
pub mod renderable;

// Re-export core types for convenience
pub use hearth_core::{Color, LightingRig, Material, NodeKey, ParticleSet, SceneGraph};

pub use camera::PerspectiveCamera;
pub use context::{ContextError, RenderContext};
pub use renderable::{MeshBatch, ParticleBatch, RenderableScene};
