//! Rendering pipeline components
//!
//! This module contains the mesh and particle render pipelines and the
//! GPU-side data layouts they share.

pub mod types;
pub mod mesh_pipeline;
pub mod particle_pipeline;

// Re-export types
pub use types::{
    FrameUniforms, MeshVertex, ParticleVertex, PointLightUniform,
    MAX_POINT_LIGHTS, PARTICLE_CORNERS, PARTICLE_VERTEX_COUNT,
};

// Re-export pipelines
pub use mesh_pipeline::{MeshPass, MeshPipeline};
pub use particle_pipeline::ParticlePipeline;
