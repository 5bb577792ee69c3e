//! GPU-compatible data types for the mesh and particle pipelines
//!
//! These types are designed to match the shader layouts exactly.
//! All types derive Pod and Zeroable for safe GPU buffer operations.

use bytemuck::{Pod, Zeroable};

/// Number of point lights the shaders evaluate
pub const MAX_POINT_LIGHTS: usize = 4;

/// Vertices emitted per particle (two triangles)
pub const PARTICLE_VERTEX_COUNT: usize = 6;

/// Quad corners in emission order, matching [`PARTICLE_VERTEX_COUNT`]
pub const PARTICLE_CORNERS: [[f32; 2]; PARTICLE_VERTEX_COUNT] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

/// A world-space mesh vertex with its material baked in
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    /// World-space position
    pub position: [f32; 3],
    /// World-space unit normal
    pub normal: [f32; 3],
    /// Linear RGB diffuse color and opacity
    pub color: [f32; 4],
    /// Emissive radiance (rgb); w unused
    pub emissive: [f32; 4],
}

impl Default for MeshVertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            normal: [0.0, 1.0, 0.0],
            color: [1.0; 4],
            emissive: [0.0; 4],
        }
    }
}

/// One corner of a particle billboard
///
/// Every particle expands to six of these; the vertex shader offsets
/// `center` along the camera's right/up axes by `corner * size / 2`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct ParticleVertex {
    /// World-space particle position
    pub center: [f32; 3],
    /// Edge length of the billboard in world units
    pub size: f32,
    /// Linear RGB color and opacity
    pub color: [f32; 4],
    /// Quad corner in [-1, 1]^2
    pub corner: [f32; 2],
}

/// One point light as seen by the shaders (32 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct PointLightUniform {
    /// xyz = world position, w = range
    pub position_range: [f32; 4],
    /// rgb = linear color, w = intensity
    pub color_intensity: [f32; 4],
}

/// Per-frame uniforms shared by both pipelines
/// Layout: 352 bytes total (must match FrameUniforms in mesh.wgsl and particles.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    /// Projection times view (64 bytes)
    pub view_proj: [[f32; 4]; 4],
    /// Eye position; w unused
    pub camera_position: [f32; 4],
    /// Camera right axis in world space; w unused
    pub camera_right: [f32; 4],
    /// Camera up axis in world space; w unused
    pub camera_up: [f32; 4],
    /// Ambient color premultiplied by intensity; w unused
    pub ambient: [f32; 4],
    /// Hemisphere sky color; w = intensity
    pub hemisphere_sky: [f32; 4],
    /// Hemisphere ground color; w unused
    pub hemisphere_ground: [f32; 4],
    /// Unit vector toward the directional light; w unused
    pub light_direction: [f32; 4],
    /// Directional light color premultiplied by intensity; w unused
    pub light_color: [f32; 4],
    /// Fog color; w unused
    pub fog_color: [f32; 4],
    /// x = fog near, y = fog far, z = exposure, w = active point light count
    pub fog_params: [f32; 4],
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view_proj: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            camera_position: [0.0, 0.0, 0.0, 1.0],
            camera_right: [1.0, 0.0, 0.0, 0.0],
            camera_up: [0.0, 1.0, 0.0, 0.0],
            ambient: [0.0; 4],
            hemisphere_sky: [0.0; 4],
            hemisphere_ground: [0.0; 4],
            light_direction: [0.0, 1.0, 0.0, 0.0],
            light_color: [0.0; 4],
            fog_color: [0.0; 4],
            fog_params: [1.0e4, 1.0e5, 1.0, 0.0],
            point_lights: [PointLightUniform::default(); MAX_POINT_LIGHTS],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn test_mesh_vertex_size() {
        // 3 floats position + 3 floats normal + 4 floats color + 4 floats emissive
        // = 14 floats = 56 bytes
        assert_eq!(size_of::<MeshVertex>(), 56);
    }

    #[test]
    fn test_particle_vertex_size() {
        // 3 floats center + 1 float size + 4 floats color + 2 floats corner = 40 bytes
        assert_eq!(size_of::<ParticleVertex>(), 40);
    }

    #[test]
    fn test_point_light_uniform_size() {
        assert_eq!(size_of::<PointLightUniform>(), 32);
    }

    #[test]
    fn test_frame_uniforms_size() {
        // 16 floats view_proj + 10 vec4s + 4 point lights * 8 floats = 88 floats = 352 bytes
        assert_eq!(size_of::<FrameUniforms>(), 352);
        assert_eq!(size_of::<FrameUniforms>() % 16, 0);
    }

    #[test]
    fn test_alignment() {
        assert_eq!(std::mem::align_of::<MeshVertex>(), 4);
        assert_eq!(std::mem::align_of::<ParticleVertex>(), 4);
        assert_eq!(std::mem::align_of::<FrameUniforms>(), 4);
    }

    #[test]
    fn test_particle_corners_cover_quad() {
        let min = PARTICLE_CORNERS.iter().fold([0.0f32; 2], |m, c| [m[0].min(c[0]), m[1].min(c[1])]);
        let max = PARTICLE_CORNERS.iter().fold([0.0f32; 2], |m, c| [m[0].max(c[0]), m[1].max(c[1])]);
        assert_eq!(min, [-1.0, -1.0]);
        assert_eq!(max, [1.0, 1.0]);
    }
}
