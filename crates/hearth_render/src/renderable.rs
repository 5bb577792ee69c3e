//! Renderable scene - bridges the scene graph to GPU buffers
//!
//! Mesh nodes are flattened into world-space vertex batches, one per
//! [`MeshPass`]. Nodes under a registered dynamic root (the animated
//! character parts) go into separate batches that are re-flattened only when
//! their subtree is dirty; everything else is flattened and uploaded once.
//! Particle emitters are rebuilt into billboard vertices every frame.

use hearth_core::{
    BlendMode, Color, Drawable, LightingRig, NodeContent, NodeKey, ParticleKey, ParticleSet,
    ParticleSystem, SceneGraph,
};
use hearth_math::{mat4, Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::camera::PerspectiveCamera;
use crate::pipeline::{
    FrameUniforms, MeshPass, MeshPipeline, MeshVertex, ParticlePipeline, ParticleVertex,
    PointLightUniform, MAX_POINT_LIGHTS, PARTICLE_CORNERS,
};

/// World-space triangles for one mesh pass
#[derive(Clone, Debug, Default)]
pub struct MeshBatch {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a drawable transformed by `world`
    pub fn add_drawable(&mut self, drawable: &Drawable, world: Mat4) {
        let base = self.vertices.len() as u32;
        let material = &drawable.material;
        let color = material.color.with_alpha(material.opacity);
        let emissive = material.emissive_radiance().with_alpha(1.0);

        let mesh = &drawable.mesh;
        for (position, normal) in mesh.positions.iter().zip(&mesh.normals) {
            self.vertices.push(MeshVertex {
                position: mat4::transform_point(world, *position).to_array(),
                normal: mat4::transform_normal(world, *normal).to_array(),
                color,
                emissive,
            });
        }
        self.indices.extend(mesh.indices.iter().map(|i| i + base));
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Pass a drawable belongs to, decided by its material
pub fn mesh_pass_for(drawable: &Drawable) -> MeshPass {
    if drawable.material.is_translucent() {
        MeshPass::Blended
    } else if drawable.material.double_sided {
        MeshPass::DoubleSided
    } else {
        MeshPass::Opaque
    }
}

/// Billboard vertices for every emitter sharing one blend mode
#[derive(Clone, Debug, Default)]
pub struct ParticleBatch {
    pub vertices: Vec<ParticleVertex>,
}

impl ParticleBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one quad per particle; positions are local to `world`
    pub fn add_system(&mut self, system: &ParticleSystem, world: Mat4) {
        let config = system.config();
        let color = config.color.with_alpha(config.opacity);
        for position in system.positions() {
            let center = mat4::transform_point(world, *position).to_array();
            for corner in PARTICLE_CORNERS {
                self.vertices.push(ParticleVertex {
                    center,
                    size: config.size,
                    color,
                    corner,
                });
            }
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Fog and exposure settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Atmosphere {
    pub fog_color: Color,
    pub fog_near: f32,
    pub fog_far: f32,
    pub exposure: f32,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            fog_color: Color::from_hex(0xffa987),
            fog_near: 20.0,
            fog_far: 50.0,
            exposure: 1.2,
        }
    }
}

/// Pack camera, lights and atmosphere into the shared frame uniforms.
///
/// Only the first [`MAX_POINT_LIGHTS`] point lights are used.
pub fn frame_uniforms(camera: &PerspectiveCamera, rig: &LightingRig, atmosphere: &Atmosphere) -> FrameUniforms {
    let mut point_lights = [PointLightUniform::default(); MAX_POINT_LIGHTS];
    let mut count = 0;
    for (slot, (_key, light)) in point_lights.iter_mut().zip(rig.lights()) {
        let p = light.position;
        let c = light.current_color();
        *slot = PointLightUniform {
            position_range: [p.x, p.y, p.z, light.range],
            color_intensity: [c.r, c.g, c.b, light.intensity().max(0.0)],
        };
        count += 1;
    }

    FrameUniforms {
        view_proj: camera.view_projection(),
        camera_position: extend(camera.eye, 1.0),
        camera_right: extend(camera.right(), 0.0),
        camera_up: extend(camera.up(), 0.0),
        ambient: rig.ambient_color.scaled(rig.ambient_intensity).with_alpha(0.0),
        hemisphere_sky: rig.hemisphere.sky.with_alpha(rig.hemisphere.intensity),
        hemisphere_ground: rig.hemisphere.ground.with_alpha(0.0),
        light_direction: extend(rig.directional.direction(), 0.0),
        light_color: rig.directional.color.scaled(rig.directional.intensity).with_alpha(0.0),
        fog_color: atmosphere.fog_color.with_alpha(1.0),
        fog_params: [atmosphere.fog_near, atmosphere.fog_far, atmosphere.exposure, count as f32],
        point_lights,
    }
}

fn extend(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

/// A GPU buffer that is rewritten in place and grows when needed
struct GpuBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    label: &'static str,
    usage: wgpu::BufferUsages,
}

/// Smallest buffer we allocate; zero-sized buffers cannot be bound
const MIN_BUFFER_SIZE: u64 = 64;

impl GpuBuffer {
    fn new(device: &wgpu::Device, label: &'static str, usage: wgpu::BufferUsages, data: &[u8]) -> Self {
        let usage = usage | wgpu::BufferUsages::COPY_DST;
        let buffer = if data.is_empty() {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: MIN_BUFFER_SIZE,
                usage,
                mapped_at_creation: false,
            })
        } else {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: data,
                usage,
            })
        };
        let capacity = buffer.size();
        Self { buffer, capacity, label, usage }
    }

    /// Overwrite the contents, reallocating if `data` no longer fits
    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        if data.len() as u64 > self.capacity {
            log::debug!("Growing {} to {} bytes", self.label, data.len());
            self.buffer.destroy();
            *self = Self::new(device, self.label, self.usage, data);
        } else {
            queue.write_buffer(&self.buffer, 0, data);
        }
    }

    fn destroy(&self) {
        self.buffer.destroy();
    }
}

struct MeshBuffers {
    vertex: GpuBuffer,
    index: GpuBuffer,
    index_count: u32,
}

impl MeshBuffers {
    fn new(device: &wgpu::Device, batch: &MeshBatch) -> Self {
        Self {
            vertex: GpuBuffer::new(
                device,
                "Mesh Vertex Buffer",
                wgpu::BufferUsages::VERTEX,
                bytemuck::cast_slice(&batch.vertices),
            ),
            index: GpuBuffer::new(
                device,
                "Mesh Index Buffer",
                wgpu::BufferUsages::INDEX,
                bytemuck::cast_slice(&batch.indices),
            ),
            index_count: batch.index_count() as u32,
        }
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, batch: &MeshBatch) {
        self.vertex.write(device, queue, bytemuck::cast_slice(&batch.vertices));
        self.index.write(device, queue, bytemuck::cast_slice(&batch.indices));
        self.index_count = batch.index_count() as u32;
    }

    fn destroy(&self) {
        self.vertex.destroy();
        self.index.destroy();
    }
}

struct ParticleBuffers {
    vertex: GpuBuffer,
    vertex_count: u32,
}

impl ParticleBuffers {
    fn new(device: &wgpu::Device, batch: &ParticleBatch) -> Self {
        Self {
            vertex: GpuBuffer::new(
                device,
                "Particle Vertex Buffer",
                wgpu::BufferUsages::VERTEX,
                bytemuck::cast_slice(&batch.vertices),
            ),
            vertex_count: batch.vertex_count() as u32,
        }
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, batch: &ParticleBatch) {
        self.vertex.write(device, queue, bytemuck::cast_slice(&batch.vertices));
        self.vertex_count = batch.vertex_count() as u32;
    }
}

/// All GPU-resident buffers owned by the scene
struct SceneBuffers {
    static_meshes: Vec<MeshBuffers>,
    dynamic_meshes: Vec<MeshBuffers>,
    /// Indexed by blend mode: additive, normal
    particles: [ParticleBuffers; 2],
}

/// The scene graph flattened into GPU batches
pub struct RenderableScene {
    dynamic_roots: Vec<NodeKey>,
    particle_anchors: Vec<(NodeKey, ParticleKey)>,
    static_batches: [MeshBatch; 3],
    dynamic_batches: [MeshBatch; 3],
    /// Indexed by blend mode: additive, normal
    particle_batches: [ParticleBatch; 2],
    buffers: Option<SceneBuffers>,
}

fn blend_index(mode: BlendMode) -> usize {
    match mode {
        BlendMode::Additive => 0,
        BlendMode::Normal => 1,
    }
}

impl RenderableScene {
    /// Flatten `graph`. Subtrees rooted at `dynamic_roots` are kept apart so
    /// they can be refreshed cheaply while animating.
    pub fn new(graph: &SceneGraph, dynamic_roots: &[NodeKey]) -> Self {
        // Nested roots are covered by their ancestor
        let roots: Vec<NodeKey> = dynamic_roots
            .iter()
            .copied()
            .filter(|r| graph.contains(*r))
            .filter(|r| !dynamic_roots.iter().any(|other| other != r && graph.is_descendant_of(*r, *other)))
            .collect();

        let particle_anchors = graph
            .iter()
            .filter_map(|(key, node)| match node.content {
                NodeContent::Particles(particles) => Some((key, particles)),
                _ => None,
            })
            .collect();

        let mut static_batches: [MeshBatch; 3] = Default::default();
        graph.visit(graph.root(), |key, node, world| {
            if let NodeContent::Mesh(drawable) = &node.content {
                let dynamic = roots.iter().any(|r| graph.is_descendant_of(key, *r));
                if !dynamic {
                    static_batches[mesh_pass_for(drawable).index()].add_drawable(drawable, world);
                }
            }
        });

        let mut scene = Self {
            dynamic_roots: roots,
            particle_anchors,
            static_batches,
            dynamic_batches: Default::default(),
            particle_batches: Default::default(),
            buffers: None,
        };
        scene.flatten_dynamic(graph);

        log::info!(
            "Flattened scene: {} static vertices, {} dynamic vertices, {} particle emitters",
            scene.static_batches.iter().map(MeshBatch::vertex_count).sum::<usize>(),
            scene.dynamic_batches.iter().map(MeshBatch::vertex_count).sum::<usize>(),
            scene.particle_anchors.len(),
        );
        scene
    }

    fn flatten_dynamic(&mut self, graph: &SceneGraph) {
        for batch in &mut self.dynamic_batches {
            batch.clear();
        }
        let batches = &mut self.dynamic_batches;
        for root in &self.dynamic_roots {
            graph.visit(*root, |_key, node, world| {
                if let NodeContent::Mesh(drawable) = &node.content {
                    batches[mesh_pass_for(drawable).index()].add_drawable(drawable, world);
                }
            });
        }
    }

    fn flatten_particles(&mut self, graph: &SceneGraph, particles: &ParticleSet) {
        for batch in &mut self.particle_batches {
            batch.clear();
        }
        for (anchor, key) in &self.particle_anchors {
            let Some(system) = particles.get(*key) else {
                continue;
            };
            let world = graph.world_matrix(*anchor).unwrap_or(mat4::IDENTITY);
            self.particle_batches[blend_index(system.config().blend_mode)].add_system(system, world);
        }
    }

    /// Static batch for a pass
    pub fn static_batch(&self, pass: MeshPass) -> &MeshBatch {
        &self.static_batches[pass.index()]
    }

    /// Dynamic batch for a pass
    pub fn dynamic_batch(&self, pass: MeshPass) -> &MeshBatch {
        &self.dynamic_batches[pass.index()]
    }

    /// Particle billboards for a blend mode, as of the last refresh
    pub fn particle_batch(&self, mode: BlendMode) -> &ParticleBatch {
        &self.particle_batches[blend_index(mode)]
    }

    /// Roots whose subtrees are re-flattened when dirty
    pub fn dynamic_roots(&self) -> &[NodeKey] {
        &self.dynamic_roots
    }

    /// Rebuild CPU-side dynamic and particle batches.
    ///
    /// Returns true if any dynamic subtree was dirty and re-flattened. The
    /// caller clears the graph's dirty flags afterwards.
    pub fn refresh(&mut self, graph: &SceneGraph, particles: &ParticleSet) -> bool {
        let dirty = self.dynamic_roots.iter().any(|r| graph.is_subtree_dirty(*r));
        if dirty {
            self.flatten_dynamic(graph);
        }
        self.flatten_particles(graph, particles);
        dirty
    }

    /// Allocate GPU buffers for every batch
    pub fn upload(&mut self, device: &wgpu::Device) {
        if self.buffers.is_some() {
            return;
        }
        let static_meshes = self.static_batches.iter().map(|b| MeshBuffers::new(device, b)).collect();
        let dynamic_meshes = self.dynamic_batches.iter().map(|b| MeshBuffers::new(device, b)).collect();
        let particles = [
            ParticleBuffers::new(device, &self.particle_batches[0]),
            ParticleBuffers::new(device, &self.particle_batches[1]),
        ];
        self.buffers = Some(SceneBuffers {
            static_meshes,
            dynamic_meshes,
            particles,
        });
        log::info!("Uploaded scene buffers");
    }

    /// Copy the latest dynamic and particle batches to the GPU
    pub fn write_buffers(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, dynamic_changed: bool) {
        let Some(buffers) = &mut self.buffers else {
            return;
        };
        if dynamic_changed {
            for (gpu, batch) in buffers.dynamic_meshes.iter_mut().zip(&self.dynamic_batches) {
                gpu.write(device, queue, batch);
            }
        }
        for (gpu, batch) in buffers.particles.iter_mut().zip(&self.particle_batches) {
            gpu.write(device, queue, batch);
        }
    }

    /// True while GPU buffers are allocated
    pub fn is_uploaded(&self) -> bool {
        self.buffers.is_some()
    }

    /// Destroy all GPU buffers. Returns false if nothing was allocated.
    pub fn release(&mut self) -> bool {
        let Some(buffers) = self.buffers.take() else {
            return false;
        };
        for mesh in buffers.static_meshes.iter().chain(&buffers.dynamic_meshes) {
            mesh.destroy();
        }
        for particles in &buffers.particles {
            particles.vertex.destroy();
        }
        log::info!("Released scene buffers");
        true
    }

    /// Record draw calls: meshes by pass, then smoke, then fire
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, meshes: &MeshPipeline, particles: &ParticlePipeline) {
        let Some(buffers) = &self.buffers else {
            return;
        };
        for pass in MeshPass::ALL {
            for gpu in [&buffers.static_meshes[pass.index()], &buffers.dynamic_meshes[pass.index()]] {
                meshes.draw(render_pass, pass, &gpu.vertex.buffer, &gpu.index.buffer, gpu.index_count);
            }
        }
        for mode in [BlendMode::Normal, BlendMode::Additive] {
            let gpu = &buffers.particles[blend_index(mode)];
            particles.draw(render_pass, mode, &gpu.vertex.buffer, gpu.vertex_count);
        }
    }
}
