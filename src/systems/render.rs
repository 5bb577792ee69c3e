//! GPU rendering system
//!
//! Manages GPU rendering including:
//! - Render context and surface
//! - Mesh and particle pipelines
//! - The flattened scene and its buffers
//! - Frame rendering

use std::sync::Arc;
use winit::window::Window;
use hearth_render::{
    context::{ContextError, RenderContext},
    pipeline::{MeshPipeline, ParticlePipeline},
    renderable::{frame_uniforms, Atmosphere},
    RenderableScene,
};
use crate::config::RenderingConfig;
use crate::scene::BuiltScene;
use super::viewport::{FrameView, RenderTarget};

/// Render error types
#[derive(Debug)]
pub enum RenderError {
    /// Surface was lost (window resized, minimized, etc.)
    SurfaceLost,
    /// GPU out of memory
    OutOfMemory,
    /// Other surface error
    Other(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::SurfaceLost => write!(f, "Surface lost"),
            RenderError::OutOfMemory => write!(f, "Out of memory"),
            RenderError::Other(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

impl RenderError {
    /// True if rendering cannot continue on this surface
    pub fn is_fatal(&self) -> bool {
        matches!(self, RenderError::SurfaceLost | RenderError::OutOfMemory)
    }
}

impl From<ContextError> for RenderError {
    fn from(e: ContextError) -> Self {
        RenderError::Other(e.to_string())
    }
}

/// Manages GPU rendering
pub struct RenderSystem {
    context: RenderContext,
    mesh_pipeline: MeshPipeline,
    particle_pipeline: ParticlePipeline,
    scene: Option<RenderableScene>,
    atmosphere: Atmosphere,
    clear_color: wgpu::Color,
}

impl RenderSystem {
    /// Create render system from window and config
    pub fn new(
        window: Arc<Window>,
        render_config: &RenderingConfig,
        vsync: bool,
    ) -> Result<Self, ContextError> {
        let context = pollster::block_on(RenderContext::with_vsync(window, vsync))?;

        let mut mesh_pipeline = MeshPipeline::new(&context.device, context.config.format);
        let particle_pipeline = ParticlePipeline::new(&context.device, context.config.format);

        // Ensure depth texture exists
        mesh_pipeline.ensure_depth_texture(
            &context.device,
            context.size.width,
            context.size.height,
        );

        Ok(Self {
            context,
            mesh_pipeline,
            particle_pipeline,
            scene: None,
            atmosphere: render_config.atmosphere(),
            clear_color: render_config.clear_color(),
        })
    }

    /// Get current surface size
    pub fn size(&self) -> (u32, u32) {
        (self.context.size.width, self.context.size.height)
    }

    /// Aspect ratio of the surface
    pub fn aspect_ratio(&self) -> f32 {
        self.context.aspect_ratio()
    }
}

impl RenderTarget for RenderSystem {
    fn prepare(&mut self, scene: &BuiltScene) -> Result<(), RenderError> {
        let mut renderable = RenderableScene::new(&scene.graph, &scene.handles.dynamic_roots());
        renderable.refresh(&scene.graph, &scene.particles);

        self.context.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        renderable.upload(&self.context.device);
        if let Some(error) = pollster::block_on(self.context.device.pop_error_scope()) {
            log::error!("Failed to allocate scene buffers: {}", error);
            renderable.release();
            return Err(RenderError::OutOfMemory);
        }

        self.scene = Some(renderable);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.context
            .resize(winit::dpi::PhysicalSize::new(width, height));
        self.mesh_pipeline.ensure_depth_texture(&self.context.device, width, height);
    }

    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        let Some(scene) = &mut self.scene else {
            return Err(RenderError::Other("scene not prepared".to_string()));
        };

        let dynamic_changed = scene.refresh(frame.graph, frame.particles);
        scene.write_buffers(&self.context.device, &self.context.queue, dynamic_changed);

        let uniforms = frame_uniforms(frame.camera, frame.rig, &self.atmosphere);
        self.mesh_pipeline.update_uniforms(&self.context.queue, &uniforms);
        self.particle_pipeline.update_uniforms(&self.context.queue, &uniforms);

        // Get surface texture
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) => return Err(RenderError::SurfaceLost),
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(wgpu::SurfaceError::Outdated) => {
                self.context.resize(self.context.size);
                return Err(RenderError::Other("surface outdated".to_string()));
            }
            Err(e) => return Err(RenderError::Other(format!("{:?}", e))),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Create command encoder
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        if let Some(mut pass) = self.mesh_pipeline.begin_pass(&mut encoder, &view, self.clear_color) {
            scene.draw(&mut pass, &self.mesh_pipeline, &self.particle_pipeline);
        }

        // Submit
        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn release(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_display() {
        assert_eq!(format!("{}", RenderError::SurfaceLost), "Surface lost");
        assert_eq!(format!("{}", RenderError::OutOfMemory), "Out of memory");
        assert_eq!(
            format!("{}", RenderError::Other("test".to_string())),
            "Render error: test"
        );
    }

    #[test]
    fn test_fatal_errors() {
        assert!(RenderError::SurfaceLost.is_fatal());
        assert!(RenderError::OutOfMemory.is_fatal());
        assert!(!RenderError::Other("timeout".to_string()).is_fatal());
    }

    #[test]
    fn test_context_error_converts() {
        let err: RenderError = ContextError::NoAdapter.into();
        assert!(matches!(err, RenderError::Other(_)));
    }
}
