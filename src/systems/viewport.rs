//! Viewport lifecycle
//!
//! Owns whatever the scene is presented to: attach once, resize any number of
//! times, detach exactly once.

use hearth_core::{LightingRig, ParticleSet, SceneGraph};
use hearth_render::PerspectiveCamera;

use crate::scene::BuiltScene;
use super::render::RenderError;

/// Everything needed to draw one frame
pub struct FrameView<'a> {
    pub graph: &'a SceneGraph,
    pub particles: &'a ParticleSet,
    pub rig: &'a LightingRig,
    pub camera: &'a PerspectiveCamera,
}

/// A surface the scene can be presented to
pub trait RenderTarget {
    /// Allocate GPU resources for a freshly built scene
    fn prepare(&mut self, scene: &BuiltScene) -> Result<(), RenderError>;

    /// Resize the presentation surface; both dimensions are non-zero
    fn resize(&mut self, width: u32, height: u32);

    /// Draw and present one frame
    fn render(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError>;

    /// Release GPU resources and the surface
    fn release(&mut self);
}

/// Owns the render target and tracks its size
pub struct ViewportManager<T> {
    target: Option<T>,
    size: Option<(u32, u32)>,
}

impl<T: RenderTarget> ViewportManager<T> {
    /// Attach to a target. Without one the manager is inert.
    pub fn attach(target: Option<T>) -> Self {
        if target.is_none() {
            log::info!("No render target; viewport is inert");
        }
        Self { target, size: None }
    }

    /// True while a target is attached
    pub fn is_attached(&self) -> bool {
        self.target.is_some()
    }

    /// Resize the target and return the new aspect ratio.
    ///
    /// Returns None (and changes nothing) if either dimension is zero or
    /// nothing is attached.
    pub fn resize(&mut self, width: u32, height: u32) -> Option<f32> {
        if width == 0 || height == 0 {
            log::debug!("Skipping resize to {}x{}", width, height);
            return None;
        }
        let target = self.target.as_mut()?;
        target.resize(width, height);
        self.size = Some((width, height));
        log::debug!("Viewport resized to {}x{}", width, height);
        Some(width as f32 / height as f32)
    }

    /// Last applied size
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// Aspect ratio of the last applied size
    pub fn aspect(&self) -> Option<f32> {
        self.size.map(|(w, h)| w as f32 / h as f32)
    }

    /// Attached target, if any
    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// Mutable access to the attached target
    pub fn target_mut(&mut self) -> Option<&mut T> {
        self.target.as_mut()
    }

    /// Release the target. Returns false if it was already released (or
    /// never attached).
    pub fn detach(&mut self) -> bool {
        match self.target.take() {
            Some(mut target) => {
                target.release();
                self.size = None;
                log::info!("Viewport detached");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingTarget {
        resizes: Vec<(u32, u32)>,
        releases: u32,
    }

    impl RenderTarget for CountingTarget {
        fn prepare(&mut self, _scene: &BuiltScene) -> Result<(), RenderError> {
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.resizes.push((width, height));
        }

        fn render(&mut self, _frame: &FrameView<'_>) -> Result<(), RenderError> {
            Ok(())
        }

        fn release(&mut self) {
            self.releases += 1;
        }
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut viewport = ViewportManager::attach(Some(CountingTarget::default()));
        assert_eq!(viewport.resize(1600, 800), Some(2.0));
        assert_eq!(viewport.aspect(), Some(2.0));
        assert_eq!(viewport.target().unwrap().resizes, vec![(1600, 800)]);
    }

    #[test]
    fn test_zero_resize_is_skipped() {
        let mut viewport = ViewportManager::attach(Some(CountingTarget::default()));
        viewport.resize(800, 600);
        assert_eq!(viewport.resize(0, 600), None);
        assert_eq!(viewport.resize(800, 0), None);
        assert_eq!(viewport.size(), Some((800, 600)));
        assert_eq!(viewport.target().unwrap().resizes.len(), 1);
    }

    #[test]
    fn test_detach_is_idempotent() {
        let mut viewport = ViewportManager::attach(Some(CountingTarget::default()));
        assert!(viewport.detach());
        assert!(!viewport.detach());
        assert!(!viewport.is_attached());
        assert_eq!(viewport.resize(800, 600), None);
    }

    #[test]
    fn test_inert_without_target() {
        let mut viewport: ViewportManager<CountingTarget> = ViewportManager::attach(None);
        assert!(!viewport.is_attached());
        assert_eq!(viewport.resize(800, 600), None);
        assert!(!viewport.detach());
    }
}
