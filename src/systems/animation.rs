//! Per-frame animation driver
//!
//! One tick runs the whole frame in a fixed order:
//! character pose, particles, lights, camera, then a single render.
//! The scheduler is an explicit state machine; once disposed it never runs
//! again.

use std::fmt;

use hearth_input::CameraController;
use hearth_render::PerspectiveCamera;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{AnimationConfig, AppConfig};
use crate::scene::{cozy_cabin, BuiltScene, CharacterPose, SceneBuildError};
use super::render::RenderError;
use super::viewport::{FrameView, RenderTarget, ViewportManager};

/// Lifecycle of the scheduler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// Mounted without a target; nothing runs
    Idle,
    /// Ticking every frame
    Running,
    /// Torn down for good
    Disposed,
}

/// What one call to [`AnimationScheduler::tick`] did
#[derive(Debug)]
pub enum TickOutcome {
    /// The frame was animated and presented
    Rendered,
    /// The frame was animated but presenting failed recoverably
    Dropped(RenderError),
    /// Presenting failed fatally; the scheduler has disposed itself
    Halted(RenderError),
    /// The scheduler is not running
    Inactive,
}

/// Error raised while mounting
#[derive(Debug)]
pub enum MountError {
    Scene(SceneBuildError),
    Render(RenderError),
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountError::Scene(e) => write!(f, "Failed to build scene: {}", e),
            MountError::Render(e) => write!(f, "Failed to prepare renderer: {}", e),
        }
    }
}

impl std::error::Error for MountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MountError::Scene(e) => Some(e),
            MountError::Render(e) => Some(e),
        }
    }
}

impl From<SceneBuildError> for MountError {
    fn from(e: SceneBuildError) -> Self {
        MountError::Scene(e)
    }
}

impl From<RenderError> for MountError {
    fn from(e: RenderError) -> Self {
        MountError::Render(e)
    }
}

/// Drives the diorama one frame at a time
pub struct AnimationScheduler<T> {
    state: SchedulerState,
    viewport: ViewportManager<T>,
    scene: Option<BuiltScene>,
    camera: PerspectiveCamera,
    controller: CameraController,
    rng: StdRng,
    settings: AnimationConfig,
    /// Scaled animation time in seconds, f64 so long sessions keep advancing
    time: f64,
    frame_requested: bool,
}

impl<T: RenderTarget> AnimationScheduler<T> {
    /// Build the scene, hand it to `target` and start running.
    ///
    /// Without a target the scheduler stays [`SchedulerState::Idle`] and
    /// nothing is built.
    pub fn mount(target: Option<T>, config: &AppConfig) -> Result<Self, MountError> {
        let mut scheduler = Self {
            state: SchedulerState::Idle,
            viewport: ViewportManager::attach(target),
            scene: None,
            camera: config.camera.to_camera(),
            controller: config.camera_controller(),
            rng: StdRng::seed_from_u64(config.animation.seed),
            settings: config.animation.clone(),
            time: 0.0,
            frame_requested: false,
        };

        let Some(target) = scheduler.viewport.target_mut() else {
            return Ok(scheduler);
        };

        let prepared = cozy_cabin(config.animation.seed)
            .map_err(MountError::from)
            .and_then(|scene| {
                target.prepare(&scene)?;
                Ok(scene)
            });
        let scene = match prepared {
            Ok(scene) => scene,
            Err(e) => {
                // Nothing stays attached after a failed mount
                scheduler.viewport.detach();
                return Err(e);
            }
        };

        // Place the camera before the first frame
        scheduler.controller.update(&mut scheduler.camera, 0.0);
        scheduler.scene = Some(scene);
        scheduler.state = SchedulerState::Running;
        scheduler.frame_requested = true;
        log::info!("Animation scheduler mounted");
        Ok(scheduler)
    }

    /// Advance everything by `dt` wall-clock seconds and render once
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        if self.state != SchedulerState::Running {
            return TickOutcome::Inactive;
        }
        let (Some(scene), Some(target)) = (self.scene.as_mut(), self.viewport.target_mut()) else {
            return TickOutcome::Inactive;
        };

        let dt = if dt.is_finite() && dt > 0.0 {
            dt.min(self.settings.max_frame_dt)
        } else {
            0.0
        };
        self.time += f64::from(dt) * f64::from(self.settings.time_scale);

        CharacterPose::at(self.time).apply(&mut scene.graph, &scene.handles);
        scene.particles.step(dt, &mut self.rng);
        scene.rig.update(self.time, &mut self.rng);
        self.controller.update(&mut self.camera, dt);

        let result = target.render(&FrameView {
            graph: &scene.graph,
            particles: &scene.particles,
            rig: &scene.rig,
            camera: &self.camera,
        });
        scene.graph.clear_dirty();

        match result {
            Ok(()) => {
                self.frame_requested = true;
                TickOutcome::Rendered
            }
            Err(e) if e.is_fatal() => {
                log::error!("{}; halting animation", e);
                self.dispose();
                TickOutcome::Halted(e)
            }
            Err(e) => {
                log::warn!("{}; dropping frame", e);
                self.frame_requested = true;
                TickOutcome::Dropped(e)
            }
        }
    }

    /// Resize the viewport and follow with the camera aspect
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.state != SchedulerState::Running {
            return;
        }
        if let Some(aspect) = self.viewport.resize(width, height) {
            self.camera.set_aspect(aspect);
            self.controller.set_viewport_height(height);
        }
    }

    /// Stop ticking and release everything. Returns false if already
    /// disposed.
    pub fn dispose(&mut self) -> bool {
        if self.state == SchedulerState::Disposed {
            return false;
        }
        self.frame_requested = false;
        self.viewport.detach();
        self.scene = None;
        self.state = SchedulerState::Disposed;
        log::info!("Animation scheduler disposed");
        true
    }

    /// Consume the pending frame request, if any
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.frame_requested)
    }

    /// Current state
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Scaled animation time in seconds
    pub fn time(&self) -> f64 {
        self.time
    }

    /// The scene while running
    pub fn scene(&self) -> Option<&BuiltScene> {
        self.scene.as_ref()
    }

    /// The camera as of the last tick
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    /// Orbit controller, for relaying pointer input
    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    /// Mutable orbit controller, for relaying pointer input
    pub fn controller_mut(&mut self) -> &mut CameraController {
        &mut self.controller
    }

    /// The viewport
    pub fn viewport(&self) -> &ViewportManager<T> {
        &self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct NullTarget {
        frames: u32,
        fail_with_lost: bool,
        fail_prepare: bool,
    }

    impl RenderTarget for NullTarget {
        fn prepare(&mut self, _scene: &BuiltScene) -> Result<(), RenderError> {
            if self.fail_prepare {
                return Err(RenderError::OutOfMemory);
            }
            Ok(())
        }

        fn resize(&mut self, _width: u32, _height: u32) {}

        fn render(&mut self, _frame: &FrameView<'_>) -> Result<(), RenderError> {
            if self.fail_with_lost {
                return Err(RenderError::SurfaceLost);
            }
            self.frames += 1;
            Ok(())
        }

        fn release(&mut self) {}
    }

    fn running() -> AnimationScheduler<NullTarget> {
        AnimationScheduler::mount(Some(NullTarget::default()), &AppConfig::default()).unwrap()
    }

    #[test]
    fn test_mount_without_target_stays_idle() {
        let mut scheduler = AnimationScheduler::<NullTarget>::mount(None, &AppConfig::default()).unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.scene().is_none());
        assert!(matches!(scheduler.tick(0.016), TickOutcome::Inactive));
        assert!(!scheduler.take_frame_request());
    }

    #[test]
    fn test_failed_prepare_aborts_mount() {
        let target = NullTarget {
            fail_prepare: true,
            ..NullTarget::default()
        };
        let result = AnimationScheduler::mount(Some(target), &AppConfig::default());
        assert!(matches!(result, Err(MountError::Render(RenderError::OutOfMemory))));
    }

    #[test]
    fn test_tick_advances_scaled_time() {
        let mut scheduler = running();
        assert!(matches!(scheduler.tick(0.5), TickOutcome::Rendered));
        // Clamped to max_frame_dt, then scaled
        let expected = 0.1 * 0.6;
        assert!((scheduler.time() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_time_keeps_advancing_after_days() {
        let mut scheduler = running();
        let start = 262_144.0;
        scheduler.time = start;
        for _ in 0..600 {
            scheduler.tick(1.0 / 60.0);
        }
        // 10 wall-clock seconds at the default 0.6 time scale
        assert!((scheduler.time() - start - 6.0).abs() < 1e-4);

        let scene = scheduler.scene().unwrap();
        let head = scene.graph.get(scene.handles.character_head).unwrap();
        let expected = CharacterPose::at(scheduler.time()).head_height;
        assert!((head.transform().position.y - expected).abs() < 1e-6);
    }

    #[test]
    fn test_non_positive_dt_freezes_time() {
        let mut scheduler = running();
        scheduler.tick(0.0);
        scheduler.tick(-1.0);
        scheduler.tick(f32::NAN);
        assert_eq!(scheduler.time(), 0.0);
        assert_eq!(scheduler.viewport().target().unwrap().frames, 3);
    }

    #[test]
    fn test_frame_requests() {
        let mut scheduler = running();
        assert!(scheduler.take_frame_request());
        assert!(!scheduler.take_frame_request());
        scheduler.tick(0.016);
        assert!(scheduler.take_frame_request());
    }

    #[test]
    fn test_lost_surface_halts() {
        let mut scheduler = running();
        if let Some(target) = scheduler.viewport.target_mut() {
            target.fail_with_lost = true;
        }
        assert!(matches!(scheduler.tick(0.016), TickOutcome::Halted(RenderError::SurfaceLost)));
        assert_eq!(scheduler.state(), SchedulerState::Disposed);
        assert!(!scheduler.take_frame_request());
        assert!(matches!(scheduler.tick(0.016), TickOutcome::Inactive));
    }

    #[test]
    fn test_dispose_cannot_restart() {
        let mut scheduler = running();
        assert!(scheduler.dispose());
        assert!(!scheduler.dispose());
        scheduler.resize(800, 600);
        assert_eq!(scheduler.state(), SchedulerState::Disposed);
        assert!(scheduler.scene().is_none());
        assert!(matches!(scheduler.tick(0.016), TickOutcome::Inactive));
    }
}
