//! End-to-end scheduler scenarios against a recording render target

use std::cell::Cell;
use std::rc::Rc;

use hearth::config::AppConfig;
use hearth::scene::BuiltScene;
use hearth::systems::{
    AnimationScheduler, FrameView, RenderError, RenderTarget, SchedulerState, TickOutcome,
};

#[derive(Default)]
struct Counters {
    prepares: Cell<u32>,
    frames: Cell<u32>,
    releases: Cell<u32>,
    lose_surface: Cell<bool>,
    time_out: Cell<bool>,
}

struct RecordingTarget(Rc<Counters>);

impl RenderTarget for RecordingTarget {
    fn prepare(&mut self, _scene: &BuiltScene) -> Result<(), RenderError> {
        self.0.prepares.set(self.0.prepares.get() + 1);
        Ok(())
    }

    fn resize(&mut self, _width: u32, _height: u32) {}

    fn render(&mut self, _frame: &FrameView<'_>) -> Result<(), RenderError> {
        if self.0.lose_surface.get() {
            return Err(RenderError::SurfaceLost);
        }
        if self.0.time_out.get() {
            return Err(RenderError::Other("timeout".to_string()));
        }
        self.0.frames.set(self.0.frames.get() + 1);
        Ok(())
    }

    fn release(&mut self) {
        self.0.releases.set(self.0.releases.get() + 1);
    }
}

fn mount() -> (AnimationScheduler<RecordingTarget>, Rc<Counters>) {
    let counters = Rc::new(Counters::default());
    let scheduler =
        AnimationScheduler::mount(Some(RecordingTarget(counters.clone())), &AppConfig::default())
            .unwrap();
    (scheduler, counters)
}

#[test]
fn test_mount_prepares_once() {
    let (scheduler, counters) = mount();
    assert_eq!(scheduler.state(), SchedulerState::Running);
    assert_eq!(counters.prepares.get(), 1);
    assert!(scheduler.scene().is_some());
}

#[test]
fn test_idle_scheduler_is_a_no_op() {
    let mut scheduler =
        AnimationScheduler::<RecordingTarget>::mount(None, &AppConfig::default()).unwrap();
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    for _ in 0..10 {
        assert!(matches!(scheduler.tick(0.016), TickOutcome::Inactive));
    }
    scheduler.resize(800, 600);
    assert_eq!(scheduler.time(), 0.0);
    assert!(scheduler.dispose());
    assert!(!scheduler.dispose());
}

#[test]
fn test_dispose_twice_releases_once() {
    let (mut scheduler, counters) = mount();
    scheduler.tick(0.016);
    assert!(scheduler.dispose());
    assert!(!scheduler.dispose());
    assert_eq!(counters.releases.get(), 1);
    assert_eq!(scheduler.state(), SchedulerState::Disposed);

    // No more frames once disposed
    let frames = counters.frames.get();
    assert!(matches!(scheduler.tick(0.016), TickOutcome::Inactive));
    assert_eq!(counters.frames.get(), frames);
}

#[test]
fn test_stove_fire_stays_in_band() {
    let (mut scheduler, _) = mount();
    for _ in 0..100 {
        assert!(matches!(scheduler.tick(0.1), TickOutcome::Rendered));
    }

    let scene = scheduler.scene().unwrap();
    for &key in &scene.handles.stove_fire_particles {
        let system = scene.particles.get(key).unwrap();
        assert_eq!(system.len(), 35);
        for p in system.positions() {
            assert!(p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
            assert!((0.5..=2.5).contains(&p.y), "fire particle at y = {}", p.y);
        }
    }
}

#[test]
fn test_wheel_out_converges_to_max_distance() {
    let (mut scheduler, _) = mount();
    scheduler.controller_mut().process_wheel_lines(-200.0);
    for _ in 0..600 {
        scheduler.tick(0.1);
    }
    let orbit = scheduler.controller().current();
    assert_eq!(orbit.distance, 30.0);

    let offset = scheduler.camera().eye - scheduler.controller().target();
    assert!((offset.length() - 30.0).abs() < 1e-3);
}

#[test]
fn test_resize_updates_camera_aspect() {
    let (mut scheduler, _) = mount();
    scheduler.resize(1600, 800);
    assert!((scheduler.camera().aspect() - 2.0).abs() < 1e-6);

    // Zero sizes change nothing
    scheduler.resize(0, 800);
    scheduler.resize(1600, 0);
    assert!((scheduler.camera().aspect() - 2.0).abs() < 1e-6);
    assert_eq!(scheduler.viewport().size(), Some((1600, 800)));
}

#[test]
fn test_lights_stay_within_flicker_bounds() {
    let (mut scheduler, _) = mount();
    for _ in 0..200 {
        scheduler.tick(1.0 / 60.0);
        let rig = &scheduler.scene().unwrap().rig;
        for (_, light) in rig.lights() {
            let (lo, hi) = light.intensity_bounds();
            assert!(light.intensity() >= lo - 1e-5 && light.intensity() <= hi + 1e-5);
        }
    }
}

#[test]
fn test_head_bobs_around_rest_height() {
    let (mut scheduler, _) = mount();
    let mut heights = Vec::new();
    for _ in 0..120 {
        scheduler.tick(1.0 / 30.0);
        let scene = scheduler.scene().unwrap();
        let head = scene.graph.get(scene.handles.character_head).unwrap();
        heights.push(head.transform().position.y);
    }
    assert!(heights.iter().all(|y| (y - 0.6).abs() <= 0.015 + 1e-6));
    assert!(heights.iter().any(|y| (y - 0.6).abs() > 1e-3));
}

#[test]
fn test_lost_surface_halts_and_releases() {
    let (mut scheduler, counters) = mount();
    scheduler.tick(0.016);
    counters.lose_surface.set(true);

    assert!(matches!(
        scheduler.tick(0.016),
        TickOutcome::Halted(RenderError::SurfaceLost)
    ));
    assert_eq!(scheduler.state(), SchedulerState::Disposed);
    assert_eq!(counters.releases.get(), 1);
    assert!(!scheduler.take_frame_request());
    assert!(!scheduler.dispose());
}

#[test]
fn test_recoverable_error_keeps_running() {
    let (mut scheduler, counters) = mount();
    counters.time_out.set(true);
    assert!(matches!(scheduler.tick(0.016), TickOutcome::Dropped(_)));
    assert_eq!(scheduler.state(), SchedulerState::Running);
    assert!(scheduler.take_frame_request());

    counters.time_out.set(false);
    assert!(matches!(scheduler.tick(0.016), TickOutcome::Rendered));
}
