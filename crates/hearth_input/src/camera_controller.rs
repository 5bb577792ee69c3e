//! Orbit camera controller with damped input
//!
//! Controls:
//! - Left mouse drag: orbit around the target (azimuth and polar angle)
//! - Mouse wheel: zoom in/out (multiplicative)
//!
//! Input is sampled, not queued: the controller remembers the latest cursor
//! position and the running wheel total, and each `update` consumes whatever
//! changed since the previous update. Goal values are clamped as soon as input
//! is applied; the displayed orbit then eases toward the goal with
//! frame-rate independent damping.

use std::f32::consts::{PI, TAU};

use hearth_math::Vec3;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Smallest polar angle allowed; keeps the view direction off the up axis
const MIN_POLAR_EPS: f32 = 1e-4;

/// Damping is specified per frame at this rate
const REFERENCE_FPS: f32 = 60.0;

/// Pixel scroll deltas are converted to wheel lines with this divisor
const PIXELS_PER_LINE: f32 = 50.0;

/// Differences smaller than this snap the displayed orbit onto the goal
const SNAP_EPSILON: f32 = 1e-4;

/// Spherical coordinates of the eye relative to the target
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    /// Distance from the target
    pub distance: f32,
    /// Angle from the +Y axis (0 = straight above)
    pub polar: f32,
    /// Angle around Y, measured from +Z toward +X
    pub azimuth: f32,
}

impl Orbit {
    /// Orbit that places the eye at `eye` when looking at `target`
    pub fn from_eye(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length();
        let polar = if distance > 0.0 {
            (offset.y / distance).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };
        Self {
            distance,
            polar,
            azimuth: offset.x.atan2(offset.z),
        }
    }

    /// Offset from target to eye: `(r sinφ sinθ, r cosφ, r sinφ cosθ)`
    pub fn offset(&self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        Vec3::new(
            self.distance * sin_p * sin_a,
            self.distance * cos_p,
            self.distance * sin_p * cos_a,
        )
    }
}

/// Orbit camera controller
pub struct CameraController {
    target: Vec3,
    initial: Orbit,
    current: Orbit,
    goal: Orbit,

    // Mouse state
    mouse_pressed: bool,
    cursor: Option<(f64, f64)>,
    applied_cursor: Option<(f64, f64)>,
    wheel_total: f32,
    applied_wheel: f32,
    viewport_height: f32,

    // Configuration
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    /// Fraction of the remaining gap closed per 60 Hz frame
    pub damping_factor: f32,
    /// Drag sensitivity (1.0 = one full turn per viewport height)
    pub rotate_speed: f32,
    /// Zoom step per wheel line
    pub zoom_speed: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 2.0, 0.0), Vec3::new(14.0, 11.0, 14.0))
    }
}

impl CameraController {
    /// Orbit around `target`, starting with the eye at `eye`
    pub fn new(target: Vec3, eye: Vec3) -> Self {
        let orbit = Orbit::from_eye(eye, target);
        let mut controller = Self {
            target,
            initial: orbit,
            current: orbit,
            goal: orbit,

            mouse_pressed: false,
            cursor: None,
            applied_cursor: None,
            wheel_total: 0.0,
            applied_wheel: 0.0,
            viewport_height: 720.0,

            min_distance: 10.0,
            max_distance: 30.0,
            min_polar: 0.0,
            max_polar: PI / 2.1,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 0.05,
        };
        controller.clamp_initial();
        controller
    }

    /// Process mouse button input (only the left button drags)
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        self.mouse_pressed = state == ElementState::Pressed;
        if self.mouse_pressed {
            // A drag starts from where the button went down
            self.applied_cursor = self.cursor;
        }
    }

    /// Record the latest cursor position in physical pixels
    pub fn process_cursor_moved(&mut self, x: f64, y: f64) {
        self.cursor = Some((x, y));
    }

    /// Record wheel movement; positive `y` zooms in
    pub fn process_scroll(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
        };
        self.process_wheel_lines(lines);
    }

    /// Record wheel movement already expressed in lines
    pub fn process_wheel_lines(&mut self, lines: f32) {
        if lines.is_finite() {
            self.wheel_total += lines;
        }
    }

    /// Viewport height used to scale drag distances (ignored if zero)
    pub fn set_viewport_height(&mut self, height: u32) {
        if height > 0 {
            self.viewport_height = height as f32;
        }
    }

    /// Consume sampled input, ease toward the goal, and point the camera.
    ///
    /// Non-positive or non-finite `dt` consumes input but does not move the
    /// displayed orbit. Returns the eye position.
    pub fn update<C: CameraControl>(&mut self, camera: &mut C, dt: f32) -> Vec3 {
        self.apply_input();

        if dt.is_finite() && dt > 0.0 {
            let retention = (1.0 - self.damping_factor.clamp(0.0, 1.0)).powf(dt * REFERENCE_FPS);
            let alpha = 1.0 - retention;
            self.current.distance = approach(self.current.distance, self.goal.distance, alpha);
            self.current.polar = approach(self.current.polar, self.goal.polar, alpha);
            self.current.azimuth = approach(self.current.azimuth, self.goal.azimuth, alpha);
        }

        let eye = self.eye();
        camera.look_from(eye, self.target);
        eye
    }

    /// Return to the starting orbit, discarding any pending input
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.goal = self.initial;
        self.applied_cursor = self.cursor;
        self.applied_wheel = self.wheel_total;
    }

    /// Current eye position
    pub fn eye(&self) -> Vec3 {
        self.target + self.current.offset()
    }

    /// Orbit target
    #[inline]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Displayed (damped) orbit
    #[inline]
    pub fn current(&self) -> Orbit {
        self.current
    }

    /// Orbit the display is easing toward
    #[inline]
    pub fn goal(&self) -> Orbit {
        self.goal
    }

    /// Check if a drag is in progress
    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.mouse_pressed
    }

    /// Builder: set distance bounds
    pub fn with_distance_bounds(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min.min(max);
        self.max_distance = max.max(min);
        self.clamp_initial();
        self
    }

    /// Builder: set polar angle bounds in radians
    pub fn with_polar_bounds(mut self, min: f32, max: f32) -> Self {
        self.min_polar = min.min(max);
        self.max_polar = max.max(min);
        self.clamp_initial();
        self
    }

    /// Builder: set the damping factor (fraction closed per 60 Hz frame)
    pub fn with_damping(mut self, damping_factor: f32) -> Self {
        self.damping_factor = damping_factor;
        self
    }

    /// Builder: set drag sensitivity
    pub fn with_rotate_speed(mut self, speed: f32) -> Self {
        self.rotate_speed = speed;
        self
    }

    /// Builder: set zoom step per wheel line
    pub fn with_zoom_speed(mut self, speed: f32) -> Self {
        self.zoom_speed = speed;
        self
    }

    fn apply_input(&mut self) {
        // Drag
        if self.mouse_pressed {
            if let (Some((x, y)), Some((ax, ay))) = (self.cursor, self.applied_cursor) {
                let per_pixel = TAU / self.viewport_height * self.rotate_speed;
                let d_azimuth = (x - ax) as f32 * per_pixel;
                let d_polar = (y - ay) as f32 * per_pixel;
                if d_azimuth.is_finite() && d_polar.is_finite() {
                    self.goal.azimuth -= d_azimuth;
                    self.goal.polar -= d_polar;
                }
            }
        }
        self.applied_cursor = self.cursor;

        // Wheel
        let lines = self.wheel_total - self.applied_wheel;
        self.applied_wheel = self.wheel_total;
        if lines != 0.0 {
            let scale = (1.0 - self.zoom_speed.clamp(0.0, 0.99)).powf(lines.abs());
            if lines > 0.0 {
                self.goal.distance *= scale;
            } else {
                self.goal.distance /= scale;
            }
        }

        self.clamp_goal();
        self.wrap_azimuth();
    }

    fn clamp_goal(&mut self) {
        self.goal.distance = self.goal.distance.clamp(self.min_distance, self.max_distance);
        let min_polar = self.min_polar.max(MIN_POLAR_EPS);
        let max_polar = self.max_polar.min(PI - MIN_POLAR_EPS).max(min_polar);
        self.goal.polar = self.goal.polar.clamp(min_polar, max_polar);
    }

    /// Keep the goal azimuth in (-π, π], shifting the display by the same turn
    fn wrap_azimuth(&mut self) {
        let azimuth = self.goal.azimuth;
        if !azimuth.is_finite() || (azimuth > -PI && azimuth <= PI) {
            return;
        }
        let mut wrapped = (azimuth + PI).rem_euclid(TAU) - PI;
        if wrapped <= -PI {
            wrapped = PI;
        }
        self.goal.azimuth = wrapped;
        self.current.azimuth += wrapped - azimuth;
        if !self.current.azimuth.is_finite() {
            self.current.azimuth = wrapped;
        }
    }

    fn clamp_initial(&mut self) {
        self.goal = self.initial;
        self.clamp_goal();
        self.initial = self.goal;
        self.current = self.goal;
    }
}

/// Move `current` toward `goal` by `alpha`, snapping when close enough
fn approach(current: f32, goal: f32, alpha: f32) -> f32 {
    let next = current + (goal - current) * alpha;
    if (goal - next).abs() < SNAP_EPSILON {
        goal
    } else {
        next
    }
}

/// Trait for camera control
/// Allows the controller to drive different camera implementations
pub trait CameraControl {
    /// Place the camera at `eye` looking at `target` (Y up)
    fn look_from(&mut self, eye: Vec3, target: Vec3);
}
