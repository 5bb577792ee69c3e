//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`HEARTH_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use hearth_core::{Color, Vec3};
use hearth_input::CameraController;
use hearth_render::{renderable::Atmosphere, PerspectiveCamera};
use serde::{Serialize, Deserialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Camera configuration
    #[serde(default)]
    pub camera: CameraConfig,
    /// Input configuration
    #[serde(default)]
    pub input: InputConfig,
    /// Animation configuration
    #[serde(default)]
    pub animation: AnimationConfig,
    /// Rendering configuration
    #[serde(default)]
    pub rendering: RenderingConfig,
    /// Overlay state configuration
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`HEARTH_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // HEARTH_WINDOW__TITLE=Test -> window.title = "Test"
        figment = figment.merge(Env::prefixed("HEARTH_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Start in fullscreen mode
    pub fullscreen: bool,
    /// Enable VSync
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Hearth - Cozy Cabin".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Point the camera orbits around [x, y, z]
    pub target: [f32; 3],
    /// Starting eye position [x, y, z]
    pub start_position: [f32; 3],
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Closest orbit distance
    pub min_distance: f32,
    /// Farthest orbit distance
    pub max_distance: f32,
    /// Smallest polar angle in degrees (0 = straight down)
    pub min_polar: f32,
    /// Largest polar angle in degrees (90 = horizon)
    pub max_polar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            target: [0.0, 2.0, 0.0],
            start_position: [14.0, 11.0, 14.0],
            fov: 42.0,
            near: 0.1,
            far: 1000.0,
            min_distance: 10.0,
            max_distance: 30.0,
            min_polar: 0.0,
            max_polar: 180.0 / 2.1,
        }
    }
}

impl CameraConfig {
    /// Perspective camera with this projection
    pub fn to_camera(&self) -> PerspectiveCamera {
        PerspectiveCamera::new().with_projection(self.fov, self.near, self.far)
    }
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Orbit rotation multiplier (1.0 = one full turn per viewport height)
    pub rotate_speed: f32,
    /// Fractional zoom per wheel line
    pub zoom_speed: f32,
    /// Fraction of the remaining distance covered per 60 Hz frame
    pub damping_factor: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            damping_factor: 0.05,
        }
    }
}

/// Animation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Animation seconds per wall-clock second
    pub time_scale: f32,
    /// Longest frame delta applied in one tick, in seconds
    pub max_frame_dt: f32,
    /// Seed for particles, light noise and decorative jitter
    pub seed: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            time_scale: 0.6,
            max_frame_dt: 0.1,
            seed: 0x4845_4152_5448,
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Clear color as 0xRRGGBB sRGB
    pub background_color: u32,
    /// Fog color as 0xRRGGBB sRGB
    pub fog_color: u32,
    /// Distance where fog starts
    pub fog_near: f32,
    /// Distance where fog is opaque
    pub fog_far: f32,
    /// Tone mapping exposure
    pub exposure: f32,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            background_color: 0xffa987,
            fog_color: 0xffa987,
            fog_near: 20.0,
            fog_far: 50.0,
            exposure: 1.2,
        }
    }
}

impl RenderingConfig {
    /// Fog and exposure for the renderer
    pub fn atmosphere(&self) -> Atmosphere {
        Atmosphere {
            fog_color: Color::from_hex(self.fog_color),
            fog_near: self.fog_near,
            fog_far: self.fog_far,
            exposure: self.exposure,
        }
    }

    /// Linear clear color
    pub fn clear_color(&self) -> wgpu::Color {
        let c = Color::from_hex(self.background_color);
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: 1.0,
        }
    }
}

/// Overlay state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Where todos, environment and volumes are persisted
    pub preferences_path: String,
    /// Pomodoro work phase length in minutes
    pub work_minutes: u32,
    /// Pomodoro break phase length in minutes
    pub break_minutes: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            preferences_path: "config/preferences.toml".to_string(),
            work_minutes: 25,
            break_minutes: 5,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Orbit controller configured from the camera and input sections
    pub fn camera_controller(&self) -> CameraController {
        let cam = &self.camera;
        CameraController::new(Vec3::from(cam.target), Vec3::from(cam.start_position))
            .with_distance_bounds(cam.min_distance, cam.max_distance)
            .with_polar_bounds(cam.min_polar.to_radians(), cam.max_polar.to_radians())
            .with_damping(self.input.damping_factor)
            .with_rotate_speed(self.input.rotate_speed)
            .with_zoom_speed(self.input.zoom_speed)
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
