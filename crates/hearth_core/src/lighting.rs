//! Lighting rig
//!
//! Dynamic point lights flicker as a function of time plus injected noise:
//!
//! ```text
//! intensity = base + amplitude * sin(time * frequency) + uniform(0, noise)
//! ```
//!
//! Lights with a [`HueSwap`] alternate between two colors. The ambient,
//! hemisphere and directional lights never change.

use hearth_math::Vec3;
use rand::rngs::StdRng;
use rand::RngExt;
use slotmap::{new_key_type, SlotMap};

use crate::material::Color;

new_key_type! {
    /// Key to a point light in the [`LightingRig`]
    pub struct LightKey;
}

/// Sinusoidal flicker with additive uniform noise
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Flicker {
    pub amplitude: f32,
    /// Angular frequency in radians per second
    pub frequency: f32,
    /// Upper bound of the uniform noise term
    pub noise_amplitude: f32,
}

/// Two-color alternation: `primary` while `time mod period < threshold`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HueSwap {
    pub period: f32,
    pub threshold: f32,
    pub primary: Color,
    pub secondary: Color,
}

impl HueSwap {
    /// Color at `time`
    pub fn color_at(&self, time: f64) -> Color {
        if time.rem_euclid(f64::from(self.period)) < f64::from(self.threshold) {
            self.primary
        } else {
            self.secondary
        }
    }
}

/// A flickering point light
#[derive(Clone, Debug, PartialEq)]
pub struct LightSource {
    /// Intensity around which the light flickers
    pub base_intensity: f32,
    /// Resting color
    pub color: Color,
    pub flicker: Flicker,
    pub hue_swap: Option<HueSwap>,
    /// World-space position
    pub position: Vec3,
    /// Distance at which the light's contribution reaches zero
    pub range: f32,
    intensity: f32,
    current_color: Color,
}

impl LightSource {
    /// Create a steady light
    pub fn new(color: Color, base_intensity: f32, position: Vec3, range: f32) -> Self {
        Self {
            base_intensity,
            color,
            flicker: Flicker::default(),
            hue_swap: None,
            position,
            range,
            intensity: base_intensity,
            current_color: color,
        }
    }

    /// Add sinusoidal flicker
    pub fn with_flicker(mut self, amplitude: f32, frequency: f32, noise_amplitude: f32) -> Self {
        self.flicker = Flicker { amplitude, frequency, noise_amplitude };
        self
    }

    /// Alternate between `primary` and `secondary` colors
    pub fn with_hue_swap(mut self, period: f32, threshold: f32, primary: Color, secondary: Color) -> Self {
        self.hue_swap = Some(HueSwap { period, threshold, primary, secondary });
        self
    }

    /// Recompute the displayed intensity and color for `time`.
    ///
    /// Depends only on `time` and the injected noise; writes only this light.
    pub fn update(&mut self, time: f64, rng: &mut StdRng) {
        let Flicker { amplitude, frequency, noise_amplitude } = self.flicker;
        let noise = if noise_amplitude > 0.0 {
            rng.random_range(0.0..=noise_amplitude)
        } else {
            0.0
        };
        // Phase in f64 so long runs keep their resolution
        let wave = (time * f64::from(frequency)).sin() as f32;
        self.intensity = self.base_intensity + amplitude * wave + noise;
        self.current_color = match &self.hue_swap {
            Some(swap) => swap.color_at(time),
            None => self.color,
        };
    }

    /// Intensity after the last update
    #[inline]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Color after the last update
    #[inline]
    pub fn current_color(&self) -> Color {
        self.current_color
    }

    /// Inclusive bounds the intensity can take: `base ± (amplitude + noise)`
    pub fn intensity_bounds(&self) -> (f32, f32) {
        let spread = self.flicker.amplitude.abs() + self.flicker.noise_amplitude;
        (self.base_intensity - spread, self.base_intensity + spread)
    }
}

/// Hemisphere light: sky color from above, ground color from below
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HemisphereLight {
    pub sky: Color,
    pub ground: Color,
    pub intensity: f32,
}

/// Directional light shining from `position` toward the origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

impl DirectionalLight {
    /// Unit vector pointing from the surface toward the light
    pub fn direction(&self) -> Vec3 {
        self.position.normalized()
    }
}

/// Static ambient terms plus all dynamic point lights
pub struct LightingRig {
    pub ambient_color: Color,
    pub ambient_intensity: f32,
    pub hemisphere: HemisphereLight,
    pub directional: DirectionalLight,
    lights: SlotMap<LightKey, LightSource>,
}

impl LightingRig {
    /// Create a rig with the given static lights and no point lights
    pub fn new(
        ambient_color: Color,
        ambient_intensity: f32,
        hemisphere: HemisphereLight,
        directional: DirectionalLight,
    ) -> Self {
        Self {
            ambient_color,
            ambient_intensity,
            hemisphere,
            directional,
            lights: SlotMap::with_key(),
        }
    }

    /// Add a point light and return its key
    pub fn add_light(&mut self, light: LightSource) -> LightKey {
        self.lights.insert(light)
    }

    /// Get an immutable reference to a light by key
    #[inline]
    pub fn get(&self, key: LightKey) -> Option<&LightSource> {
        self.lights.get(key)
    }

    /// Get a mutable reference to a light by key
    #[inline]
    pub fn get_mut(&mut self, key: LightKey) -> Option<&mut LightSource> {
        self.lights.get_mut(key)
    }

    /// Number of point lights
    #[inline]
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Iterate over all point lights
    pub fn lights(&self) -> impl Iterator<Item = (LightKey, &LightSource)> {
        self.lights.iter()
    }

    /// Update every point light for `time`
    pub fn update(&mut self, time: f64, rng: &mut StdRng) {
        for (_key, light) in &mut self.lights {
            light.update(time, rng);
        }
    }
}
