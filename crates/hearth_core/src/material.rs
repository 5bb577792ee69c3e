//! Color and Material types
//!
//! Colors are authored as sRGB hex values and stored in linear space, which is
//! what the shaders light and blend in.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Flags indicating which parts of a node have changed and need updating
    ///
    /// Used for dirty tracking so the renderer only re-flattens the subtrees
    /// that animation touched.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// No changes
        const NONE = 0;
        /// Transform (position, rotation, scale) has changed
        const TRANSFORM = 1 << 0;
        /// Mesh has changed
        const MESH = 1 << 1;
        /// Material has changed
        const MATERIAL = 1 << 2;
        /// All flags set - node needs full rebuild
        const ALL = Self::TRANSFORM.bits() | Self::MESH.bits() | Self::MATERIAL.bits();
    }
}

/// Linear RGB color
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };

    /// Create a color from linear components
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a `0xRRGGBB` sRGB value
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self::new(channel(16), channel(8), channel(0))
    }

    /// Multiply every channel by `s`
    pub fn scaled(self, s: f32) -> Self {
        Self::new(self.r * s, self.g * s, self.b * s)
    }

    /// Linear interpolation between two colors
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Components as an array
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Components plus alpha, for GPU upload
    pub fn with_alpha(self, a: f32) -> [f32; 4] {
        [self.r, self.g, self.b, a]
    }
}

/// Convert one sRGB-encoded channel to linear
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Surface material for a mesh
///
/// Only the parameters the lighting model uses: a diffuse color, an opacity
/// for translucent surfaces, and an emissive term for glowing parts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Diffuse color
    pub color: Color,
    /// 1.0 is opaque; anything lower is drawn in the blended pass
    pub opacity: f32,
    /// Self-illumination color
    pub emissive: Color,
    /// Multiplier for `emissive`
    pub emissive_intensity: f32,
    /// Lit from both sides and never culled
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Material {
    /// White material
    pub const WHITE: Self = Self {
        color: Color::WHITE,
        opacity: 1.0,
        emissive: Color::BLACK,
        emissive_intensity: 0.0,
        double_sided: false,
    };

    /// Create an opaque material from a `0xRRGGBB` sRGB value
    pub fn from_hex(hex: u32) -> Self {
        Self {
            color: Color::from_hex(hex),
            ..Self::WHITE
        }
    }

    /// Set opacity (values below 1.0 make the material translucent)
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set an emissive color and intensity
    pub fn with_emissive(mut self, hex: u32, intensity: f32) -> Self {
        self.emissive = Color::from_hex(hex);
        self.emissive_intensity = intensity;
        self
    }

    /// Render both faces
    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    /// True if this material belongs in the blended pass
    #[inline]
    pub fn is_translucent(&self) -> bool {
        self.opacity < 1.0
    }

    /// Emissive color premultiplied by its intensity
    pub fn emissive_radiance(&self) -> Color {
        self.emissive.scaled(self.emissive_intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_dirty_flags_default() {
        assert_eq!(DirtyFlags::default(), DirtyFlags::NONE);
    }

    #[test]
    fn test_dirty_flags_all() {
        let flags = DirtyFlags::ALL;
        assert!(flags.contains(DirtyFlags::TRANSFORM));
        assert!(flags.contains(DirtyFlags::MESH));
        assert!(flags.contains(DirtyFlags::MATERIAL));
    }

    #[test]
    fn test_from_hex_endpoints() {
        assert_eq!(Color::from_hex(0x000000), Color::BLACK);
        let white = Color::from_hex(0xffffff);
        assert!(approx_eq(white.r, 1.0) && approx_eq(white.g, 1.0) && approx_eq(white.b, 1.0));
    }

    #[test]
    fn test_from_hex_is_linearized() {
        // sRGB mid-grey 0x80 is roughly 0.216 in linear space
        let grey = Color::from_hex(0x808080);
        assert!((grey.r - 0.2158).abs() < 0.001);
        assert_eq!(grey.r, grey.g);
    }

    #[test]
    fn test_from_hex_channel_order() {
        let c = Color::from_hex(0xff0000);
        assert!(approx_eq(c.r, 1.0));
        assert_eq!(c.g, 0.0);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn test_material_translucency() {
        let glass = Material::from_hex(0x87ceeb).with_opacity(0.3);
        assert!(glass.is_translucent());
        assert!(!Material::from_hex(0x5a4a3a).is_translucent());
        assert_eq!(Material::WHITE.with_opacity(2.0).opacity, 1.0);
    }

    #[test]
    fn test_emissive_radiance() {
        let door = Material::from_hex(0x000000).with_emissive(0xffffff, 2.0);
        let e = door.emissive_radiance();
        assert!(approx_eq(e.r, 2.0));
    }
}
