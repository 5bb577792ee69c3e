//! Stable handles to the parts of the scene that animate

use hearth_core::{LightKey, NodeKey, ParticleKey};

/// A resolved handle
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Handle<'a> {
    Node(NodeKey),
    Light(LightKey),
    Particles(&'a [ParticleKey]),
}

/// Everything the animation loop mutates, resolved once at build time
#[derive(Clone, Debug)]
pub struct SceneHandles {
    pub character_head: NodeKey,
    pub character_ears: NodeKey,
    pub stove_light: LightKey,
    pub lamp_light: LightKey,
    pub campfire_light: LightKey,
    pub stove_fire_particles: Vec<ParticleKey>,
    pub campfire_flame_particles: Vec<ParticleKey>,
    pub campfire_smoke: ParticleKey,
}

impl SceneHandles {
    /// Symbolic names accepted by [`Self::resolve`]
    pub const NAMES: [&'static str; 8] = [
        "character_head",
        "character_ears",
        "stove_light",
        "lamp_light",
        "campfire_light",
        "stove_fire_particles",
        "campfire_flame_particles",
        "campfire_smoke",
    ];

    /// Look a handle up by its symbolic name
    pub fn resolve(&self, name: &str) -> Option<Handle<'_>> {
        let handle = match name {
            "character_head" => Handle::Node(self.character_head),
            "character_ears" => Handle::Node(self.character_ears),
            "stove_light" => Handle::Light(self.stove_light),
            "lamp_light" => Handle::Light(self.lamp_light),
            "campfire_light" => Handle::Light(self.campfire_light),
            "stove_fire_particles" => Handle::Particles(&self.stove_fire_particles),
            "campfire_flame_particles" => Handle::Particles(&self.campfire_flame_particles),
            "campfire_smoke" => Handle::Particles(std::slice::from_ref(&self.campfire_smoke)),
            _ => return None,
        };
        Some(handle)
    }

    /// Subtrees whose transforms change every frame
    pub fn dynamic_roots(&self) -> Vec<NodeKey> {
        vec![self.character_head]
    }
}

/// Handles collected while building; all must be filled before the scene is
/// handed out
#[derive(Default)]
pub(crate) struct PartialHandles {
    pub character_head: Option<NodeKey>,
    pub character_ears: Option<NodeKey>,
    pub stove_light: Option<LightKey>,
    pub lamp_light: Option<LightKey>,
    pub campfire_light: Option<LightKey>,
    pub stove_fire_particles: Vec<ParticleKey>,
    pub campfire_flame_particles: Vec<ParticleKey>,
    pub campfire_smoke: Option<ParticleKey>,
}

impl PartialHandles {
    /// Complete the handle set, naming the first missing part
    pub fn finish(self) -> Result<SceneHandles, &'static str> {
        if self.stove_fire_particles.is_empty() {
            return Err("stove_fire_particles");
        }
        if self.campfire_flame_particles.is_empty() {
            return Err("campfire_flame_particles");
        }
        Ok(SceneHandles {
            character_head: self.character_head.ok_or("character_head")?,
            character_ears: self.character_ears.ok_or("character_ears")?,
            stove_light: self.stove_light.ok_or("stove_light")?,
            lamp_light: self.lamp_light.ok_or("lamp_light")?,
            campfire_light: self.campfire_light.ok_or("campfire_light")?,
            stove_fire_particles: self.stove_fire_particles,
            campfire_flame_particles: self.campfire_flame_particles,
            campfire_smoke: self.campfire_smoke.ok_or("campfire_smoke")?,
        })
    }
}
