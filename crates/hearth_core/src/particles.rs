//! Recyclable particle systems
//!
//! A [`ParticleSystem`] owns a fixed-capacity buffer of positions that rise
//! with a little horizontal jitter and are recycled back into a reset volume
//! once they pass a height threshold. Particles never die and the buffer never
//! grows. Fire, flame and smoke are all the same system with different configs.
//!
//! Positions are in the local space of the scene node that anchors the emitter.

use std::fmt;

use hearth_math::Vec3;
use rand::rngs::StdRng;
use rand::RngExt;
use slotmap::{new_key_type, SlotMap};

use crate::material::Color;

new_key_type! {
    /// Key to a particle system in a [`ParticleSet`]
    pub struct ParticleKey;
}

/// How particle sprites combine with what is behind them
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Colors add up (glowing fire)
    #[default]
    Additive,
    /// Standard alpha blending (smoke)
    Normal,
}

/// Axis-aligned box used for spawning and recycling
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Volume {
    pub min: Vec3,
    pub max: Vec3,
}

impl Volume {
    /// Create a volume from its corners
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered at `center` with the given half extents
    pub fn centered(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// True if both corners are finite and `min <= max` on every axis
    pub fn is_well_formed(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.z <= self.max.z
    }

    /// True if `p` lies inside (inclusive)
    pub fn contains(&self, p: Vec3) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    /// Uniform sample inside the volume
    ///
    /// The volume must be well-formed; a flat axis yields its single value.
    pub fn sample(&self, rng: &mut StdRng) -> Vec3 {
        Vec3::new(
            rng.random_range(self.min.x..=self.max.x),
            rng.random_range(self.min.y..=self.max.y),
            rng.random_range(self.min.z..=self.max.z),
        )
    }
}

/// Immutable description of one particle system
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSystemConfig {
    /// Number of particles (fixed for the system's lifetime)
    pub capacity: usize,
    /// Where particles are first placed
    pub spawn_volume: Volume,
    /// Where particles go when recycled
    pub reset_volume: Volume,
    /// Vertical speed range `(min, max)` in units per second
    pub rise_rate: (f32, f32),
    /// Horizontal drift amplitude `(x, z)` in units per second
    pub jitter: (f32, f32),
    /// Particles above this height are recycled
    pub recycle_height: f32,
    /// Sprite color
    pub color: Color,
    /// Sprite size in world units
    pub size: f32,
    /// Sprite opacity
    pub opacity: f32,
    /// Sprite blending
    pub blend_mode: BlendMode,
}

impl ParticleSystemConfig {
    /// Check the config can produce a system whose particles stay in range
    pub fn validate(&self) -> Result<(), ParticleConfigError> {
        if self.capacity == 0 {
            return Err(ParticleConfigError::ZeroCapacity);
        }
        if !self.spawn_volume.is_well_formed() {
            return Err(ParticleConfigError::MalformedVolume("spawn"));
        }
        if !self.reset_volume.is_well_formed() {
            return Err(ParticleConfigError::MalformedVolume("reset"));
        }
        if self.reset_volume.min.y < self.spawn_volume.min.y {
            return Err(ParticleConfigError::ResetBelowSpawn);
        }
        if !self.recycle_height.is_finite()
            || self.recycle_height < self.spawn_volume.max.y
            || self.recycle_height < self.reset_volume.max.y
        {
            return Err(ParticleConfigError::RecycleBelowVolume);
        }
        let (rise_min, rise_max) = self.rise_rate;
        if !(rise_min.is_finite() && rise_max.is_finite() && 0.0 <= rise_min && rise_min <= rise_max) {
            return Err(ParticleConfigError::InvalidRiseRate);
        }
        let (jx, jz) = self.jitter;
        if !(jx.is_finite() && jz.is_finite() && jx >= 0.0 && jz >= 0.0) {
            return Err(ParticleConfigError::InvalidJitter);
        }
        if !(self.size.is_finite() && self.size > 0.0 && (0.0..=1.0).contains(&self.opacity)) {
            return Err(ParticleConfigError::InvalidAppearance);
        }
        Ok(())
    }
}

/// Why a particle config was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ParticleConfigError {
    /// Capacity must be at least one
    ZeroCapacity,
    /// A volume has non-finite corners or `min > max` (names which volume)
    MalformedVolume(&'static str),
    /// The reset volume starts below the spawn volume
    ResetBelowSpawn,
    /// The recycle height lies inside the spawn or reset volume
    RecycleBelowVolume,
    /// Rise rate must satisfy `0 <= min <= max`
    InvalidRiseRate,
    /// Jitter amplitudes must be finite and non-negative
    InvalidJitter,
    /// Size must be positive and opacity within `[0, 1]`
    InvalidAppearance,
}

impl fmt::Display for ParticleConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticleConfigError::ZeroCapacity => write!(f, "Particle capacity must be positive"),
            ParticleConfigError::MalformedVolume(which) => {
                write!(f, "Particle {} volume is malformed", which)
            }
            ParticleConfigError::ResetBelowSpawn => {
                write!(f, "Particle reset volume starts below the spawn volume")
            }
            ParticleConfigError::RecycleBelowVolume => {
                write!(f, "Particle recycle height must be above the spawn and reset volumes")
            }
            ParticleConfigError::InvalidRiseRate => write!(f, "Particle rise rate must satisfy 0 <= min <= max"),
            ParticleConfigError::InvalidJitter => write!(f, "Particle jitter must be non-negative"),
            ParticleConfigError::InvalidAppearance => {
                write!(f, "Particle size must be positive and opacity within [0, 1]")
            }
        }
    }
}

impl std::error::Error for ParticleConfigError {}

/// A fixed-capacity buffer of rising, recycling particles
#[derive(Clone, Debug)]
pub struct ParticleSystem {
    config: ParticleSystemConfig,
    positions: Vec<Vec3>,
    resets: Vec<u64>,
}

impl ParticleSystem {
    /// Largest time step applied in one `step`; longer frames are clamped
    pub const MAX_STEP_DT: f32 = 0.25;

    /// Validate `config` and fill the buffer with positions drawn uniformly
    /// inside the spawn volume
    pub fn spawn(config: ParticleSystemConfig, rng: &mut StdRng) -> Result<Self, ParticleConfigError> {
        config.validate()?;
        let positions = (0..config.capacity).map(|_| config.spawn_volume.sample(rng)).collect();
        let resets = vec![0; config.capacity];
        Ok(Self { config, positions, resets })
    }

    /// Advance every particle by `dt` seconds.
    ///
    /// Zero, negative or non-finite `dt` leaves positions untouched; `dt`
    /// above [`Self::MAX_STEP_DT`] is clamped.
    pub fn step(&mut self, dt: f32, rng: &mut StdRng) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let dt = dt.min(Self::MAX_STEP_DT);

        let (rise_min, rise_max) = self.config.rise_rate;
        let (jx, jz) = self.config.jitter;
        let recycle_height = self.config.recycle_height;
        let reset_volume = self.config.reset_volume;

        for (p, resets) in self.positions.iter_mut().zip(self.resets.iter_mut()) {
            p.y += rng.random_range(rise_min..=rise_max) * dt;
            p.x += rng.random_range(-jx..=jx) * dt;
            p.z += rng.random_range(-jz..=jz) * dt;

            if p.y > recycle_height {
                *p = reset_volume.sample(rng);
                *resets += 1;
            }
        }
    }

    /// The config this system was built from
    #[inline]
    pub fn config(&self) -> &ParticleSystemConfig {
        &self.config
    }

    /// Current particle positions (local to the anchoring node)
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Number of particles
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false once spawned (capacity is validated to be positive)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// How many times particle `index` has been recycled
    #[inline]
    pub fn resets(&self, index: usize) -> Option<u64> {
        self.resets.get(index).copied()
    }
}

/// Arena of all particle systems in a scene
///
/// Stepping the set steps every system with the same injected random source.
#[derive(Default)]
pub struct ParticleSet {
    systems: SlotMap<ParticleKey, ParticleSystem>,
}

impl ParticleSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self { systems: SlotMap::with_key() }
    }

    /// Add a system and return its key
    pub fn insert(&mut self, system: ParticleSystem) -> ParticleKey {
        self.systems.insert(system)
    }

    /// Get an immutable reference to a system by key
    #[inline]
    pub fn get(&self, key: ParticleKey) -> Option<&ParticleSystem> {
        self.systems.get(key)
    }

    /// Get a mutable reference to a system by key
    #[inline]
    pub fn get_mut(&mut self, key: ParticleKey) -> Option<&mut ParticleSystem> {
        self.systems.get_mut(key)
    }

    /// Number of systems
    #[inline]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// True if there are no systems
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Total particles across all systems
    pub fn particle_count(&self) -> usize {
        self.systems.values().map(ParticleSystem::len).sum()
    }

    /// Iterate over all systems with their keys
    pub fn iter(&self) -> impl Iterator<Item = (ParticleKey, &ParticleSystem)> {
        self.systems.iter()
    }

    /// Step every system by `dt`
    pub fn step(&mut self, dt: f32, rng: &mut StdRng) {
        for (_key, system) in &mut self.systems {
            system.step(dt, rng);
        }
    }
}
