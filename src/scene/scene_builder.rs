//! SceneBuilder - Declarative construction of the cabin diorama
//!
//! The builder owns the scene graph, the particle arena and the lighting rig
//! while parts are added, then hands all three out together with the
//! [`SceneHandles`] the animation loop needs. Every constant is fixed; the
//! only input is the seed for decorative randomness, so two builds with the
//! same seed produce identical scenes.

use std::fmt;
use std::sync::Arc;

use hearth_core::{
    Color, DirectionalLight, HemisphereLight, LightKey, LightSource, LightingRig, Material, MeshData, NodeContent,
    NodeKey, ParticleConfigError, ParticleKey, ParticleSet, ParticleSystem, ParticleSystemConfig, SceneError,
    SceneGraph, SceneNode, Transform, Vec3,
};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use super::handles::{PartialHandles, SceneHandles};

/// A fully built scene
pub struct BuiltScene {
    pub graph: SceneGraph,
    pub particles: ParticleSet,
    pub rig: LightingRig,
    pub handles: SceneHandles,
}

/// Error raised while building the scene
#[derive(Debug)]
pub enum SceneBuildError {
    /// A node could not be attached
    Graph(SceneError),
    /// A particle emitter was configured inconsistently
    Particles(ParticleConfigError),
    /// A part the animation loop depends on was never added
    MissingPart(&'static str),
}

impl fmt::Display for SceneBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneBuildError::Graph(e) => write!(f, "Scene graph error: {}", e),
            SceneBuildError::Particles(e) => write!(f, "Particle config error: {}", e),
            SceneBuildError::MissingPart(name) => write!(f, "Scene is missing '{}'", name),
        }
    }
}

impl std::error::Error for SceneBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneBuildError::Graph(e) => Some(e),
            SceneBuildError::Particles(e) => Some(e),
            SceneBuildError::MissingPart(_) => None,
        }
    }
}

impl From<SceneError> for SceneBuildError {
    fn from(e: SceneError) -> Self {
        SceneBuildError::Graph(e)
    }
}

impl From<ParticleConfigError> for SceneBuildError {
    fn from(e: ParticleConfigError) -> Self {
        SceneBuildError::Particles(e)
    }
}

/// Build the complete diorama: ground, cabin, character, forest and campfire
pub fn cozy_cabin(seed: u64) -> Result<BuiltScene, SceneBuildError> {
    SceneBuilder::new(seed)
        .add_ground()?
        .add_cabin()?
        .add_character()?
        .add_forest()?
        .add_campfire()?
        .build()
}

/// Builder for the cabin scene
///
/// # Example
/// ```ignore
/// let scene = SceneBuilder::new(seed)
///     .add_ground()?
///     .add_cabin()?
///     .add_character()?
///     .build()?;
/// ```
pub struct SceneBuilder {
    pub(super) graph: SceneGraph,
    pub(super) particles: ParticleSet,
    pub(super) rig: LightingRig,
    pub(super) rng: StdRng,
    pub(super) handles: PartialHandles,
    /// Cabin group, once added; furniture and the character hang off it
    pub(super) cabin: Option<NodeKey>,
}

impl SceneBuilder {
    /// Create a builder with the static evening lights and an empty graph
    pub fn new(seed: u64) -> Self {
        let rig = LightingRig::new(
            Color::from_hex(0xffa987),
            0.6,
            HemisphereLight {
                sky: Color::from_hex(0xffa987),
                ground: Color::from_hex(0x6e5a4d),
                intensity: 0.6,
            },
            DirectionalLight {
                color: Color::from_hex(0xff7f50),
                intensity: 1.2,
                position: Vec3::new(-15.0, 10.0, -10.0),
            },
        );

        Self {
            graph: SceneGraph::new(),
            particles: ParticleSet::new(),
            rig,
            rng: StdRng::seed_from_u64(seed),
            handles: PartialHandles::default(),
            cabin: None,
        }
    }

    /// Resolve light positions and hand out the scene
    ///
    /// Fails if any animated part was never added.
    pub fn build(mut self) -> Result<BuiltScene, SceneBuildError> {
        let anchors: Vec<(NodeKey, LightKey)> = self
            .graph
            .iter()
            .filter_map(|(key, node)| match node.content {
                NodeContent::Light(light) => Some((key, light)),
                _ => None,
            })
            .collect();
        for (anchor, key) in anchors {
            if let (Some(position), Some(light)) = (self.graph.world_position(anchor), self.rig.get_mut(key)) {
                light.position = position;
            }
        }

        let handles = self.handles.finish().map_err(SceneBuildError::MissingPart)?;

        log::info!(
            "Built scene: {} nodes, {} particle systems ({} particles), {} point lights",
            self.graph.len(),
            self.particles.len(),
            self.particles.particle_count(),
            self.rig.light_count(),
        );

        Ok(BuiltScene {
            graph: self.graph,
            particles: self.particles,
            rig: self.rig,
            handles,
        })
    }

    /// Parent for interior parts: the cabin group if present, else the root
    pub(super) fn interior(&self) -> NodeKey {
        self.cabin.unwrap_or_else(|| self.graph.root())
    }

    pub(super) fn add_group(
        &mut self,
        parent: NodeKey,
        name: &str,
        transform: Transform,
    ) -> Result<NodeKey, SceneError> {
        self.graph.add_child(parent, SceneNode::group(name).with_transform(transform))
    }

    pub(super) fn add_mesh(
        &mut self,
        parent: NodeKey,
        name: &str,
        mesh: &Arc<MeshData>,
        material: Material,
        transform: Transform,
    ) -> Result<NodeKey, SceneError> {
        self.graph.add_child(
            parent,
            SceneNode::mesh(name, Arc::clone(mesh), material).with_transform(transform),
        )
    }

    /// Anchor a point light under `parent`; its world position is resolved in
    /// [`Self::build`]
    pub(super) fn add_light(
        &mut self,
        parent: NodeKey,
        name: &str,
        local_position: Vec3,
        light: LightSource,
    ) -> Result<LightKey, SceneError> {
        let key = self.rig.add_light(light);
        self.graph.add_child(
            parent,
            SceneNode::group(name)
                .with_transform(Transform::from_position(local_position))
                .with_content(NodeContent::Light(key)),
        )?;
        Ok(key)
    }

    /// Spawn a particle system and anchor it under `parent`
    pub(super) fn add_emitter(
        &mut self,
        parent: NodeKey,
        name: &str,
        local_position: Vec3,
        config: ParticleSystemConfig,
    ) -> Result<ParticleKey, SceneBuildError> {
        let system = ParticleSystem::spawn(config, &mut self.rng)?;
        let key = self.particles.insert(system);
        self.graph.add_child(
            parent,
            SceneNode::group(name)
                .with_transform(Transform::from_position(local_position))
                .with_content(NodeContent::Particles(key)),
        )?;
        Ok(key)
    }

    /// Uniform in `[0, 1)`
    pub(super) fn random(&mut self) -> f32 {
        self.rng.random_range(0.0..1.0)
    }

    /// Uniform in `[-spread / 2, spread / 2)`
    pub(super) fn spread(&mut self, spread: f32) -> f32 {
        (self.random() - 0.5) * spread
    }
}

/// Wrap a generated mesh for sharing between nodes
#[inline]
pub(super) fn shared(mesh: MeshData) -> Arc<MeshData> {
    Arc::new(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Handle;

    fn scene() -> BuiltScene {
        cozy_cabin(42).unwrap()
    }

    #[test]
    fn test_missing_parts_are_reported() {
        let result = SceneBuilder::new(1).add_ground().unwrap().build();
        assert!(matches!(result, Err(SceneBuildError::MissingPart(_))));
    }

    #[test]
    fn test_every_handle_resolves() {
        let scene = scene();
        for name in SceneHandles::NAMES {
            assert!(scene.handles.resolve(name).is_some(), "{} did not resolve", name);
        }
        assert!(scene.handles.resolve("teapot").is_none());
    }

    #[test]
    fn test_node_handles_point_into_the_graph() {
        let scene = scene();
        let head = scene.handles.character_head;
        let ears = scene.handles.character_ears;
        assert!(scene.graph.contains(head));
        assert!(scene.graph.is_descendant_of(ears, head));
        assert_eq!(scene.graph.get(head).unwrap().transform().position, Vec3::new(0.25, 0.6, 0.0));
    }

    #[test]
    fn test_emitter_counts() {
        let scene = scene();
        let handles = &scene.handles;
        assert_eq!(handles.stove_fire_particles.len(), 6);
        assert_eq!(handles.campfire_flame_particles.len(), 4);

        for key in &handles.stove_fire_particles {
            assert_eq!(scene.particles.get(*key).unwrap().len(), 35);
        }
        for key in &handles.campfire_flame_particles {
            assert_eq!(scene.particles.get(*key).unwrap().len(), 20);
        }
        assert_eq!(scene.particles.get(handles.campfire_smoke).unwrap().len(), 25);
        assert_eq!(scene.particles.particle_count(), 6 * 35 + 4 * 20 + 25);

        match handles.resolve("campfire_smoke") {
            Some(Handle::Particles(keys)) => assert_eq!(keys, &[handles.campfire_smoke]),
            other => panic!("unexpected handle {:?}", other),
        }
    }

    #[test]
    fn test_light_positions_are_resolved_to_world_space() {
        let scene = scene();
        let stove = scene.rig.get(scene.handles.stove_light).unwrap();
        let lamp = scene.rig.get(scene.handles.lamp_light).unwrap();
        let campfire = scene.rig.get(scene.handles.campfire_light).unwrap();

        assert!((stove.position - Vec3::new(2.0, 1.5, -2.5)).length() < 1e-5);
        assert!((lamp.position - Vec3::new(0.5, 1.5, 0.3)).length() < 1e-5);
        assert!((campfire.position - Vec3::new(-5.0, 0.9, 5.0)).length() < 1e-5);
        assert_eq!(scene.rig.light_count(), 3);
    }

    #[test]
    fn test_same_seed_builds_same_scene() {
        let a = cozy_cabin(7).unwrap();
        let b = cozy_cabin(7).unwrap();
        assert_eq!(a.graph.len(), b.graph.len());

        let first = |scene: &BuiltScene| {
            let key = scene.handles.stove_fire_particles[0];
            scene.particles.get(key).unwrap().positions().to_vec()
        };
        assert_eq!(first(&a), first(&b));
    }

    #[test]
    fn test_particles_spawn_inside_their_volumes() {
        let scene = scene();
        for (_key, system) in scene.particles.iter() {
            let volume = system.config().spawn_volume;
            for p in system.positions() {
                assert!(volume.contains(*p), "{:?} outside {:?}", p, volume);
            }
        }
    }
}
