//! Outdoor parts: ground, forest ring, rocks and the campfire

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use hearth_core::{BlendMode, Color, LightSource, Material, ParticleSystemConfig, Transform, Vec3, Volume};
use hearth_math::primitives::{circle, cone, cylinder, dodecahedron};

use super::scene_builder::{shared, SceneBuildError, SceneBuilder};

/// Tree placements as `(x, z, scale)`
const TREES: [(f32, f32, f32); 16] = [
    (-10.0, -9.0, 1.3),
    (-7.0, -11.0, 1.1),
    (-12.0, -6.0, 1.4),
    (-9.0, -13.0, 1.0),
    (9.0, -9.0, 1.2),
    (7.0, -11.0, 1.4),
    (11.0, -7.0, 1.1),
    (10.0, -12.0, 1.0),
    (-9.0, 10.0, 1.3),
    (-11.0, 12.0, 1.2),
    (8.0, 11.0, 1.1),
    (11.0, 9.0, 1.3),
    (6.0, 9.0, 0.9),
    (-6.0, 11.0, 1.0),
    (13.0, 7.0, 1.2),
    (-13.0, 8.0, 1.1),
];

const FOLIAGE_COLORS: [u32; 3] = [0x4a6a35, 0x5a7a45, 0x3a5a2a];
const FLAME_COLORS: [u32; 4] = [0xff6a00, 0xff8c00, 0xffa500, 0xffd700];
const FLAME_PARTICLES: usize = 20;
const SMOKE_PARTICLES: usize = 25;

impl SceneBuilder {
    /// Add the ground disc under everything
    pub fn add_ground(mut self) -> Result<Self, SceneBuildError> {
        let root = self.graph.root();
        self.add_mesh(
            root,
            "ground",
            &shared(circle(30.0, 32)),
            Material::from_hex(0x3a4a3f),
            Transform::identity().with_rotation(-FRAC_PI_2, 0.0, 0.0),
        )?;
        Ok(self)
    }

    /// Add the ring of trees and scattered rocks around the cabin
    pub fn add_forest(mut self) -> Result<Self, SceneBuildError> {
        let root = self.graph.root();

        for (x, z, scale) in TREES {
            let tree = self.add_group(root, "tree", Transform::at(x, 0.0, z))?;
            self.add_mesh(
                tree,
                "tree_trunk",
                &shared(cylinder(0.18 * scale, 0.22 * scale, 1.8 * scale, 8, false).flat_shaded()),
                Material::from_hex(0x4a3f38),
                Transform::at(0.0, 0.9 * scale, 0.0),
            )?;
            for (i, color) in FOLIAGE_COLORS.into_iter().enumerate() {
                let i = i as f32;
                let size = (1.4 - i * 0.3) * scale;
                self.add_mesh(
                    tree,
                    "tree_foliage",
                    &shared(cone(size, size * 1.6, 7, false).flat_shaded()),
                    Material::from_hex(color),
                    Transform::at(0.0, 1.5 * scale + i * 0.7 * scale, 0.0).with_rotation(0.0, i * 0.5, 0.0),
                )?;
            }
        }

        for i in 0..8 {
            let angle = i as f32 / 8.0 * TAU;
            let distance = 8.0 + self.random() * 4.0;
            let radius = 0.3 + self.random() * 0.3;
            let rotation = Vec3::new(self.random() * PI, self.random() * PI, self.random() * PI);
            self.add_mesh(
                root,
                "rock",
                &shared(dodecahedron(radius)),
                Material::from_hex(0x5a5a5a),
                Transform::at(angle.cos() * distance, 0.15, angle.sin() * distance)
                    .with_rotation(rotation.x, rotation.y, rotation.z),
            )?;
        }

        Ok(self)
    }

    /// Add the campfire: stone ring, logs, flickering light, flames and smoke
    pub fn add_campfire(mut self) -> Result<Self, SceneBuildError> {
        let root = self.graph.root();
        let campfire = self.add_group(root, "campfire", Transform::at(-5.0, 0.1, 5.0))?;

        for i in 0..10 {
            let angle = i as f32 / 10.0 * TAU;
            let radius = 0.2 + self.random() * 0.15;
            let x = angle.cos() * 1.2 + self.spread(0.2);
            let z = angle.sin() * 1.2 + self.spread(0.2);
            let rotation = Vec3::new(self.random() * PI, self.random() * PI, self.random() * PI);
            self.add_mesh(
                campfire,
                "campfire_stone",
                &shared(dodecahedron(radius)),
                Material::from_hex(0x4a4a4a),
                Transform::at(x, 0.1, z).with_rotation(rotation.x, rotation.y, rotation.z),
            )?;
        }

        let log = shared(cylinder(0.1, 0.1, 1.5, 8, false));
        for i in 0..4 {
            let angle = i as f32 / 4.0 * TAU + FRAC_PI_4;
            // Lean inward, facing the center
            self.add_mesh(
                campfire,
                "campfire_log",
                &log,
                Material::from_hex(0x4d3a2a),
                Transform::at(angle.cos() * 0.4, 0.6, angle.sin() * 0.4).with_rotation(0.0, -angle, FRAC_PI_2 - 0.4),
            )?;
        }

        let light = LightSource::new(Color::from_hex(0xff7a00), 1.8, Vec3::ZERO, 15.0)
            .with_flicker(0.5, 6.0, 0.4)
            .with_hue_swap(1.0, 0.5, Color::from_hex(0xff7a00), Color::from_hex(0xff6a00));
        let key = self.add_light(campfire, "campfire_light", Vec3::new(0.0, 0.8, 0.0), light)?;
        self.handles.campfire_light = Some(key);

        for hex in FLAME_COLORS {
            let config = ParticleSystemConfig {
                capacity: FLAME_PARTICLES,
                spawn_volume: Volume::new(Vec3::new(-0.3, 0.0, -0.3), Vec3::new(0.3, 1.5, 0.3)),
                reset_volume: Volume::new(Vec3::new(-0.3, 0.0, -0.3), Vec3::new(0.3, 0.5, 0.3)),
                rise_rate: (0.6, 1.2),
                jitter: (0.3, 0.3),
                recycle_height: 2.0,
                color: Color::from_hex(hex),
                size: 0.15,
                opacity: 0.9,
                blend_mode: BlendMode::Additive,
            };
            let key = self.add_emitter(campfire, "campfire_flame", Vec3::ZERO, config)?;
            self.handles.campfire_flame_particles.push(key);
        }

        let smoke = ParticleSystemConfig {
            capacity: SMOKE_PARTICLES,
            spawn_volume: Volume::new(Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 3.0, 0.5)),
            reset_volume: Volume::new(Vec3::new(-0.5, 0.0, -0.5), Vec3::new(0.5, 0.5, 0.5)),
            rise_rate: (0.48, 0.6),
            jitter: (0.24, 0.06),
            recycle_height: 4.0,
            color: Color::from_hex(0x666666),
            size: 0.3,
            opacity: 0.25,
            blend_mode: BlendMode::Normal,
        };
        let key = self.add_emitter(campfire, "campfire_smoke", Vec3::new(0.0, 1.0, 0.0), smoke)?;
        self.handles.campfire_smoke = Some(key);

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::NodeContent;

    fn count_named(builder: &SceneBuilder, name: &str) -> usize {
        builder.graph.iter().filter(|(_, node)| node.name == name).count()
    }

    #[test]
    fn test_forest_counts() {
        let builder = SceneBuilder::new(9).add_forest().unwrap();
        assert_eq!(count_named(&builder, "tree"), 16);
        assert_eq!(count_named(&builder, "tree_foliage"), 48);
        assert_eq!(count_named(&builder, "rock"), 8);
    }

    #[test]
    fn test_rocks_lie_on_the_ring() {
        let builder = SceneBuilder::new(9).add_forest().unwrap();
        for (key, node) in builder.graph.iter() {
            if node.name == "rock" {
                let p = builder.graph.world_position(key).unwrap();
                let r = (p.x * p.x + p.z * p.z).sqrt();
                assert!((8.0 - 1e-4..=12.0 + 1e-4).contains(&r), "rock at radius {}", r);
            }
        }
    }

    #[test]
    fn test_campfire_emitters() {
        let builder = SceneBuilder::new(9).add_campfire().unwrap();
        assert_eq!(builder.handles.campfire_flame_particles.len(), 4);
        assert_eq!(count_named(&builder, "campfire_stone"), 10);
        assert_eq!(count_named(&builder, "campfire_log"), 4);

        let smoke = builder.handles.campfire_smoke.unwrap();
        let config = builder.particles.get(smoke).unwrap().config();
        assert_eq!(config.blend_mode, BlendMode::Normal);

        let anchor = builder
            .graph
            .iter()
            .find(|(_, node)| matches!(node.content, NodeContent::Particles(k) if k == smoke))
            .map(|(key, _)| key)
            .unwrap();
        let world = builder.graph.world_position(anchor).unwrap();
        assert!((world - Vec3::new(-5.0, 1.1, 5.0)).length() < 1e-5);
    }
}
