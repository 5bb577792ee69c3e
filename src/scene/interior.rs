//! Cabin interior: structure, furniture, the stove and its fire

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use hearth_core::{BlendMode, Color, LightSource, Material, NodeKey, ParticleSystemConfig, Transform, Vec3, Volume};
use hearth_math::primitives::{circle, cone, cuboid, cylinder, plane, sphere, torus};

use super::scene_builder::{shared, SceneBuildError, SceneBuilder};

/// Stove fire palette, one emitter per color
const STOVE_FIRE_COLORS: [u32; 6] = [0xff5522, 0xff7733, 0xffaa33, 0xffcc44, 0xffdd66, 0xffffaa];
const STOVE_FIRE_PARTICLES: usize = 35;

const LEAF_GREEN: u32 = 0x5a7a45;
const DARK_WOOD: u32 = 0x4a3a2a;
const BEAM_WOOD: u32 = 0x5a4a38;

impl SceneBuilder {
    /// Add the cabin group with everything inside it, including the stove
    /// light, the lamp light and the stove fire emitters
    pub fn add_cabin(mut self) -> Result<Self, SceneBuildError> {
        let root = self.graph.root();
        let cabin = self.add_group(root, "cabin", Transform::identity())?;
        self.cabin = Some(cabin);

        self.add_structure(cabin)?;
        self.add_window(cabin)?;
        self.add_stove(cabin)?;
        self.add_stove_fire(cabin)?;
        self.add_basket(cabin)?;
        self.add_bed(cabin)?;
        self.add_table(cabin)?;
        self.add_chair(cabin)?;
        self.add_shelf(cabin)?;
        self.add_floor_plant(cabin)?;

        let rug = shared(circle(1.3, 32));
        self.add_mesh(
            cabin,
            "rug",
            &rug,
            Material::from_hex(0x8a7060),
            Transform::at(0.8, 0.03, 0.5).with_rotation(-FRAC_PI_2, 0.0, 0.0),
        )?;

        Ok(self)
    }

    fn add_structure(&mut self, cabin: NodeKey) -> Result<(), SceneBuildError> {
        let floor = shared(plane(7.0, 7.0));
        self.add_mesh(
            cabin,
            "floor",
            &floor,
            Material::from_hex(0x7a5f47),
            Transform::at(0.0, 0.01, 0.0).with_rotation(-FRAC_PI_2, 0.0, 0.0),
        )?;

        let plank = shared(plane(7.0, 0.45));
        for i in 0..14 {
            let color = if i % 2 == 0 { 0x7a5f47 } else { 0x6f5440 };
            self.add_mesh(
                cabin,
                "plank",
                &plank,
                Material::from_hex(color),
                Transform::at(0.0, 0.02, -3.5 + i as f32 * 0.5).with_rotation(-FRAC_PI_2, 0.0, 0.0),
            )?;
        }

        let wall = Material::from_hex(0x5a4f45);
        self.add_mesh(cabin, "back_wall", &shared(cuboid(7.0, 5.0, 0.25)), wall, Transform::at(0.0, 2.5, -3.5))?;
        self.add_mesh(cabin, "left_wall", &shared(cuboid(0.25, 5.0, 7.0)), wall, Transform::at(-3.5, 2.5, 0.0))?;

        self.add_mesh(
            cabin,
            "ceiling",
            &shared(cuboid(7.5, 0.25, 7.5)),
            Material::from_hex(0x4a3f38),
            Transform::at(0.0, 5.0, 0.0),
        )?;

        let beam = shared(cuboid(0.2, 0.3, 7.5));
        for i in 0..3 {
            self.add_mesh(
                cabin,
                "beam",
                &beam,
                Material::from_hex(BEAM_WOOD),
                Transform::at(-2.0 + i as f32 * 2.0, 4.85, 0.0),
            )?;
        }

        Ok(())
    }

    fn add_window(&mut self, cabin: NodeKey) -> Result<(), SceneBuildError> {
        let window = self.add_group(cabin, "window", Transform::at(1.5, 2.8, -3.37))?;

        self.add_mesh(
            window,
            "window_frame",
            &shared(cuboid(2.2, 2.2, 0.18)),
            Material::from_hex(BEAM_WOOD),
            Transform::identity(),
        )?;
        self.add_mesh(
            window,
            "window_glass",
            &shared(cuboid(1.9, 1.9, 0.12)),
            Material::from_hex(0x2a3f5a).with_opacity(0.35).with_emissive(0x1a2f4a, 0.4),
            Transform::at(0.0, 0.0, 0.02),
        )?;

        let bar = Material::from_hex(0x4a3f38);
        self.add_mesh(window, "window_bar", &shared(cuboid(0.1, 1.9, 0.1)), bar, Transform::at(0.0, 0.0, 0.05))?;
        self.add_mesh(window, "window_bar", &shared(cuboid(1.9, 0.1, 0.1)), bar, Transform::at(0.0, 0.0, 0.05))?;

        self.add_mesh(
            cabin,
            "window_sill",
            &shared(cuboid(2.4, 0.15, 0.35)),
            Material::from_hex(BEAM_WOOD),
            Transform::at(1.5, 1.7, -3.25),
        )?;
        self.add_mesh(
            cabin,
            "sill_pot",
            &shared(cylinder(0.15, 0.12, 0.2, 12, false)),
            Material::from_hex(0x6a5040),
            Transform::at(1.5, 1.87, -3.15),
        )?;

        let leaf = shared(sphere(0.12, 8, 8));
        for i in 0..4 {
            let angle = i as f32 / 4.0 * TAU;
            let y = 2.05 + self.random() * 0.08;
            self.add_mesh(
                cabin,
                "sill_leaf",
                &leaf,
                Material::from_hex(LEAF_GREEN),
                Transform::at(1.5 + angle.cos() * 0.12, y, -3.15 + angle.sin() * 0.12).with_scale(0.8, 1.5, 0.5),
            )?;
        }

        Ok(())
    }

    fn add_stove(&mut self, cabin: NodeKey) -> Result<(), SceneBuildError> {
        let stove = self.add_group(cabin, "stove", Transform::at(2.0, 0.0, -2.5))?;
        let iron = Material::from_hex(0x1a1a1a);

        self.add_mesh(stove, "stove_body", &shared(cuboid(0.9, 1.3, 0.7)), iron, Transform::at(0.0, 0.65, 0.0))?;
        self.add_mesh(
            stove,
            "stove_top",
            &shared(cuboid(1.0, 0.08, 0.75)),
            Material::from_hex(0x0a0a0a),
            Transform::at(0.0, 1.32, 0.0),
        )?;
        self.add_mesh(
            stove,
            "chimney",
            &shared(cylinder(0.18, 0.18, 2.8, 12, false)),
            iron,
            Transform::at(0.0, 2.7, 0.0),
        )?;
        self.add_mesh(
            stove,
            "stove_door",
            &shared(cuboid(0.6, 0.6, 0.08)),
            Material::from_hex(0xff4422).with_emissive(0xff3300, 1.5),
            Transform::at(0.0, 0.6, 0.36),
        )?;
        self.add_mesh(
            stove,
            "stove_glow",
            &shared(plane(0.7, 0.7)),
            Material::from_hex(0xff5522).with_opacity(0.3).with_emissive(0xff5522, 1.0),
            Transform::at(0.0, 0.6, 0.4),
        )?;
        self.add_mesh(
            stove,
            "stove_handle",
            &shared(torus(0.08, 0.02, 8, 12, TAU)),
            Material::from_hex(0x8b7355),
            Transform::at(0.2, 0.6, 0.42).with_rotation(FRAC_PI_2, 0.0, 0.0),
        )?;

        let leg = shared(cylinder(0.06, 0.05, 0.35, 8, false));
        for i in 0..4 {
            let angle = i as f32 / 4.0 * TAU + FRAC_PI_4;
            self.add_mesh(
                stove,
                "stove_leg",
                &leg,
                iron,
                Transform::at(angle.cos() * 0.35, 0.175, angle.sin() * 0.28),
            )?;
        }

        let light = LightSource::new(Color::from_hex(0xff7744), 2.5, Vec3::ZERO, 12.0)
            .with_flicker(0.4, 4.5, 0.3)
            .with_hue_swap(1.0, 0.5, Color::from_hex(0xff6b35), Color::from_hex(0xff7744));
        let key = self.add_light(cabin, "stove_light", Vec3::new(2.0, 1.5, -2.5), light)?;
        self.handles.stove_light = Some(key);

        Ok(())
    }

    /// One emitter per palette color, all rising out of the stove door
    fn add_stove_fire(&mut self, cabin: NodeKey) -> Result<(), SceneBuildError> {
        let center = Vec3::new(2.0, 0.0, -2.5);
        for hex in STOVE_FIRE_COLORS {
            let config = ParticleSystemConfig {
                capacity: STOVE_FIRE_PARTICLES,
                spawn_volume: Volume::new(
                    Vec3::new(center.x - 0.2, 0.5, center.z - 0.125),
                    Vec3::new(center.x + 0.2, 1.8, center.z + 0.125),
                ),
                reset_volume: Volume::new(
                    Vec3::new(center.x - 0.2, 0.5, center.z - 0.125),
                    Vec3::new(center.x + 0.2, 0.5, center.z + 0.125),
                ),
                rise_rate: (0.84, 1.68),
                jitter: (0.3, 0.0),
                recycle_height: 2.5,
                color: Color::from_hex(hex),
                size: 0.12,
                opacity: 0.8,
                blend_mode: BlendMode::Additive,
            };
            let key = self.add_emitter(cabin, "stove_fire", Vec3::ZERO, config)?;
            self.handles.stove_fire_particles.push(key);
        }
        Ok(())
    }

    fn add_basket(&mut self, cabin: NodeKey) -> Result<(), SceneBuildError> {
        let basket = self.add_group(cabin, "basket", Transform::at(2.8, 0.0, -1.8))?;
        self.add_mesh(
            basket,
            "basket_body",
            &shared(cylinder(0.35, 0.3, 0.4, 12, false)),
            Material::from_hex(0x5a4530),
            Transform::at(0.0, 0.2, 0.0),
        )?;

        let log = shared(cylinder(0.08, 0.08, 0.5, 8, false));
        for i in 0..4 {
            let rotation = Vec3::new(self.random() * 0.5, self.random() * PI, self.random() * 0.5);
            let x = self.spread(0.2);
            let z = self.spread(0.2);
            self.add_mesh(
                basket,
                "firewood",
                &log,
                Material::from_hex(DARK_WOOD),
                Transform::at(x, 0.25 + i as f32 * 0.08, z).with_rotation(rotation.x, rotation.y, rotation.z),
            )?;
        }
        Ok(())
    }

    fn add_bed(&mut self, cabin: NodeKey) -> Result<(), SceneBuildError> {
        let bed = self.add_group(cabin, "bed", Transform::at(-1.8, 0.0, 1.2).with_rotation(0.0, FRAC_PI_2, 0.0))?;

        self.add_mesh(
            bed,
            "bed_frame",
            &shared(cuboid(2.2, 0.35, 1.6)),
            Material::from_hex(DARK_WOOD),
            Transform::at(0.0, 0.175, 0.0),
        )?;
        self.add_mesh(
            bed,
            "mattress",
            &shared(cuboid(2.1, 0.35, 1.5)),
            Material::from_hex(0x8a7a6a),
            Transform::at(0.0, 0.525, 0.0),
        )?;
        self.add_mesh(
            bed,
            "blanket",
            &shared(cuboid(2.0, 0.18, 1.3)),
            Material::from_hex(0xaa8860),
            Transform::at(0.1, 0.78, 0.1),
        )?;

        let pillow = shared(cuboid(0.5, 0.2, 0.45));
        for i in 0..2 {
            self.add_mesh(
                bed,
                "pillow",
                &pillow,
                Material::from_hex(0xc0a585),
                Transform::at(-0.7, 0.8, -0.25 + i as f32 * 0.5).with_rotation(0.0, 0.0, 0.1),
            )?;
        }

        let leg = shared(cylinder(0.08, 0.08, 0.35, 8, false));
        for (x, z) in [(-1.0, -0.7), (1.0, -0.7), (-1.0, 0.7), (1.0, 0.7)] {
            self.add_mesh(bed, "bed_leg", &leg, Material::from_hex(0x3d3025), Transform::at(x, 0.175, z))?;
        }
        Ok(())
    }

    fn add_table(&mut self, cabin: NodeKey) -> Result<(), SceneBuildError> {
        let table = self.add_group(cabin, "table", Transform::at(0.5, 0.0, 0.3))?;
        let stand = Material::from_hex(0x4f3f2f);

        self.add_mesh(
            table,
            "table_top",
            &shared(cylinder(0.7, 0.7, 0.12, 24, false)),
            Material::from_hex(0x5a4a3a),
            Transform::at(0.0, 0.85, 0.0),
        )?;
        self.add_mesh(
            table,
            "table_pedestal",
            &shared(cylinder(0.12, 0.18, 0.8, 12, false)),
            stand,
            Transform::at(0.0, 0.4, 0.0),
        )?;
        self.add_mesh(
            table,
            "table_base",
            &shared(cylinder(0.4, 0.4, 0.08, 16, false)),
            stand,
            Transform::at(0.0, 0.04, 0.0),
        )?;

        let lamp = self.add_group(table, "lamp", Transform::at(0.5, 0.92, 0.3))?;
        let metal = Material::from_hex(0x3a3a3a);
        self.add_mesh(
            lamp,
            "lamp_base",
            &shared(cylinder(0.12, 0.12, 0.05, 12, false)),
            metal,
            Transform::identity(),
        )?;
        self.add_mesh(
            lamp,
            "lamp_pole",
            &shared(cylinder(0.02, 0.02, 0.5, 8, false)),
            metal,
            Transform::at(0.0, 0.25, 0.0),
        )?;
        self.add_mesh(
            lamp,
            "lamp_shade",
            &shared(cone(0.2, 0.25, 12, true)),
            Material::from_hex(0xffe4b5)
                .with_emissive(0xffaa66, 0.8)
                .with_opacity(0.9)
                .double_sided(),
            Transform::at(0.0, 0.55, 0.0),
        )?;

        let light = LightSource::new(Color::from_hex(0xffddaa), 1.2, Vec3::ZERO, 7.0).with_flicker(0.1, 2.0, 0.0);
        let key = self.add_light(cabin, "lamp_light", Vec3::new(0.5, 1.5, 0.3), light)?;
        self.handles.lamp_light = Some(key);

        let cup = self.add_group(table, "cup", Transform::at(-0.35, 0.98, 0.15))?;
        let clay = Material::from_hex(0x4a3a3a);
        self.add_mesh(cup, "cup_body", &shared(cylinder(0.1, 0.08, 0.14, 16, false)), clay, Transform::identity())?;
        self.add_mesh(
            cup,
            "cup_handle",
            &shared(torus(0.06, 0.015, 8, 12, PI)),
            clay,
            Transform::at(0.1, 0.0, 0.0).with_rotation(0.0, -FRAC_PI_2, 0.0),
        )?;

        self.add_mesh(
            table,
            "table_book",
            &shared(cuboid(0.3, 0.04, 0.4)),
            Material::from_hex(0x5a3a2a),
            Transform::at(-0.2, 0.93, -0.2).with_rotation(0.0, 0.3, 0.0),
        )?;
        Ok(())
    }

    fn add_chair(&mut self, cabin: NodeKey) -> Result<(), SceneBuildError> {
        let chair = self.add_group(cabin, "chair", Transform::at(-0.4, 0.0, 1.2).with_rotation(0.0, -PI / 5.0, 0.0))?;
        let wood = Material::from_hex(0x5a4a3a);

        self.add_mesh(chair, "chair_seat", &shared(cuboid(0.55, 0.1, 0.55)), wood, Transform::at(0.0, 0.55, 0.0))?;
        self.add_mesh(chair, "chair_back", &shared(cuboid(0.55, 0.7, 0.1)), wood, Transform::at(0.0, 0.95, -0.225))?;

        let slat = shared(cuboid(0.08, 0.5, 0.08));
        for i in 0..3 {
            self.add_mesh(
                chair,
                "chair_slat",
                &slat,
                Material::from_hex(0x4f3f2f),
                Transform::at(-0.15 + i as f32 * 0.15, 0.95, -0.22),
            )?;
        }

        let leg = shared(cylinder(0.04, 0.04, 0.55, 8, false));
        for (x, z) in [(-0.22, -0.22), (0.22, -0.22), (-0.22, 0.22), (0.22, 0.22)] {
            self.add_mesh(chair, "chair_leg", &leg, Material::from_hex(DARK_WOOD), Transform::at(x, 0.275, z))?;
        }
        Ok(())
    }

    fn add_shelf(&mut self, cabin: NodeKey) -> Result<(), SceneBuildError> {
        let shelf = self.add_group(cabin, "shelf", Transform::at(-1.5, 2.5, -3.3))?;
        self.add_mesh(
            shelf,
            "shelf_board",
            &shared(cuboid(1.8, 0.1, 0.35)),
            Material::from_hex(DARK_WOOD),
            Transform::identity(),
        )?;

        let bracket = shared(cuboid(0.08, 0.35, 0.3));
        for x in [-0.7, 0.7] {
            self.add_mesh(
                shelf,
                "shelf_bracket",
                &bracket,
                Material::from_hex(0x3d3025),
                Transform::at(x, -0.175, 0.0),
            )?;
        }

        let pot = shared(cylinder(0.12, 0.1, 0.18, 12, false));
        let leaf = shared(sphere(0.08, 8, 8));
        for x in [-0.6, 0.5] {
            self.add_mesh(
                cabin,
                "shelf_pot",
                &pot,
                Material::from_hex(DARK_WOOD),
                Transform::at(-1.5 + x, 2.64, -3.2),
            )?;
            for i in 0..3 {
                let angle = i as f32 / 3.0 * TAU;
                let y = 2.75 + self.random() * 0.05;
                self.add_mesh(
                    cabin,
                    "shelf_leaf",
                    &leaf,
                    Material::from_hex(LEAF_GREEN),
                    Transform::at(-1.5 + x + angle.cos() * 0.1, y, -3.2 + angle.sin() * 0.1).with_scale(0.7, 1.3, 0.4),
                )?;
            }
        }

        let book = shared(cuboid(0.15, 0.25, 0.2));
        for (x, color) in [(-0.2, 0x5a3a2a), (0.0, 0x4a3028)] {
            self.add_mesh(cabin, "shelf_book", &book, Material::from_hex(color), Transform::at(-1.5 + x, 2.67, -3.2))?;
        }
        Ok(())
    }

    fn add_floor_plant(&mut self, cabin: NodeKey) -> Result<(), SceneBuildError> {
        let plant = self.add_group(cabin, "floor_plant", Transform::at(-2.5, 0.0, -1.2))?;
        self.add_mesh(
            plant,
            "plant_pot",
            &shared(cylinder(0.25, 0.2, 0.35, 12, false)),
            Material::from_hex(DARK_WOOD),
            Transform::at(0.0, 0.175, 0.0),
        )?;

        let stem = shared(cylinder(0.02, 0.02, 0.6, 6, false));
        let leaf = shared(sphere(0.14, 8, 8));
        for i in 0..6 {
            let angle = i as f32 / 6.0 * TAU;
            let (s, c) = angle.sin_cos();
            self.add_mesh(
                plant,
                "plant_stem",
                &stem,
                Material::from_hex(0x4a6a35),
                Transform::at(c * 0.12, 0.5, s * 0.12).with_rotation(c * 0.3, 0.0, s * 0.3),
            )?;
            self.add_mesh(
                plant,
                "plant_leaf",
                &leaf,
                Material::from_hex(LEAF_GREEN),
                Transform::at(c * 0.2, 0.75, s * 0.2).with_scale(0.9, 1.8, 0.5),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cabin_without_character_is_incomplete() {
        let builder = SceneBuilder::new(3).add_cabin().unwrap();
        assert!(builder.cabin.is_some());
        assert_eq!(builder.handles.stove_fire_particles.len(), STOVE_FIRE_COLORS.len());
        assert!(builder.handles.stove_light.is_some());
        assert!(builder.handles.lamp_light.is_some());
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_stove_fire_stays_under_recycle_height() {
        let builder = SceneBuilder::new(5).add_cabin().unwrap();
        for key in &builder.handles.stove_fire_particles {
            let config = builder.particles.get(*key).unwrap().config();
            assert_eq!(config.spawn_volume.min.y, 0.5);
            assert_eq!(config.recycle_height, 2.5);
            assert_eq!(config.blend_mode, BlendMode::Additive);
        }
    }

    #[test]
    fn test_translucent_parts() {
        let builder = SceneBuilder::new(5).add_cabin().unwrap();
        let translucent: Vec<&str> = builder
            .graph
            .iter()
            .filter_map(|(_, node)| match &node.content {
                hearth_core::NodeContent::Mesh(d) if d.material.is_translucent() => Some(node.name.as_str()),
                _ => None,
            })
            .collect();
        assert!(translucent.contains(&"window_glass"));
        assert!(translucent.contains(&"stove_glow"));
        assert!(translucent.contains(&"lamp_shade"));
    }
}
