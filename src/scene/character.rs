//! The cat by the table, and its idle animation
//!
//! The head group (with the ears group inside it) is the only part of the
//! scene whose transform changes after construction.

use std::f32::consts::{FRAC_PI_2, PI};

use hearth_core::{Material, NodeKey, SceneGraph, Transform, Vec3};
use hearth_math::primitives::{circle, cone, cylinder, sphere, tube};

use super::handles::SceneHandles;
use super::scene_builder::{shared, SceneBuildError, SceneBuilder};

const MAIN_FUR: u32 = 0x8b6347;
const BELLY_FUR: u32 = 0xa0826d;
const NOSE_PINK: u32 = 0xd4a5a5;

/// Resting height of the head group above the cat's origin
const HEAD_HEIGHT: f32 = 0.6;

impl SceneBuilder {
    /// Add the cat, with its head and ears registered for animation
    pub fn add_character(mut self) -> Result<Self, SceneBuildError> {
        let parent = self.interior();
        let cat = self.add_group(
            parent,
            "cat",
            Transform::at(1.2, 0.03, 0.6).with_rotation(0.0, -PI / 8.0, 0.0),
        )?;

        let fur = Material::from_hex(MAIN_FUR);
        let belly_fur = Material::from_hex(BELLY_FUR);

        self.add_mesh(
            cat,
            "cat_body",
            &shared(sphere(0.35, 16, 16)),
            fur,
            Transform::at(0.0, 0.35, 0.0).with_scale(1.0, 0.9, 1.1),
        )?;
        self.add_mesh(
            cat,
            "cat_belly",
            &shared(sphere(0.28, 12, 12)),
            belly_fur,
            Transform::at(0.1, 0.25, 0.0).with_scale(1.0, 1.2, 0.9),
        )?;

        self.add_head(cat)?;

        let tail_points = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(-0.15, 0.1, -0.05),
            Vec3::new(-0.25, 0.25, -0.08),
            Vec3::new(-0.3, 0.4, -0.05),
        ];
        self.add_mesh(
            cat,
            "cat_tail",
            &shared(tube(&tail_points, 12, 0.08, 8)),
            fur,
            Transform::at(-0.25, 0.35, 0.05),
        )?;
        self.add_mesh(
            cat,
            "cat_tail_tip",
            &shared(sphere(0.09, 12, 12)),
            belly_fur,
            Transform::at(-0.55, 0.75, 0.0).with_scale(0.8, 1.0, 0.8),
        )?;

        let paw = shared(sphere(0.09, 12, 12));
        let pad = shared(sphere(0.06, 8, 8));
        for (x, z) in [(0.18, -0.2), (0.18, 0.2), (-0.15, -0.2), (-0.15, 0.2)] {
            self.add_mesh(cat, "cat_paw", &paw, fur, Transform::at(x, 0.09, z).with_scale(1.0, 0.7, 1.0))?;
            self.add_mesh(
                cat,
                "cat_paw_pad",
                &pad,
                Material::from_hex(0x6d5545),
                Transform::at(x + 0.02, 0.05, z).with_scale(1.0, 0.5, 0.9),
            )?;
        }

        self.add_headphones(cat)?;

        Ok(self)
    }

    fn add_head(&mut self, cat: NodeKey) -> Result<(), SceneBuildError> {
        let head = self.add_group(cat, "cat_head", Transform::at(0.25, HEAD_HEIGHT, 0.0))?;
        self.handles.character_head = Some(head);

        let fur = Material::from_hex(MAIN_FUR);
        self.add_mesh(
            head,
            "cat_head_sphere",
            &shared(sphere(0.32, 16, 16)),
            fur,
            Transform::identity().with_scale(1.05, 1.0, 1.0),
        )?;

        let muzzle = shared(sphere(0.14, 12, 12));
        for z in [-0.12, 0.12] {
            self.add_mesh(
                head,
                "cat_muzzle",
                &muzzle,
                Material::from_hex(BELLY_FUR),
                Transform::at(0.22, -0.08, z).with_scale(1.2, 0.9, 1.0),
            )?;
        }

        let ears = self.add_group(head, "cat_ears", Transform::identity())?;
        self.handles.character_ears = Some(ears);

        let outer = shared(cone(0.14, 0.3, 4, false));
        let inner = shared(cone(0.08, 0.18, 4, false));
        for (z, tilt) in [(-0.18, 0.25), (0.18, -0.25)] {
            self.add_mesh(
                ears,
                "cat_ear",
                &outer,
                fur,
                Transform::at(-0.02, 0.3, z).with_rotation(-0.2, 0.0, tilt),
            )?;
            self.add_mesh(
                ears,
                "cat_inner_ear",
                &inner,
                Material::from_hex(NOSE_PINK),
                Transform::at(0.02, 0.28, z).with_rotation(-0.2, 0.0, tilt),
            )?;
        }

        let eye = shared(sphere(0.08, 12, 12));
        let pupil = shared(sphere(0.045, 12, 12));
        for z in [-0.14, 0.14] {
            self.add_mesh(
                head,
                "cat_eye",
                &eye,
                Material::from_hex(0xffffff).with_emissive(0xffffff, 0.1),
                Transform::at(0.25, 0.06, z).with_scale(1.3, 1.1, 1.0),
            )?;
            self.add_mesh(
                head,
                "cat_pupil",
                &pupil,
                Material::from_hex(0x1a2f15).with_emissive(0x3a5f2e, 0.4),
                Transform::at(0.31, 0.06, z).with_scale(1.0, 1.5, 0.4),
            )?;
        }

        let highlight = shared(sphere(0.025, 8, 8));
        for z in [-0.13, 0.15] {
            self.add_mesh(
                head,
                "cat_eye_highlight",
                &highlight,
                Material::from_hex(0xffffff).with_emissive(0xffffff, 1.0),
                Transform::at(0.32, 0.09, z),
            )?;
        }

        self.add_mesh(
            head,
            "cat_nose",
            &shared(sphere(0.045, 8, 8)),
            Material::from_hex(NOSE_PINK).with_emissive(NOSE_PINK, 0.2),
            Transform::at(0.3, -0.05, 0.0).with_scale(1.0, 0.8, 0.7),
        )?;

        Ok(())
    }

    fn add_headphones(&mut self, cat: NodeKey) -> Result<(), SceneBuildError> {
        let plastic = Material::from_hex(0x2a2a2a);

        // Half circle of radius 0.35 in the XY plane, sampled at 25 points
        let band: Vec<Vec3> = (0..=24)
            .map(|i| {
                let angle = i as f32 / 24.0 * PI;
                Vec3::new(angle.cos() * 0.35, angle.sin() * 0.35, 0.0)
            })
            .collect();
        self.add_mesh(
            cat,
            "headband",
            &shared(tube(&band, 24, 0.03, 8)),
            plastic,
            Transform::at(0.25, 0.9, 0.0).with_rotation(0.0, FRAC_PI_2, FRAC_PI_2),
        )?;

        let cup = shared(cylinder(0.13, 0.13, 0.1, 16, false));
        let cushion = shared(cylinder(0.11, 0.11, 0.05, 16, false));
        let logo = shared(circle(0.03, 12));
        for side in [-1.0f32, 1.0] {
            self.add_mesh(
                cat,
                "headphone_cup",
                &cup,
                plastic,
                Transform::at(0.25, 0.6, side * 0.32).with_rotation(FRAC_PI_2, 0.0, 0.0),
            )?;
            self.add_mesh(
                cat,
                "headphone_cushion",
                &cushion,
                Material::from_hex(0x4a4a4a),
                Transform::at(0.25, 0.6, side * 0.36).with_rotation(FRAC_PI_2, 0.0, 0.0),
            )?;
            self.add_mesh(
                cat,
                "headphone_logo",
                &logo,
                Material::from_hex(0x8b7355),
                Transform::at(0.3, 0.6, side * 0.32).with_rotation(0.0, FRAC_PI_2, 0.0),
            )?;
        }

        Ok(())
    }
}

/// Head bob and ear wiggle at one instant
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterPose {
    /// Head group Euler rotation
    pub head_rotation: Vec3,
    /// Head group height
    pub head_height: f32,
    /// Ears group rotation about X
    pub ear_tilt: f32,
}

impl CharacterPose {
    /// Pose for animation time `time` (seconds of scaled time)
    pub fn at(time: f64) -> Self {
        let wave = |rate: f64| (time * rate).sin() as f32;
        let bob = wave(2.2);
        Self {
            head_rotation: Vec3::new(wave(1.8) * 0.06, 0.0, bob * 0.12),
            head_height: HEAD_HEIGHT + bob * 0.015,
            ear_tilt: wave(1.5) * 0.03,
        }
    }

    /// Write the pose into the head and ears nodes
    pub fn apply(&self, graph: &mut SceneGraph, handles: &SceneHandles) {
        if let Some(head) = graph.get_mut(handles.character_head) {
            let mut position = head.transform().position;
            position.y = self.head_height;
            head.set_position(position);
            head.set_rotation(self.head_rotation);
        }
        if let Some(ears) = graph.get_mut(handles.character_ears) {
            ears.set_rotation(Vec3::new(self.ear_tilt, 0.0, 0.0));
        }
    }
}
