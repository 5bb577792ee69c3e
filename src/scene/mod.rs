//! Scene construction
//!
//! The diorama is built once by [`SceneBuilder`]; after that only the parts
//! reachable through [`SceneHandles`] change.

mod character;
mod exterior;
mod handles;
mod interior;
mod scene_builder;

pub use character::CharacterPose;
pub use handles::{Handle, SceneHandles};
pub use scene_builder::{cozy_cabin, BuiltScene, SceneBuildError, SceneBuilder};
