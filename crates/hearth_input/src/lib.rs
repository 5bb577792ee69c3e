//! Input Handling
//!
//! This crate provides the orbit camera controller used to look around the
//! diorama: left-drag to orbit, wheel to zoom, both damped and bounded.

mod camera_controller;

pub use camera_controller::{CameraController, CameraControl, Orbit};
