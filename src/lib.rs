//! Hearth - a cozy cabin diorama
//!
//! Library half of the application: configuration, scene construction, the
//! per-frame scheduler and the overlay state. `main.rs` wires these to winit.

pub mod config;
pub mod input;
pub mod overlay;
pub mod scene;
pub mod systems;
