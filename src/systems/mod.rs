//! Application systems
//!
//! The scheduler drives one frame at a time; the viewport owns whatever the
//! frame is presented to; the render and window systems wrap wgpu and winit.

mod animation;
mod render;
mod viewport;
mod window;

pub use animation::{AnimationScheduler, MountError, SchedulerState, TickOutcome};
pub use render::{RenderError, RenderSystem};
pub use viewport::{FrameView, RenderTarget, ViewportManager};
pub use window::{WindowError, WindowSystem};
