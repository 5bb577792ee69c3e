//! Hearth - a cozy cabin diorama
//!
//! A warm low-poly cabin with a cat, a stove and a campfire. Drag to orbit,
//! scroll to zoom.

use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowId,
};

use hearth::config::AppConfig;
use hearth::input::{InputAction, InputMapper};
use hearth::overlay::{OverlayState, Preferences};
use hearth::systems::{AnimationScheduler, RenderSystem, TickOutcome, WindowSystem};

/// Main application state
struct App {
    /// Application configuration
    config: AppConfig,
    window: Option<WindowSystem>,
    scheduler: Option<AnimationScheduler<RenderSystem>>,
    overlay: OverlayState,
    last_frame: Instant,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let prefs = Preferences::load(&config.overlay.preferences_path).unwrap_or_else(|e| {
            log::warn!("{}. Using default preferences.", e);
            Preferences::default()
        });
        let overlay = OverlayState::new(&config.overlay, prefs);

        Self {
            config,
            window: None,
            scheduler: None,
            overlay,
            last_frame: Instant::now(),
        }
    }

    /// Create the window, the renderer and the scheduler
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn std::error::Error>> {
        let window = WindowSystem::create(event_loop, &self.config.window)?;
        let render = RenderSystem::new(
            window.window().clone(),
            &self.config.rendering,
            self.config.window.vsync,
        )?;
        let (width, height) = render.size();

        let mut scheduler = AnimationScheduler::mount(Some(render), &self.config)?;
        scheduler.resize(width, height);

        window.update_title(&self.overlay.environment.name);
        window.request_redraw();
        self.window = Some(window);
        self.scheduler = Some(scheduler);
        self.last_frame = Instant::now();
        Ok(())
    }

    /// Tear everything down and persist the overlay
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(scheduler) = &mut self.scheduler {
            scheduler.dispose();
        }
        if let Err(e) = self.overlay.preferences().save(&self.config.overlay.preferences_path) {
            log::warn!("{}", e);
        }
        event_loop.exit();
    }

    fn handle_action(&mut self, action: InputAction, event_loop: &ActiveEventLoop) {
        match action {
            InputAction::Exit => self.shutdown(event_loop),
            InputAction::ResetCamera => {
                if let Some(scheduler) = &mut self.scheduler {
                    scheduler.controller_mut().reset();
                    log::info!("Camera reset to starting orbit");
                }
            }
            InputAction::ToggleFullscreen => {
                if let Some(window) = &self.window {
                    window.toggle_fullscreen();
                }
            }
            InputAction::CycleEnvironment => {
                let name = self.overlay.cycle_environment().name.clone();
                if let Some(window) = &self.window {
                    window.update_title(&name);
                }
            }
            InputAction::TogglePomodoro => {
                let running = self.overlay.pomodoro.toggle();
                log::info!(
                    "Pomodoro {} at {}",
                    if running { "started" } else { "paused" },
                    self.overlay.pomodoro.display()
                );
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            log::error!("Startup failed: {}", e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(physical_size) => {
                if let Some(scheduler) = &mut self.scheduler {
                    scheduler.resize(physical_size.width, physical_size.height);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if let Some(action) = InputMapper::map_keyboard(key, event.state) {
                        self.handle_action(action, event_loop);
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(scheduler) = &mut self.scheduler {
                    scheduler.controller_mut().process_mouse_button(button, state);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(scheduler) = &mut self.scheduler {
                    scheduler.controller_mut().process_cursor_moved(position.x, position.y);
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(scheduler) = &mut self.scheduler {
                    scheduler.controller_mut().process_scroll(delta);
                }
            }

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame).as_secs_f32();
                self.last_frame = now;

                self.overlay.advance(dt);

                let Some(scheduler) = &mut self.scheduler else {
                    return;
                };
                if let TickOutcome::Halted(e) = scheduler.tick(dt) {
                    log::error!("Rendering stopped: {}", e);
                    self.shutdown(event_loop);
                    return;
                }

                // Request next frame
                if scheduler.take_frame_request() {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }

            _ => {}
        }
    }
}

fn main() {
    // Load configuration; a failure is reported once logging is up
    let loaded = AppConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // Initialize logging; RUST_LOG still wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();
    if let Err(e) = &loaded {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }
    log::info!("Starting Hearth");

    // Create event loop
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    // Create and run application
    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        std::process::exit(1);
    }
}
