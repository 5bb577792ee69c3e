//! Overlay state
//!
//! Plain data behind the productivity widgets drawn over the diorama. Nothing
//! here touches the scene or the render loop.

mod environment;
mod pomodoro;
mod preferences;
mod sound;
mod todo;

pub use environment::{catalog, Environment, TimeOfDay};
pub use pomodoro::{Phase, PomodoroTimer};
pub use preferences::{Preferences, PreferencesError};
pub use sound::SoundLevels;
pub use todo::{TodoItem, TodoList};

use crate::config::OverlayConfig;

/// All widget state in one place
#[derive(Clone, Debug)]
pub struct OverlayState {
    pub environment: Environment,
    pub todos: TodoList,
    pub pomodoro: PomodoroTimer,
    pub sound: SoundLevels,
}

impl OverlayState {
    /// Restore saved preferences; the pomodoro always starts fresh
    pub fn new(config: &OverlayConfig, prefs: Preferences) -> Self {
        Self {
            environment: prefs.environment,
            todos: prefs.todos,
            pomodoro: PomodoroTimer::new(config.work_minutes, config.break_minutes),
            sound: prefs.sound,
        }
    }

    /// Switch to a catalog entry. Returns false for an unknown id.
    pub fn select_environment(&mut self, id: &str) -> bool {
        match Environment::find(id) {
            Some(env) => {
                log::info!("Environment: {}", env.name);
                self.environment = env;
                true
            }
            None => false,
        }
    }

    /// Switch to whatever environment `prompt` asks for
    pub fn apply_prompt(&mut self, prompt: &str) -> &Environment {
        self.environment = Environment::from_prompt(prompt);
        log::info!("Environment from prompt: {}", self.environment.name);
        &self.environment
    }

    /// Step to the next catalog entry
    pub fn cycle_environment(&mut self) -> &Environment {
        self.environment = self.environment.next();
        log::info!("Environment: {}", self.environment.name);
        &self.environment
    }

    /// Feed wall-clock time to the pomodoro
    pub fn advance(&mut self, dt: f32) {
        match self.pomodoro.advance(dt) {
            Some(Phase::Break) => log::info!("Focus session done; time for a break"),
            Some(Phase::Work) => log::info!("Break over; back to focus"),
            None => {}
        }
    }

    /// Snapshot of what gets persisted
    pub fn preferences(&self) -> Preferences {
        Preferences {
            environment: self.environment.clone(),
            sound: self.sound,
            todos: self.todos.clone(),
        }
    }
}
