//! Persisted overlay state
//!
//! Stored as TOML next to the configuration. A missing file is not an error.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::environment::Environment;
use super::sound::SoundLevels;
use super::todo::TodoList;

/// Everything the overlay remembers between runs
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub environment: Environment,
    pub sound: SoundLevels,
    pub todos: TodoList,
}

impl Preferences {
    /// Read preferences from `path`, or defaults if the file does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PreferencesError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No preferences at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        let mut prefs: Preferences = toml::from_str(&text)?;
        prefs.sound = prefs.sound.sanitized();
        Ok(prefs)
    }

    /// Write preferences to `path`, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PreferencesError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let text = toml::to_string(self)?;
        std::fs::write(path, text)?;
        log::info!("Saved preferences to {}", path.display());
        Ok(())
    }
}

/// Preferences error
#[derive(Debug)]
pub enum PreferencesError {
    /// Reading or writing the file failed
    Io(std::io::Error),
    /// The file is not valid preferences TOML
    Parse(toml::de::Error),
    /// Preferences could not be encoded
    Encode(toml::ser::Error),
}

impl std::fmt::Display for PreferencesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreferencesError::Io(e) => write!(f, "Preferences I/O error: {}", e),
            PreferencesError::Parse(e) => write!(f, "Invalid preferences: {}", e),
            PreferencesError::Encode(e) => write!(f, "Failed to encode preferences: {}", e),
        }
    }
}

impl std::error::Error for PreferencesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PreferencesError::Io(e) => Some(e),
            PreferencesError::Parse(e) => Some(e),
            PreferencesError::Encode(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for PreferencesError {
    fn from(e: std::io::Error) -> Self {
        PreferencesError::Io(e)
    }
}

impl From<toml::de::Error> for PreferencesError {
    fn from(e: toml::de::Error) -> Self {
        PreferencesError::Parse(e)
    }
}

impl From<toml::ser::Error> for PreferencesError {
    fn from(e: toml::ser::Error) -> Self {
        PreferencesError::Encode(e)
    }
}
