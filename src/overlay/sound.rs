//! Background music and ambience volumes

use serde::{Deserialize, Serialize};

const DEFAULT_VOLUME: u8 = 50;
const MAX_VOLUME: u8 = 100;

/// Volume percentages in `0..=100`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundLevels {
    bgm: u8,
    ambience: u8,
}

impl SoundLevels {
    pub fn bgm(&self) -> u8 {
        self.bgm
    }

    pub fn ambience(&self) -> u8 {
        self.ambience
    }

    pub fn set_bgm(&mut self, percent: i32) {
        self.bgm = clamp_percent(percent);
    }

    pub fn set_ambience(&mut self, percent: i32) {
        self.ambience = clamp_percent(percent);
    }

    /// Clamp values read from an edited preferences file
    pub(crate) fn sanitized(self) -> Self {
        Self {
            bgm: self.bgm.min(MAX_VOLUME),
            ambience: self.ambience.min(MAX_VOLUME),
        }
    }
}

impl Default for SoundLevels {
    fn default() -> Self {
        Self {
            bgm: DEFAULT_VOLUME,
            ambience: DEFAULT_VOLUME,
        }
    }
}

fn clamp_percent(percent: i32) -> u8 {
    percent.clamp(0, MAX_VOLUME as i32) as u8
}
