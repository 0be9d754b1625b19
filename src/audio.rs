use std::fmt;

use serde::Deserialize;

use crate::classifier::SleepCategory;

/// Opaque reference to an audio asset, handed to whatever plays it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AudioAsset(String);

impl AudioAsset {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AudioAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait AudioSelector: Send + Sync {
    fn select(&self, category: SleepCategory) -> AudioAsset;
}

/// One configured asset per sleep category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AudioCatalog {
    pub short: AudioAsset,
    pub medium: AudioAsset,
    pub long: AudioAsset,
}

impl Default for AudioCatalog {
    fn default() -> Self {
        Self {
            short: AudioAsset::new("audio/beach_with_birds.mp3"),
            medium: AudioAsset::new("audio/alarm_clock_beeps.mp3"),
            long: AudioAsset::new("audio/retro-game-emergency-alarm.mp3"),
        }
    }
}

impl AudioSelector for AudioCatalog {
    fn select(&self, category: SleepCategory) -> AudioAsset {
        match category {
            SleepCategory::Short => self.short.clone(),
            SleepCategory::Medium => self.medium.clone(),
            SleepCategory::Long => self.long.clone(),
        }
    }
}
