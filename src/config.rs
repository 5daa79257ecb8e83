use crate::question::Difficulty;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE: &str = "settings.json";
const APP_DIR: &str = "semantic-guess";

/// Per-tier time limits in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TimeLimits {
    #[serde(alias = "1")]
    pub easy: u64,
    #[serde(alias = "2")]
    pub normal: u64,
    #[serde(alias = "3")]
    pub hard: u64,
}

impl Default for TimeLimits {
    fn default() -> Self {
        Self {
            easy: 300,
            normal: 240,
            hard: 180,
        }
    }
}

/// Game settings. Read only; missing keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub time_limits: TimeLimits,
    /// Time limit for custom-keyword games, in seconds.
    pub custom_time_limit: u64,
    /// Entries shown at each end of the ranking; `0` hides it.
    pub ranking_display_count: usize,
    /// Show similarity scores next to ranked guesses and in feedback.
    pub show_similarity: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_limits: TimeLimits::default(),
            custom_time_limit: 300,
            ranking_display_count: 5,
            show_similarity: false,
        }
    }
}

impl Settings {
    pub fn time_limit(&self, difficulty: &Difficulty) -> Duration {
        let secs = match difficulty {
            Difficulty::Easy => self.time_limits.easy,
            Difficulty::Normal => self.time_limits.normal,
            Difficulty::Hard => self.time_limits.hard,
            Difficulty::Custom { .. } => self.custom_time_limit,
        };
        Duration::from_secs(secs)
    }

    /// Parse settings JSON, falling back to defaults if it is malformed.
    pub fn from_json_str(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed settings: {e}");
                Self::default()
            }
        }
    }

    /// Read settings from `path`. A missing or unreadable file yields defaults.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => {
                log::info!("Loading settings from {}", path.display());
                Self::from_json_str(&text)
            }
            Err(e) => {
                log::info!(
                    "No settings at {} ({e}), using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }
}

/// `<config_dir>/semantic-guess/settings.json`, if the platform has one.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}
