//! Page-level configuration for the background music and the loading screen.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::ControllerError;
use super::fade::FadeSettings;

pub const DEFAULT_STORAGE_KEY: &str = "musicMuted";

/// Everything the page reads from `assets/page.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PageConfig {
    #[serde(default)]
    pub music: MusicConfig,
    #[serde(default)]
    pub loading: LoadingConfig,
}

impl PageConfig {
    pub fn from_json(raw: &str) -> Result<Self, ControllerError> {
        serde_json::from_str(raw).map_err(|e| ControllerError::Config(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicConfig {
    #[serde(default = "default_tracks")]
    pub tracks: Vec<String>,
    #[serde(default = "default_target_volume")]
    pub target_volume: f64,
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Applied only when no preference has been stored yet.
    #[serde(default)]
    pub muted_by_default: bool,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_tracks() -> Vec<String> {
    (1..=3)
        .map(|n| format!("./assets/music/music ({n}).mp3"))
        .collect()
}

fn default_target_volume() -> f64 {
    0.5
}

fn default_fade_ms() -> u64 {
    500
}

fn default_tick_ms() -> u64 {
    50
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            tracks: default_tracks(),
            target_volume: default_target_volume(),
            fade_ms: default_fade_ms(),
            tick_ms: default_tick_ms(),
            muted_by_default: false,
            storage_key: default_storage_key(),
        }
    }
}

impl MusicConfig {
    /// Rejects an empty playlist and pulls the volume back into range.
    pub fn validate(mut self) -> Result<Self, ControllerError> {
        if self.tracks.is_empty() {
            return Err(ControllerError::EmptyTrackList);
        }
        self.target_volume = if self.target_volume.is_finite() {
            self.target_volume.clamp(0.0, 1.0)
        } else {
            default_target_volume()
        };
        Ok(self)
    }

    pub fn fade_settings(&self) -> FadeSettings {
        FadeSettings::new(
            Duration::from_millis(self.fade_ms),
            Duration::from_millis(self.tick_ms),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadingConfig {
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
    #[serde(default = "default_fallback_ms")]
    pub fallback_ms: u64,
    #[serde(default = "default_hide_delay_ms")]
    pub hide_delay_ms: u64,
    #[serde(default = "default_remove_delay_ms")]
    pub remove_delay_ms: u64,
}

fn default_poll_ms() -> u64 {
    800
}

fn default_fallback_ms() -> u64 {
    22_000
}

fn default_hide_delay_ms() -> u64 {
    500
}

fn default_remove_delay_ms() -> u64 {
    1_000
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            poll_ms: default_poll_ms(),
            fallback_ms: default_fallback_ms(),
            hide_delay_ms: default_hide_delay_ms(),
            remove_delay_ms: default_remove_delay_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_config_parses() {
        let config = PageConfig::from_json(include_str!("../../assets/page.json")).unwrap();
        assert_eq!(config.music.tracks.len(), 3);
        assert_eq!(config.music.storage_key, "musicMuted");
        assert_eq!(config.music.fade_settings().steps(), 10);
        assert_eq!(config.loading.fallback_ms, 22_000);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = PageConfig::from_json(r#"{ "music": { "target_volume": 0.8 } }"#).unwrap();
        assert_eq!(config.music.target_volume, 0.8);
        assert_eq!(config.music.tracks, default_tracks());
        assert_eq!(config.loading, LoadingConfig::default());
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = PageConfig::from_json("{ music: ").unwrap_err();
        assert!(matches!(err, ControllerError::Config(_)));
    }

    #[test]
    fn validate_rejects_empty_tracks_and_clamps_volume() {
        let empty = MusicConfig {
            tracks: Vec::new(),
            ..MusicConfig::default()
        };
        assert_eq!(empty.validate(), Err(ControllerError::EmptyTrackList));

        let loud = MusicConfig {
            target_volume: 3.0,
            ..MusicConfig::default()
        };
        assert_eq!(loud.validate().unwrap().target_volume, 1.0);
    }
}
