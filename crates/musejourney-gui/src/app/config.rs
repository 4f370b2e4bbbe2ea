//! App config persistence

use std::path::{Path, PathBuf};

use musejourney_services::InstrumentKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub midi: MidiConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub instrument: InstrumentKind,
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            instrument: InstrumentKind::Piano,
            volume: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiConfig {
    /// Substring of the input port name; empty picks the first port
    pub input_pattern: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Training data directory, the override or the platform data dir
    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("musejourney")
        })
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("musejourney")
        .join("config.toml")
}

pub fn load_config() -> AppConfig {
    load_config_from(&config_path())
}

pub fn save_config(config: &AppConfig) {
    save_config_to(&config_path(), config);
}

/// Missing or unreadable config yields defaults
fn load_config_from(path: &Path) -> AppConfig {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return AppConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
        AppConfig::default()
    })
}

fn save_config_to(path: &Path, config: &AppConfig) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(s) = toml::to_string_pretty(config) else { return };
    if let Err(e) = std::fs::write(path, s) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to save config");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.audio.instrument = InstrumentKind::Marimba;
        config.audio.volume = 0.5;
        config.midi.input_pattern = "keystep".to_string();
        config.storage.data_dir = Some(dir.path().join("data"));

        save_config_to(&path, &config);
        assert_eq!(load_config_from(&path), config);
    }

    #[test]
    fn test_missing_and_corrupt_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(load_config_from(&path), AppConfig::default());

        std::fs::write(&path, "audio = [").unwrap();
        assert_eq!(load_config_from(&path), AppConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config: AppConfig = toml::from_str("[audio]\ninstrument = \"guitar\"\n").unwrap();
        assert_eq!(config.audio.instrument, InstrumentKind::Guitar);
        assert_eq!(config.audio.volume, 0.8);
        assert!(config.midi.input_pattern.is_empty());
    }

    #[test]
    fn test_data_dir_override() {
        let mut config = AppConfig::default();
        config.storage.data_dir = Some(PathBuf::from("/tmp/mj"));
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/mj"));
    }
}
