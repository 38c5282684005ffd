// Engine configuration - persisted as RON in the platform config directory

use crate::sequencer::tempo::DEFAULT_BPM;
use crate::sequencer::track::DEFAULT_VOLUME;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "midia";
const CONFIG_FILE: &str = "config.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to serialize config: {0}")]
    Serialize(String),
}

/// Engine wide settings
///
/// Missing fields fall back to their defaults, so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Interval between two position syncs while playing
    pub poll_interval_ms: u64,
    /// Tempo of new timelines
    pub default_bpm: f64,
    /// Volume of new tracks (0-127)
    pub default_volume: u8,
    pub beat_division: u32,
    pub beats_per_measure: u32,
    /// Capacity of the engine event channel
    pub event_channel_capacity: usize,
    /// MIDI output port used for playback; first port when `None`
    pub output_port: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            default_bpm: DEFAULT_BPM,
            default_volume: DEFAULT_VOLUME,
            beat_division: 4,
            beats_per_measure: 4,
            event_channel_capacity: 256,
            output_port: None,
        }
    }
}

impl EngineConfig {
    /// `<config_dir>/midia/config.ron`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            log::debug!("No config directory on this platform, using defaults");
            return Self::default();
        };
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Write the config, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Parse("poll_interval_ms must be > 0".into()));
        }
        if !self.default_bpm.is_finite() || self.default_bpm < 1.0 {
            return Err(ConfigError::Parse("default_bpm must be at least 1".into()));
        }
        if self.default_volume > 127 {
            return Err(ConfigError::Parse("default_volume must be 0-127".into()));
        }
        if !(1..=960).contains(&self.beat_division) {
            return Err(ConfigError::Parse("beat_division must be 1-960".into()));
        }
        if !(1..=3840).contains(&self.beats_per_measure) {
            return Err(ConfigError::Parse(
                "beats_per_measure must be 1-3840".into(),
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(ConfigError::Parse(
                "event_channel_capacity must be > 0".into(),
            ));
        }
        Ok(())
    }
}
