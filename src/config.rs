//! Configuration.
//!
//! Loaded from `<config dir>/readalong/config.toml` (or `$READALONG_CONFIG`).
//! Every field has a default, so a partial file only overrides what it names.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::storage::FileStore;
use crate::sync::position::DEFAULT_RESTORE_EPSILON;
use crate::sync::rate::{AllowedRates, DEFAULT_ALLOWED_RATES, NEUTRAL_RATE};
use crate::sync::{SaveThrottle, ScrollPolicy, SkipDeltas, SyncOptions};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "READALONG_CONFIG";

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Playback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Permitted playback speed multipliers
    pub allowed_rates: Vec<f64>,
    /// Rate used when no valid rate has been persisted
    pub default_rate: f64,
    /// Skip-back distance in seconds
    pub skip_backward_secs: f64,
    /// Skip-forward distance in seconds
    pub skip_forward_secs: f64,
    /// Restored positions stay this far from the end
    pub restore_epsilon_secs: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        let skip = SkipDeltas::default();
        Self {
            allowed_rates: DEFAULT_ALLOWED_RATES.to_vec(),
            default_rate: NEUTRAL_RATE,
            skip_backward_secs: skip.backward,
            skip_forward_secs: skip.forward,
            restore_epsilon_secs: DEFAULT_RESTORE_EPSILON,
        }
    }
}

/// Synchronization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// When to scroll the highlighted paragraph into view
    pub scroll: ScrollPolicy,
    /// Minimum time between position writes
    pub save_interval_ms: u64,
    /// Position jump that forces a write
    pub save_min_delta_secs: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let throttle = SaveThrottle::default();
        Self {
            scroll: ScrollPolicy::default(),
            save_interval_ms: throttle.min_interval.as_millis() as u64,
            save_min_delta_secs: throttle.min_delta,
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// State file; defaults to `<data dir>/readalong/state.json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub playback: PlaybackConfig,
    pub sync: SyncConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Location of the config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        dirs::config_dir()
            .map(|dir| dir.join("readalong").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load the config from its default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the config from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)?;
        Ok(())
    }

    /// Check value ranges and cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let playback = &self.playback;

        let rates = AllowedRates::new(playback.allowed_rates.iter().copied()).ok_or_else(|| {
            ConfigError::Invalid("playback.allowed_rates must contain a positive rate".into())
        })?;
        if !rates.contains(playback.default_rate) {
            return Err(ConfigError::Invalid(format!(
                "playback.default_rate {} is not in playback.allowed_rates",
                playback.default_rate
            )));
        }

        let epsilon = playback.restore_epsilon_secs;
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "playback.restore_epsilon_secs must be a positive number, got {}",
                epsilon
            )));
        }

        let non_negative = [
            ("playback.skip_backward_secs", playback.skip_backward_secs),
            ("playback.skip_forward_secs", playback.skip_forward_secs),
            ("sync.save_min_delta_secs", self.sync.save_min_delta_secs),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Runtime options for a [`SyncEngine`](crate::SyncEngine).
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            allowed_rates: AllowedRates::new(self.playback.allowed_rates.iter().copied())
                .unwrap_or_default(),
            default_rate: self.playback.default_rate,
            skip: SkipDeltas {
                backward: self.playback.skip_backward_secs,
                forward: self.playback.skip_forward_secs,
            },
            save_throttle: SaveThrottle {
                min_interval: Duration::from_millis(self.sync.save_interval_ms),
                min_delta: self.sync.save_min_delta_secs,
            },
            restore_epsilon: self.playback.restore_epsilon_secs,
            scroll: self.sync.scroll,
        }
    }

    /// Effective state file path.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage.path.clone().or_else(FileStore::default_path)
    }
}
