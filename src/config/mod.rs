//! Configuration module for the motion recorder
//!
//! This module handles recorder configuration:
//! - Collector endpoint for best-effort network notifications
//! - Decimation interval for forwarded samples
//! - Export location and naming
//! - Enabled channels and simulated sensor parameters
//!
//! # Config Location
//!
//! When no explicit path is given, the configuration is read from the
//! platform-appropriate data directory under `dev.motion-recorder`:
//! - **Linux**: `~/.local/share/dev.motion-recorder/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.motion-recorder/config.toml`
//! - **Windows**: `%APPDATA%\dev.motion-recorder\config.toml`
//!
//! # Example
//!
//! ```toml
//! enabled_channels = ["ACC", "GYRO", "MAG", "MOTION"]
//!
//! [sink]
//! server_url = "http://192.168.0.102:8000/api"
//! request_timeout_ms = 2000
//!
//! [decimation]
//! forward_interval = 5
//!
//! [export]
//! file_prefix = "motion_data"
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{MotionError, Result};
use crate::types::Channel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.motion-recorder";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the default config file
pub fn default_config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Recorder Config ====================

/// Complete recorder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Version for future migration support
    #[serde(default = "default_config_version")]
    pub version: u32,

    /// Channels to subscribe when recording starts
    #[serde(default = "default_enabled_channels")]
    pub enabled_channels: Vec<Channel>,

    /// Remote collector settings
    #[serde(default)]
    pub sink: SinkSettings,

    /// Decimation settings
    #[serde(default)]
    pub decimation: DecimationSettings,

    /// Export settings
    #[serde(default)]
    pub export: ExportSettings,

    /// Simulated sensor settings
    #[serde(default)]
    pub simulation: SimulationSettings,
}

fn default_config_version() -> u32 {
    1
}

fn default_enabled_channels() -> Vec<Channel> {
    Channel::ALL.to_vec()
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            version: 1,
            enabled_channels: default_enabled_channels(),
            sink: SinkSettings::default(),
            decimation: DecimationSettings::default(),
            export: ExportSettings::default(),
            simulation: SimulationSettings::default(),
        }
    }
}

impl RecorderConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collector URL
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.sink.server_url = Some(url.into());
        self
    }

    /// Set the export directory
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export.directory = Some(dir.into());
        self
    }

    /// Set the forwarding interval
    pub fn with_forward_interval(mut self, interval: u32) -> Self {
        self.decimation.forward_interval = interval;
        self
    }

    /// Check whether a channel should be subscribed
    pub fn is_channel_enabled(&self, channel: Channel) -> bool {
        self.enabled_channels.contains(&channel)
    }

    /// Parse a configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| MotionError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Serialize the configuration to TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| MotionError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Load a configuration file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MotionError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Load from `path`, or from the default location when `None`
    ///
    /// A missing file yields the defaults; any other error is logged and
    /// also yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) => p,
                None => return Self::default(),
            },
        };

        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Self::default();
        }

        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the configuration to disk as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MotionError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        std::fs::write(path, self.to_toml()?).map_err(|e| {
            MotionError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = RecorderConfig::default();
        assert_eq!(config.version, 1);
        assert_eq!(config.enabled_channels.len(), 4);
        assert!(config.sink.server_url.is_none());
        assert_eq!(config.decimation.forward_interval, 5);
        assert_eq!(config.export.file_prefix, "motion_data");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = RecorderConfig::from_toml(
            r#"
            enabled_channels = ["ACC", "MOTION"]

            [sink]
            server_url = "http://192.168.0.102:8000/api"
            "#,
        )
        .unwrap();

        assert!(config.is_channel_enabled(Channel::Accelerometer));
        assert!(!config.is_channel_enabled(Channel::Gyroscope));
        assert!(config.sink.endpoint().is_some());
        assert_eq!(config.sink.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.decimation.forward_interval, 5);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = RecorderConfig::from_toml("enabled_channels = 3").unwrap_err();
        assert!(matches!(err, MotionError::Config(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = RecorderConfig::new()
            .with_server_url("http://localhost:9000/api")
            .with_export_dir(dir.path())
            .with_forward_interval(10);
        config.save(&path).unwrap();

        let loaded = RecorderConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = RecorderConfig::load_or_default(Some(&dir.path().join("missing.toml")));
        assert_eq!(config, RecorderConfig::default());
    }

    #[test]
    fn test_load_or_default_on_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[sink\nserver_url = ").unwrap();
        assert_eq!(
            RecorderConfig::load_or_default(Some(&path)),
            RecorderConfig::default()
        );
    }
}
