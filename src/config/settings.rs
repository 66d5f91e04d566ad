//! Settings sections of the recorder configuration
//!
//! # Main Types
//!
//! - [`SinkSettings`] - Remote collector endpoint and request timeout
//! - [`DecimationSettings`] - How many samples per channel are forwarded
//! - [`ExportSettings`] - Where export files go and how they are named
//! - [`SimulationSettings`] - Parameters for the simulated sensor provider
//!
//! # Collector URL
//!
//! The server URL is optional. A missing, empty or unparseable URL is not an
//! error: network notifications are skipped and recording continues.

use crate::pipeline::DEFAULT_FORWARD_INTERVAL;
use crate::storage::DEFAULT_FILE_PREFIX;
use crate::types::Channel;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default timeout for collector requests in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;

/// Default simulated sensor rate in Hz
pub const DEFAULT_SIMULATION_RATE_HZ: u32 = 50;

/// Remote collector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkSettings {
    /// Collector base URL (e.g. `http://192.168.0.102:8000/api`)
    #[serde(default)]
    pub server_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self {
            server_url: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl SinkSettings {
    /// Parse the configured URL, if present and usable
    pub fn endpoint(&self) -> Option<Url> {
        parse_endpoint(self.server_url.as_deref()?)
    }

    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }
}

/// Parse a collector URL, accepting only http and https
pub fn parse_endpoint(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            tracing::debug!("Ignoring collector URL with scheme {:?}", url.scheme());
            None
        }
        Err(e) => {
            tracing::debug!("Ignoring unparseable collector URL {:?}: {}", raw, e);
            None
        }
    }
}

/// Decimation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimationSettings {
    /// Forward every Nth sample of each channel
    #[serde(default = "default_forward_interval")]
    pub forward_interval: u32,
}

fn default_forward_interval() -> u32 {
    DEFAULT_FORWARD_INTERVAL
}

impl Default for DecimationSettings {
    fn default() -> Self {
        Self {
            forward_interval: DEFAULT_FORWARD_INTERVAL,
        }
    }
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Target directory; the documents directory when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Filename prefix, followed by the export time
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

impl ExportSettings {
    /// Resolve the export directory
    ///
    /// Falls back to the user's documents directory, then the app data
    /// directory, then the current directory.
    pub fn resolve_directory(&self) -> PathBuf {
        if let Some(dir) = &self.directory {
            return dir.clone();
        }
        dirs_next::document_dir()
            .or_else(super::app_data_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Simulated sensor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Delivery rate per channel in Hz
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,

    /// Channels the simulated device reports as missing
    #[serde(default)]
    pub unavailable: Vec<Channel>,

    /// Noise amplitude added to every component
    #[serde(default)]
    pub noise: f64,
}

fn default_rate_hz() -> u32 {
    DEFAULT_SIMULATION_RATE_HZ
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            rate_hz: DEFAULT_SIMULATION_RATE_HZ,
            unavailable: Vec::new(),
            noise: 0.0,
        }
    }
}
