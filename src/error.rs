//! Error handling for the motion recorder
//!
//! This module defines custom error types and a Result alias for use
//! throughout the crate. Public coordinator operations never surface these
//! errors to the caller; they are logged and degrade to an empty result.

use crate::types::Channel;
use thiserror::Error;

/// Main error type for motion recorder operations
#[derive(Error, Debug)]
pub enum MotionError {
    /// A sample did not carry exactly three components
    #[error("Invalid {channel} sample: expected 3 values, got {got}")]
    InvalidSample { channel: Channel, got: usize },

    /// The platform reports the sensor as missing
    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(Channel),

    /// Errors while subscribing to or cancelling a sensor stream
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// Errors related to the remote collector
    #[error("Network error: {0}")]
    Network(String),

    /// Errors while writing an export file
    #[error("Export error: {0}")]
    Export(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<MotionError>,
    },
}

impl MotionError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        MotionError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for MotionError {
    fn from(err: serde_json::Error) -> Self {
        MotionError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for MotionError {
    fn from(err: reqwest::Error) -> Self {
        MotionError::Network(err.to_string())
    }
}

/// Result type alias for motion recorder operations
pub type Result<T> = std::result::Result<T, MotionError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| MotionError::Io(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| MotionError::Io(e).with_context(f()))
    }
}
