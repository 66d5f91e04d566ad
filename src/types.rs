//! Core data types for the motion recorder
//!
//! This module contains the fundamental data structures used throughout
//! the crate for representing sensor channels and their observations.
//!
//! # Main Types
//!
//! - [`Channel`] - The four motion sensor streams (ACC, GYRO, MAG, MOTION)
//! - [`SensorSample`] - A raw observation as delivered by a sensor driver
//! - [`SensorRecord`] - A validated, sanitized observation ready for storage
//! - [`LiveSample`] - The most recent reading of a channel, for display
//!
//! # Sanitization
//!
//! A [`SensorRecord`] always carries exactly three finite components. Any NaN
//! or infinite component reported by a driver is replaced with `0.0` instead of
//! dropping the record, so per-channel timing stays aligned.

use crate::error::{MotionError, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Number of sensor channels
pub const CHANNEL_COUNT: usize = 4;

/// Number of components in every stored record
pub const RECORD_COMPONENTS: usize = 3;

/// One of the four motion sensor streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Accelerometer (x/y/z, in g)
    #[serde(rename = "ACC")]
    Accelerometer,
    /// Gyroscope rotation rate (x/y/z, rad/s)
    #[serde(rename = "GYRO")]
    Gyroscope,
    /// Magnetometer field (x/y/z, microtesla)
    #[serde(rename = "MAG")]
    Magnetometer,
    /// Device attitude (roll/pitch/yaw, radians)
    #[serde(rename = "MOTION")]
    Attitude,
}

impl Channel {
    /// All channels in subscription and export order
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::Accelerometer,
        Channel::Gyroscope,
        Channel::Magnetometer,
        Channel::Attitude,
    ];

    /// Tag used in export files and collector payloads
    pub fn tag(&self) -> &'static str {
        match self {
            Channel::Accelerometer => "ACC",
            Channel::Gyroscope => "GYRO",
            Channel::Magnetometer => "MAG",
            Channel::Attitude => "MOTION",
        }
    }

    /// Parse a channel from its export tag
    pub fn from_tag(tag: &str) -> Option<Channel> {
        match tag {
            "ACC" => Some(Channel::Accelerometer),
            "GYRO" => Some(Channel::Gyroscope),
            "MAG" => Some(Channel::Magnetometer),
            "MOTION" => Some(Channel::Attitude),
            _ => None,
        }
    }

    /// Dense index in `0..CHANNEL_COUNT`, used for per-channel arrays
    pub fn index(&self) -> usize {
        match self {
            Channel::Accelerometer => 0,
            Channel::Gyroscope => 1,
            Channel::Magnetometer => 2,
            Channel::Attitude => 3,
        }
    }

    /// Component labels for display
    pub fn component_names(&self) -> [&'static str; RECORD_COMPONENTS] {
        match self {
            Channel::Attitude => ["roll", "pitch", "yaw"],
            _ => ["x", "y", "z"],
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Channel::Accelerometer => "Accelerometer",
            Channel::Gyroscope => "Gyroscope",
            Channel::Magnetometer => "Magnetometer",
            Channel::Attitude => "Attitude",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// A raw observation as delivered by a sensor driver
///
/// The component count is not checked here; validation happens when the
/// sample is appended to a buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSample {
    /// Channel the sample came from
    pub channel: Channel,
    /// Monotonic timestamp in seconds
    pub timestamp: f64,
    /// Reported components
    pub values: Vec<f64>,
}

impl SensorSample {
    /// Create a new sample
    pub fn new(channel: Channel, timestamp: f64, values: impl Into<Vec<f64>>) -> Self {
        Self {
            channel,
            timestamp,
            values: values.into(),
        }
    }
}

/// A validated observation with exactly three finite components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorRecord {
    channel: Channel,
    timestamp: f64,
    values: [f64; RECORD_COMPONENTS],
}

impl SensorRecord {
    /// Build a record from driver output
    ///
    /// Fails when `values` does not hold exactly three components. Non-finite
    /// components are replaced with `0.0` and logged.
    pub fn try_new(channel: Channel, timestamp: f64, values: &[f64]) -> Result<Self> {
        let values: [f64; RECORD_COMPONENTS] =
            values.try_into().map_err(|_| MotionError::InvalidSample {
                channel,
                got: values.len(),
            })?;

        let values = values.map(|v| {
            if v.is_finite() {
                v
            } else {
                tracing::warn!("Invalid {} sensor value detected: {}", channel, v);
                0.0
            }
        });

        Ok(Self {
            channel,
            timestamp,
            values,
        })
    }

    /// Build a record from a raw sample
    pub fn from_sample(sample: &SensorSample) -> Result<Self> {
        Self::try_new(sample.channel, sample.timestamp, &sample.values)
    }

    /// Channel of this record
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Monotonic timestamp in seconds
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// The three sanitized components
    pub fn values(&self) -> [f64; RECORD_COMPONENTS] {
        self.values
    }
}

/// The latest reading of one channel, for live display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveSample {
    /// Channel of the reading
    pub channel: Channel,
    /// Sensor timestamp in seconds
    pub timestamp: f64,
    /// Sanitized components
    pub values: [f64; RECORD_COMPONENTS],
    /// When the reading reached the coordinator
    pub received_at: Instant,
}

impl LiveSample {
    /// Create a live sample from a stored record
    pub fn from_record(record: &SensorRecord) -> Self {
        Self {
            channel: record.channel(),
            timestamp: record.timestamp(),
            values: record.values(),
            received_at: Instant::now(),
        }
    }

    /// Euclidean norm of the three components
    pub fn magnitude(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}
