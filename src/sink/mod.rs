//! Network sink for best-effort collector notifications
//!
//! The recorder notifies a remote collector when a session starts and stops,
//! and forwards a decimated subset of samples. Delivery is fire-and-forget:
//! no response is awaited beyond logging, nothing is retried, and ordering
//! across requests is not guaranteed. The local record log remains the
//! source of truth.
//!
//! # Payloads
//!
//! ```json
//! {"event":"start"}
//! {"event":"stop"}
//! {"event":"data","type":"ACC","timestamp":12.345,"values":[0.01,-0.98,0.03]}
//! ```
//!
//! # Components
//!
//! - [`EventSink`] - Non-blocking delivery seam used by the coordinator
//! - [`HttpSink`] - JSON over HTTP POST on a background tokio runtime
//! - [`NullSink`] - Discards every event

pub mod http;

pub use http::HttpSink;

use crate::types::{Channel, SensorRecord, RECORD_COMPONENTS};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A notification for the remote collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum SinkEvent {
    /// A recording session started
    Start,
    /// A recording session stopped
    Stop,
    /// A forwarded sample
    Data {
        /// Channel tag (`ACC`, `GYRO`, `MAG`, `MOTION`)
        #[serde(rename = "type")]
        channel: Channel,
        /// Sensor timestamp in seconds
        timestamp: f64,
        /// Sanitized components
        values: [f64; RECORD_COMPONENTS],
    },
}

impl SinkEvent {
    /// Build a data event from a stored record
    pub fn data(record: &SensorRecord) -> Self {
        SinkEvent::Data {
            channel: record.channel(),
            timestamp: record.timestamp(),
            values: record.values(),
        }
    }

    /// Serialize to the JSON request body
    pub fn to_json(&self) -> crate::error::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            SinkEvent::Start => "start",
            SinkEvent::Stop => "stop",
            SinkEvent::Data { .. } => "data",
        }
    }
}

/// Destination for collector notifications
///
/// `send` is called from sensor delivery threads and must return promptly;
/// implementations hand the event off and perform I/O elsewhere. Failures
/// are logged, never returned.
#[cfg_attr(test, mockall::automock)]
pub trait EventSink: Send + Sync {
    /// Hand off an event for delivery
    fn send(&self, event: SinkEvent);
}

/// Sink that discards every event
#[derive(Debug, Default)]
pub struct NullSink {
    discarded: AtomicU64,
}

impl NullSink {
    /// Create a new null sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events discarded so far
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}

impl EventSink for NullSink {
    fn send(&self, event: SinkEvent) {
        tracing::trace!("Discarding {} event", event.name());
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }
}

/// Delivery counters of a sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    /// Requests that completed with a success status
    pub sent: u64,
    /// Requests that failed or returned an error status
    pub failed: u64,
    /// Events dropped because no endpoint was configured
    pub skipped: u64,
    /// Requests currently in flight
    pub in_flight: u64,
}
