//! Latest-reading cache and live fan-out
//!
//! Readings are advisory display state: last write wins per channel, and
//! subscribers that fall behind miss updates rather than slowing producers.

use crate::types::{Channel, LiveSample, CHANNEL_COUNT};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::{Mutex, RwLock};

/// Capacity of each live subscription channel
pub const LIVE_CHANNEL_CAPACITY: usize = 256;

/// Most recent reading per channel plus subscriber channels
#[derive(Debug, Default)]
pub struct LiveReadings {
    latest: RwLock<[Option<LiveSample>; CHANNEL_COUNT]>,
    subscribers: Mutex<Vec<Sender<LiveSample>>>,
}

impl LiveReadings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `sample` as the latest of its channel and notify subscribers
    pub fn publish(&self, sample: LiveSample) {
        self.latest
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())[sample.channel.index()] =
            Some(sample);

        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if subscribers.is_empty() {
            return;
        }
        subscribers.retain(|tx| match tx.try_send(sample) {
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!("Dropping disconnected live subscriber");
                false
            }
        });
    }

    /// Latest reading of `channel`
    pub fn latest(&self, channel: Channel) -> Option<LiveSample> {
        self.latest
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())[channel.index()]
    }

    /// Latest reading of every channel, indexed by [`Channel::index`]
    pub fn all(&self) -> [Option<LiveSample>; CHANNEL_COUNT] {
        *self
            .latest
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open a bounded subscription to future readings
    pub fn subscribe(&self) -> Receiver<LiveSample> {
        let (tx, rx) = bounded(LIVE_CHANNEL_CAPACITY);
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }

    /// Number of connected subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
