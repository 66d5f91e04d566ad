//! Per-channel decimation counters.
//!
//! The router forwards the Nth, 2Nth, 3Nth, … sample of each channel
//! (1-indexed). Channels never share a counter, so a burst on one channel
//! does not shift another channel's cadence.

use crate::types::{Channel, CHANNEL_COUNT};

/// Forward every fifth sample by default.
pub const DEFAULT_FORWARD_INTERVAL: u32 = 5;

/// Decides which samples are forwarded to the network sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimationRouter {
    interval: u64,
    counters: [u64; CHANNEL_COUNT],
}

impl Default for DecimationRouter {
    fn default() -> Self {
        Self::new(DEFAULT_FORWARD_INTERVAL)
    }
}

impl DecimationRouter {
    /// Create a router forwarding every `interval`th sample per channel.
    ///
    /// An interval of zero is treated as one (forward everything).
    pub fn new(interval: u32) -> Self {
        Self {
            interval: u64::from(interval.max(1)),
            counters: [0; CHANNEL_COUNT],
        }
    }

    /// Count one sample on `channel` and report whether to forward it.
    #[inline]
    pub fn should_forward(&mut self, channel: Channel) -> bool {
        let counter = &mut self.counters[channel.index()];
        *counter += 1;
        *counter % self.interval == 0
    }

    /// Samples counted so far on `channel`.
    pub fn count(&self, channel: Channel) -> u64 {
        self.counters[channel.index()]
    }

    /// Samples forwarded so far on `channel`.
    pub fn forwarded(&self, channel: Channel) -> u64 {
        self.count(channel) / self.interval
    }

    /// Samples forwarded so far across all channels.
    pub fn total_forwarded(&self) -> u64 {
        Channel::ALL.iter().map(|&c| self.forwarded(c)).sum()
    }

    /// The forwarding interval.
    pub fn interval(&self) -> u32 {
        // Constructed from a u32, so this never truncates
        self.interval as u32
    }
}
