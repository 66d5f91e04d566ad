//! Sensor provider seam
//!
//! This module provides a common trait for the platform's motion sensors,
//! enabling both real drivers and the simulated provider used for headless
//! runs and testing.
//!
//! # Delivery Model
//!
//! Each subscription delivers samples on its own context (thread, driver
//! queue, interrupt bridge). Handlers for different channels may therefore
//! run concurrently with each other and with the control thread.
//!
//! # Cancellation
//!
//! [`SensorSubscription::cancel`] returns once the provider will not start
//! any further callback for that subscription. A callback that was already
//! running may still complete.

pub mod simulated;

pub use simulated::{SignalPattern, SimulatedSensors};

use crate::error::Result;
use crate::types::{Channel, SensorSample};
use std::sync::Arc;

/// Callback invoked for every delivered sample
pub type SampleHandler = Arc<dyn Fn(SensorSample) + Send + Sync>;

/// Unified interface for motion sensor platforms
///
/// Implementations must be `Send + Sync` so one provider can be shared by
/// the coordinator and the delivery contexts it spawns.
pub trait SensorProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &str;

    /// Whether the device has this sensor
    fn is_available(&self, channel: Channel) -> bool;

    /// Start delivering samples of `channel` to `handler`
    fn subscribe(
        &self,
        channel: Channel,
        handler: SampleHandler,
    ) -> Result<Box<dyn SensorSubscription>>;

    /// Channels this provider reports as available
    fn available_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|&c| self.is_available(c))
            .collect()
    }
}

/// Handle to an active sensor stream
pub trait SensorSubscription: Send {
    /// Channel being delivered
    fn channel(&self) -> Channel;

    /// Stop delivery
    ///
    /// Idempotent. Returns after the provider stops scheduling callbacks.
    fn cancel(&mut self);
}
