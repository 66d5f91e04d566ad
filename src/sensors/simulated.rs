//! Simulated Motion Sensors
//!
//! This module provides a sensor provider that synthesizes plausible motion
//! data without hardware. It is used by the headless binary and by tests.
//!
//! # Features
//!
//! - **Pattern-based data generation**: Each channel follows a [`SignalPattern`]
//! - **Per-channel bias**: Gravity on the accelerometer, Earth field on the magnetometer
//! - **Noise simulation**: Add configurable noise to generated values
//! - **Availability**: Channels can be reported missing, as on devices without a magnetometer
//!
//! # Data Patterns
//!
//! - [`SignalPattern::Constant`] - Fixed value
//! - [`SignalPattern::Sine`] - Sinusoidal wave with configurable frequency/amplitude
//! - [`SignalPattern::Counter`] - Incrementing counter with wrap-around
//! - [`SignalPattern::Random`] - Random values within a range
//! - [`SignalPattern::Square`] - Square wave alternating between two values
//! - [`SignalPattern::Triangle`] - Triangle wave
//!
//! The three components of a channel share a pattern and are spread by a
//! third of a cycle each, so x/y/z are distinguishable in exports.
//!
//! # Example
//!
//! ```ignore
//! use motion_recorder::sensors::{SimulatedSensors, SignalPattern};
//! use motion_recorder::types::Channel;
//!
//! let sensors = SimulatedSensors::new(100)
//!     .with_unavailable(Channel::Magnetometer)
//!     .with_pattern(Channel::Gyroscope, SignalPattern::Constant(0.0));
//! ```

use super::{SampleHandler, SensorProvider, SensorSubscription};
use crate::config::SimulationSettings;
use crate::error::{MotionError, Result};
use crate::types::{Channel, SensorSample, CHANNEL_COUNT, RECORD_COMPONENTS};
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use rand::Rng;
use std::f64::consts::PI;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Pattern for generating simulated data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalPattern {
    /// Constant value
    Constant(f64),
    /// Sine wave with frequency and amplitude
    Sine {
        frequency: f64,
        amplitude: f64,
        offset: f64,
    },
    /// Counter that increments
    Counter { step: f64, min: f64, max: f64 },
    /// Random values within range
    Random { min: f64, max: f64 },
    /// Square wave
    Square { period: f64, amplitude: f64 },
    /// Triangle wave
    Triangle { period: f64, amplitude: f64 },
}

impl Default for SignalPattern {
    fn default() -> Self {
        SignalPattern::Sine {
            frequency: 1.0,
            amplitude: 1.0,
            offset: 0.0,
        }
    }
}

/// Simulation parameters of one channel
#[derive(Debug, Clone, Copy, PartialEq)]
struct ChannelProfile {
    available: bool,
    pattern: SignalPattern,
    bias: [f64; RECORD_COMPONENTS],
}

impl ChannelProfile {
    fn for_channel(channel: Channel) -> Self {
        let (pattern, bias) = match channel {
            Channel::Accelerometer => (
                SignalPattern::Sine {
                    frequency: 1.5,
                    amplitude: 0.05,
                    offset: 0.0,
                },
                [0.0, 0.0, -1.0],
            ),
            Channel::Gyroscope => (
                SignalPattern::Sine {
                    frequency: 0.5,
                    amplitude: 0.3,
                    offset: 0.0,
                },
                [0.0; RECORD_COMPONENTS],
            ),
            Channel::Magnetometer => (
                SignalPattern::Sine {
                    frequency: 0.1,
                    amplitude: 2.0,
                    offset: 0.0,
                },
                [22.1, -5.3, 41.0],
            ),
            Channel::Attitude => (
                SignalPattern::Triangle {
                    period: 8.0,
                    amplitude: PI / 4.0,
                },
                [0.0; RECORD_COMPONENTS],
            ),
        };
        Self {
            available: true,
            pattern,
            bias,
        }
    }
}

/// Noise amplitude usable as a sampling range
fn sanitize_noise(amplitude: f64) -> f64 {
    let amplitude = amplitude.abs();
    // The sampled span is twice the amplitude and must stay finite
    if (amplitude * 2.0).is_finite() {
        amplitude
    } else {
        tracing::warn!("Ignoring unusable noise amplitude {}, noise disabled", amplitude);
        0.0
    }
}

/// Generates component values for one subscription
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    pattern: SignalPattern,
    bias: [f64; RECORD_COMPONENTS],
    noise_amplitude: f64,
    counter_value: f64,
}

impl SignalGenerator {
    /// Create a generator with no bias and no noise
    pub fn new(pattern: SignalPattern) -> Self {
        Self {
            pattern,
            bias: [0.0; RECORD_COMPONENTS],
            noise_amplitude: 0.0,
            counter_value: 0.0,
        }
    }

    /// Add a constant per-component offset
    pub fn with_bias(mut self, bias: [f64; RECORD_COMPONENTS]) -> Self {
        self.bias = bias;
        self
    }

    /// Add noise to the generated values
    pub fn with_noise(mut self, amplitude: f64) -> Self {
        self.noise_amplitude = sanitize_noise(amplitude);
        self
    }

    /// Generate the three components at `elapsed_secs`
    pub fn generate(&mut self, elapsed_secs: f64) -> [f64; RECORD_COMPONENTS] {
        if let SignalPattern::Counter { step, min, max } = self.pattern {
            self.counter_value += step;
            if self.counter_value > max {
                self.counter_value = min;
            } else if self.counter_value < min {
                self.counter_value = max;
            }
        }

        let mut rng = rand::thread_rng();
        let mut out = [0.0; RECORD_COMPONENTS];
        for (k, slot) in out.iter_mut().enumerate() {
            let phase = k as f64 / RECORD_COMPONENTS as f64;
            let base = match self.pattern {
                SignalPattern::Constant(v) => v,
                SignalPattern::Sine {
                    frequency,
                    amplitude,
                    offset,
                } => offset + amplitude * (2.0 * PI * (frequency * elapsed_secs + phase)).sin(),
                SignalPattern::Counter { .. } => self.counter_value,
                SignalPattern::Random { min, max } => {
                    if max > min && (max - min).is_finite() {
                        rng.gen_range(min..max)
                    } else {
                        min
                    }
                }
                SignalPattern::Square { period, amplitude } => {
                    let t = (elapsed_secs / period + phase).rem_euclid(1.0);
                    if t < 0.5 {
                        amplitude
                    } else {
                        -amplitude
                    }
                }
                SignalPattern::Triangle { period, amplitude } => {
                    let t = (elapsed_secs / period + phase).rem_euclid(1.0);
                    if t < 0.5 {
                        amplitude * (4.0 * t - 1.0)
                    } else {
                        amplitude * (3.0 - 4.0 * t)
                    }
                }
            };

            let noise = if self.noise_amplitude > 0.0 {
                rng.gen_range(-self.noise_amplitude..=self.noise_amplitude)
            } else {
                0.0
            };
            *slot = base + self.bias[k] + noise;
        }
        out
    }
}

/// Sensor provider that synthesizes samples on one thread per subscription
#[derive(Debug, Clone)]
pub struct SimulatedSensors {
    rate_hz: u32,
    noise: f64,
    epoch: Instant,
    profiles: [ChannelProfile; CHANNEL_COUNT],
}

impl SimulatedSensors {
    /// Create a provider delivering every channel at `rate_hz`
    pub fn new(rate_hz: u32) -> Self {
        Self {
            rate_hz: rate_hz.max(1),
            noise: 0.0,
            epoch: Instant::now(),
            profiles: Channel::ALL.map(ChannelProfile::for_channel),
        }
    }

    /// Create a provider from configuration
    pub fn from_settings(settings: &SimulationSettings) -> Self {
        let mut sensors = Self::new(settings.rate_hz).with_noise(settings.noise);
        for &channel in &settings.unavailable {
            sensors = sensors.with_unavailable(channel);
        }
        sensors
    }

    /// Report `channel` as missing
    pub fn with_unavailable(mut self, channel: Channel) -> Self {
        self.profiles[channel.index()].available = false;
        self
    }

    /// Override the pattern of `channel` (bias is cleared)
    pub fn with_pattern(mut self, channel: Channel, pattern: SignalPattern) -> Self {
        let profile = &mut self.profiles[channel.index()];
        profile.pattern = pattern;
        profile.bias = [0.0; RECORD_COMPONENTS];
        self
    }

    /// Add noise to every channel
    ///
    /// Non-finite or overflowing amplitudes disable noise.
    pub fn with_noise(mut self, amplitude: f64) -> Self {
        self.noise = sanitize_noise(amplitude);
        self
    }

    /// Delivery rate per channel
    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    fn generator(&self, channel: Channel) -> SignalGenerator {
        let profile = &self.profiles[channel.index()];
        SignalGenerator::new(profile.pattern)
            .with_bias(profile.bias)
            .with_noise(self.noise)
    }
}

impl SensorProvider for SimulatedSensors {
    fn name(&self) -> &str {
        "simulated"
    }

    fn is_available(&self, channel: Channel) -> bool {
        self.profiles[channel.index()].available
    }

    fn subscribe(
        &self,
        channel: Channel,
        handler: SampleHandler,
    ) -> Result<Box<dyn SensorSubscription>> {
        if !self.is_available(channel) {
            return Err(MotionError::SensorUnavailable(channel));
        }

        let period = Duration::from_secs_f64(1.0 / f64::from(self.rate_hz));
        let epoch = self.epoch;
        let mut generator = self.generator(channel);
        let (stop_tx, stop_rx) = bounded::<()>(0);

        let handle = thread::Builder::new()
            .name(format!("sensor-{}", channel.tag().to_ascii_lowercase()))
            .spawn(move || {
                let mut next_tick = Instant::now();
                loop {
                    let elapsed = epoch.elapsed().as_secs_f64();
                    let values = generator.generate(elapsed);
                    handler(SensorSample::new(channel, elapsed, values.to_vec()));

                    next_tick += period;
                    let now = Instant::now();
                    if next_tick < now {
                        // Fell behind; resynchronize instead of bursting
                        next_tick = now;
                    }
                    match stop_rx.recv_timeout(next_tick - now) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::debug!("Simulated {} delivery stopped", channel);
            })
            .map_err(|e| {
                MotionError::Subscription(format!("Failed to spawn {} thread: {}", channel, e))
            })?;

        tracing::debug!("Simulated {} delivery started at {} Hz", channel, self.rate_hz);
        Ok(Box::new(SimulatedSubscription {
            channel,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }))
    }
}

/// Subscription backed by a delivery thread
struct SimulatedSubscription {
    channel: Channel,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SensorSubscription for SimulatedSubscription {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn cancel(&mut self) {
        // Dropping the sender wakes the delivery thread immediately
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                // Cancelled from inside our own handler; the loop exits on return
                return;
            }
            if handle.join().is_err() {
                tracing::error!("Simulated {} delivery thread panicked", self.channel);
            }
        }
    }
}

impl Drop for SimulatedSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
