//! # Motion Recorder: multi-channel motion sensor capture
//!
//! Records accelerometer, gyroscope, magnetometer and attitude samples into an
//! in-memory log, forwards a decimated subset to a remote collector, and
//! exports each session as a CSV-style text file.
//!
//! ## Architecture
//!
//! - **Sensors**: A [`SensorProvider`] delivers each channel on its own thread
//! - **Coordinator**: [`AcquisitionCoordinator`] drives the `Idle`/`Recording` lifecycle
//! - **Storage**: One [`SampleBuffer`] per session, with atomic file export
//! - **Pipeline**: [`DecimationRouter`] forwards every Nth sample per channel
//! - **Sink**: [`HttpSink`] posts JSON events from a background tokio runtime
//!
//! ## Configuration
//!
//! Settings are stored in the platform-appropriate data directory under
//! `dev.motion-recorder`:
//!
//! - **Linux**: `~/.local/share/dev.motion-recorder/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.motion-recorder/config.toml`
//! - **Windows**: `%APPDATA%\dev.motion-recorder\config.toml`
//!
//! ## Example
//!
//! ```ignore
//! use motion_recorder::{
//!     AcquisitionCoordinator, HttpSink, RecorderConfig, SimulatedSensors,
//! };
//! use std::sync::Arc;
//!
//! let config = RecorderConfig::load_or_default(None);
//! let sink = Arc::new(HttpSink::new(&config.sink)?);
//! let sensors = Arc::new(SimulatedSensors::from_settings(&config.simulation));
//!
//! let coordinator = AcquisitionCoordinator::new(config, sensors, sink);
//! coordinator.start();
//! std::thread::sleep(std::time::Duration::from_secs(5));
//! coordinator.stop();
//!
//! if let Some(path) = coordinator.export_file() {
//!     println!("Exported to {}", path.display());
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod pipeline;
pub mod sensors;
pub mod sink;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use config::RecorderConfig;
pub use coordinator::{AcquisitionCoordinator, SessionState, SessionStats};
pub use error::{MotionError, Result};
pub use pipeline::DecimationRouter;
pub use sensors::{SensorProvider, SensorSubscription, SimulatedSensors};
pub use sink::{EventSink, HttpSink, NullSink, SinkEvent};
pub use storage::SampleBuffer;
pub use types::{Channel, LiveSample, SensorRecord, SensorSample};
