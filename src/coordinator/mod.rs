//! Acquisition coordinator
//!
//! The coordinator owns the recording lifecycle and fans sensor samples in
//! to the current session and out to live display and the network sink.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  start/stop/export   ┌────────────────────────┐
//! │ Control thread   │ ───────────────────► │ AcquisitionCoordinator │
//! └──────────────────┘                      └───────────┬────────────┘
//!                                                       │ subscribe
//!        ┌──────────┬──────────┬──────────┐             ▼
//!        │ ACC      │ GYRO     │ MAG      │ MOTION  (SensorProvider)
//!        └────┬─────┴────┬─────┴────┬─────┴────┬─────
//!             └──────────┴─────┬────┴──────────┘
//!                              ▼
//!                  Session (RecordLog + DecimationRouter, one lock)
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//!        LiveReadings                  EventSink (outside the lock)
//! ```
//!
//! # States
//!
//! `Idle` → `Recording` → `Idle`. Calling `start` while recording or `stop`
//! while idle does nothing.
//!
//! # Late callbacks
//!
//! Each subscription handler holds the session that was current when it was
//! created. A callback already running when `stop` cancels delivery lands in
//! that finished session, never in a later one.

pub mod live;
pub mod session;

pub use live::{LiveReadings, LIVE_CHANNEL_CAPACITY};
pub use session::{Session, SessionState, SessionStats};

use crate::config::RecorderConfig;
use crate::error::{MotionError, Result};
use crate::sensors::{SampleHandler, SensorProvider, SensorSubscription};
use crate::sink::{EventSink, SinkEvent};
use crate::storage::write_atomic;
use crate::types::{Channel, LiveSample, SensorSample, CHANNEL_COUNT};
use chrono::Local;
use crossbeam_channel::Receiver;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// State reachable from sensor delivery threads
struct Shared {
    recording: AtomicBool,
    session: RwLock<Option<Arc<Session>>>,
    live: LiveReadings,
    sink: Arc<dyn EventSink>,
}

impl Shared {
    fn current_session(&self) -> Option<Arc<Session>> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn ingest(&self, session: &Session, sample: &SensorSample) {
        let Some(ingested) = session.ingest(sample) else {
            return;
        };
        self.live.publish(ingested.live);
        if let Some(event) = ingested.forward {
            self.sink.send(event);
        }
    }
}

/// Coordinates sensor subscriptions, sessions, forwarding and export
pub struct AcquisitionCoordinator {
    config: RecorderConfig,
    provider: Arc<dyn SensorProvider>,
    shared: Arc<Shared>,
    /// Active subscriptions; also serializes start and stop
    control: Mutex<Vec<Box<dyn SensorSubscription>>>,
    next_session_id: AtomicU64,
}

impl AcquisitionCoordinator {
    /// Create an idle coordinator
    pub fn new(
        config: RecorderConfig,
        provider: Arc<dyn SensorProvider>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            config,
            provider,
            shared: Arc::new(Shared {
                recording: AtomicBool::new(false),
                session: RwLock::new(None),
                live: LiveReadings::new(),
                sink,
            }),
            control: Mutex::new(Vec::new()),
            next_session_id: AtomicU64::new(1),
        }
    }

    fn lock_control(&self) -> std::sync::MutexGuard<'_, Vec<Box<dyn SensorSubscription>>> {
        self.control
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Configuration this coordinator was built with
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    // ==================== Lifecycle ====================

    /// Start a new recording session
    ///
    /// Discards the previous session's records, zeroes the decimation
    /// counters, notifies the sink and subscribes every enabled channel the
    /// provider has. Does nothing when already recording.
    pub fn start(&self) {
        let mut subscriptions = self.lock_control();
        if self.shared.recording.load(Ordering::Acquire) {
            tracing::debug!("start() ignored, already recording");
            return;
        }

        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let session = Arc::new(Session::new(id, self.config.decimation.forward_interval));
        *self
            .shared
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::clone(&session));
        self.shared.recording.store(true, Ordering::Release);
        self.shared.sink.send(SinkEvent::Start);

        for channel in Channel::ALL {
            if !self.config.is_channel_enabled(channel) {
                tracing::debug!("{} disabled in configuration", channel.display_name());
                continue;
            }
            if !self.provider.is_available(channel) {
                tracing::info!("{} not available, skipping", channel.display_name());
                continue;
            }
            match self
                .provider
                .subscribe(channel, self.session_handler(&session))
            {
                Ok(subscription) => subscriptions.push(subscription),
                Err(e) => tracing::warn!("Failed to subscribe {}: {}", channel, e),
            }
        }

        tracing::info!(
            "Recording session {} started on {} ({} channel(s))",
            id,
            self.provider.name(),
            subscriptions.len()
        );
    }

    /// Stop recording
    ///
    /// Every subscription is cancelled before this returns. The finished
    /// session stays available for export until the next `start`.
    pub fn stop(&self) {
        let mut subscriptions = self.lock_control();
        if !self.shared.recording.load(Ordering::Acquire) {
            tracing::debug!("stop() ignored, not recording");
            return;
        }

        for mut subscription in subscriptions.drain(..) {
            subscription.cancel();
            tracing::trace!("Unsubscribed {}", subscription.channel());
        }
        self.shared.recording.store(false, Ordering::Release);
        self.shared.sink.send(SinkEvent::Stop);

        if let Some(session) = self.shared.current_session() {
            session.finish();
            let stats = session.stats();
            tracing::info!(
                "Recording session {} stopped: {} records, {} forwarded, {} rejected",
                stats.id,
                stats.records,
                stats.forwarded,
                stats.rejected
            );
        }
    }

    fn session_handler(&self, session: &Arc<Session>) -> SampleHandler {
        let shared = Arc::clone(&self.shared);
        let session = Arc::clone(session);
        Arc::new(move |sample: SensorSample| shared.ingest(&session, &sample))
    }

    // ==================== Ingestion ====================

    /// Ingest one sample into the current session
    ///
    /// Entry point for providers that do not go through
    /// [`SensorProvider::subscribe`]. Samples arriving while idle are dropped.
    pub fn on_sample(&self, sample: SensorSample) {
        if !self.shared.recording.load(Ordering::Acquire) {
            tracing::trace!("Dropping {} sample, not recording", sample.channel);
            return;
        }
        match self.shared.current_session() {
            Some(session) => self.shared.ingest(&session, &sample),
            None => tracing::trace!("Dropping {} sample, no session", sample.channel),
        }
    }

    // ==================== Export ====================

    /// Export the current session to the configured directory
    ///
    /// Returns `None` when there is no session yet or the write failed.
    pub fn export_file(&self) -> Option<PathBuf> {
        if self.shared.current_session().is_none() {
            tracing::debug!("Nothing to export, no session recorded yet");
            return None;
        }
        let dir = self.config.export.resolve_directory();
        match self.export_to(&dir) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                None
            }
        }
    }

    /// Export the current session into `dir`
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf> {
        let session = self
            .shared
            .current_session()
            .ok_or_else(|| MotionError::Export("No recording session to export".into()))?;

        if session.buffer().inspect(|log, _| log.is_empty()) {
            tracing::warn!("Session {} has no records, exporting header only", session.id());
        }
        let contents = session.buffer().snapshot_and_serialize();
        let path = write_atomic(dir, &self.config.export.file_prefix, &contents, &Local::now())?;
        tracing::info!(
            "Exported session {} ({} records) to {:?}",
            session.id(),
            session.buffer().count(),
            path
        );
        Ok(path)
    }

    // ==================== Status ====================

    /// Whether a session is recording
    pub fn is_recording(&self) -> bool {
        self.shared.recording.load(Ordering::Acquire)
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        if self.is_recording() {
            SessionState::Recording
        } else {
            SessionState::Idle
        }
    }

    /// Latest reading of `channel`
    pub fn latest(&self, channel: Channel) -> Option<LiveSample> {
        self.shared.live.latest(channel)
    }

    /// Latest reading of every channel, indexed by [`Channel::index`]
    pub fn live_readings(&self) -> [Option<LiveSample>; CHANNEL_COUNT] {
        self.shared.live.all()
    }

    /// Receive every future reading
    ///
    /// The channel is bounded; readings are dropped for a subscriber that
    /// falls behind.
    pub fn subscribe_live(&self) -> Receiver<LiveSample> {
        self.shared.live.subscribe()
    }

    /// Records in the current session, 0 when there is none
    pub fn record_count(&self) -> usize {
        self.shared
            .current_session()
            .map_or(0, |session| session.buffer().count())
    }

    /// Statistics of the current session
    pub fn session_stats(&self) -> Option<SessionStats> {
        self.shared.current_session().map(|session| session.stats())
    }

    /// The current session
    pub fn current_session(&self) -> Option<Arc<Session>> {
        self.shared.current_session()
    }
}

impl Drop for AcquisitionCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for AcquisitionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquisitionCoordinator")
            .field("provider", &self.provider.name())
            .field("state", &self.state())
            .field("records", &self.record_count())
            .finish()
    }
}
