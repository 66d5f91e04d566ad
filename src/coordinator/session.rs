//! Recording session state

use crate::pipeline::DecimationRouter;
use crate::sink::SinkEvent;
use crate::storage::SampleBuffer;
use crate::types::{Channel, LiveSample, SensorSample, CHANNEL_COUNT};
use chrono::{DateTime, Local};
use std::sync::Mutex;
use std::time::Duration;

/// State of the acquisition coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No active session
    #[default]
    Idle,
    /// Currently recording a session
    Recording,
}

impl SessionState {
    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        matches!(self, SessionState::Recording)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Recording => "Recording",
        }
    }
}

/// Outcome of ingesting one sample into a session
#[derive(Debug, Clone)]
pub(crate) struct Ingested {
    pub live: LiveSample,
    pub forward: Option<SinkEvent>,
}

/// One start-to-stop recording
///
/// The record log and the decimation counters share one lock, so a sample
/// is stored and its forwarding decision made as a single step.
#[derive(Debug)]
pub struct Session {
    id: u64,
    started_at: DateTime<Local>,
    stopped_at: Mutex<Option<DateTime<Local>>>,
    buffer: SampleBuffer<DecimationRouter>,
}

impl Session {
    pub(crate) fn new(id: u64, forward_interval: u32) -> Self {
        Self {
            id,
            started_at: Local::now(),
            stopped_at: Mutex::new(None),
            buffer: SampleBuffer::with_state(DecimationRouter::new(forward_interval)),
        }
    }

    /// Session number, starting at 1
    pub fn id(&self) -> u64 {
        self.id
    }

    /// When recording started
    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    /// When recording stopped, if it has
    pub fn stopped_at(&self) -> Option<DateTime<Local>> {
        *self
            .stopped_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records and decimation counters
    pub fn buffer(&self) -> &SampleBuffer<DecimationRouter> {
        &self.buffer
    }

    pub(crate) fn finish(&self) {
        let mut stopped = self
            .stopped_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if stopped.is_none() {
            *stopped = Some(Local::now());
        }
    }

    /// Store a sample and decide whether to forward it
    ///
    /// Returns `None` for malformed samples.
    pub(crate) fn ingest(&self, sample: &SensorSample) -> Option<Ingested> {
        self.buffer.append_with(sample, |record, router| Ingested {
            live: LiveSample::from_record(record),
            forward: router
                .should_forward(record.channel())
                .then(|| SinkEvent::data(record)),
        })
    }

    /// Statistics of this session
    pub fn stats(&self) -> SessionStats {
        let stopped_at = self.stopped_at();
        let end = stopped_at.unwrap_or_else(Local::now);
        let duration = (end - self.started_at).to_std().unwrap_or_default();

        self.buffer.inspect(|log, router| SessionStats {
            id: self.id,
            records: log.len(),
            per_channel: Channel::ALL.map(|c| log.channel_count(c)),
            forwarded: router.total_forwarded(),
            rejected: log.rejected(),
            started_at: self.started_at,
            stopped_at,
            duration,
        })
    }
}

/// Summary of a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    /// Session number
    pub id: u64,
    /// Stored records
    pub records: usize,
    /// Stored records per channel, indexed by [`Channel::index`]
    pub per_channel: [usize; CHANNEL_COUNT],
    /// Samples handed to the sink
    pub forwarded: u64,
    /// Malformed samples dropped
    pub rejected: u64,
    /// When recording started
    pub started_at: DateTime<Local>,
    /// When recording stopped
    pub stopped_at: Option<DateTime<Local>>,
    /// Recording time so far
    pub duration: Duration,
}

impl SessionStats {
    /// Stored records of one channel
    pub fn channel_records(&self, channel: Channel) -> usize {
        self.per_channel[channel.index()]
    }
}
