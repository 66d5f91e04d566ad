//! Append-only sample buffer shared by concurrent producers

use crate::storage::export;
use crate::types::{Channel, SensorRecord, SensorSample, CHANNEL_COUNT};
use std::sync::{Mutex, MutexGuard};

/// Ordered log of records for one session
///
/// Not synchronized on its own; [`SampleBuffer`] provides the exclusion.
#[derive(Debug, Clone, Default)]
pub struct RecordLog {
    records: Vec<SensorRecord>,
    per_channel: [usize; CHANNEL_COUNT],
    rejected: u64,
}

impl RecordLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate, sanitize and push a sample
    ///
    /// Malformed samples are logged, counted and dropped.
    pub fn push(&mut self, sample: &SensorSample) -> Option<&SensorRecord> {
        match SensorRecord::from_sample(sample) {
            Ok(record) => {
                self.per_channel[record.channel().index()] += 1;
                self.records.push(record);
                self.records.last()
            }
            Err(e) => {
                tracing::warn!("Dropping sample: {}", e);
                self.rejected += 1;
                None
            }
        }
    }

    /// Number of stored records (header excluded)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no records are stored
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stored records in append order
    pub fn records(&self) -> &[SensorRecord] {
        &self.records
    }

    /// Number of stored records for one channel
    pub fn channel_count(&self, channel: Channel) -> usize {
        self.per_channel[channel.index()]
    }

    /// Number of malformed samples dropped
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Serialize header plus records
    pub fn serialize(&self) -> String {
        export::serialize_records(&self.records)
    }
}

/// Thread-safe append-only buffer
///
/// Every operation takes the same mutex, so appends from any number of
/// producer threads are serialized and a snapshot never observes a torn record.
///
/// `S` is caller-attached state guarded by the same lock. The coordinator
/// stores its decimation counters there so that appending a sample and
/// deciding whether to forward it form one step.
#[derive(Debug, Default)]
pub struct SampleBuffer<S = ()> {
    inner: Mutex<(RecordLog, S)>,
}

impl SampleBuffer<()> {
    /// Create an empty buffer without attached state
    pub fn new() -> Self {
        Self::with_state(())
    }
}

impl<S> SampleBuffer<S> {
    /// Create an empty buffer guarding `state`
    pub fn with_state(state: S) -> Self {
        Self {
            inner: Mutex::new((RecordLog::new(), state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, (RecordLog, S)> {
        // A panicking producer cannot leave a half-pushed record behind, so
        // the log is still consistent after poisoning.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a sample, returning whether it was stored
    pub fn append(&self, sample: &SensorSample) -> bool {
        self.append_with(sample, |_, _| ()).is_some()
    }

    /// Append a sample and run `f` on the stored record while the lock is held
    ///
    /// Returns `None` when the sample was malformed and nothing was stored.
    pub fn append_with<R>(
        &self,
        sample: &SensorSample,
        f: impl FnOnce(&SensorRecord, &mut S) -> R,
    ) -> Option<R> {
        let mut guard = self.lock();
        let (log, state) = &mut *guard;
        let record = log.push(sample)?;
        Some(f(record, state))
    }

    /// Header plus every record appended so far, as export text
    pub fn snapshot_and_serialize(&self) -> String {
        self.lock().0.serialize()
    }

    /// Copy of the stored records
    pub fn snapshot(&self) -> Vec<SensorRecord> {
        self.lock().0.records().to_vec()
    }

    /// Number of stored records (header excluded)
    pub fn count(&self) -> usize {
        self.lock().0.len()
    }

    /// Number of stored records for one channel
    pub fn channel_count(&self, channel: Channel) -> usize {
        self.lock().0.channel_count(channel)
    }

    /// Number of malformed samples dropped
    pub fn rejected(&self) -> u64 {
        self.lock().0.rejected()
    }

    /// Run `f` with shared access to the log and attached state
    pub fn inspect<R>(&self, f: impl FnOnce(&RecordLog, &S) -> R) -> R {
        let guard = self.lock();
        f(&guard.0, &guard.1)
    }
}
