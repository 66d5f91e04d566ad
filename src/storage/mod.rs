//! Sample storage and export
//!
//! This module provides the append-only record log for one recording session
//! and the CSV export format.
//!
//! # Components
//!
//! - [`RecordLog`] - Ordered, single-owner sequence of [`SensorRecord`]s
//! - [`SampleBuffer`] - Thread-safe wrapper around a log, shared by all producers
//! - [`export`] - Text format, filenames and atomic file writes
//!
//! # Export Format
//!
//! ```text
//! TYPE,TIMESTAMP,X,Y,Z
//! ACC,12.345678,0.012000,-0.981000,0.034000
//! MOTION,12.360000,0.010000,-0.020000,1.500000
//! ```
//!
//! The header is always present. Every numeric field carries exactly six
//! decimal places.
//!
//! [`SensorRecord`]: crate::types::SensorRecord

pub mod buffer;
pub mod export;

pub use buffer::{RecordLog, SampleBuffer};
pub use export::{
    export_filename, parse_export, serialize_records, write_atomic, DEFAULT_FILE_PREFIX,
    EXPORT_HEADER,
};
