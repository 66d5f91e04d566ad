//! Export format and atomic file writes
//!
//! Exports are written to a temporary file in the destination directory and
//! renamed into place, so the returned path never refers to a partially
//! written file. Filenames carry the export time; repeated exports within
//! the same second get a numeric suffix instead of overwriting each other.

use crate::error::{MotionError, Result, ResultExt};
use crate::types::{Channel, SensorRecord};
use chrono::{DateTime, TimeZone};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Fixed first line of every export
pub const EXPORT_HEADER: &str = "TYPE,TIMESTAMP,X,Y,Z";

/// Default filename prefix
pub const DEFAULT_FILE_PREFIX: &str = "motion_data";

/// Export file extension
pub const EXPORT_EXTENSION: &str = "csv";

/// Timestamp layout used in export filenames
const FILENAME_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Upper bound on collision suffixes tried for one export
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Format one record as an export line
pub fn format_record(record: &SensorRecord) -> String {
    let [x, y, z] = record.values();
    format!(
        "{},{:.6},{:.6},{:.6},{:.6}",
        record.channel().tag(),
        record.timestamp(),
        x,
        y,
        z
    )
}

/// Serialize records to export text: header, then one line per record
///
/// Lines are joined with `\n`; there is no trailing newline.
pub fn serialize_records(records: &[SensorRecord]) -> String {
    // ~48 bytes per line at typical magnitudes
    let mut out = String::with_capacity(EXPORT_HEADER.len() + records.len() * 48);
    out.push_str(EXPORT_HEADER);
    for record in records {
        out.push('\n');
        out.push_str(&format_record(record));
    }
    out
}

/// Parse export text back into records
pub fn parse_export(text: &str) -> Result<Vec<SensorRecord>> {
    let mut lines = text.lines();
    match lines.next() {
        Some(EXPORT_HEADER) => {}
        other => {
            return Err(MotionError::Export(format!(
                "Missing export header, found {:?}",
                other
            )))
        }
    }

    lines
        .enumerate()
        .map(|(i, line)| {
            let line_no = i + 2;
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != 5 {
                return Err(MotionError::Export(format!(
                    "Line {}: expected 5 fields, got {}",
                    line_no,
                    fields.len()
                )));
            }
            let channel = Channel::from_tag(fields[0]).ok_or_else(|| {
                MotionError::Export(format!("Line {}: unknown type {:?}", line_no, fields[0]))
            })?;
            let numbers = fields[1..]
                .iter()
                .map(|f| {
                    f.parse::<f64>().map_err(|e| {
                        MotionError::Export(format!("Line {}: bad number {:?}: {}", line_no, f, e))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            SensorRecord::try_new(channel, numbers[0], &numbers[1..])
        })
        .collect()
}

/// Build the export filename for a given export time
pub fn export_filename<Tz: TimeZone>(prefix: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}.{}",
        prefix,
        at.format(FILENAME_TIME_FORMAT),
        EXPORT_EXTENSION
    )
}

fn candidate_path<Tz: TimeZone>(
    dir: &Path,
    prefix: &str,
    at: &DateTime<Tz>,
    attempt: u32,
) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    if attempt == 0 {
        dir.join(export_filename(prefix, at))
    } else {
        dir.join(format!(
            "{}_{}_{}.{}",
            prefix,
            at.format(FILENAME_TIME_FORMAT),
            attempt,
            EXPORT_EXTENSION
        ))
    }
}

/// Atomically write `contents` to a new, uniquely named file in `dir`
///
/// Creates `dir` if needed. Never overwrites an existing file.
pub fn write_atomic<Tz: TimeZone>(
    dir: &Path,
    prefix: &str,
    contents: &str,
    at: &DateTime<Tz>,
) -> Result<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    write_with_attempts(dir, prefix, contents, at, MAX_NAME_ATTEMPTS)
}

fn write_with_attempts<Tz: TimeZone>(
    dir: &Path,
    prefix: &str,
    contents: &str,
    at: &DateTime<Tz>,
    max_attempts: u32,
) -> Result<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {:?}", dir))?;

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
    temp.write_all(contents.as_bytes())
        .context("Failed to write export data")?;
    temp.as_file()
        .sync_all()
        .context("Failed to sync export data")?;

    // The temp file is removed on drop if no name is free
    for attempt in 0..max_attempts {
        let path = candidate_path(dir, prefix, at, attempt);
        match temp.persist_noclobber(&path) {
            Ok(_) => return Ok(path),
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                temp = e.file;
            }
            Err(e) => {
                return Err(MotionError::Io(e.error)
                    .with_context(format!("Failed to move export into place at {:?}", path)))
            }
        }
    }

    Err(MotionError::Export(format!(
        "No free export filename in {:?} after {} attempts",
        dir, max_attempts
    )))
}
