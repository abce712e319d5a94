//! Run-level errors
//!
//! Per-clip problems never show up here: they are collected as
//! [`crate::metadata::SkippedClip`] and the run continues. Everything below aborts
//! the run with a message that names the offending input.

use std::fmt;
use std::path::PathBuf;

use crate::probe::ProbeError;
use crate::table::TableError;
use crate::timecode::TimecodeError;

#[derive(Debug)]
pub enum LogError {
    /// Start timecode malformed; nothing was processed
    Format { input: String, reason: String },
    /// Input folder missing, not a directory, or unreadable
    InputFolder { path: PathBuf, reason: String },
    /// Probe executable missing or not runnable; nothing can be computed
    ProbeUnavailable { probe: String, reason: String },
    /// Table could not be written to `path`
    OutputWrite { path: PathBuf, reason: String },
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogError::Format { input, reason } => {
                write!(f, "Invalid start timecode '{}': {}", input, reason)
            }
            LogError::InputFolder { path, reason } => {
                write!(f, "Cannot scan input folder {}: {}", path.display(), reason)
            }
            LogError::ProbeUnavailable { probe, reason } => write!(
                f,
                "Probe '{}' is not available ({}). Install FFmpeg or pass --ffprobe <PATH>",
                probe, reason
            ),
            LogError::OutputWrite { path, reason } => {
                write!(f, "Failed to write {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for LogError {}

impl From<TimecodeError> for LogError {
    fn from(e: TimecodeError) -> Self {
        match e {
            TimecodeError::Format { input, reason } => LogError::Format { input, reason },
        }
    }
}

impl LogError {
    pub fn probe_unavailable(probe: impl Into<String>, e: ProbeError) -> Self {
        LogError::ProbeUnavailable {
            probe: probe.into(),
            reason: e.to_string(),
        }
    }

    pub fn output_write(path: impl Into<PathBuf>, e: TableError) -> Self {
        LogError::OutputWrite {
            path: path.into(),
            reason: e.to_string(),
        }
    }
}
