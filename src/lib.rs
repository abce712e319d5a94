//! AUTOTCLOG - chained timecode logs for folders of video clips
//!
//! Scans a folder, reads each clip's frame rate and duration with ffprobe, chains
//! the clips from a start timecode and writes one `File / Timecode In / Timecode Out`
//! row per clip (plus empty Scene/Shot/Usable columns for manual notes).
//!
//! Re-exports all modules for use by binary targets.

// Core
pub mod metadata;
pub mod probe;
pub mod sequencer;
pub mod table;
pub mod timecode;

// App modules
pub mod cli;
pub mod error;
pub mod paths;
pub mod runner;
pub mod settings;
pub mod utils;

pub use error::LogError;
pub use metadata::{ClipMetadata, MetadataError, ScanResult, SkippedClip};
pub use probe::{FfProbe, Probe, ProbeError, ProbeField};
pub use runner::{LogRequest, ReportSummary, run};
pub use sequencer::{DestinationNaming, LogRow};
pub use settings::Settings;
pub use table::{CsvSink, TableFormat, TableSink, XlsxSink};
pub use timecode::{Timecode, TimecodeError, frame_to_timecode, timecode_to_frame};
