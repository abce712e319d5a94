//! Run orchestration - entry point for the CLI and any other front end.
//!
//! A front end collects a [`LogRequest`] once, calls [`run`], and shows either the
//! returned [`ReportSummary`] or the [`LogError`]. No state outlives a run.

use log::{info, trace, warn};
use std::path::{Path, PathBuf};

use crate::error::LogError;
use crate::metadata::{self, SkippedClip};
use crate::probe::Probe;
use crate::sequencer::{self, DestinationNaming, LogRow};
use crate::settings::DEFAULT_OUTPUT_NAME;
use crate::table::TableSink;
use crate::timecode::Timecode;
use crate::utils::media;

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct LogRequest {
    /// Folder to scan (non-recursive)
    pub folder: PathBuf,
    /// `HH:MM:SS:FF`; empty or `None` means `00:00:00:00`
    pub start_timecode: Option<String>,
    /// Where the table goes; defaults to `folder`
    pub output_dir: Option<PathBuf>,
    /// Table base name without extension; defaults to `AutoTCLog`
    pub output_name: Option<String>,
    /// Container extensions to scan, normalized
    pub extensions: Vec<String>,
}

impl LogRequest {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            start_timecode: None,
            output_dir: None,
            output_name: None,
            extensions: media::VIDEO_EXTS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// `{output_dir or folder}/{output_name}.{extension}`
    pub fn output_path(&self, extension: &str) -> PathBuf {
        let dir = self.output_dir.as_deref().unwrap_or(&self.folder);
        let name = self
            .output_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_OUTPUT_NAME);
        dir.join(format!("{}.{}", name, extension))
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub output_path: PathBuf,
    pub rows: Vec<LogRow>,
    /// Files left out of the log, with the reason
    pub skipped: Vec<SkippedClip>,
    /// Distinct frame rates seen, first-seen order
    pub frame_rates: Vec<f64>,
    /// Advisory: clips with different frame rates share the log
    pub mixed_frame_rates: bool,
}

impl ReportSummary {
    pub fn rows_written(&self) -> usize {
        self.rows.len()
    }
}

/// Scan, sequence and write one timecode log
///
/// Fails before touching the probe if the start timecode is malformed or the
/// folder can't be scanned. Per-clip failures end up in `skipped`.
pub fn run<P>(request: &LogRequest, probe: &P, sink: &dyn TableSink) -> Result<ReportSummary, LogError>
where
    P: Probe + ?Sized,
{
    trace!("Request: {:?}", request);

    let start = Timecode::parse_or_zero(request.start_timecode.as_deref())?;
    check_folder(&request.folder)?;

    probe
        .ensure_available()
        .map_err(|e| LogError::probe_unavailable(probe.name(), e))?;

    info!("Scanning folder {}", request.folder.display());
    let scan = metadata::scan(&request.folder, &request.extensions, probe).map_err(|e| {
        LogError::InputFolder {
            path: request.folder.clone(),
            reason: e.to_string(),
        }
    })?;

    if scan.clips.is_empty() {
        warn!("No usable clips in {}", request.folder.display());
    }

    let naming = DestinationNaming::from_output_dir(request.output_dir.as_deref());
    let rows = sequencer::sequence(&scan.clips, start, |path| naming.destination(path));

    let output_path = request.output_path(sink.extension());
    sink.write_rows(&output_path, &rows)
        .map_err(|e| LogError::output_write(&output_path, e))?;
    info!("Output file saved to {}", output_path.display());

    Ok(ReportSummary {
        output_path,
        rows,
        skipped: scan.skipped,
        frame_rates: scan.frame_rates,
        mixed_frame_rates: scan.mixed_frame_rates,
    })
}

fn check_folder(folder: &Path) -> Result<(), LogError> {
    let fail = |reason: &str| LogError::InputFolder {
        path: folder.to_path_buf(),
        reason: reason.to_string(),
    };

    if folder.as_os_str().is_empty() {
        return Err(fail("no folder given"));
    }
    if !folder.exists() {
        return Err(fail("does not exist"));
    }
    if !folder.is_dir() {
        return Err(fail("not a directory"));
    }
    Ok(())
}
