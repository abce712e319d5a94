//! Timecode chaining across clips
//!
//! **Why**: Separate files shot in one session are logged as a single continuous
//! virtual timeline, so an editor can match log entries against a conformed sequence.
//!
//! **Used by**: runner (sequence step)
//!
//! # Algorithm
//!
//! Strict left-to-right fold over the clips:
//!
//! ```text
//! in[0]     = start
//! in[i]     = out[i-1]
//! frame_in  = timecode_to_frame(in[i], fps[i])
//! frame_out = frame_in + duration[i] * fps[i]
//! out[i]    = frame_to_timecode(frame_out, fps[i])
//! ```
//!
//! There is no gap or overlap between rows, whatever their frame rates. Each row is
//! converted at its own clip's fps (see [`crate::timecode`]).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::metadata::ClipMetadata;
use crate::timecode::{Timecode, frame_to_timecode, timecode_to_frame};

/// Column headers, in output order
pub const COLUMNS: [&str; 6] = [
    "File",
    "Timecode In",
    "Timecode Out",
    "Scene Number",
    "Shot Number",
    "Usable",
];

/// One line of the timecode log
///
/// The annotation columns are always empty on generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    #[serde(rename = "File")]
    pub file: String,
    #[serde(rename = "Timecode In")]
    pub timecode_in: String,
    #[serde(rename = "Timecode Out")]
    pub timecode_out: String,
    #[serde(rename = "Scene Number")]
    pub scene_number: String,
    #[serde(rename = "Shot Number")]
    pub shot_number: String,
    #[serde(rename = "Usable")]
    pub usable: String,
}

impl LogRow {
    pub fn new(file: String, timecode_in: Timecode, timecode_out: Timecode) -> Self {
        Self {
            file,
            timecode_in: timecode_in.to_string(),
            timecode_out: timecode_out.to_string(),
            scene_number: String::new(),
            shot_number: String::new(),
            usable: String::new(),
        }
    }

    /// Cells in [`COLUMNS`] order
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.file,
            &self.timecode_in,
            &self.timecode_out,
            &self.scene_number,
            &self.shot_number,
            &self.usable,
        ]
    }
}

/// How the `File` column is filled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationNaming {
    /// Same file name, placed under the output folder
    UnderFolder(PathBuf),
    /// Source path with its extension replaced by `.xlsx`
    SourceStem,
}

impl DestinationNaming {
    /// `UnderFolder` when an output folder is given, else `SourceStem`
    pub fn from_output_dir(output_dir: Option<&Path>) -> Self {
        match output_dir {
            Some(dir) => DestinationNaming::UnderFolder(dir.to_path_buf()),
            None => DestinationNaming::SourceStem,
        }
    }

    pub fn destination(&self, source: &Path) -> String {
        match self {
            DestinationNaming::UnderFolder(dir) => match source.file_name() {
                Some(name) => dir.join(name).to_string_lossy().into_owned(),
                None => dir.to_string_lossy().into_owned(),
            },
            DestinationNaming::SourceStem => {
                source.with_extension("xlsx").to_string_lossy().into_owned()
            }
        }
    }
}

/// Assign chained in/out timecodes to `clips`, keeping their order
///
/// `naming` builds the `File` column from each clip's source path.
pub fn sequence<F>(clips: &[ClipMetadata], start: Timecode, naming: F) -> Vec<LogRow>
where
    F: Fn(&Path) -> String,
{
    let mut rows = Vec::with_capacity(clips.len());
    let mut timecode_in = start;

    for clip in clips {
        let frame_in = timecode_to_frame(&timecode_in, clip.fps);
        let frame_out = frame_in + clip.frame_count();
        let timecode_out = frame_to_timecode(frame_out, clip.fps);

        rows.push(LogRow::new(naming(&clip.file_path), timecode_in, timecode_out));
        timecode_in = timecode_out;
    }

    rows
}
