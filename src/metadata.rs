//! Clip discovery and frame-rate / duration extraction
//!
//! **Why**: Timecode chaining needs an fps and a duration per clip, and ffprobe
//! reports them as loosely formatted text: `30000/1001`, one value per video stream,
//! `N/A`, or nothing at all. Everything is reduced to a single number here.
//!
//! **Used by**: runner (scan step)
//!
//! # Parsing rules
//!
//! Frame rate, in priority order:
//! 1. one `num/den` pair -> `num / den` (zero denominator fails)
//! 2. several lines -> parse each line, skip the bad ones, average the rest.
//!    A line may be a plain float or a `num/den` pair, so `25/1\n25/1` gives 25.
//!    A float-only reader would drop such a file instead.
//! 3. one token -> plain float
//!
//! Duration: plain float of the whole text, else the average of the lines that parse.
//!
//! A file whose fps or duration can't be parsed is dropped and reported, never
//! treated as zero. Averaging across several video streams is a heuristic kept
//! for compatibility; for multi-stream files the result is an approximation.

use indexmap::IndexSet;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::probe::{Probe, ProbeError, ProbeField};
use crate::utils::media;

/// Frame rate and duration of one clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipMetadata {
    pub file_path: PathBuf,
    /// Frames per second, > 0
    pub fps: f64,
    /// Seconds, >= 0
    pub duration: f64,
}

impl ClipMetadata {
    /// Clip length in (fractional) frames
    pub fn frame_count(&self) -> f64 {
        self.duration * self.fps
    }
}

/// Why a clip was left out of the log
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataError {
    Probe { field: ProbeField, error: ProbeError },
    FrameRate { raw: String, reason: String },
    Duration { raw: String, reason: String },
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::Probe { field, error } => write!(f, "{} probe: {}", field, error),
            MetadataError::FrameRate { raw, reason } => {
                write!(f, "could not parse frame rate '{}': {}", raw.trim(), reason)
            }
            MetadataError::Duration { raw, reason } => {
                write!(f, "could not parse duration '{}': {}", raw.trim(), reason)
            }
        }
    }
}

impl std::error::Error for MetadataError {}

/// Clip dropped during the scan
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedClip {
    pub file_path: PathBuf,
    pub reason: MetadataError,
}

/// Scan outcome
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Parsed clips, in scan order
    pub clips: Vec<ClipMetadata>,
    pub skipped: Vec<SkippedClip>,
    /// Distinct frame rates in first-seen order
    pub frame_rates: Vec<f64>,
    /// More than one distinct frame rate. Advisory only.
    pub mixed_frame_rates: bool,
}

/// List clips in `folder` (non-recursive) whose extension is in `exts`
///
/// Order is whatever the directory listing yields; nothing is sorted.
pub fn discover<S: AsRef<str>>(folder: &Path, exts: &[S]) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(folder)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", folder.display(), e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        if media::has_ext(&path, exts) {
            files.push(path);
        } else if media::has_ext(&path, media::OPTIONAL_VIDEO_EXTS) {
            debug!("Ignoring {} (extension not enabled, see --ext)", path.display());
        }
    }

    Ok(files)
}

/// Probe every file in order; failures are collected, not propagated
pub fn extract<P: Probe + ?Sized>(files: &[PathBuf], probe: &P) -> ScanResult {
    let mut result = ScanResult::default();
    let mut distinct: IndexSet<u64> = IndexSet::new();

    for file in files {
        match probe_clip(file, probe) {
            Ok(clip) => {
                debug!(
                    "{}: {:.3} fps, {:.3}s",
                    clip.file_path.display(),
                    clip.fps,
                    clip.duration
                );
                distinct.insert(clip.fps.to_bits());
                result.clips.push(clip);
            }
            Err(reason) => {
                warn!("Skipping {}: {}", file.display(), reason);
                result.skipped.push(SkippedClip {
                    file_path: file.clone(),
                    reason,
                });
            }
        }
    }

    result.frame_rates = distinct.into_iter().map(f64::from_bits).collect();
    result.mixed_frame_rates = result.frame_rates.len() > 1;

    if result.mixed_frame_rates {
        warn!(
            "Mixed frame rates ({}): keep clips with different frame rates in separate folders for best results",
            format_rates(&result.frame_rates)
        );
    }

    result
}

/// Discover and probe all clips in `folder`
pub fn scan<S, P>(folder: &Path, exts: &[S], probe: &P) -> std::io::Result<ScanResult>
where
    S: AsRef<str>,
    P: Probe + ?Sized,
{
    let files = discover(folder, exts)?;
    info!("Scanning {} clip(s) in {}", files.len(), folder.display());
    Ok(extract(&files, probe))
}

/// Probe and parse a single clip
pub fn probe_clip<P: Probe + ?Sized>(path: &Path, probe: &P) -> Result<ClipMetadata, MetadataError> {
    let raw_fps = probe
        .probe(path, ProbeField::FrameRate)
        .map_err(|error| MetadataError::Probe { field: ProbeField::FrameRate, error })?;
    let fps = parse_frame_rate(&raw_fps)?;

    let raw_duration = probe
        .probe(path, ProbeField::Duration)
        .map_err(|error| MetadataError::Probe { field: ProbeField::Duration, error })?;
    let duration = parse_duration(&raw_duration)?;

    Ok(ClipMetadata {
        file_path: path.to_path_buf(),
        fps,
        duration,
    })
}

/// Parse raw frame-rate probe output
pub fn parse_frame_rate(raw: &str) -> Result<f64, MetadataError> {
    let fail = |reason: String| MetadataError::FrameRate {
        raw: raw.to_string(),
        reason,
    };

    let text = raw.trim();
    if text.is_empty() {
        return Err(fail("empty probe output".to_string()));
    }

    let fps = if !text.contains('\n') && text.contains('/') {
        parse_ratio(text).map_err(fail)?
    } else if text.contains('\n') {
        let values = parse_lines(text, parse_rate_token);
        mean(&values).ok_or_else(|| fail("no line holds a number".to_string()))?
    } else {
        text.parse::<f64>()
            .map_err(|e| fail(format!("'{}': {}", text, e)))?
    };

    if !fps.is_finite() || fps <= 0.0 {
        return Err(fail(format!("{} is not a usable frame rate", fps)));
    }
    Ok(fps)
}

/// Parse raw duration probe output (seconds)
pub fn parse_duration(raw: &str) -> Result<f64, MetadataError> {
    let fail = |reason: String| MetadataError::Duration {
        raw: raw.to_string(),
        reason,
    };

    let text = raw.trim();
    if text.is_empty() {
        return Err(fail("empty probe output".to_string()));
    }

    let duration = match text.parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            let values = parse_lines(text, |t| t.parse::<f64>().map_err(|e| e.to_string()));
            mean(&values).ok_or_else(|| fail("no line holds a number".to_string()))?
        }
    };

    if !duration.is_finite() || duration < 0.0 {
        return Err(fail(format!("{} is not a usable duration", duration)));
    }
    Ok(duration)
}

/// `num/den` -> `num / den`
fn parse_ratio(text: &str) -> Result<f64, String> {
    let (num, den) = text
        .split_once('/')
        .ok_or_else(|| format!("'{}' is not a ratio", text))?;
    let num: f64 = num
        .trim()
        .parse()
        .map_err(|e| format!("numerator '{}': {}", num.trim(), e))?;
    let den: f64 = den
        .trim()
        .parse()
        .map_err(|e| format!("denominator '{}': {}", den.trim(), e))?;
    if den == 0.0 {
        return Err(format!("zero denominator in '{}'", text));
    }
    Ok(num / den)
}

/// One line of multi-stream frame-rate output: ratio or plain number
fn parse_rate_token(token: &str) -> Result<f64, String> {
    if token.contains('/') {
        parse_ratio(token)
    } else {
        token.parse::<f64>().map_err(|e| e.to_string())
    }
}

/// Parse every non-blank line, logging and skipping the ones that fail
fn parse_lines<F>(text: &str, parse: F) -> Vec<f64>
where
    F: Fn(&str) -> Result<f64, String>,
{
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match parse(line) {
            Ok(value) if value.is_finite() => Some(value),
            Ok(value) => {
                warn!("Ignoring probe value '{}' ({})", line, value);
                None
            }
            Err(e) => {
                warn!("Could not convert '{}' to a number: {}", line, e);
                None
            }
        })
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// `24, 29.97` style list for messages
pub fn format_rates(rates: &[f64]) -> String {
    rates
        .iter()
        .map(|r| {
            let s = format!("{:.3}", r);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_frame_rate_ratio() {
        assert!(approx(parse_frame_rate("30000/1001").unwrap(), 29.970));
        assert_eq!(parse_frame_rate("25/1\n").unwrap(), 25.0);
        assert_eq!(parse_frame_rate(" 24 ").unwrap(), 24.0);
        assert_eq!(parse_frame_rate("23.976").unwrap(), 23.976);
    }

    #[test]
    fn test_frame_rate_zero_denominator() {
        let err = parse_frame_rate("30/0").unwrap_err();
        assert!(matches!(err, MetadataError::FrameRate { .. }));
        assert!(parse_frame_rate("0/0").is_err());
        assert!(parse_frame_rate("0/1").is_err());
    }

    #[test]
    fn test_frame_rate_multi_line_mean() {
        let fps = parse_frame_rate("24\n24\n25").unwrap();
        assert!(approx(fps, 24.333));

        // Bad lines are skipped
        assert_eq!(parse_frame_rate("24\ngarbage\n\n").unwrap(), 24.0);
        assert_eq!(parse_frame_rate("25/1\n25/1").unwrap(), 25.0);
        assert!(approx(parse_frame_rate("30000/1001\n30/1").unwrap(), 29.985));
    }

    #[test]
    fn test_frame_rate_failures() {
        for raw in ["", "   \n", "N/A", "abc", "x\ny", "-25", "inf"] {
            assert!(parse_frame_rate(raw).is_err(), "{raw:?}");
        }
    }

    #[test]
    fn test_duration() {
        assert_eq!(parse_duration("10.000000\n").unwrap(), 10.0);
        assert_eq!(parse_duration("0").unwrap(), 0.0);
        assert_eq!(parse_duration("4.0\n6.0").unwrap(), 5.0);
        assert_eq!(parse_duration("N/A\n8.5").unwrap(), 8.5);
    }

    #[test]
    fn test_duration_failures() {
        for raw in ["", "N/A", "N/A\nN/A", "-1.0", "nan"] {
            let err = parse_duration(raw).unwrap_err();
            assert!(matches!(err, MetadataError::Duration { .. }), "{raw:?}");
        }
    }

    fn fake_probe(
        table: HashMap<&'static str, (&'static str, &'static str)>,
    ) -> impl Fn(&Path, ProbeField) -> Result<String, ProbeError> {
        move |path: &Path, field: ProbeField| -> Result<String, ProbeError> {
            let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
            let (fps, duration) = table
                .get(name)
                .ok_or_else(|| ProbeError::NotFound(name.to_string()))?;
            Ok(match field {
                ProbeField::FrameRate => fps.to_string(),
                ProbeField::Duration => duration.to_string(),
            })
        }
    }

    /// Test: One clip with an empty duration
    /// Validates: Clip is skipped, the rest keep their order
    #[test]
    fn test_extract_skips_unparseable() {
        let probe = fake_probe(HashMap::from([
            ("a.mp4", ("24/1", "10.0")),
            ("b.mp4", ("24/1", "")),
            ("c.mp4", ("24/1", "2.5")),
        ]));
        let files: Vec<PathBuf> = ["a.mp4", "b.mp4", "c.mp4"].iter().map(PathBuf::from).collect();

        let result = extract(&files, &probe);
        let names: Vec<_> = result.clips.iter().map(|c| c.file_path.clone()).collect();
        assert_eq!(names, vec![PathBuf::from("a.mp4"), PathBuf::from("c.mp4")]);
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].file_path, PathBuf::from("b.mp4"));
        assert!(matches!(result.skipped[0].reason, MetadataError::Duration { .. }));
        assert!(!result.mixed_frame_rates);
        assert_eq!(result.frame_rates, vec![24.0]);
    }

    #[test]
    fn test_extract_probe_failure_is_per_file() {
        let probe = fake_probe(HashMap::from([("a.mov", ("25", "1.0"))]));
        let files = vec![PathBuf::from("missing.mov"), PathBuf::from("a.mov")];

        let result = extract(&files, &probe);
        assert_eq!(result.clips.len(), 1);
        assert!(matches!(
            result.skipped[0].reason,
            MetadataError::Probe { field: ProbeField::FrameRate, .. }
        ));
    }

    /// Test: 24 and 30 fps clips in one folder
    /// Validates: Advisory flag set, both clips kept
    #[test]
    fn test_extract_mixed_frame_rates() {
        let probe = fake_probe(HashMap::from([
            ("a.mp4", ("24/1", "1.0")),
            ("b.mp4", ("30/1", "1.0")),
            ("c.mp4", ("24/1", "1.0")),
        ]));
        let files: Vec<PathBuf> = ["a.mp4", "b.mp4", "c.mp4"].iter().map(PathBuf::from).collect();

        let result = extract(&files, &probe);
        assert!(result.mixed_frame_rates);
        assert_eq!(result.clips.len(), 3);
        assert_eq!(result.frame_rates, vec![24.0, 30.0]);
        assert_eq!(format_rates(&result.frame_rates), "24, 30");
    }

    #[test]
    fn test_discover_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.mp4", "b.MOV", "c.txt", "d.mts", "e.avi"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.mp4")).unwrap();

        let mut found: Vec<String> = discover(dir.path(), media::VIDEO_EXTS)
            .unwrap()
            .iter()
            .filter_map(|p| p.file_name().and_then(|s| s.to_str()).map(String::from))
            .collect();
        found.sort();
        assert_eq!(found, vec!["a.mp4", "b.MOV", "e.avi"]);

        let exts = vec!["mts".to_string()];
        let found = discover(dir.path(), &exts).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_discover_missing_folder() {
        assert!(discover(Path::new("/nonexistent/clips"), media::VIDEO_EXTS).is_err());
    }

    #[test]
    fn test_format_rates() {
        assert_eq!(format_rates(&[23.976, 25.0, 29.97002997]), "23.976, 25, 29.97");
    }
}
