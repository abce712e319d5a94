//! Persisted defaults (`autotclog.json`)
//!
//! **Why**: Probe location, container list and output naming rarely change between
//! runs; keeping them in a settings file saves retyping flags.
//!
//! **Used by**: main (merged with CLI flags before building the request)

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::probe::{DEFAULT_FFPROBE, DEFAULT_TIMEOUT};
use crate::table::TableFormat;
use crate::utils::media;

/// Default output base name
pub const DEFAULT_OUTPUT_NAME: &str = "AutoTCLog";

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Probe executable (name on PATH or full path)
    pub ffprobe: String,
    pub probe_timeout_secs: u64, // 0 = no timeout
    /// Container extensions to scan, without the dot
    pub extensions: Vec<String>,
    pub output_name: String,
    pub format: TableFormat,
    /// Start timecode used when none is given (empty = 00:00:00:00)
    pub start_timecode: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ffprobe: DEFAULT_FFPROBE.to_string(),
            probe_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            extensions: media::VIDEO_EXTS.iter().map(|s| s.to_string()).collect(),
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            format: TableFormat::default(),
            start_timecode: String::new(),
        }
    }
}

impl Settings {
    /// Load settings from `path`
    ///
    /// A missing file yields defaults silently; an unreadable or malformed one
    /// yields defaults with a warning.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("No settings file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::try_load(path) {
            Ok(settings) => {
                debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Ignoring settings file: {:#}", e);
                Self::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        settings.normalize();
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        Ok(())
    }

    /// Lowercase and de-dot extensions, drop blanks and duplicates
    pub fn normalize(&mut self) {
        let mut exts: Vec<String> = Vec::with_capacity(self.extensions.len());
        for ext in self.extensions.iter().map(|e| media::normalize_ext(e)) {
            if !ext.is_empty() && !exts.contains(&ext) {
                exts.push(ext);
            }
        }
        self.extensions = exts;
    }

    /// Add extra extensions (e.g. from `--ext`)
    pub fn add_extensions<S: AsRef<str>>(&mut self, extra: &[S]) {
        self.extensions
            .extend(extra.iter().map(|e| e.as_ref().to_string()));
        self.normalize();
    }

    /// Probe timeout; `None` when disabled
    pub fn probe_timeout(&self) -> Option<Duration> {
        (self.probe_timeout_secs > 0).then(|| Duration::from_secs(self.probe_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.ffprobe, "ffprobe");
        assert_eq!(s.extensions, vec!["mp4", "avi", "mov", "mpg"]);
        assert_eq!(s.output_name, "AutoTCLog");
        assert_eq!(s.format, TableFormat::Xlsx);
        assert_eq!(s.probe_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load(&dir.path().join("none.json")), Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autotclog.json");
        std::fs::write(&path, r#"{ "extensions": [".MTS", "mp4", "mp4"], "format": "csv" }"#).unwrap();

        let s = Settings::load(&path);
        assert_eq!(s.extensions, vec!["mts", "mp4"]);
        assert_eq!(s.format, TableFormat::Csv);
        assert_eq!(s.output_name, DEFAULT_OUTPUT_NAME);
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autotclog.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autotclog.json");
        let mut s = Settings::default();
        s.start_timecode = "01:00:00:00".into();
        s.probe_timeout_secs = 0;
        s.save(&path).unwrap();

        let back = Settings::load(&path);
        assert_eq!(back, s);
        assert_eq!(back.probe_timeout(), None);
    }

    #[test]
    fn test_add_extensions() {
        let mut s = Settings::default();
        s.add_extensions(&["MTS", ".mov"]);
        assert_eq!(s.extensions, vec!["mp4", "avi", "mov", "mpg", "mts"]);
    }
}
