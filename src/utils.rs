//! Utility functions and constants
//!
//! **Why**: Centralized helpers used across multiple modules
//!
//! **Used by**: metadata (discovery), settings (defaults), cli (extra extensions)

/// Media file type detection
pub mod media {
    use std::path::Path;

    /// Containers scanned by default
    pub const VIDEO_EXTS: &[&str] = &["mp4", "avi", "mov", "mpg"];

    /// Containers that can be enabled through settings or `--ext`
    pub const OPTIONAL_VIDEO_EXTS: &[&str] = &["mts", "m2ts", "mkv", "mxf", "mpeg"];

    /// Normalize a user-supplied extension: `".MTS"` -> `"mts"`
    pub fn normalize_ext(ext: &str) -> String {
        ext.trim().trim_start_matches('.').to_lowercase()
    }

    /// Check if file extension is in `exts` (case-insensitive, `exts` already normalized)
    pub fn has_ext<S: AsRef<str>>(path: &Path, exts: &[S]) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|s| {
                let s = s.to_lowercase();
                exts.iter().any(|e| e.as_ref() == s)
            })
            .unwrap_or(false)
    }
}
