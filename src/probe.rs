//! External metadata probe (ffprobe)
//!
//! **Why**: Frame rate and duration come from an external tool, not from decoding.
//! The extractor only sees raw text, so the probe is kept behind a trait and can be
//! swapped for an in-memory fake in tests.
//!
//! **Used by**: metadata (per-file probing), runner (availability check)
//!
//! Output is returned verbatim: it may be empty, span several lines (one per video
//! stream) or contain garbage. Interpreting it is the extractor's job.

use crossbeam_channel::RecvTimeoutError;
use log::{debug, trace};
use std::ffi::OsStr;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Default probe executable (resolved through PATH)
pub const DEFAULT_FFPROBE: &str = "ffprobe";

/// Default per-call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Stream entry requested from the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeField {
    FrameRate,
    Duration,
}

impl ProbeField {
    /// ffprobe `-show_entries` value
    pub fn entry(&self) -> &'static str {
        match self {
            ProbeField::FrameRate => "stream=r_frame_rate",
            ProbeField::Duration => "stream=duration",
        }
    }
}

impl fmt::Display for ProbeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeField::FrameRate => write!(f, "frame rate"),
            ProbeField::Duration => write!(f, "duration"),
        }
    }
}

/// Probe invocation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// Executable missing or not runnable
    NotFound(String),
    Io(String),
    Timeout(Duration),
    /// Non-zero exit without any output
    Failed { status: String, stderr: String },
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::NotFound(e) => write!(f, "probe not found: {}", e),
            ProbeError::Io(e) => write!(f, "probe I/O error: {}", e),
            ProbeError::Timeout(d) => write!(f, "probe timed out after {:.1}s", d.as_secs_f64()),
            ProbeError::Failed { status, stderr } if stderr.is_empty() => {
                write!(f, "probe failed ({})", status)
            }
            ProbeError::Failed { status, stderr } => write!(f, "probe failed ({}): {}", status, stderr),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Source of raw per-file metadata text
pub trait Probe {
    /// Raw text for `field` of the video streams in `path`
    fn probe(&self, path: &Path, field: ProbeField) -> Result<String, ProbeError>;

    /// Check the probe can run at all. Called once before a scan.
    fn ensure_available(&self) -> Result<(), ProbeError> {
        Ok(())
    }

    /// Name shown in error messages
    fn name(&self) -> String {
        "probe".to_string()
    }
}

/// Closures act as probes (test fakes, custom front ends)
impl<F> Probe for F
where
    F: Fn(&Path, ProbeField) -> Result<String, ProbeError>,
{
    fn probe(&self, path: &Path, field: ProbeField) -> Result<String, ProbeError> {
        self(path, field)
    }
}

/// ffprobe run as a child process, one call per field
#[derive(Debug, Clone)]
pub struct FfProbe {
    executable: PathBuf,
    /// `None` waits forever
    timeout: Option<Duration>,
}

impl Default for FfProbe {
    fn default() -> Self {
        Self::new(DEFAULT_FFPROBE, Some(DEFAULT_TIMEOUT))
    }
}

impl FfProbe {
    pub fn new(executable: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run the probe with `args` and return stdout
    ///
    /// Stdout is drained on a helper thread so a stalled process can be killed once
    /// the timeout expires instead of blocking the scan forever.
    fn run(&self, args: &[&OsStr]) -> Result<String, ProbeError> {
        trace!("{} {:?}", self.executable.display(), args);

        let mut child = Command::new(&self.executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    ProbeError::NotFound(format!("{}: {}", self.executable.display(), e))
                }
                _ => ProbeError::Io(e.to_string()),
            })?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProbeError::Io("stdout not captured".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ProbeError::Io("stderr not captured".to_string()))?;

        // stderr gets its own reader so a chatty probe can't fill the pipe and stall
        let stderr_reader = std::thread::spawn(move || {
            let mut err = Vec::new();
            let _ = stderr.read_to_end(&mut err);
            String::from_utf8_lossy(&err).into_owned()
        });

        let (tx, rx) = crossbeam_channel::bounded(1);
        std::thread::spawn(move || {
            let mut out = Vec::new();
            let res = stdout.read_to_end(&mut out).map(|_| {
                let err = stderr_reader.join().unwrap_or_default();
                (String::from_utf8_lossy(&out).into_owned(), err)
            });
            let _ = tx.send(res);
        });

        let received = match self.timeout {
            Some(timeout) => rx.recv_timeout(timeout),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        let (out, err) = match received {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProbeError::Io(e.to_string()));
            }
            Err(RecvTimeoutError::Timeout) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProbeError::Timeout(self.timeout.unwrap_or_default()));
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProbeError::Io("probe reader thread exited".to_string()));
            }
        };

        let status = child.wait().map_err(|e| ProbeError::Io(e.to_string()))?;
        if !err.trim().is_empty() {
            debug!("{}: {}", self.executable.display(), err.trim());
        }

        if !status.success() && out.trim().is_empty() {
            return Err(ProbeError::Failed {
                status: status.to_string(),
                stderr: err.trim().to_string(),
            });
        }

        Ok(out)
    }
}

impl Probe for FfProbe {
    fn probe(&self, path: &Path, field: ProbeField) -> Result<String, ProbeError> {
        let args = [
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-select_streams"),
            OsStr::new("v"),
            OsStr::new("-of"),
            OsStr::new("default=noprint_wrappers=1:nokey=1"),
            OsStr::new("-show_entries"),
            OsStr::new(field.entry()),
            OsStr::new("-i"),
            path.as_os_str(),
        ];
        self.run(&args)
    }

    fn ensure_available(&self) -> Result<(), ProbeError> {
        let out = self.run(&[OsStr::new("-version")])?;
        if let Some(first) = out.lines().next() {
            debug!("Probe: {}", first);
        }
        Ok(())
    }

    fn name(&self) -> String {
        self.executable.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_entries() {
        assert_eq!(ProbeField::FrameRate.entry(), "stream=r_frame_rate");
        assert_eq!(ProbeField::Duration.entry(), "stream=duration");
        assert_eq!(ProbeField::FrameRate.to_string(), "frame rate");
    }

    #[test]
    fn test_closure_probe() {
        let probe = |_: &Path, field: ProbeField| -> Result<String, ProbeError> {
            Ok(match field {
                ProbeField::FrameRate => "25/1\n".to_string(),
                ProbeField::Duration => "4.0\n".to_string(),
            })
        };
        assert_eq!(probe.probe(Path::new("a.mp4"), ProbeField::FrameRate).unwrap(), "25/1\n");
        assert!(probe.ensure_available().is_ok());
    }

    /// Test: Missing executable
    /// Validates: Spawn failure maps to NotFound (fatal at run level)
    #[test]
    fn test_missing_executable() {
        let probe = FfProbe::new("/nonexistent/dir/ffprobe-missing", Some(Duration::from_secs(1)));
        let err = probe.ensure_available().unwrap_err();
        assert!(matches!(err, ProbeError::NotFound(_)), "{err}");
        assert_eq!(probe.name(), "/nonexistent/dir/ffprobe-missing");

        let err = probe.probe(Path::new("clip.mp4"), ProbeField::Duration).unwrap_err();
        assert!(matches!(err, ProbeError::NotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let probe = FfProbe::new("sleep", Some(Duration::from_millis(200)));
        let started = std::time::Instant::now();
        let err = probe.run(&[OsStr::new("5")]).unwrap_err();
        assert_eq!(err, ProbeError::Timeout(Duration::from_millis(200)));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout() {
        let probe = FfProbe::new("echo", None);
        let out = probe.run(&[OsStr::new("30000/1001")]).unwrap();
        assert_eq!(out.trim(), "30000/1001");
    }
}
