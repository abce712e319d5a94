//! `HH:MM:SS:FF` timecodes and frame-count conversion
//!
//! **Why**: The log chains clips on a virtual timeline. Each clip's in/out points
//! are stored as timecodes, but the arithmetic happens on (fractional) frame counts.
//!
//! **Used by**: sequencer (in/out computation), runner (start timecode validation)
//!
//! # Frame rate is per clip
//!
//! A timecode only means something together with the frame rate it was built for.
//! The sequencer converts every clip with *its own* fps, so `FF` in a mixed-rate
//! log counts 24ths of a second on one row and 30ths on the next. This differs from
//! a normal timecode track where one fixed rate applies to the whole timeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timecode parse errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimecodeError {
    /// Input did not split into exactly four colon-separated non-negative integers
    Format { input: String, reason: String },
}

impl fmt::Display for TimecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimecodeError::Format { input, reason } => {
                write!(f, "Invalid timecode '{}': {} (expected HH:MM:SS:FF)", input, reason)
            }
        }
    }
}

impl std::error::Error for TimecodeError {}

/// Position on a timeline, rendered as `HH:MM:SS:FF`
///
/// Component ranges are not enforced: minutes/seconds are expected in `[0, 60)` and
/// frames in `[0, floor(fps))`, but only the caller knows the fps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Timecode {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub frames: u32,
}

impl Timecode {
    /// `00:00:00:00`
    pub const ZERO: Timecode = Timecode::new(0, 0, 0, 0);

    pub const fn new(hours: u32, minutes: u32, seconds: u32, frames: u32) -> Self {
        Self { hours, minutes, seconds, frames }
    }

    /// Whole seconds before the frame component
    pub fn total_seconds(&self) -> u64 {
        self.hours as u64 * 3600 + self.minutes as u64 * 60 + self.seconds as u64
    }

    /// Parse an optional user string; empty or missing means `00:00:00:00`
    pub fn parse_or_zero(input: Option<&str>) -> Result<Self, TimecodeError> {
        match input.map(str::trim) {
            None | Some("") => Ok(Self::ZERO),
            Some(s) => s.parse(),
        }
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let parts: Vec<&str> = input.split(':').collect();
        if parts.len() != 4 {
            return Err(TimecodeError::Format {
                input: s.to_string(),
                reason: format!("found {} component(s)", parts.len()),
            });
        }

        let mut values = [0u32; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            // u32::from_str accepts a leading '+', timecodes don't
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TimecodeError::Format {
                    input: s.to_string(),
                    reason: format!("'{}' is not a non-negative integer", part),
                });
            }
            *value = part.parse().map_err(|e| TimecodeError::Format {
                input: s.to_string(),
                reason: format!("'{}': {}", part, e),
            })?;
        }

        let [hours, minutes, seconds, frames] = values;
        Ok(Self::new(hours, minutes, seconds, frames))
    }
}

impl fmt::Display for Timecode {
    /// Two-digit minimum per field. Hours widen past 99 rather than wrap.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

/// Convert a timecode to an absolute frame count at `fps`
///
/// `((H*3600 + M*60 + S) * fps) + F`
pub fn timecode_to_frame(tc: &Timecode, fps: f64) -> f64 {
    tc.total_seconds() as f64 * fps + tc.frames as f64
}

/// Convert a (possibly fractional) frame count to a timecode at `fps`
///
/// Sub-frame precision is dropped: both the seconds and the frame component are
/// floored. Negative or non-finite counts clamp to `00:00:00:00`.
///
/// Seconds and frames both come from the same remainder, so the result never
/// lies past `frame` even for fractional rates like 30000/1001.
pub fn frame_to_timecode(frame: f64, fps: f64) -> Timecode {
    if !frame.is_finite() || frame <= 0.0 || !fps.is_finite() || fps <= 0.0 {
        return Timecode::ZERO;
    }

    let rem = frame % fps;
    let total_seconds = ((frame - rem) / fps).round() as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds / 60) % 60;
    let seconds = total_seconds % 60;
    let frames = rem.floor() as u32;

    Timecode::new(
        u32::try_from(hours).unwrap_or(u32::MAX),
        minutes as u32,
        seconds as u32,
        frames,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let tc: Timecode = "01:02:03:04".parse().unwrap();
        assert_eq!(tc, Timecode::new(1, 2, 3, 4));
        assert_eq!(tc.to_string(), "01:02:03:04");

        // Unpadded input normalizes on output
        let tc: Timecode = " 1:2:3:4 ".parse().unwrap();
        assert_eq!(tc.to_string(), "01:02:03:04");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "01:02:03", "01:02:03:04:05", "aa:00:00:00", "00:-1:00:00", "00:00:00:1.5", "00::00:00", "+1:00:00:00"] {
            let err = bad.parse::<Timecode>().unwrap_err();
            assert!(matches!(err, TimecodeError::Format { .. }), "{bad}");
        }
    }

    #[test]
    fn test_parse_or_zero() {
        assert_eq!(Timecode::parse_or_zero(None).unwrap(), Timecode::ZERO);
        assert_eq!(Timecode::parse_or_zero(Some("  ")).unwrap(), Timecode::ZERO);
        assert_eq!(
            Timecode::parse_or_zero(Some("10:00:00:00")).unwrap(),
            Timecode::new(10, 0, 0, 0)
        );
        assert!(Timecode::parse_or_zero(Some("10:00")).is_err());
    }

    #[test]
    fn test_timecode_to_frame() {
        let tc = Timecode::new(0, 1, 2, 3);
        assert_eq!(timecode_to_frame(&tc, 24.0), 62.0 * 24.0 + 3.0);
        assert_eq!(timecode_to_frame(&Timecode::ZERO, 29.97), 0.0);
    }

    #[test]
    fn test_frame_to_timecode() {
        assert_eq!(frame_to_timecode(240.0, 24.0).to_string(), "00:00:10:00");
        assert_eq!(frame_to_timecode(225.0, 30.0).to_string(), "00:00:07:15");
        // 1h 1m 1s + 12 frames at 25 fps
        assert_eq!(frame_to_timecode(3661.0 * 25.0 + 12.0, 25.0).to_string(), "01:01:01:12");
        // Fractional frames are floored
        assert_eq!(frame_to_timecode(24.9, 24.0).to_string(), "00:00:01:00");
        assert_eq!(frame_to_timecode(23.9, 24.0).to_string(), "00:00:00:23");
    }

    #[test]
    fn test_frame_to_timecode_clamps_invalid() {
        assert_eq!(frame_to_timecode(-5.0, 24.0), Timecode::ZERO);
        assert_eq!(frame_to_timecode(f64::NAN, 24.0), Timecode::ZERO);
        assert_eq!(frame_to_timecode(100.0, 0.0), Timecode::ZERO);
    }

    #[test]
    fn test_hours_widen_past_99() {
        let tc = frame_to_timecode(123.0 * 3600.0 * 24.0, 24.0);
        assert_eq!(tc.to_string(), "123:00:00:00");
        assert_eq!(tc.to_string().parse::<Timecode>().unwrap(), tc);
    }

    /// Test: frame -> timecode -> frame
    /// Validates: Round trip holds up to whole-frame granularity
    #[test]
    fn test_round_trip_floor() {
        for fps in [24.0, 25.0, 30.0, 50.0, 60.0] {
            for n in [0.0, 1.0, 23.5, 24.0, 1799.99, 86_400.25, 1_000_003.7] {
                let tc = frame_to_timecode(n, fps);
                assert_eq!(timecode_to_frame(&tc, fps), f64::floor(n), "fps={fps} n={n}");
            }
        }
    }

    #[test]
    fn test_frame_to_timecode_ntsc() {
        let fps = 30000.0 / 1001.0;
        assert_eq!(frame_to_timecode(61.5 * fps, fps).to_string(), "00:01:01:14");
        let fps = 24000.0 / 1001.0;
        assert_eq!(frame_to_timecode(10.5 * fps, fps).to_string(), "00:00:10:11");
    }

    /// Test: whole-second durations at fractional rates
    /// Validates: Converted timecode never lands past the frame count, and stays within one frame of it
    #[test]
    fn test_fractional_fps_never_overshoots() {
        for fps in [24000.0 / 1001.0, 30000.0 / 1001.0, 60000.0 / 1001.0, 29.97] {
            for secs in 0..600 {
                let frame = secs as f64 * fps;
                let back = timecode_to_frame(&frame_to_timecode(frame, fps), fps);
                assert!(back <= frame, "fps={fps} secs={secs}: {back} > {frame}");
                assert!(frame - back < 1.0, "fps={fps} secs={secs}: {back} << {frame}");
            }
        }
    }
}
