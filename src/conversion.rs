//! Timecode and rational conversion helpers.
//!
//! Trim bounds arrive from callers as strings such as `"00:07:34"` or `"75.5"`
//! and leave towards FFmpeg as seconds or stream time bases. The helpers here
//! keep those conversions in one place.

use std::time::Duration;

use ffmpeg_next::Rational;

use crate::error::PlanError;
use crate::metadata::FrameRate;

/// Parse a timecode into a [`Duration`].
///
/// Accepts plain seconds (`"75"`, `"75.5"`), `MM:SS(.fff)` and
/// `HH:MM:SS(.fff)`. Minutes and seconds fields of the colon forms must be
/// below 60.
///
/// # Errors
///
/// Returns [`PlanError::InvalidTimecode`] for empty, negative or malformed
/// input.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// let start = vidfit::parse_timecode("00:07:34")?;
/// assert_eq!(start, Duration::from_secs(454));
/// # Ok::<(), vidfit::PlanError>(())
/// ```
pub fn parse_timecode(value: &str) -> Result<Duration, PlanError> {
    let trimmed = value.trim();
    let invalid = || PlanError::InvalidTimecode(trimmed.to_string());

    if trimmed.is_empty() {
        return Err(invalid());
    }

    if !trimmed.contains(':') {
        let seconds = trimmed.parse::<f64>().map_err(|_| invalid())?;
        return seconds_to_duration(seconds).ok_or_else(invalid);
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [minutes, seconds] => (0_u64, *minutes, *seconds),
        [hours, minutes, seconds] => (hours.parse::<u64>().map_err(|_| invalid())?, *minutes, *seconds),
        _ => return Err(invalid()),
    };

    let minutes = minutes.parse::<u64>().map_err(|_| invalid())?;
    let seconds = seconds.parse::<f64>().map_err(|_| invalid())?;
    if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return Err(invalid());
    }

    let whole = hours
        .checked_mul(3600)
        .and_then(|hours| hours.checked_add(minutes * 60))
        .map(Duration::from_secs)
        .ok_or_else(invalid)?;
    seconds_to_duration(seconds)
        .and_then(|fraction| whole.checked_add(fraction))
        .ok_or_else(invalid)
}

/// Format a [`Duration`] as `HH:MM:SS.mmm`.
pub fn format_timecode(duration: Duration) -> String {
    let total_millis = duration.as_millis();
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis / 60_000) % 60;
    let seconds = (total_millis / 1000) % 60;
    let millis = total_millis % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Convert non-negative finite seconds to a [`Duration`]. `None` when the
/// value is negative, not finite or too large for a `Duration`.
pub(crate) fn seconds_to_duration(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds).ok()
}

/// The time base of a stream running at `frame_rate` (one tick per frame).
pub(crate) fn frame_rate_time_base(frame_rate: FrameRate) -> Rational {
    let rate = frame_rate_to_rational(frame_rate);
    Rational::new(rate.denominator(), rate.numerator())
}

/// A frame rate as an FFmpeg rational.
///
/// [`FrameRate`] keeps both components within `i32`, so the casts are exact.
pub(crate) fn frame_rate_to_rational(frame_rate: FrameRate) -> Rational {
    Rational::new(frame_rate.numerator() as i32, frame_rate.denominator() as i32)
}
