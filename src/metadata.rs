//! Video metadata types.
//!
//! [`VideoMetadata`] is the read-once result of a
//! [`MetadataProbe`](crate::MetadataProbe). It is also what the planner
//! consumes, so tests and callers with metadata from elsewhere can build one
//! directly with [`VideoMetadata::new`].

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::time::Duration;

use crate::error::PlanError;

/// A frame rate expressed as an exact rational number.
///
/// NTSC rates such as 29.97 fps are stored as `30000/1001` so that filter
/// arguments and time bases derived from them stay exact.
/// [`FrameRate::ZERO`] stands for an unknown rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRate {
    numerator: u32,
    denominator: u32,
}

impl FrameRate {
    /// The unknown / absent frame rate.
    pub const ZERO: FrameRate = FrameRate {
        numerator: 0,
        denominator: 1,
    };

    /// Build a frame rate from a ratio, reduced to lowest terms.
    ///
    /// A zero denominator yields [`FrameRate::ZERO`], and so does a ratio
    /// that stays above `i32::MAX` in either component after reduction,
    /// since FFmpeg rationals cannot hold it.
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self::checked(numerator, denominator).unwrap_or(Self::ZERO)
    }

    /// Like [`new`](Self::new), but `None` for a ratio FFmpeg cannot
    /// represent.
    fn checked(numerator: u32, denominator: u32) -> Option<Self> {
        if numerator == 0 || denominator == 0 {
            return Some(Self::ZERO);
        }
        let divisor = gcd(numerator, denominator);
        let (numerator, denominator) = (numerator / divisor, denominator / divisor);
        if numerator > i32::MAX as u32 || denominator > i32::MAX as u32 {
            return None;
        }
        Some(Self {
            numerator,
            denominator,
        })
    }

    /// Build a frame rate from a whole number of frames per second.
    pub fn from_integer(frames_per_second: u32) -> Self {
        Self::new(frames_per_second, 1)
    }

    /// Build a frame rate from a signed ratio as reported by FFmpeg.
    ///
    /// Non-positive components mean FFmpeg did not know the rate.
    pub(crate) fn from_signed(numerator: i32, denominator: i32) -> Self {
        if numerator <= 0 || denominator <= 0 {
            Self::ZERO
        } else {
            Self::new(numerator as u32, denominator as u32)
        }
    }

    /// Numerator of the reduced ratio.
    pub fn numerator(self) -> u32 {
        self.numerator
    }

    /// Denominator of the reduced ratio.
    pub fn denominator(self) -> u32 {
        self.denominator
    }

    /// Returns `true` if the rate is unknown.
    pub fn is_zero(self) -> bool {
        self.numerator == 0
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Display for FrameRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl FromStr for FrameRate {
    type Err = PlanError;

    /// Parse `"30"`, `"30000/1001"` or `"29.97"`.
    ///
    /// Decimal values keep millihertz precision (`29.97` becomes `2997/100`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let invalid = || PlanError::InvalidFrameRate(trimmed.to_string());

        if let Some((numerator, denominator)) = trimmed.split_once('/') {
            let numerator = numerator.trim().parse::<u32>().map_err(|_| invalid())?;
            let denominator = denominator.trim().parse::<u32>().map_err(|_| invalid())?;
            if denominator == 0 {
                return Err(invalid());
            }
            return Self::checked(numerator, denominator).ok_or_else(invalid);
        }

        if let Ok(whole) = trimmed.parse::<u32>() {
            return Self::checked(whole, 1).ok_or_else(invalid);
        }

        let decimal = trimmed.parse::<f64>().map_err(|_| invalid())?;
        if !decimal.is_finite() || decimal < 0.0 || decimal > u32::MAX as f64 / 1000.0 {
            return Err(invalid());
        }
        Self::checked((decimal * 1000.0).round() as u32, 1000).ok_or_else(invalid)
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Structural metadata of a video stream.
///
/// `duration` is always derived from `frame_count` and `frame_rate`, never
/// read independently, so the two can not disagree.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frame rate; [`FrameRate::ZERO`] when unknown.
    pub frame_rate: FrameRate,
    /// Number of frames in the stream.
    pub frame_count: u64,
    /// Duration in seconds: `frame_count / fps`, or `0.0` when the frame rate
    /// is unknown.
    pub duration: f64,
}

impl VideoMetadata {
    /// Build metadata, deriving the duration from frame count and rate.
    pub fn new(width: u32, height: u32, frame_rate: FrameRate, frame_count: u64) -> Self {
        let duration = if frame_rate.is_zero() {
            0.0
        } else {
            frame_count as f64 * frame_rate.denominator() as f64 / frame_rate.numerator() as f64
        };
        Self {
            width,
            height,
            frame_rate,
            frame_count,
            duration,
        }
    }

    /// Frames per second as a float (`0.0` when unknown).
    pub fn frames_per_second(&self) -> f64 {
        self.frame_rate.as_f64()
    }

    /// The duration as a [`Duration`].
    pub fn duration(&self) -> Duration {
        crate::conversion::seconds_to_duration(self.duration).unwrap_or(Duration::ZERO)
    }

    /// Metadata for the part of this stream inside `[start, end)`.
    ///
    /// Bounds are clamped to the stream; an empty window yields zero frames.
    pub fn trimmed(&self, start: Option<Duration>, end: Option<Duration>) -> Self {
        if self.frame_rate.is_zero() {
            return *self;
        }
        let fps = self.frames_per_second();
        let to_frame = |timestamp: Duration| {
            ((timestamp.as_secs_f64() * fps) as u64).min(self.frame_count)
        };
        let first = start.map(to_frame).unwrap_or(0);
        let last = end.map(to_frame).unwrap_or(self.frame_count);
        Self::new(
            self.width,
            self.height,
            self.frame_rate,
            last.saturating_sub(first),
        )
    }
}
