//! Comparing two videos before playing them side by side.
//!
//! [`MetadataComparison`] answers the questions that come up when a processed
//! video (say, a low-resolution analysis output) has to be played in sync
//! with its original: do the durations agree within a second, and do the
//! resolution and frame rate match?
//!
//! # Example
//!
//! ```
//! use vidfit::{FrameRate, MetadataComparison, VideoMetadata};
//!
//! let original = VideoMetadata::new(1920, 1080, FrameRate::from_integer(25), 2500);
//! let processed = VideoMetadata::new(640, 360, FrameRate::from_integer(5), 498);
//!
//! let comparison = MetadataComparison::new(&original, &processed);
//! assert!(comparison.is_in_sync());
//! assert!(!comparison.resolution_matches());
//! print!("{comparison}");
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::metadata::VideoMetadata;

/// Largest duration difference, in seconds, still considered in sync.
pub const SYNC_TOLERANCE_SECONDS: f64 = 1.0;

/// Side-by-side comparison of two videos' metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetadataComparison {
    /// The first video (usually the one to match).
    pub reference: VideoMetadata,
    /// The second video.
    pub other: VideoMetadata,
    /// Allowed duration difference in seconds.
    pub tolerance: f64,
}

impl MetadataComparison {
    /// Compare two videos with the default one-second tolerance.
    pub fn new(reference: &VideoMetadata, other: &VideoMetadata) -> Self {
        Self {
            reference: *reference,
            other: *other,
            tolerance: SYNC_TOLERANCE_SECONDS,
        }
    }

    /// Use a different duration tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, seconds: f64) -> Self {
        self.tolerance = seconds.max(0.0);
        self
    }

    /// Absolute duration difference in seconds.
    pub fn duration_difference(&self) -> f64 {
        (self.reference.duration - self.other.duration).abs()
    }

    /// Returns `true` if the durations differ by no more than the tolerance.
    pub fn is_in_sync(&self) -> bool {
        self.duration_difference() <= self.tolerance
    }

    /// Returns `true` if both videos have the same width and height.
    pub fn resolution_matches(&self) -> bool {
        (self.reference.width, self.reference.height) == (self.other.width, self.other.height)
    }

    /// Returns `true` if both videos have the same frame rate.
    pub fn frame_rate_matches(&self) -> bool {
        self.reference.frame_rate == self.other.frame_rate
    }
}

impl Display for MetadataComparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "Duration Difference: {:.2} seconds", self.duration_difference())?;
        if self.is_in_sync() {
            writeln!(
                f,
                "The videos have similar durations, which is good for synchronization."
            )?;
        } else {
            writeln!(
                f,
                "Warning: The videos have significantly different durations."
            )?;
            writeln!(
                f,
                "This may cause synchronization issues when playing them together."
            )?;
        }
        if !self.resolution_matches() {
            writeln!(
                f,
                "Resolution differs: {}x{} vs {}x{}",
                self.reference.width, self.reference.height, self.other.width, self.other.height,
            )?;
        }
        if !self.frame_rate_matches() {
            writeln!(
                f,
                "Frame rate differs: {:.2} vs {:.2} fps",
                self.reference.frames_per_second(),
                self.other.frames_per_second(),
            )?;
        }
        Ok(())
    }
}
