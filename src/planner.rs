//! Transformation planning.
//!
//! [`TransformPlanner`] turns probed metadata plus caller [`Constraints`] into
//! a [`TransformPlan`]: output size, output frame rate, trim window and the
//! playback speed factor that makes the input last as long as a reference.
//! Planning is pure. It reads nothing but its arguments and the same inputs
//! always give the same plan.
//!
//! # Example
//!
//! ```
//! use vidfit::{Constraints, FrameRate, TransformPlanner, VideoMetadata};
//!
//! let input = VideoMetadata::new(3840, 2160, FrameRate::from_integer(30), 4500);
//! let reference = VideoMetadata::new(1280, 720, FrameRate::from_integer(30), 3600);
//!
//! let plan = TransformPlanner::plan_full(
//!     &input,
//!     &Constraints::new()
//!         .with_max_dimension(1280)
//!         .with_reference(reference),
//! )?;
//! assert_eq!((plan.target_width, plan.target_height), (1280, 720));
//! assert_eq!(plan.speed_factor, 0.8);
//! # Ok::<(), vidfit::PlanError>(())
//! ```

use std::time::Duration;

use crate::error::PlanError;
use crate::metadata::{FrameRate, VideoMetadata};

/// Caller-supplied targets for [`TransformPlanner::plan_full`].
///
/// Every field is optional; a default `Constraints` plans an identity
/// transform at the source size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    /// Largest allowed output dimension; the other one follows the aspect
    /// ratio.
    pub max_dimension: Option<u32>,
    /// Exact output size, ignoring the source aspect ratio.
    pub target_size: Option<(u32, u32)>,
    /// Output frame rate.
    pub target_fps: Option<FrameRate>,
    /// Start of the kept window.
    pub trim_start: Option<Duration>,
    /// End of the kept window.
    pub trim_end: Option<Duration>,
    /// Video whose duration the output should match.
    pub reference: Option<VideoMetadata>,
    /// Speed factor to use when durations cannot be matched. Unset means a
    /// degenerate duration is an error.
    pub speed_fallback: Option<f64>,
}

impl Constraints {
    /// Empty constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constraints that reproduce `reference`: its exact size, its frame
    /// rate (when known) and its duration.
    pub fn matching(reference: VideoMetadata) -> Self {
        let target_fps = (!reference.frame_rate.is_zero()).then_some(reference.frame_rate);
        Self {
            target_size: Some((reference.width, reference.height)),
            target_fps,
            reference: Some(reference),
            ..Self::default()
        }
    }

    /// Limit the larger output dimension to `max_dimension` pixels.
    #[must_use]
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = Some(max_dimension);
        self
    }

    /// Force an exact output size.
    #[must_use]
    pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
        self.target_size = Some((width, height));
        self
    }

    /// Convert to `frame_rate`.
    #[must_use]
    pub fn with_target_fps(mut self, frame_rate: FrameRate) -> Self {
        self.target_fps = Some(frame_rate);
        self
    }

    /// Keep only `[start, end)`.
    #[must_use]
    pub fn with_trim(mut self, start: Duration, end: Duration) -> Self {
        self.trim_start = Some(start);
        self.trim_end = Some(end);
        self
    }

    /// Drop everything before `start`.
    #[must_use]
    pub fn with_trim_start(mut self, start: Duration) -> Self {
        self.trim_start = Some(start);
        self
    }

    /// Drop everything from `end` on.
    #[must_use]
    pub fn with_trim_end(mut self, end: Duration) -> Self {
        self.trim_end = Some(end);
        self
    }

    /// Retime the output to last as long as `reference`.
    #[must_use]
    pub fn with_reference(mut self, reference: VideoMetadata) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Use `speed_factor` when the durations cannot be matched instead of
    /// failing with [`PlanError::DegenerateDuration`].
    #[must_use]
    pub fn with_speed_fallback(mut self, speed_factor: f64) -> Self {
        self.speed_fallback = Some(speed_factor);
        self
    }
}

/// A fully resolved transformation, ready to hand to an
/// [`Executor`](crate::Executor).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformPlan {
    /// Output width in pixels.
    pub target_width: u32,
    /// Output height in pixels.
    pub target_height: u32,
    /// Output frame rate; `None` keeps the source rate.
    pub target_fps: Option<FrameRate>,
    /// Multiplier applied to presentation timestamps. Below 1.0 speeds the
    /// video up, above 1.0 slows it down.
    pub speed_factor: f64,
    /// Start of the kept window.
    pub trim_start: Option<Duration>,
    /// End of the kept window.
    pub trim_end: Option<Duration>,
}

impl TransformPlan {
    /// Returns `true` if the plan trims the input.
    pub fn is_trimmed(&self) -> bool {
        self.trim_start.is_some() || self.trim_end.is_some()
    }

    /// Returns `true` if the plan changes playback speed.
    pub fn changes_speed(&self) -> bool {
        (self.speed_factor - 1.0).abs() > f64::EPSILON
    }

    /// Expected output duration in seconds for `input`.
    pub fn output_duration(&self, input: &VideoMetadata) -> f64 {
        input.trimmed(self.trim_start, self.trim_end).duration * self.speed_factor
    }
}

/// Pure planning functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformPlanner;

impl TransformPlanner {
    /// Compute an aspect-preserving output size.
    ///
    /// Without `max_dimension` the source size is returned unchanged.
    /// Otherwise the larger source side (width on ties) becomes
    /// `max_dimension` and the other side is scaled by the same ratio,
    /// truncated toward zero. The arithmetic is done on integers, so
    /// `3840x2160` limited to `1280` is exactly `1280x720`. Neither side is
    /// ever below one pixel.
    ///
    /// # Errors
    ///
    /// - [`PlanError::DegenerateAspectRatio`] if either source side is zero.
    /// - [`PlanError::InvalidMaxDimension`] if `max_dimension` is zero.
    pub fn plan_resize(
        metadata: &VideoMetadata,
        max_dimension: Option<u32>,
    ) -> Result<(u32, u32), PlanError> {
        let (width, height) = (metadata.width, metadata.height);
        if width == 0 || height == 0 {
            return Err(PlanError::DegenerateAspectRatio { width, height });
        }

        let Some(max_dimension) = max_dimension else {
            return Ok((width, height));
        };
        if max_dimension == 0 {
            return Err(PlanError::InvalidMaxDimension);
        }

        let scale = |side: u32, numerator: u32, denominator: u32| -> u32 {
            let scaled = u64::from(side) * u64::from(numerator) / u64::from(denominator);
            u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
        };

        if width >= height {
            Ok((max_dimension, scale(max_dimension, height, width)))
        } else {
            Ok((scale(max_dimension, width, height), max_dimension))
        }
    }

    /// Compute the speed factor that stretches `input` to the duration of
    /// `reference`: `reference.duration / input.duration`.
    ///
    /// There is no silent fallback. A caller who wants the historical
    /// "use 1.0" behaviour must ask for it, for example through
    /// [`Constraints::with_speed_fallback`].
    ///
    /// # Errors
    ///
    /// [`PlanError::DegenerateDuration`] if either duration is not a
    /// positive finite number.
    pub fn plan_duration_match(
        reference: &VideoMetadata,
        input: &VideoMetadata,
    ) -> Result<f64, PlanError> {
        let usable = |seconds: f64| seconds.is_finite() && seconds > 0.0;
        if !usable(reference.duration) || !usable(input.duration) {
            return Err(PlanError::DegenerateDuration {
                reference: reference.duration,
                input: input.duration,
            });
        }
        Ok(reference.duration / input.duration)
    }

    /// Compose resize, frame rate, trim and duration matching into a plan.
    ///
    /// When a reference is given together with a trim window, the speed
    /// factor is computed against the trimmed part of the input, since that
    /// is what ends up in the output.
    ///
    /// # Errors
    ///
    /// - [`PlanError::InvalidTrimWindow`] if `trim_start >= trim_end`, if
    ///   `trim_end` is zero, or if a lone `trim_start` lies at or past the end
    ///   of an input of known duration.
    /// - [`PlanError::ConflictingSize`] if both an exact size and a maximum
    ///   dimension are set.
    /// - [`PlanError::InvalidFrameRate`] for a zero target frame rate.
    /// - [`PlanError::InvalidSpeedFallback`] if the fallback is needed but is
    ///   not a positive number.
    /// - Any error of [`plan_resize`](Self::plan_resize) or
    ///   [`plan_duration_match`](Self::plan_duration_match) (the latter only
    ///   without a speed fallback).
    pub fn plan_full(
        input: &VideoMetadata,
        constraints: &Constraints,
    ) -> Result<TransformPlan, PlanError> {
        // A lone start is checked against the end of the stream, when known.
        let start = constraints.trim_start.unwrap_or(Duration::ZERO);
        let end = match constraints.trim_end {
            Some(end) => Some(end),
            None if constraints.trim_start.is_some() && input.duration > 0.0 => {
                Some(input.duration())
            }
            None => None,
        };
        if let Some(end) = end
            && start >= end
        {
            return Err(PlanError::InvalidTrimWindow { start, end });
        }

        let (target_width, target_height) =
            match (constraints.target_size, constraints.max_dimension) {
                (Some(_), Some(_)) => return Err(PlanError::ConflictingSize),
                (Some((width, height)), None) => {
                    if width == 0 || height == 0 {
                        return Err(PlanError::DegenerateAspectRatio { width, height });
                    }
                    (width, height)
                }
                (None, max_dimension) => Self::plan_resize(input, max_dimension)?,
            };

        if let Some(frame_rate) = constraints.target_fps
            && frame_rate.is_zero()
        {
            return Err(PlanError::InvalidFrameRate(frame_rate.to_string()));
        }

        let speed_factor = match &constraints.reference {
            None => 1.0,
            Some(reference) => {
                let kept = input.trimmed(constraints.trim_start, constraints.trim_end);
                match (
                    Self::plan_duration_match(reference, &kept),
                    constraints.speed_fallback,
                ) {
                    (Ok(speed_factor), _) => speed_factor,
                    (Err(error), Some(fallback)) => {
                        if !(fallback.is_finite() && fallback > 0.0) {
                            return Err(PlanError::InvalidSpeedFallback(fallback));
                        }
                        log::warn!("{error}; using requested fallback speed {fallback}");
                        fallback
                    }
                    (Err(error), None) => return Err(error),
                }
            }
        };

        let plan = TransformPlan {
            target_width,
            target_height,
            target_fps: constraints.target_fps,
            speed_factor,
            trim_start: constraints.trim_start,
            trim_end: constraints.trim_end,
        };
        log::debug!("Planned {plan:?} for {}x{} input", input.width, input.height);
        Ok(plan)
    }
}
