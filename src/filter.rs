//! Rendering a [`TransformPlan`] into an FFmpeg filter chain.
//!
//! The planner only produces numbers. This module maps them onto FFmpeg's
//! filter vocabulary (`trim`, `setpts`, `scale`, `setsar`, `fps`) in the
//! order the executor feeds them to a filter graph:
//!
//! ```text
//! trim -> setpts (rebase) -> setpts (speed) -> scale -> setsar -> fps
//! ```
//!
//! Speed is applied before `fps` so the frame-rate filter resamples the
//! already retimed stream and the output really runs at the target rate.
//!
//! # Example
//!
//! ```
//! use vidfit::{FilterChain, FrameRate, TransformPlan};
//!
//! let plan = TransformPlan {
//!     target_width: 1280,
//!     target_height: 720,
//!     target_fps: Some(FrameRate::from_integer(5)),
//!     speed_factor: 0.8,
//!     trim_start: None,
//!     trim_end: None,
//! };
//! assert_eq!(
//!     FilterChain::from_plan(&plan).to_string(),
//!     "setpts=0.8*PTS,scale=1280:720,setsar=1,fps=5",
//! );
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

use ffmpeg_next::Rational;

use crate::metadata::FrameRate;
use crate::planner::TransformPlan;

/// One stage of a filter chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterStage {
    /// Keep frames inside `[start, end)`.
    Trim {
        /// Window start.
        start: Option<Duration>,
        /// Window end.
        end: Option<Duration>,
    },
    /// Shift timestamps so the first kept frame starts at zero.
    RebaseTimestamps,
    /// Multiply presentation timestamps by the factor.
    ScaleTimestamps(f64),
    /// Resize to exact dimensions.
    Scale {
        /// Output width.
        width: u32,
        /// Output height.
        height: u32,
    },
    /// Mark pixels as square so players do not stretch the scaled picture.
    SquarePixels,
    /// Duplicate or drop frames to reach a constant rate.
    FrameRate(FrameRate),
}

impl Display for FilterStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FilterStage::Trim { start, end } => {
                f.write_str("trim=")?;
                let bounds: Vec<String> = [("start", start), ("end", end)]
                    .into_iter()
                    .filter_map(|(key, bound)| {
                        bound.map(|bound| format!("{key}={}", bound.as_secs_f64()))
                    })
                    .collect();
                f.write_str(&bounds.join(":"))
            }
            FilterStage::RebaseTimestamps => f.write_str("setpts=PTS-STARTPTS"),
            FilterStage::ScaleTimestamps(factor) => write!(f, "setpts={factor}*PTS"),
            FilterStage::Scale { width, height } => write!(f, "scale={width}:{height}"),
            FilterStage::SquarePixels => f.write_str("setsar=1"),
            FilterStage::FrameRate(rate) => write!(f, "fps={rate}"),
        }
    }
}

/// An ordered list of [`FilterStage`]s.
///
/// `Display` renders the comma-separated description accepted by
/// `avfilter_graph_parse`; an empty chain renders as the pass-through
/// `null` filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    stages: Vec<FilterStage>,
}

impl FilterChain {
    /// Build the chain that carries out `plan`.
    pub fn from_plan(plan: &TransformPlan) -> Self {
        let mut stages = Vec::new();

        if plan.is_trimmed() {
            stages.push(FilterStage::Trim {
                start: plan.trim_start,
                end: plan.trim_end,
            });
            stages.push(FilterStage::RebaseTimestamps);
        }
        if plan.changes_speed() {
            stages.push(FilterStage::ScaleTimestamps(plan.speed_factor));
        }
        stages.push(FilterStage::Scale {
            width: plan.target_width,
            height: plan.target_height,
        });
        stages.push(FilterStage::SquarePixels);
        if let Some(rate) = plan.target_fps {
            stages.push(FilterStage::FrameRate(rate));
        }

        Self { stages }
    }

    /// The stages in application order.
    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    /// Returns `true` if the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// The frame rate the chain forces, if any.
    pub fn output_frame_rate(&self) -> Option<FrameRate> {
        self.stages.iter().rev().find_map(|stage| match stage {
            FilterStage::FrameRate(rate) => Some(*rate),
            _ => None,
        })
    }

    /// Time base of frames leaving the chain.
    ///
    /// `fps` re-stamps frames in `1/rate` units; every other stage keeps the
    /// input time base.
    pub fn output_time_base(&self, input_time_base: Rational) -> Rational {
        self.output_frame_rate()
            .map(crate::conversion::frame_rate_time_base)
            .unwrap_or(input_time_base)
    }
}

impl Display for FilterChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.stages.is_empty() {
            return f.write_str("null");
        }
        for (index, stage) in self.stages.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{stage}")?;
        }
        Ok(())
    }
}
