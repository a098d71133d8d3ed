//! # vidfit
//!
//! Probe video metadata and fit videos to a target: aspect-preserving
//! resize, frame-rate conversion, trimming, container conversion and
//! duration matching through playback speed.
//!
//! `vidfit` splits the job in two. A small pure core decides *what* to do:
//! [`MetadataProbe`] reads width, height, frame rate and frame count, and
//! [`TransformPlanner`] turns that metadata plus caller [`Constraints`] into a
//! [`TransformPlan`]. Adapters then carry the plan out with FFmpeg, via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate: a
//! [`FilterChain`] renders it into filter-graph syntax and an [`Executor`]
//! runs it.
//!
//! ## Quick Start
//!
//! ### Inspect a Video
//!
//! ```no_run
//! use vidfit::MetadataProbe;
//!
//! let metadata = MetadataProbe::new().probe("input.mp4")?;
//! println!("{}x{} @ {} fps, {:.2}s", metadata.width, metadata.height,
//!     metadata.frame_rate, metadata.duration);
//! # Ok::<(), vidfit::ProbeError>(())
//! ```
//!
//! ### Shrink a 4K Video
//!
//! ```no_run
//! use vidfit::{Constraints, Executor, FfmpegExecutor, MetadataProbe, TransformPlanner};
//!
//! let input = MetadataProbe::new().probe("uhd.mp4")?;
//! let plan = TransformPlanner::plan_full(&input, &Constraints::new().with_max_dimension(1280))?;
//! FfmpegExecutor::default().execute(&plan, "uhd.mp4".as_ref(), "hd.mp4".as_ref())?;
//! # Ok::<(), vidfit::VidfitError>(())
//! ```
//!
//! ### Match Another Video
//!
//! ```no_run
//! use vidfit::{Constraints, Executor, FfmpegExecutor, MetadataProbe, TransformPlanner};
//!
//! let probe = MetadataProbe::new();
//! let reference = probe.probe("analysis_lowres.mp4")?;
//! let input = probe.probe("camera.mp4")?;
//!
//! // Same size, frame rate and duration as the reference.
//! let plan = TransformPlanner::plan_full(&input, &Constraints::matching(reference))?;
//! FfmpegExecutor::default().execute(&plan, "camera.mp4".as_ref(), "camera_matched.mp4".as_ref())?;
//! # Ok::<(), vidfit::VidfitError>(())
//! ```
//!
//! ## Features
//!
//! - **Probing**: width, height, exact rational frame rate, frame count and
//!   derived duration, through a pluggable [`ProbeBackend`]
//! - **Planning**: integer-exact aspect-preserving resize, frame-rate
//!   targets, trim windows and duration matching, all as pure functions with
//!   typed errors instead of silent fallbacks
//! - **Execution**: in-process decode, filter and encode with H.264, H.265
//!   or MPEG-4
//! - **Container conversion**: packet-copy remuxing to another container
//! - **Comparison**: duration difference and sync check for two videos
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | `probe_many_parallel()` probes independent files on rayon threads |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod compare;
pub mod config;
mod conversion;
pub mod error;
pub mod ffmpeg;
pub mod filter;
pub mod metadata;
pub mod planner;
pub mod probe;
pub mod remux;
pub mod transcode;
mod utilities;

pub use compare::{MetadataComparison, SYNC_TOLERANCE_SECONDS};
pub use config::{OutputOptions, VideoCodec};
pub use conversion::{format_timecode, parse_timecode};
pub use error::{PlanError, ProbeError, TranscodeError, VidfitError};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use filter::{FilterChain, FilterStage};
pub use metadata::{FrameRate, VideoMetadata};
pub use planner::{Constraints, TransformPlan, TransformPlanner};
pub use probe::{FfmpegBackend, MetadataProbe, ProbeBackend, StreamInfo};
pub use remux::ContainerConverter;
pub use transcode::{Executor, FfmpegExecutor};
pub use utilities::converted_output_path;
