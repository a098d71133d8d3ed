//! Error types for the `vidfit` crate.
//!
//! Probing, planning and transcoding each have their own error enum so callers
//! can match on exactly the failures a given operation can produce.
//! [`VidfitError`] unifies them for code that drives the whole pipeline.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// Errors returned by [`MetadataProbe`](crate::MetadataProbe).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProbeError {
    /// The source could not be opened for inspection (missing file,
    /// unrecognised container, unsupported codec, permission failure).
    #[error("Failed to open media source at {path}: {reason}")]
    Unopenable {
        /// Path that was passed to the probe.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The container opened but holds no video stream.
    #[error("No video stream found in {path}")]
    NoVideoStream {
        /// Path of the inspected source.
        path: PathBuf,
    },
}

/// Errors returned by [`TransformPlanner`](crate::TransformPlanner).
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PlanError {
    /// A speed factor cannot be derived because one of the durations is zero,
    /// negative or not finite.
    #[error(
        "Cannot match durations: reference is {reference}s and input is {input}s (both must be positive)"
    )]
    DegenerateDuration {
        /// Duration of the reference video in seconds.
        reference: f64,
        /// Duration of the input video in seconds.
        input: f64,
    },

    /// The trim window is empty or reversed.
    #[error("Invalid trim window: start ({start:?}) must be less than end ({end:?})")]
    InvalidTrimWindow {
        /// Requested trim start.
        start: Duration,
        /// Requested trim end, or the end of the input for a lone start.
        end: Duration,
    },

    /// The source has a zero dimension, so no aspect ratio exists.
    #[error("Degenerate aspect ratio for {width}x{height} source")]
    DegenerateAspectRatio {
        /// Source width in pixels.
        width: u32,
        /// Source height in pixels.
        height: u32,
    },

    /// A maximum dimension of zero was requested.
    #[error("Maximum dimension must be greater than zero")]
    InvalidMaxDimension,

    /// Both an exact output size and a maximum dimension were requested.
    #[error("Exact target size and maximum dimension cannot be combined")]
    ConflictingSize,

    /// A target frame rate was zero or could not be parsed.
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(String),

    /// A caller-supplied speed fallback was not a positive finite number.
    #[error("Speed fallback must be positive, got {0}")]
    InvalidSpeedFallback(f64),

    /// A timecode string could not be parsed.
    #[error("Invalid timecode: {0}")]
    InvalidTimecode(String),
}

/// Errors returned by an [`Executor`](crate::Executor) or the
/// [`ContainerConverter`](crate::ContainerConverter).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TranscodeError {
    /// The source could not be opened for decoding.
    #[error("Failed to open source {path}: {reason}")]
    SourceOpen {
        /// Source path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// The destination could not be created.
    #[error("Failed to create destination {path}: {reason}")]
    DestinationOpen {
        /// Destination path.
        path: PathBuf,
        /// Underlying reason.
        reason: String,
    },

    /// The destination exists and overwriting was not allowed.
    #[error("Output already exists: {0}")]
    OutputExists(PathBuf),

    /// The source has no video stream to transcode.
    #[error("No video stream found in source")]
    NoVideoStream,

    /// The requested encoder is not compiled into the linked FFmpeg.
    #[error("Encoder not available: {0}")]
    EncoderUnavailable(String),

    /// Filter graph setup or processing failed.
    #[error("Filter graph error: {0}")]
    FilterGraph(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred while preparing the output.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

impl From<FfmpegError> for TranscodeError {
    fn from(error: FfmpegError) -> Self {
        TranscodeError::Ffmpeg(error.to_string())
    }
}

/// Any error produced by `vidfit`.
#[derive(Debug, Error)]
pub enum VidfitError {
    /// Probing failed.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// Planning failed.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// Transcoding or remuxing failed.
    #[error(transparent)]
    Transcode(#[from] TranscodeError),
}
