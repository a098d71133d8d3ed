//! Video metadata probing.
//!
//! [`MetadataProbe`] opens a source, reads the four structural fields of its
//! best video stream (width, height, frame rate, frame count) and closes it
//! again before returning. The reading itself goes through a
//! [`ProbeBackend`], so the probe contract does not depend on FFmpeg; the
//! default [`FfmpegBackend`] uses `ffmpeg-next`.
//!
//! # Example
//!
//! ```no_run
//! use vidfit::MetadataProbe;
//!
//! let metadata = MetadataProbe::new().probe("input.mp4")?;
//! println!(
//!     "{}x{} @ {} fps, {} frames, {:.2}s",
//!     metadata.width, metadata.height, metadata.frame_rate,
//!     metadata.frame_count, metadata.duration,
//! );
//! # Ok::<(), vidfit::ProbeError>(())
//! ```

use std::path::Path;

use ffmpeg_next::{codec::context::Context as CodecContext, media::Type};

use crate::error::ProbeError;
use crate::metadata::{FrameRate, VideoMetadata};

/// The raw fields a probe backend reports for a video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frame rate, [`FrameRate::ZERO`] when unknown.
    pub frame_rate: FrameRate,
    /// Number of frames.
    pub frame_count: u64,
}

/// Anything able to open a media source and report its [`StreamInfo`].
///
/// Implementations must release whatever handle they open before `read`
/// returns, on success and on failure alike.
pub trait ProbeBackend {
    /// Read the stream fields of `source`.
    ///
    /// # Errors
    ///
    /// [`ProbeError::Unopenable`] if the source cannot be opened, or
    /// [`ProbeError::NoVideoStream`] if it holds no video.
    fn read(&self, source: &Path) -> Result<StreamInfo, ProbeError>;
}

/// Probe backend built on FFmpeg's demuxers and decoders.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegBackend;

impl ProbeBackend for FfmpegBackend {
    fn read(&self, source: &Path) -> Result<StreamInfo, ProbeError> {
        let unopenable = |reason: String| ProbeError::Unopenable {
            path: source.to_path_buf(),
            reason,
        };

        crate::ffmpeg::initialize()
            .map_err(|error| unopenable(format!("FFmpeg initialisation failed: {error}")))?;

        // The input context is dropped (and the file closed) when this
        // function returns, whichever path it returns through.
        let input_context =
            ffmpeg_next::format::input(&source).map_err(|error| unopenable(error.to_string()))?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or_else(|| ProbeError::NoVideoStream {
                path: source.to_path_buf(),
            })?;

        let decoder_context = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| unopenable(format!("Failed to read codec parameters: {error}")))?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| unopenable(format!("Unsupported video codec: {error}")))?;

        let average = stream.avg_frame_rate();
        let frame_rate = match FrameRate::from_signed(average.numerator(), average.denominator()) {
            rate if !rate.is_zero() => rate,
            _ => {
                let rate = stream.rate();
                FrameRate::from_signed(rate.numerator(), rate.denominator())
            }
        };

        let frame_count = if stream.frames() > 0 {
            stream.frames() as u64
        } else if frame_rate.is_zero() {
            0
        } else {
            let time_base = stream.time_base();
            let stream_seconds = if stream.duration() > 0 && time_base.denominator() != 0 {
                stream.duration() as f64 * time_base.numerator() as f64
                    / time_base.denominator() as f64
            } else {
                input_context.duration().max(0) as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE)
            };
            (stream_seconds * frame_rate.as_f64()) as u64
        };

        log::debug!(
            "Probed {}: {}x{} @ {} fps, {} frames",
            source.display(),
            decoder.width(),
            decoder.height(),
            frame_rate,
            frame_count,
        );

        Ok(StreamInfo {
            width: decoder.width(),
            height: decoder.height(),
            frame_rate,
            frame_count,
        })
    }
}

/// Read-only metadata probe.
///
/// Holds no open handle between calls; every [`probe`](MetadataProbe::probe)
/// opens, reads and closes its own source, so one probe can serve many
/// sources (and many threads, with a `Sync` backend).
#[derive(Debug, Clone, Default)]
pub struct MetadataProbe<B = FfmpegBackend> {
    backend: B,
}

impl MetadataProbe<FfmpegBackend> {
    /// Create a probe backed by FFmpeg.
    pub fn new() -> Self {
        Self {
            backend: FfmpegBackend,
        }
    }
}

impl<B: ProbeBackend> MetadataProbe<B> {
    /// Create a probe using a custom backend.
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Probe a source and return its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Unopenable`] if the source cannot be opened or
    /// decoded, and [`ProbeError::NoVideoStream`] if it holds no video.
    pub fn probe<P: AsRef<Path>>(&self, source: P) -> Result<VideoMetadata, ProbeError> {
        let info = self.backend.read(source.as_ref())?;
        Ok(VideoMetadata::new(
            info.width,
            info.height,
            info.frame_rate,
            info.frame_count,
        ))
    }

    /// Probe several sources in sequence.
    ///
    /// Sources that cannot be probed produce an `Err` entry rather than
    /// aborting the batch.
    pub fn probe_many<P: AsRef<Path>>(
        &self,
        sources: &[P],
    ) -> Vec<Result<VideoMetadata, ProbeError>> {
        sources.iter().map(|source| self.probe(source)).collect()
    }

    /// Probe several sources concurrently on the rayon thread pool.
    ///
    /// Results are returned in input order.
    #[cfg(feature = "rayon")]
    pub fn probe_many_parallel<P: AsRef<Path> + Sync>(
        &self,
        sources: &[P],
    ) -> Vec<Result<VideoMetadata, ProbeError>>
    where
        B: Sync,
    {
        use rayon::prelude::*;

        sources
            .par_iter()
            .map(|source| self.probe(source))
            .collect()
    }
}
