//! Output encoding configuration.
//!
//! [`OutputOptions`] carries everything the executor needs besides the plan
//! itself: which encoder to use, its quality settings and whether an existing
//! destination may be replaced. The defaults match a typical
//! `-c:v libx264 -crf 23 -preset medium` invocation.
//!
//! # Example
//!
//! ```
//! use vidfit::{OutputOptions, VideoCodec};
//!
//! let options = OutputOptions::new()
//!     .with_codec(VideoCodec::H265)
//!     .with_crf(28)
//!     .with_overwrite(true);
//! assert_eq!(options.preset.as_deref(), Some("medium"));
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use ffmpeg_next::Dictionary;
use ffmpeg_next::codec::Id;

/// Supported output video codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoCodec {
    /// H.264 / AVC. This is the default.
    #[default]
    H264,
    /// H.265 / HEVC.
    H265,
    /// MPEG-4 Part 2 (for AVI compatibility).
    Mpeg4,
}

impl VideoCodec {
    pub(crate) fn to_codec_id(self) -> Id {
        match self {
            VideoCodec::H264 => Id::H264,
            VideoCodec::H265 => Id::HEVC,
            VideoCodec::Mpeg4 => Id::MPEG4,
        }
    }

    /// Whether the encoder understands x264/x265-style `crf` and `preset`
    /// private options.
    pub(crate) fn supports_crf(self) -> bool {
        matches!(self, VideoCodec::H264 | VideoCodec::H265)
    }
}

impl Display for VideoCodec {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            VideoCodec::H264 => "h264",
            VideoCodec::H265 => "h265",
            VideoCodec::Mpeg4 => "mpeg4",
        })
    }
}

impl FromStr for VideoCodec {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "h264" | "avc" | "libx264" => Ok(VideoCodec::H264),
            "h265" | "hevc" | "libx265" => Ok(VideoCodec::H265),
            "mpeg4" => Ok(VideoCodec::Mpeg4),
            other => Err(format!("unsupported codec: {other}")),
        }
    }
}

/// Encoder and destination settings for [`FfmpegExecutor`](crate::FfmpegExecutor).
#[derive(Debug, Clone, PartialEq)]
pub struct OutputOptions {
    /// Output codec.
    pub codec: VideoCodec,
    /// Constant Rate Factor (0-51, lower is better). Ignored by codecs
    /// without CRF support and when a bitrate is set.
    pub crf: Option<u32>,
    /// Encoder speed/quality preset such as `"medium"` or `"slow"`.
    pub preset: Option<String>,
    /// Target bitrate in bits per second; overrides CRF.
    pub bitrate: Option<usize>,
    /// Replace an existing destination file.
    pub overwrite: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            codec: VideoCodec::H264,
            crf: Some(23),
            preset: Some("medium".to_string()),
            bitrate: None,
            overwrite: false,
        }
    }
}

impl OutputOptions {
    /// Default options: H.264, CRF 23, preset `medium`, no overwrite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the codec.
    #[must_use]
    pub fn with_codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Set the CRF quality value.
    #[must_use]
    pub fn with_crf(mut self, crf: u32) -> Self {
        self.crf = Some(crf);
        self
    }

    /// Set the encoder preset.
    #[must_use]
    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    /// Set the target bitrate in bits per second.
    #[must_use]
    pub fn with_bitrate(mut self, bitrate: usize) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    /// Allow replacing an existing destination.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Private encoder options passed when opening the encoder.
    pub(crate) fn encoder_options(&self) -> Dictionary<'static> {
        let mut options = Dictionary::new();
        if self.codec.supports_crf() {
            if let (Some(crf), None) = (self.crf, self.bitrate) {
                options.set("crf", &crf.to_string());
            }
            if let Some(preset) = &self.preset {
                options.set("preset", preset);
            }
        }
        options
    }
}
