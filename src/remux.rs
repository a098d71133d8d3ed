//! Lossless container conversion.
//!
//! [`ContainerConverter`] moves the streams of a file into a different
//! container (MP4 to MKV, MOV to MP4, ...) by copying packets without
//! re-encoding. The target container is chosen by file extension; when no
//! destination is given the output lands next to the input as
//! `<stem>_converted.<extension>`.
//!
//! # Example
//!
//! ```no_run
//! use vidfit::ContainerConverter;
//!
//! let written = ContainerConverter::new("clip.mp4", "mkv").run()?;
//! assert!(written.ends_with("clip_converted.mkv"));
//! # Ok::<(), vidfit::TranscodeError>(())
//! ```

use std::path::{Path, PathBuf};

use ffmpeg_next::codec::Id;
use ffmpeg_next::media::Type;

use crate::error::TranscodeError;
use crate::utilities::converted_output_path;

/// Builder for a packet-copy container conversion.
#[derive(Debug, Clone)]
pub struct ContainerConverter {
    source: PathBuf,
    destination: PathBuf,
    copy_video: bool,
    copy_audio: bool,
    copy_subtitles: bool,
    overwrite: bool,
}

impl ContainerConverter {
    /// Convert `source` into the container named by `extension`
    /// (`"mkv"`, `".mp4"`, ...), written to `<stem>_converted.<extension>`.
    pub fn new<P: AsRef<Path>>(source: P, extension: &str) -> Self {
        let source = source.as_ref().to_path_buf();
        let destination = converted_output_path(&source, Some(extension));
        Self::with_destination(source, destination)
    }

    /// Convert `source` into `destination`; the container follows the
    /// destination's extension.
    pub fn with_destination<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            destination: destination.as_ref().to_path_buf(),
            copy_video: true,
            copy_audio: true,
            copy_subtitles: true,
            overwrite: false,
        }
    }

    /// The path the converted file will be written to.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Leave video streams out.
    #[must_use]
    pub fn exclude_video(mut self) -> Self {
        self.copy_video = false;
        self
    }

    /// Leave audio streams out.
    #[must_use]
    pub fn exclude_audio(mut self) -> Self {
        self.copy_audio = false;
        self
    }

    /// Leave subtitle streams out.
    #[must_use]
    pub fn exclude_subtitles(mut self) -> Self {
        self.copy_subtitles = false;
        self
    }

    /// Allow replacing an existing destination.
    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    fn keeps(&self, medium: Type) -> bool {
        match medium {
            Type::Video => self.copy_video,
            Type::Audio => self.copy_audio,
            Type::Subtitle => self.copy_subtitles,
            _ => false,
        }
    }

    /// Copy the selected streams into the new container.
    ///
    /// Returns the path that was written.
    ///
    /// # Errors
    ///
    /// - [`TranscodeError::OutputExists`] if the destination exists and
    ///   overwriting was not allowed.
    /// - [`TranscodeError::SourceOpen`] / [`TranscodeError::DestinationOpen`]
    ///   if either file cannot be opened.
    /// - [`TranscodeError::Ffmpeg`] if the container rejects a stream or a
    ///   packet.
    pub fn run(&self) -> Result<PathBuf, TranscodeError> {
        crate::ffmpeg::initialize()?;

        if self.destination.exists() && !self.overwrite {
            return Err(TranscodeError::OutputExists(self.destination.clone()));
        }

        log::info!(
            "Converting container {} -> {}",
            self.source.display(),
            self.destination.display(),
        );

        let mut input_context = ffmpeg_next::format::input(&self.source).map_err(|error| {
            TranscodeError::SourceOpen {
                path: self.source.clone(),
                reason: error.to_string(),
            }
        })?;
        let mut output_context =
            ffmpeg_next::format::output(&self.destination).map_err(|error| {
                TranscodeError::DestinationOpen {
                    path: self.destination.clone(),
                    reason: error.to_string(),
                }
            })?;

        // Input stream index -> output stream index, `None` for dropped streams.
        let mut stream_map: Vec<Option<usize>> = Vec::new();
        let mut kept = 0_usize;
        for stream in input_context.streams() {
            if !self.keeps(stream.parameters().medium()) {
                stream_map.push(None);
                continue;
            }
            let mut output_stream = output_context.add_stream(ffmpeg_next::encoder::find(Id::None))?;
            output_stream.set_parameters(stream.parameters());
            // Let the target muxer choose its own codec tag.
            unsafe {
                (*output_stream.parameters().as_mut_ptr()).codec_tag = 0;
            }
            stream_map.push(Some(kept));
            kept += 1;
        }

        output_context.write_header()?;

        for (stream, mut packet) in input_context.packets() {
            let Some(output_index) = stream_map.get(stream.index()).copied().flatten() else {
                continue;
            };
            let output_time_base = output_context
                .stream(output_index)
                .map(|output_stream| output_stream.time_base())
                .ok_or_else(|| TranscodeError::Ffmpeg("output stream vanished".to_string()))?;

            packet.set_stream(output_index);
            packet.rescale_ts(stream.time_base(), output_time_base);
            packet.set_position(-1);
            packet.write_interleaved(&mut output_context)?;
        }

        output_context.write_trailer()?;
        log::debug!("Copied {kept} stream(s) into {}", self.destination.display());
        Ok(self.destination.clone())
    }
}
