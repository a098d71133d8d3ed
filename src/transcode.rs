//! Executing a [`TransformPlan`].
//!
//! An [`Executor`] takes a plan plus a source and destination and produces
//! the transformed video. [`FfmpegExecutor`] does this in-process: it decodes
//! the best video stream, pushes frames through an FFmpeg filter graph built
//! from the plan's [`FilterChain`], re-encodes them and muxes the result into
//! the container implied by the destination's extension.
//!
//! Only the video stream is written. A speed change would leave audio out of
//! sync, so audio is dropped just as a `-an` transcode would.
//!
//! # Example
//!
//! ```no_run
//! use vidfit::{
//!     Constraints, Executor, FfmpegExecutor, MetadataProbe, OutputOptions, TransformPlanner,
//!     VidfitError,
//! };
//!
//! let input = MetadataProbe::new().probe("input.mp4")?;
//! let plan = TransformPlanner::plan_full(&input, &Constraints::new().with_max_dimension(720))?;
//! FfmpegExecutor::new(OutputOptions::new()).execute(&plan, "input.mp4".as_ref(), "small.mp4".as_ref())?;
//! # Ok::<(), VidfitError>(())
//! ```

use std::path::Path;

use ffmpeg_next::codec::context::Context as CodecContext;
use ffmpeg_next::format::context::Output;
use ffmpeg_next::format::{Flags as FormatFlags, Pixel};
use ffmpeg_next::frame::Video as VideoFrame;
use ffmpeg_next::media::Type;
use ffmpeg_next::{Packet, Rational, decoder, encoder, filter::Graph as FilterGraph, picture};
use ffmpeg_sys_next::AVPixelFormat;

use crate::config::OutputOptions;
use crate::error::TranscodeError;
use crate::filter::FilterChain;
use crate::planner::TransformPlan;

/// Something that can carry out a [`TransformPlan`].
///
/// The planner never encodes anything itself; implement this trait to plug
/// in a different backend (a remote worker, a command-line `ffmpeg`, a test
/// double).
pub trait Executor {
    /// Transform `source` into `destination` according to `plan`.
    ///
    /// # Errors
    ///
    /// Implementations report any failure of the underlying toolkit as a
    /// [`TranscodeError`].
    fn execute(
        &self,
        plan: &TransformPlan,
        source: &Path,
        destination: &Path,
    ) -> Result<(), TranscodeError>;
}

/// In-process executor built on `ffmpeg-next`.
#[derive(Debug, Clone, Default)]
pub struct FfmpegExecutor {
    options: OutputOptions,
}

impl FfmpegExecutor {
    /// Create an executor with the given output options.
    pub fn new(options: OutputOptions) -> Self {
        Self { options }
    }

    /// The output options in use.
    pub fn options(&self) -> &OutputOptions {
        &self.options
    }
}

impl Executor for FfmpegExecutor {
    fn execute(
        &self,
        plan: &TransformPlan,
        source: &Path,
        destination: &Path,
    ) -> Result<(), TranscodeError> {
        crate::ffmpeg::initialize()?;

        if destination.exists() && !self.options.overwrite {
            return Err(TranscodeError::OutputExists(destination.to_path_buf()));
        }

        let chain = FilterChain::from_plan(plan);
        log::info!(
            "Transcoding {} -> {} (filters={chain}, codec={})",
            source.display(),
            destination.display(),
            self.options.codec,
        );

        let mut input_context =
            ffmpeg_next::format::input(&source).map_err(|error| TranscodeError::SourceOpen {
                path: source.to_path_buf(),
                reason: error.to_string(),
            })?;

        let (input_stream_index, input_time_base, decoder) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or(TranscodeError::NoVideoStream)?;
            let decoder = CodecContext::from_parameters(stream.parameters())?
                .decoder()
                .video()?;
            (stream.index(), stream.time_base(), decoder)
        };

        let mut output_context = ffmpeg_next::format::output(&destination).map_err(|error| {
            TranscodeError::DestinationOpen {
                path: destination.to_path_buf(),
                reason: error.to_string(),
            }
        })?;

        let encoder_time_base = chain.output_time_base(input_time_base);
        let sink = self.open_encoder(plan, &chain, encoder_time_base, &mut output_context)?;

        output_context.write_header()?;

        // The muxer may pick its own stream time base while writing the header.
        let output_time_base = output_context
            .stream(sink.stream_index)
            .map(|stream| stream.time_base())
            .ok_or_else(|| TranscodeError::Ffmpeg("output stream vanished".to_string()))?;

        let mut pipeline = VideoPipeline {
            decoder,
            input_time_base,
            chain: chain.to_string(),
            graph: None,
            sink: EncoderSink {
                output_time_base,
                ..sink
            },
        };

        for (stream, packet) in input_context.packets() {
            if stream.index() != input_stream_index {
                continue;
            }
            pipeline.decoder.send_packet(&packet)?;
            pipeline.receive_decoded(&mut output_context)?;
        }

        pipeline.finish(&mut output_context)?;
        output_context.write_trailer()?;

        log::debug!("Finished writing {}", destination.display());
        Ok(())
    }
}

impl FfmpegExecutor {
    /// Add the output stream and open its encoder.
    fn open_encoder(
        &self,
        plan: &TransformPlan,
        chain: &FilterChain,
        time_base: Rational,
        output_context: &mut Output,
    ) -> Result<EncoderSink, TranscodeError> {
        let codec_id = self.options.codec.to_codec_id();
        let codec = ffmpeg_next::encoder::find(codec_id)
            .ok_or_else(|| TranscodeError::EncoderUnavailable(format!("{codec_id:?}")))?;

        let needs_global_header = output_context
            .format()
            .flags()
            .contains(FormatFlags::GLOBAL_HEADER);

        let mut stream = output_context.add_stream(codec)?;
        let stream_index = stream.index();

        let mut encoder = CodecContext::from_parameters(stream.parameters())?
            .encoder()
            .video()?;
        encoder.set_width(plan.target_width);
        encoder.set_height(plan.target_height);
        encoder.set_format(Pixel::YUV420P);
        encoder.set_time_base(time_base);
        if let Some(rate) = chain.output_frame_rate() {
            encoder.set_frame_rate(Some(crate::conversion::frame_rate_to_rational(rate)));
        }
        if let Some(bitrate) = self.options.bitrate {
            encoder.set_bit_rate(bitrate);
        }
        if needs_global_header {
            unsafe {
                (*encoder.as_mut_ptr()).flags |=
                    ffmpeg_sys_next::AV_CODEC_FLAG_GLOBAL_HEADER as i32;
            }
        }

        let encoder = encoder
            .open_as_with(codec, self.options.encoder_options())
            .map_err(|error| {
                TranscodeError::EncoderUnavailable(format!("cannot open {codec_id:?}: {error}"))
            })?;
        stream.set_parameters(&encoder);

        Ok(EncoderSink {
            encoder,
            stream_index,
            encoder_time_base: time_base,
            output_time_base: time_base,
        })
    }
}

/// Decoder -> filter graph -> encoder for a single video stream.
struct VideoPipeline {
    decoder: decoder::Video,
    input_time_base: Rational,
    chain: String,
    /// Built from the first decoded frame, whose format is authoritative.
    graph: Option<FilterGraph>,
    sink: EncoderSink,
}

impl VideoPipeline {
    fn receive_decoded(&mut self, output: &mut Output) -> Result<(), TranscodeError> {
        let mut decoded = VideoFrame::empty();
        while self.decoder.receive_frame(&mut decoded).is_ok() {
            let timestamp = decoded.timestamp();
            decoded.set_pts(timestamp);

            if self.graph.is_none() {
                self.graph = Some(build_graph(&decoded, self.input_time_base, &self.chain)?);
            }
            if let Some(graph) = self.graph.as_mut() {
                graph
                    .get("in")
                    .ok_or_else(|| TranscodeError::FilterGraph("source 'in' missing".to_string()))?
                    .source()
                    .add(&decoded)
                    .map_err(|error| {
                        TranscodeError::FilterGraph(format!("failed to feed frame: {error}"))
                    })?;
            }
            self.receive_filtered(output)?;
        }
        Ok(())
    }

    fn receive_filtered(&mut self, output: &mut Output) -> Result<(), TranscodeError> {
        let Some(graph) = self.graph.as_mut() else {
            return Ok(());
        };
        let mut filtered = VideoFrame::empty();
        while graph
            .get("out")
            .ok_or_else(|| TranscodeError::FilterGraph("sink 'out' missing".to_string()))?
            .sink()
            .frame(&mut filtered)
            .is_ok()
        {
            filtered.set_kind(picture::Type::None);
            self.sink.encoder.send_frame(&filtered)?;
            self.sink.write_pending(output)?;
        }
        Ok(())
    }

    /// Drain decoder, filter graph and encoder in that order.
    fn finish(&mut self, output: &mut Output) -> Result<(), TranscodeError> {
        self.decoder.send_eof()?;
        self.receive_decoded(output)?;

        match self.graph.as_mut() {
            Some(graph) => {
                graph
                    .get("in")
                    .ok_or_else(|| TranscodeError::FilterGraph("source 'in' missing".to_string()))?
                    .source()
                    .flush()
                    .map_err(|error| {
                        TranscodeError::FilterGraph(format!("failed to flush: {error}"))
                    })?;
                self.receive_filtered(output)?;
            }
            None => log::warn!("No video frames were decoded from the source"),
        }

        self.sink.encoder.send_eof()?;
        self.sink.write_pending(output)
    }
}

/// An opened encoder and the output stream it writes to.
struct EncoderSink {
    encoder: encoder::video::Encoder,
    stream_index: usize,
    encoder_time_base: Rational,
    output_time_base: Rational,
}

impl EncoderSink {
    fn write_pending(&mut self, output: &mut Output) -> Result<(), TranscodeError> {
        let mut packet = Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.encoder_time_base, self.output_time_base);
            packet.write_interleaved(output)?;
        }
        Ok(())
    }
}

/// Build `buffer -> <chain>,format=pix_fmts=yuv420p -> buffersink` for frames
/// shaped like `frame`.
fn build_graph(
    frame: &VideoFrame,
    time_base: Rational,
    chain: &str,
) -> Result<FilterGraph, TranscodeError> {
    let aspect = frame.aspect_ratio();
    let (aspect_numerator, aspect_denominator) = if aspect.numerator() > 0 {
        (aspect.numerator(), aspect.denominator())
    } else {
        (1, 1)
    };
    let buffer_args = format!(
        "video_size={}x{}:pix_fmt={}:time_base={}/{}:pixel_aspect={}/{}",
        frame.width(),
        frame.height(),
        AVPixelFormat::from(frame.format()) as i32,
        time_base.numerator(),
        time_base.denominator(),
        aspect_numerator,
        aspect_denominator,
    );

    let mut graph = FilterGraph::new();
    graph
        .add(
            &ffmpeg_next::filter::find("buffer").ok_or_else(|| {
                TranscodeError::FilterGraph("FFmpeg 'buffer' filter not found".to_string())
            })?,
            "in",
            &buffer_args,
        )
        .map_err(graph_error("add buffer"))?;
    graph
        .add(
            &ffmpeg_next::filter::find("buffersink").ok_or_else(|| {
                TranscodeError::FilterGraph("FFmpeg 'buffersink' filter not found".to_string())
            })?,
            "out",
            "",
        )
        .map_err(graph_error("add buffersink"))?;

    let spec = format!("{chain},format=pix_fmts=yuv420p");
    log::debug!("Filter graph: {spec}");
    graph
        .output("in", 0)
        .map_err(graph_error("output"))?
        .input("out", 0)
        .map_err(graph_error("input"))?
        .parse(&spec)
        .map_err(graph_error("parse"))?;
    graph.validate().map_err(graph_error("validate"))?;

    Ok(graph)
}

fn graph_error(stage: &'static str) -> impl Fn(ffmpeg_next::Error) -> TranscodeError {
    move |error| TranscodeError::FilterGraph(format!("{stage}: {error}"))
}
