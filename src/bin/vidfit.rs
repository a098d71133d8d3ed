use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use vidfit::{
    Constraints, ContainerConverter, Executor, FfmpegExecutor, FfmpegLogLevel, FilterChain,
    FrameRate, MetadataComparison, MetadataProbe, OutputOptions, TransformPlan, TransformPlanner,
    VideoCodec, VideoMetadata,
};

const CLI_AFTER_HELP: &str = "Examples:\n  vidfit info input.mp4 other.mp4\n  vidfit compare processed.mp4 original.mp4\n  vidfit plan input.mp4 --max-dimension 1280 --fps 5 --json\n  vidfit convert input.mp4 --start 00:07:34 --end 00:07:38\n  vidfit convert camera.mp4 matched.mp4 --match processed.mp4\n  vidfit remux input.mp4 --format mkv\n  vidfit completions zsh > _vidfit";

#[derive(Debug, Parser)]
#[command(
    name = "vidfit",
    version,
    about = "Inspect videos and fit them to a size, frame rate, window or duration",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Allow overwriting existing output files.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

/// Targets shared by `plan` and `convert`.
#[derive(Debug, Args, Clone, Default)]
struct PlanArgs {
    /// Largest output dimension; the other side keeps the aspect ratio.
    #[arg(long)]
    max_dimension: Option<u32>,

    /// Exact output size as WIDTHxHEIGHT.
    #[arg(long)]
    size: Option<String>,

    /// Output frame rate (e.g. 30, 29.97, 30000/1001).
    #[arg(long)]
    fps: Option<String>,

    /// Trim start (seconds, MM:SS or HH:MM:SS).
    #[arg(long)]
    start: Option<String>,

    /// Trim end (seconds, MM:SS or HH:MM:SS).
    #[arg(long)]
    end: Option<String>,

    /// Match size, frame rate and duration of this reference video.
    #[arg(long = "match", value_name = "REFERENCE")]
    reference: Option<PathBuf>,

    /// Speed factor to use when durations cannot be matched (e.g. 1.0).
    #[arg(long)]
    speed_fallback: Option<f64>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print metadata for one or more videos.
    #[command(
        about = "Print video metadata",
        visible_alias = "probe",
        after_help = "Examples:\n  vidfit info input.mp4\n  vidfit info a.mp4 b.mp4 --json"
    )]
    Info {
        /// Input video paths.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Compare two videos and check whether they can play in sync.
    #[command(about = "Compare durations, resolution and frame rate of two videos")]
    Compare {
        /// The video to compare against.
        reference: PathBuf,
        /// The other video.
        input: PathBuf,
        /// Allowed duration difference in seconds.
        #[arg(long, default_value_t = vidfit::SYNC_TOLERANCE_SECONDS)]
        tolerance: f64,
        /// Output the comparison as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the transformation that `convert` would perform.
    #[command(about = "Plan a conversion without running it")]
    Plan {
        /// Input video path.
        input: PathBuf,
        #[command(flatten)]
        targets: PlanArgs,
        /// Output the plan as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Resize, change frame rate, trim or retime a video.
    #[command(
        about = "Convert a video according to the given targets",
        after_help = "Examples:\n  vidfit convert input.mp4 --max-dimension 720\n  vidfit convert input.mp4 out.mp4 --fps 5 --codec h265 --crf 28"
    )]
    Convert {
        /// Input video path.
        input: PathBuf,
        /// Output path (defaults to <input>_converted.<ext>).
        output: Option<PathBuf>,
        #[command(flatten)]
        targets: PlanArgs,
        /// Output codec: h264 | h265 | mpeg4.
        #[arg(long, default_value = "h264")]
        codec: String,
        /// Constant Rate Factor (lower is better quality).
        #[arg(long, default_value_t = 23)]
        crf: u32,
        /// Encoder preset.
        #[arg(long, default_value = "medium")]
        preset: String,
        /// Target bitrate in bits per second (overrides --crf).
        #[arg(long)]
        bitrate: Option<usize>,
    },

    /// Copy streams into another container without re-encoding.
    #[command(about = "Change container format losslessly")]
    Remux {
        /// Input media path.
        input: PathBuf,
        /// Target container extension (mkv, mp4, mov, ...).
        #[arg(long, required_unless_present = "out")]
        format: Option<String>,
        /// Explicit output path; its extension picks the container.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        exclude_video: bool,
        #[arg(long)]
        exclude_audio: bool,
        #[arg(long)]
        exclude_subtitles: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or(format!("invalid size (expected WIDTHxHEIGHT): {value}"))?;
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width in size: {value}"))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height in size: {value}"))?;
    Ok((width, height))
}

fn build_constraints(
    targets: &PlanArgs,
    probe: &MetadataProbe,
) -> Result<Constraints, Box<dyn std::error::Error>> {
    let mut constraints = match &targets.reference {
        Some(path) => Constraints::matching(probe.probe(path)?),
        None => Constraints::new(),
    };

    // Explicit flags win over what a reference implies.
    if let Some(size) = &targets.size {
        let (width, height) = parse_size(size)?;
        constraints = constraints.with_target_size(width, height);
    }
    if let Some(max_dimension) = targets.max_dimension {
        if targets.size.is_some() {
            return Err("--size and --max-dimension cannot be combined".into());
        }
        constraints.target_size = None;
        constraints = constraints.with_max_dimension(max_dimension);
    }
    if let Some(fps) = &targets.fps {
        constraints = constraints.with_target_fps(fps.parse::<FrameRate>()?);
    }
    if let Some(start) = &targets.start {
        constraints = constraints.with_trim_start(vidfit::parse_timecode(start)?);
    }
    if let Some(end) = &targets.end {
        constraints = constraints.with_trim_end(vidfit::parse_timecode(end)?);
    }
    if let Some(fallback) = targets.speed_fallback {
        constraints = constraints.with_speed_fallback(fallback);
    }
    Ok(constraints)
}

fn metadata_json(path: &Path, metadata: &VideoMetadata) -> Value {
    json!({
        "path": path.display().to_string(),
        "width": metadata.width,
        "height": metadata.height,
        "fps": metadata.frames_per_second(),
        "frame_rate": metadata.frame_rate.to_string(),
        "frame_count": metadata.frame_count,
        "duration_seconds": metadata.duration,
    })
}

fn plan_json(plan: &TransformPlan, chain: &FilterChain, input: &VideoMetadata) -> Value {
    json!({
        "width": plan.target_width,
        "height": plan.target_height,
        "fps": plan.target_fps.map(|rate| rate.to_string()),
        "speed_factor": plan.speed_factor,
        "trim_start_seconds": plan.trim_start.map(|start| start.as_secs_f64()),
        "trim_end_seconds": plan.trim_end.map(|end| end.as_secs_f64()),
        "output_duration_seconds": plan.output_duration(input),
        "filters": chain.to_string(),
    })
}

fn print_metadata(label: &str, path: &Path, metadata: &VideoMetadata) {
    println!("{label} Information:");
    println!("  Path: {}", path.display());
    println!("  FPS: {:.2}", metadata.frames_per_second());
    println!("  Duration: {:.2} seconds", metadata.duration);
    println!("  Total Frames: {}", metadata.frame_count);
    println!("  Resolution: {}x{}", metadata.width, metadata.height);
    println!();
}

fn print_plan(plan: &TransformPlan, chain: &FilterChain, input: &VideoMetadata) {
    println!(
        "Resolution: {}x{} -> {}x{}",
        input.width, input.height, plan.target_width, plan.target_height
    );
    match plan.target_fps {
        Some(rate) => println!("FPS: {:.2} -> {rate}", input.frames_per_second()),
        None => println!("FPS: {:.2} (unchanged)", input.frames_per_second()),
    }
    if plan.is_trimmed() {
        println!(
            "Trim: {} -> {}",
            plan.trim_start
                .map(vidfit::format_timecode)
                .unwrap_or_else(|| "start".to_string()),
            plan.trim_end
                .map(vidfit::format_timecode)
                .unwrap_or_else(|| "end".to_string()),
        );
    }
    println!("Speed factor: {}", plan.speed_factor);
    println!(
        "Duration: {:.2} -> {:.2} seconds",
        input.duration,
        plan.output_duration(input)
    );
    println!("Filters: {chain}");
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &global.log_level {
        Some(level) => vidfit::set_ffmpeg_log_level(level.parse::<FfmpegLogLevel>()?),
        None if !global.verbose => vidfit::set_ffmpeg_log_level(FfmpegLogLevel::Error),
        None => {}
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;
    let probe = MetadataProbe::new();

    match cli.command {
        Commands::Info { inputs, json } => {
            let results = probe.probe_many(&inputs);
            if json {
                let payload = inputs
                    .iter()
                    .zip(&results)
                    .map(|(path, result)| match result {
                        Ok(metadata) => metadata_json(path, metadata),
                        Err(error) => json!({
                            "path": path.display().to_string(),
                            "error": error.to_string(),
                        }),
                    })
                    .collect::<Vec<_>>();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                for (index, (path, result)) in inputs.iter().zip(&results).enumerate() {
                    match result {
                        Ok(metadata) => {
                            print_metadata(&format!("Video {}", index + 1), path, metadata)
                        }
                        Err(error) => eprintln!("{} {error}", "error:".red().bold()),
                    }
                }
            }
            if results.iter().any(Result::is_err) {
                return Err("some inputs could not be probed".into());
            }
        }
        Commands::Compare {
            reference,
            input,
            tolerance,
            json,
        } => {
            let reference_metadata = probe.probe(&reference)?;
            let input_metadata = probe.probe(&input)?;
            let comparison = MetadataComparison::new(&reference_metadata, &input_metadata)
                .with_tolerance(tolerance);

            if json {
                let payload = json!({
                    "reference": metadata_json(&reference, &reference_metadata),
                    "input": metadata_json(&input, &input_metadata),
                    "duration_difference_seconds": comparison.duration_difference(),
                    "in_sync": comparison.is_in_sync(),
                    "resolution_matches": comparison.resolution_matches(),
                    "frame_rate_matches": comparison.frame_rate_matches(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print_metadata("Video 1", &reference, &reference_metadata);
                print_metadata("Video 2", &input, &input_metadata);
                print!("{comparison}");
            }
        }
        Commands::Plan {
            input,
            targets,
            json,
        } => {
            let metadata = probe.probe(&input)?;
            let constraints = build_constraints(&targets, &probe)?;
            let plan = TransformPlanner::plan_full(&metadata, &constraints)?;
            let chain = FilterChain::from_plan(&plan);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&plan_json(&plan, &chain, &metadata))?
                );
            } else {
                print_plan(&plan, &chain, &metadata);
            }
        }
        Commands::Convert {
            input,
            output,
            targets,
            codec,
            crf,
            preset,
            bitrate,
        } => {
            let output = output.unwrap_or_else(|| vidfit::converted_output_path(&input, None));
            ensure_writable_path(&output, cli.global.overwrite)?;

            let metadata = probe.probe(&input)?;
            let constraints = build_constraints(&targets, &probe)?;
            let plan = TransformPlanner::plan_full(&metadata, &constraints)?;
            let chain = FilterChain::from_plan(&plan);
            if cli.global.verbose {
                print_plan(&plan, &chain, &metadata);
            }

            let mut options = OutputOptions::new()
                .with_codec(codec.parse::<VideoCodec>()?)
                .with_crf(crf)
                .with_preset(preset)
                .with_overwrite(cli.global.overwrite);
            if let Some(bitrate) = bitrate {
                options = options.with_bitrate(bitrate);
            }

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")?);
            spinner.set_message(format!(
                "Converting to {}x{}...",
                plan.target_width, plan.target_height
            ));
            spinner.enable_steady_tick(Duration::from_millis(120));

            let result = FfmpegExecutor::new(options).execute(&plan, &input, &output);
            spinner.finish_and_clear();
            result?;

            println!(
                "{} {}",
                "success:".green().bold(),
                format!(
                    "{}x{}, {} -> {}",
                    plan.target_width,
                    plan.target_height,
                    chain,
                    output.display()
                )
                .green()
            );
        }
        Commands::Remux {
            input,
            format,
            out,
            exclude_video,
            exclude_audio,
            exclude_subtitles,
        } => {
            let mut converter = match (out, format) {
                (Some(out), _) => ContainerConverter::with_destination(&input, out),
                (None, Some(format)) => ContainerConverter::new(&input, &format),
                (None, None) => return Err("provide --format or --out".into()),
            };
            ensure_writable_path(converter.destination(), cli.global.overwrite)?;
            converter = converter.overwrite(cli.global.overwrite);
            if exclude_video {
                converter = converter.exclude_video();
            }
            if exclude_audio {
                converter = converter.exclude_audio();
            }
            if exclude_subtitles {
                converter = converter.exclude_subtitles();
            }
            let written = converter.run()?;
            println!("{} {}", "saved".green().bold(), written.display());
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "vidfit", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
