use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flume::Receiver;
use stereo_synth_rs::logger;
use stereo_synth_rs::settings::Settings;
use stereo_synth_rs::stereo_pipeline::conversions::{
    ConversionJob, FramePipeline, JobConfig, JobConfigBuilder, JobHandle, JobState,
    PipelineEvent, PipelineResult, VideoConversion, spawn_job, spawn_worker,
};
use stereo_synth_rs::stereo_pipeline::depth::{
    DepthEstimator, GradientDepthEstimator, SidecarDepthEstimator,
};
use stereo_synth_rs::stereo_pipeline::frame::{DepthMap, Frame};
use stereo_synth_rs::stereo_pipeline::render::{ContentPreset, HoleFillMethod, OutputFormat};
use stereo_synth_rs::stereo_pipeline::temporal::{TemporalMethod, TemporalSettings};
use stereo_synth_rs::stereo_pipeline::video::{FfmpegEncoder, FfmpegFrameSource};
use stereo_synth_rs::stereo_pipeline::Result as StereoResult;

use tracing::{debug, error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "stereo-synth", version, about = "Convert 2D images and videos to stereoscopic 3D")]
struct Cli {
    /// Settings file (TOML); `STEREO_*` environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert one image
    Image {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Convert every matching image in a directory
    Batch {
        input_dir: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long = "ext", value_delimiter = ',', default_value = "png,jpg,jpeg,tif,tiff")]
        extensions: Vec<String>,
        #[command(flatten)]
        render: RenderArgs,
    },
    /// Convert a video, keeping its audio track
    Video {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Resample to this frame rate before conversion
        #[arg(long)]
        fps: Option<f64>,
        #[arg(long)]
        no_audio: bool,
        #[command(flatten)]
        render: RenderArgs,
    },
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// half-sbs, full-sbs, top-bottom, top-bottom-full, anaglyph, anaglyph-amber
    #[arg(long)]
    format: Option<OutputFormat>,
    /// Depth intensity, 0-100
    #[arg(long)]
    depth: Option<f64>,
    /// Interpupillary distance in mm, 50-80
    #[arg(long)]
    ipd: Option<f64>,
    #[arg(long)]
    convergence: Option<f64>,
    /// standard, action, documentary, animation, talking-head
    #[arg(long)]
    preset: Option<ContentPreset>,
    /// inpaint or nearest
    #[arg(long)]
    hole_fill: Option<HoleFillMethod>,
    /// Disable temporal depth smoothing (video only)
    #[arg(long)]
    no_temporal: bool,
    /// ema, median or gaussian
    #[arg(long)]
    temporal_method: Option<TemporalMethod>,
    /// Read precomputed depth maps (frame_NNNNNN.png) instead of estimating
    #[arg(long)]
    depth_dir: Option<PathBuf>,
    /// Also write depth, left and right views here
    #[arg(long)]
    intermediate_dir: Option<PathBuf>,
    #[arg(long)]
    batch_size: Option<usize>,
}

impl RenderArgs {
    fn apply(&self, settings: &Settings, mut builder: JobConfigBuilder) -> JobConfigBuilder {
        if let Some(preset) = self.preset {
            builder = builder.preset(preset);
        }
        if let Some(format) = self.format {
            builder = builder.format(format);
        }
        if let Some(depth) = self.depth {
            builder = builder.depth_intensity(depth);
        }
        if let Some(ipd) = self.ipd {
            builder = builder.ipd_mm(ipd);
        }
        if let Some(convergence) = self.convergence {
            builder = builder.convergence(convergence);
        }
        if let Some(method) = self.hole_fill {
            builder = builder.hole_fill_method(method);
        }
        if self.no_temporal {
            builder = builder.temporal(None);
        } else if let Some(method) = self.temporal_method {
            let base = settings.temporal_settings().unwrap_or_default();
            builder = builder.temporal(Some(TemporalSettings { method, ..base }));
        }
        if let Some(dir) = &self.intermediate_dir {
            builder = builder.intermediate_dir(dir);
        }
        if let Some(size) = self.batch_size {
            builder = builder.batch_size(size);
        }
        builder
    }

    fn estimator(&self, settings: &Settings) -> CliEstimator {
        match self.depth_dir.as_ref().or(settings.depth.depth_dir.as_ref()) {
            Some(dir) => {
                info!("Using precomputed depth maps from {}", dir.display());
                CliEstimator::Sidecar(SidecarDepthEstimator::new(dir))
            }
            None => {
                info!("Using the gradient depth heuristic");
                CliEstimator::Gradient(GradientDepthEstimator::default())
            }
        }
    }
}

/// Estimator picked on the command line
enum CliEstimator {
    Gradient(GradientDepthEstimator),
    Sidecar(SidecarDepthEstimator),
}

impl DepthEstimator for CliEstimator {
    fn initialize(&mut self) -> StereoResult<()> {
        match self {
            CliEstimator::Gradient(e) => e.initialize(),
            CliEstimator::Sidecar(e) => e.initialize(),
        }
    }

    fn estimate(&self, frame: &Frame) -> StereoResult<DepthMap> {
        match self {
            CliEstimator::Gradient(e) => e.estimate(frame),
            CliEstimator::Sidecar(e) => e.estimate(frame),
        }
    }

    fn batch_size(&self) -> usize {
        match self {
            CliEstimator::Gradient(e) => e.batch_size(),
            CliEstimator::Sidecar(e) => e.batch_size(),
        }
    }
}

fn install_cancel_handler<T>(handle: &JobHandle<T>) -> Result<()> {
    let token = handle.cancel_token();
    ctrlc::set_handler(move || {
        warn!("Interrupted, stopping after the current item");
        token.cancel();
    })
    .context("Failed to install the Ctrl-C handler")
}

fn report_events(events: &Receiver<PipelineEvent>) {
    for event in events.iter() {
        match event {
            PipelineEvent::ItemFailed { index, reason } => {
                warn!("Item {} failed: {}", index, reason)
            }
            PipelineEvent::JobFinished { state } => info!("Job finished: {}", state),
            other => debug!(?other, "Pipeline event"),
        }
    }
}

fn summarize(result: &PipelineResult) -> bool {
    info!(
        "{} succeeded, {} failed, {} skipped of {}",
        result.succeeded(),
        result.failed(),
        result.skipped(),
        result.total()
    );
    match result.state() {
        JobState::Completed if result.all_failed() => {
            error!("Every item failed");
            false
        }
        JobState::Completed => true,
        JobState::Cancelled => {
            warn!("Job was cancelled");
            false
        }
        state => {
            error!(
                "Job ended in state {}: {}",
                state,
                result.error().unwrap_or("no reason given")
            );
            false
        }
    }
}

fn run_frames(job: ConversionJob, estimator: CliEstimator) -> Result<bool> {
    let handle = spawn_job(FramePipeline::new(estimator), job)
        .context("Failed to start the conversion worker")?;
    install_cancel_handler(&handle)?;
    report_events(handle.events());
    let (_job, result) = handle.join().context("Conversion failed")?;
    Ok(summarize(&result))
}

fn run_video(
    input: &Path,
    output: &Path,
    config: JobConfig,
    settings: &Settings,
    estimator: CliEstimator,
) -> Result<bool> {
    let ffmpeg = settings
        .video
        .ffmpeg
        .clone()
        .unwrap_or_else(|| PathBuf::from("ffmpeg"));
    let ffprobe = settings
        .video
        .ffprobe
        .clone()
        .unwrap_or_else(|| PathBuf::from("ffprobe"));
    let conversion = VideoConversion::with_custom(
        FfmpegFrameSource::new(&ffmpeg, ffprobe),
        FfmpegEncoder::new(ffmpeg, settings.video.encoder.clone()),
    );
    let (input, output) = (input.to_path_buf(), output.to_path_buf());

    let handle = spawn_worker("stereo-video", move |events, cancel| {
        let mut pipeline = FramePipeline::new(estimator);
        conversion.run(&mut pipeline, &input, &output, config, events, cancel)
    })
    .context("Failed to start the video worker")?;
    install_cancel_handler(&handle)?;
    report_events(handle.events());

    let outcome = handle.join().context("Video conversion failed")?;
    info!(
        "Source {}x{} @ {:.3} fps, {} frames",
        outcome.info.width,
        outcome.info.height,
        outcome.info.fps,
        outcome.info.estimated_frames()
    );
    Ok(summarize(&outcome.result) && outcome.encoded)
}

fn run(cli: Cli) -> Result<bool> {
    let settings = Settings::load(cli.config.as_deref())?;
    let base = settings.job_builder()?;

    match cli.command {
        Command::Image {
            input,
            output,
            render,
        } => {
            let config = render.apply(&settings, base).build()?;
            let job = ConversionJob::single_image(input, output, config);
            run_frames(job, render.estimator(&settings))
        }
        Command::Batch {
            input_dir,
            output,
            extensions,
            render,
        } => {
            let config = render.apply(&settings, base).build()?;
            let extensions: Vec<&str> = extensions.iter().map(String::as_str).collect();
            let job = ConversionJob::from_directory(&input_dir, &output, &extensions, config)
                .with_context(|| format!("Failed to list {}", input_dir.display()))?;
            if job.is_empty() {
                warn!("No matching images in {}", input_dir.display());
                return Ok(false);
            }
            run_frames(job, render.estimator(&settings))
        }
        Command::Video {
            input,
            output,
            fps,
            no_audio,
            render,
        } => {
            let mut builder = render.apply(&settings, base);
            if let Some(fps) = fps {
                builder = builder.fps_override(fps);
            }
            if no_audio {
                builder = builder.keep_audio(false);
            }
            let config = builder.build()?;
            run_video(&input, &output, config, &settings, render.estimator(&settings))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    info!("Starting stereo-synth...");

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
