//! Video conversion: extract frames, run the frame pipeline, re-encode.

use std::path::{Path, PathBuf};

use flume::Sender;
use tempfile::TempDir;
use tracing::{info, instrument, warn};

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::conversions::config::JobConfig;
use crate::stereo_pipeline::conversions::events::{CancellationToken, PipelineEvent};
use crate::stereo_pipeline::conversions::job::{ConversionJob, ItemStatus, JobState};
use crate::stereo_pipeline::conversions::pipeline::FramePipeline;
use crate::stereo_pipeline::conversions::result::PipelineResult;
use crate::stereo_pipeline::depth::DepthEstimator;
use crate::stereo_pipeline::frame::{FrameReader, FrameWriter, frame_file_name};
use crate::stereo_pipeline::video::{
    FfmpegEncoder, FfmpegFrameSource, FrameSource, VideoEncoder, VideoInfo,
};

const FRAMES_DIR: &str = "frames";
const OUTPUT_DIR: &str = "output";

/// What a finished video job leaves behind
#[derive(Debug)]
pub struct VideoOutcome {
    pub info: VideoInfo,
    pub result: PipelineResult,
    /// Whether the output file was written (false when cancelled or failed)
    pub encoded: bool,
    /// The job's work directory; removed by the time this is returned
    pub work_dir: PathBuf,
}

fn create_work_dir(config: &JobConfig) -> Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("stereo-job-");
    let dir = match config.work_dir_root() {
        Some(root) => {
            std::fs::create_dir_all(root)?;
            builder.tempdir_in(root)?
        }
        None => builder.tempdir()?,
    };
    Ok(dir)
}

/// An audio track is only handed to the encoder when the file exists and is non-empty.
fn usable_audio(audio: Option<PathBuf>) -> Option<PathBuf> {
    let audio = audio?;
    match std::fs::metadata(&audio) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Some(audio),
        _ => {
            warn!("Ignoring empty or missing audio track {}", audio.display());
            None
        }
    }
}

/// Renames the successful outputs to a gapless 1..=K sequence so the encoder sees
/// every converted frame. Returns K.
fn compact_outputs(job: &ConversionJob, output_dir: &Path) -> Result<usize> {
    let mut next = 1u64;
    for item in job.items() {
        if *item.status() != ItemStatus::Succeeded {
            continue;
        }
        let target = output_dir.join(frame_file_name(next));
        if item.output() != target {
            std::fs::rename(item.output(), &target).map_err(|e| {
                StereoError::OutputWriteError(format!("{}: {}", target.display(), e))
            })?;
        }
        next += 1;
    }
    Ok((next - 1) as usize)
}

pub struct VideoConversion<S: FrameSource, C: VideoEncoder> {
    source: S,
    encoder: C,
}

impl VideoConversion<FfmpegFrameSource, FfmpegEncoder> {
    pub fn new() -> Self {
        Self::with_custom(FfmpegFrameSource::default(), FfmpegEncoder::default())
    }
}

impl Default for VideoConversion<FfmpegFrameSource, FfmpegEncoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FrameSource, C: VideoEncoder> VideoConversion<S, C> {
    pub fn with_custom(source: S, encoder: C) -> Self {
        Self { source, encoder }
    }

    /// Converts `input` into a stereoscopic `output` video.
    ///
    /// Frames and audio live in a job-scoped temporary directory that is removed on
    /// every exit path. The encoder only runs when the job completed with at least one
    /// converted frame.
    #[instrument(skip(self, pipeline, config, events, cancel))]
    pub fn run<E, R, W>(
        &self,
        pipeline: &mut FramePipeline<E, R, W>,
        input: &Path,
        output: &Path,
        config: JobConfig,
        events: &Sender<PipelineEvent>,
        cancel: &CancellationToken,
    ) -> Result<VideoOutcome>
    where
        E: DepthEstimator,
        R: FrameReader,
        W: FrameWriter,
    {
        let work_dir = create_work_dir(&config)?;
        let work_path = work_dir.path().to_path_buf();
        info!("Working directory {}", work_path.display());

        let info = {
            let _span = tracing::info_span!("probe").entered();
            self.source.probe(input)?
        };
        let fps = config.fps_override().unwrap_or(info.fps);

        let frames_dir = work_path.join(FRAMES_DIR);
        let output_dir = work_path.join(OUTPUT_DIR);
        std::fs::create_dir_all(&output_dir)?;
        {
            let _span = tracing::info_span!("extract_frames").entered();
            self.source
                .extract_frames(input, &frames_dir, config.fps_override())?;
        }

        let audio = if config.keep_audio() && info.has_audio {
            let _span = tracing::info_span!("extract_audio").entered();
            match self.source.extract_audio(input, &work_path) {
                Ok(audio) => usable_audio(audio),
                Err(e) => {
                    warn!("Audio extraction failed, continuing without audio: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let mut job = ConversionJob::video_frames(&frames_dir, &output_dir, config)?;
        let result = pipeline.run(&mut job, events, cancel)?;

        if matches!(result.state(), JobState::Cancelled | JobState::Failed) {
            info!("Video job {}, skipping encode", result.state());
            return Ok(VideoOutcome {
                info,
                result,
                encoded: false,
                work_dir: work_path,
            });
        }
        if result.succeeded() == 0 {
            return Err(StereoError::JobFailed(format!(
                "none of the {} frames could be converted",
                job.len()
            )));
        }

        let frames = compact_outputs(&job, &output_dir)?;
        if result.failed() > 0 {
            warn!(
                "{} frames failed; encoding the {} converted frames",
                result.failed(),
                frames
            );
        }

        {
            let _span = tracing::info_span!("encode").entered();
            self.encoder
                .encode(&output_dir, fps, audio.as_deref(), output)?;
        }
        info!("Video written to {}", output.display());

        Ok(VideoOutcome {
            info,
            result,
            encoded: true,
            work_dir: work_path,
        })
    }
}
