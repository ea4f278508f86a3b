use std::path::{Path, PathBuf};
use std::time::Instant;

use flume::Sender;
use tracing::{debug, error, info, instrument, warn};

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::conversions::config::JobConfig;
use crate::stereo_pipeline::conversions::events::{CancellationToken, PipelineEvent};
use crate::stereo_pipeline::conversions::job::{ConversionJob, ItemStatus, JobItem, JobKind, JobState};
use crate::stereo_pipeline::conversions::result::PipelineResult;
use crate::stereo_pipeline::conversions::timing::{PipelineTimings, Timer};
use crate::stereo_pipeline::depth::DepthEstimator;
use crate::stereo_pipeline::frame::{
    DepthMap, Frame, FrameReader, FrameWriter, ImageFrameReader, ImageFrameWriter,
};
use crate::stereo_pipeline::render::{DisparityMapper, FormatComposer, HoleFiller, ViewWarper};
use crate::stereo_pipeline::temporal::{TemporalStabilizer, is_scene_change};

/// Log progress every this many items.
const PROGRESS_LOG_INTERVAL: usize = 10;

/// Per-frame render chain, built from the job configuration at the start of a run.
struct Stages {
    mapper: DisparityMapper,
    warper: ViewWarper,
    filler: HoleFiller,
    composer: FormatComposer,
    stabilizer: Option<TemporalStabilizer>,
    scene_cut_threshold: Option<f32>,
    comfort_checked: bool,
}

impl Stages {
    fn new(kind: JobKind, config: &JobConfig) -> Self {
        let stabilizer = match kind {
            JobKind::Video => config.temporal().copied().map(TemporalStabilizer::new),
            JobKind::SingleImage | JobKind::Batch => None,
        };
        Self {
            mapper: DisparityMapper::new(*config.render()),
            warper: ViewWarper::new(),
            filler: HoleFiller::new(*config.hole_fill()),
            composer: FormatComposer::new(config.format()),
            stabilizer,
            scene_cut_threshold: config.scene_cut_threshold(),
            comfort_checked: false,
        }
    }
}

fn timed<T>(timings: &mut PipelineTimings, name: &'static str, f: impl FnOnce() -> T) -> T {
    let _span = tracing::info_span!("stage", name).entered();
    let timer = Timer::start(name);
    let out = f();
    let (name, duration) = timer.stop();
    timings.add_step(name, duration);
    out
}

fn emit(events: &Sender<PipelineEvent>, event: PipelineEvent) {
    // A dropped receiver only means nobody is watching.
    if events.send(event).is_err() {
        debug!("Pipeline event receiver dropped");
    }
}

/// Moves the job to the result's terminal state and reports it.
fn finish(
    job: &mut ConversionJob,
    events: &Sender<PipelineEvent>,
    result: PipelineResult,
) -> PipelineResult {
    let state = result.state();
    job.set_state(state);
    emit(events, PipelineEvent::JobFinished { state });
    info!(
        "Job {}: {} succeeded, {} failed, {} skipped in {:.2}s",
        state,
        result.succeeded(),
        result.failed(),
        result.skipped(),
        result.elapsed().as_secs_f64()
    );
    if let Some(reason) = result.error() {
        error!("Job failed: {}", reason);
    }
    result.timings().log_summary();
    result
}

fn intermediate_path(dir: &Path, prefix: &str, output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame.png".to_string());
    dir.join(format!("{prefix}_{name}"))
}

/// Drives the items of a [`ConversionJob`] through depth estimation and the render
/// chain, strictly in index order.
pub struct FramePipeline<E, R = ImageFrameReader, W = ImageFrameWriter>
where
    E: DepthEstimator,
    R: FrameReader,
    W: FrameWriter,
{
    estimator: E,
    reader: R,
    writer: W,
    initialized: bool,
}

impl<E: DepthEstimator> FramePipeline<E, ImageFrameReader, ImageFrameWriter> {
    pub fn new(estimator: E) -> Self {
        Self::with_custom(estimator, ImageFrameReader, ImageFrameWriter::default())
    }
}

impl<E: DepthEstimator, R: FrameReader, W: FrameWriter> FramePipeline<E, R, W> {
    pub fn with_custom(estimator: E, reader: R, writer: W) -> Self {
        Self {
            estimator,
            reader,
            writer,
            initialized: false,
        }
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Runs `job` to a terminal state and summarizes it.
    ///
    /// The job ends `Failed` when the estimator cannot be initialized or when the item
    /// of a single-image job fails; the result then carries the reason. Batch and video
    /// items fail individually and the job carries on. `Err` is only returned for a job
    /// that has already finished.
    #[instrument(skip_all, fields(kind = ?job.kind(), items = job.len()))]
    pub fn run(
        &mut self,
        job: &mut ConversionJob,
        events: &Sender<PipelineEvent>,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult> {
        if job.state().is_terminal() {
            return Err(StereoError::InvalidParameter(format!(
                "job has already finished ({})",
                job.state()
            )));
        }
        let started = Instant::now();
        let total = job.len();
        job.set_state(JobState::Running);
        emit(events, PipelineEvent::JobStarted { total });
        info!("Starting {:?} job with {} items", job.kind(), total);

        if !self.initialized {
            let init = {
                let _span = tracing::info_span!("initialize_estimator").entered();
                self.estimator.initialize()
            };
            if let Err(e) = init {
                for item in job.items_mut() {
                    item.set_status(ItemStatus::Skipped);
                }
                let reason = format!("depth estimator could not be initialized: {e}");
                return Ok(finish(
                    job,
                    events,
                    PipelineResult::new(
                        JobState::Failed,
                        0,
                        total,
                        Vec::new(),
                        started.elapsed(),
                        PipelineTimings::new(),
                    )
                    .with_error(reason),
                ));
            }
            self.initialized = true;
        }

        let mut stages = Stages::new(job.kind(), job.config());
        let mut timings = PipelineTimings::new();
        let batch_size = job
            .config()
            .batch_size()
            .unwrap_or_else(|| self.estimator.batch_size())
            .max(1);

        let mut succeeded = 0;
        let mut failures = Vec::new();
        let mut done = 0;
        let mut cancelled = false;

        let mut start = 0;
        'chunks: while start < total {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let end = (start + batch_size).min(total);
            let staged = self.stage_chunk(&job.items()[start..end], &mut timings);

            for (offset, inputs) in staged.into_iter().enumerate() {
                if offset > 0 && cancel.is_cancelled() {
                    cancelled = true;
                    break 'chunks;
                }
                let position = start + offset;
                let item = job.items()[position].clone();
                emit(events, PipelineEvent::ItemStarted { index: item.index() });

                let _span = tracing::info_span!("item", index = item.index()).entered();
                let outcome = inputs.and_then(|(frame, depth)| {
                    self.render_item(&item, frame, depth, &mut stages, job.config(), &mut timings)
                });

                done += 1;
                match outcome {
                    Ok(()) => {
                        succeeded += 1;
                        job.items_mut()[position].set_status(ItemStatus::Succeeded);
                        emit(
                            events,
                            PipelineEvent::ItemSucceeded {
                                index: item.index(),
                                output: item.output().to_path_buf(),
                            },
                        );
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        error!(
                            index = item.index(),
                            input = %item.input().display(),
                            "Item failed: {}",
                            reason
                        );
                        job.items_mut()[position].set_status(ItemStatus::Failed(reason.clone()));
                        emit(
                            events,
                            PipelineEvent::ItemFailed {
                                index: item.index(),
                                reason: reason.clone(),
                            },
                        );
                        failures.push((item.index(), reason.clone()));
                        if job.kind() == JobKind::SingleImage {
                            let result = PipelineResult::new(
                                JobState::Failed,
                                succeeded,
                                0,
                                failures,
                                started.elapsed(),
                                timings,
                            )
                            .with_error(reason);
                            return Ok(finish(job, events, result));
                        }
                    }
                }

                emit(events, PipelineEvent::Progress { done, total });
                if done % PROGRESS_LOG_INTERVAL == 0 || done == total {
                    info!("Processed {}/{} items", done, total);
                }
            }
            start = end;
        }

        let mut skipped = 0;
        if cancelled {
            for item in job.items_mut() {
                if *item.status() == ItemStatus::Pending {
                    item.set_status(ItemStatus::Skipped);
                    skipped += 1;
                }
            }
            warn!("Job cancelled after {}/{} items", done, total);
        }

        let state = if cancelled {
            JobState::Cancelled
        } else {
            JobState::Completed
        };
        let result = PipelineResult::new(
            state,
            succeeded,
            skipped,
            failures,
            started.elapsed(),
            timings,
        );
        Ok(finish(job, events, result))
    }

    /// Loads every frame of a chunk and estimates their depth, returning one entry per
    /// item in index order.
    fn stage_chunk(
        &self,
        items: &[JobItem],
        timings: &mut PipelineTimings,
    ) -> Vec<Result<(Frame, DepthMap)>> {
        let mut frames = Vec::with_capacity(items.len());
        let mut load_errors = Vec::with_capacity(items.len());
        for item in items {
            match timed(timings, "load", || {
                self.reader.read_frame(item.input(), item.index())
            }) {
                Ok(frame) => {
                    frames.push(frame);
                    load_errors.push(None);
                }
                Err(e) => load_errors.push(Some(e)),
            }
        }

        let depths = timed(timings, "estimate", || self.estimate_frames(&frames));
        let mut estimated = frames.into_iter().zip(depths);

        load_errors
            .into_iter()
            .map(|load_error| match load_error {
                Some(e) => Err(e),
                None => match estimated.next() {
                    Some((frame, depth)) => depth.map(|depth| (frame, depth)),
                    None => Err(StereoError::DepthEstimation(
                        "no depth map returned for frame".to_string(),
                    )),
                },
            })
            .collect()
    }

    fn estimate_frames(&self, frames: &[Frame]) -> Vec<Result<DepthMap>> {
        if frames.len() > 1 {
            match self.estimator.estimate_batch(frames) {
                Ok(maps) if maps.len() == frames.len() => return maps.into_iter().map(Ok).collect(),
                Ok(maps) => warn!(
                    "Batch estimate returned {} maps for {} frames, retrying per frame",
                    maps.len(),
                    frames.len()
                ),
                Err(e) => warn!("Batch estimate failed, retrying per frame: {}", e),
            }
        }
        frames
            .iter()
            .map(|frame| self.estimator.estimate(frame))
            .collect()
    }

    fn render_item(
        &self,
        item: &JobItem,
        frame: Frame,
        depth: DepthMap,
        stages: &mut Stages,
        config: &JobConfig,
        timings: &mut PipelineTimings,
    ) -> Result<()> {
        if depth.dimensions() != frame.dimensions() {
            return Err(StereoError::mismatch(
                "depth map",
                frame.dimensions(),
                depth.dimensions(),
            ));
        }

        if !stages.comfort_checked {
            stages.mapper.check_comfort(frame.width());
            stages.comfort_checked = true;
        }

        let depth = if config.depth().is_identity() {
            depth
        } else {
            timed(timings, "postprocess", || config.depth().apply(depth))?
        };

        let threshold = stages.scene_cut_threshold;
        let depth = match stages.stabilizer.as_mut() {
            Some(stabilizer) => timed(timings, "temporal", || {
                let cut = match (threshold, stabilizer.state().last_raw()) {
                    (Some(threshold), Some(previous)) => {
                        is_scene_change(previous, &depth, threshold)?
                    }
                    _ => false,
                };
                if cut {
                    info!("Scene change at frame {}, resetting temporal filter", item.index());
                    stabilizer.reset();
                }
                stabilizer.filter(depth)
            })?,
            None => depth,
        };

        let disparity = timed(timings, "disparity", || stages.mapper.compute(&depth));
        let pair = timed(timings, "warp", || {
            stages.warper.render_pair(&frame, &disparity)
        })?;
        let pair = timed(timings, "fill", || stages.filler.fill(pair))?;
        let output = timed(timings, "compose", || stages.composer.compose_pair(&pair))?;

        if let Some(dir) = config.intermediate_dir() {
            let written = timed(timings, "intermediate", || {
                let depth_frame = depth.to_frame(frame.index())?;
                self.writer
                    .write_frame(&depth_frame, &intermediate_path(dir, "depth", item.output()))?;
                self.writer
                    .write_frame(pair.left(), &intermediate_path(dir, "left", item.output()))?;
                self.writer
                    .write_frame(pair.right(), &intermediate_path(dir, "right", item.output()))
            });
            if let Err(e) = written {
                warn!("Could not write intermediates for item {}: {}", item.index(), e);
            }
        }

        timed(timings, "write", || self.writer.write_frame(&output, item.output()))
    }
}
