//! Dedicated worker thread for running a job off the caller's thread.

use std::thread::JoinHandle;

use flume::{Receiver, Sender};
use tracing::debug;

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::conversions::events::{CancellationToken, PipelineEvent};
use crate::stereo_pipeline::conversions::job::ConversionJob;
use crate::stereo_pipeline::conversions::pipeline::FramePipeline;
use crate::stereo_pipeline::conversions::result::PipelineResult;
use crate::stereo_pipeline::depth::DepthEstimator;
use crate::stereo_pipeline::frame::{FrameReader, FrameWriter};

/// Caller side of a running job: its event stream, its cancellation token and the
/// worker's eventual result.
pub struct JobHandle<T> {
    events: Receiver<PipelineEvent>,
    cancel: CancellationToken,
    join: JoinHandle<Result<T>>,
}

impl<T> JobHandle<T> {
    pub fn events(&self) -> &Receiver<PipelineEvent> {
        &self.events
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Asks the worker to stop after the item in flight.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the worker to exit.
    pub fn join(self) -> Result<T> {
        self.join
            .join()
            .map_err(|_| StereoError::JobFailed("worker thread panicked".to_string()))?
    }
}

/// Runs `work` on a named worker thread with a fresh event channel and token.
pub fn spawn_worker<T, F>(name: &str, work: F) -> Result<JobHandle<T>>
where
    T: Send + 'static,
    F: FnOnce(&Sender<PipelineEvent>, &CancellationToken) -> Result<T> + Send + 'static,
{
    let (tx, rx) = flume::unbounded();
    let cancel = CancellationToken::new();
    let worker_cancel = cancel.clone();

    debug!("Spawning worker {}", name);
    let join = std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || work(&tx, &worker_cancel))?;

    Ok(JobHandle {
        events: rx,
        cancel,
        join,
    })
}

/// Runs `job` through `pipeline` on a worker thread. The job ledger is handed back
/// with the result.
pub fn spawn_job<E, R, W>(
    mut pipeline: FramePipeline<E, R, W>,
    mut job: ConversionJob,
) -> Result<JobHandle<(ConversionJob, PipelineResult)>>
where
    E: DepthEstimator + Send + 'static,
    R: FrameReader + Send + 'static,
    W: FrameWriter + Send + 'static,
{
    spawn_worker("stereo-job", move |events, cancel| {
        let result = pipeline.run(&mut job, events, cancel)?;
        Ok((job, result))
    })
}
