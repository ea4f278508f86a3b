use std::time::Duration;

use crate::stereo_pipeline::conversions::job::JobState;
use crate::stereo_pipeline::conversions::timing::PipelineTimings;

/// Summary of a finished job. Produced once, never modified.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    state: JobState,
    succeeded: usize,
    failed: usize,
    skipped: usize,
    failures: Vec<(u64, String)>,
    error: Option<String>,
    elapsed: Duration,
    timings: PipelineTimings,
}

impl PipelineResult {
    pub(crate) fn new(
        state: JobState,
        succeeded: usize,
        skipped: usize,
        failures: Vec<(u64, String)>,
        elapsed: Duration,
        timings: PipelineTimings,
    ) -> Self {
        Self {
            state,
            succeeded,
            failed: failures.len(),
            skipped,
            failures,
            error: None,
            elapsed,
            timings,
        }
    }

    pub(crate) fn with_error(mut self, reason: String) -> Self {
        self.error = Some(reason);
        self
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }

    /// `(item index, reason)` for every failed item, in index order
    pub fn failures(&self) -> &[(u64, String)] {
        &self.failures
    }

    /// Why the job ended `Failed`; `None` for any other terminal state
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn timings(&self) -> &PipelineTimings {
        &self.timings
    }

    /// True when items were processed and none of them succeeded.
    pub fn all_failed(&self) -> bool {
        self.failed > 0 && self.succeeded == 0
    }
}
