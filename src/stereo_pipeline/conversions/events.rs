use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::stereo_pipeline::conversions::job::JobState;

/// Progress stream emitted by a running job
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    JobStarted { total: usize },
    ItemStarted { index: u64 },
    ItemSucceeded { index: u64, output: PathBuf },
    ItemFailed { index: u64, reason: String },
    Progress { done: usize, total: usize },
    JobFinished { state: JobState },
}

/// Cooperative cancellation flag, checked by the pipeline between items.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
