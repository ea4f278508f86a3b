//! Job ledger: the ordered items of one conversion and their per-item outcome.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::conversions::config::JobConfig;
use crate::stereo_pipeline::frame::{frame_file_name, list_frame_files};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// One image; a failure ends the job
    SingleImage,
    /// Independent images; failures are isolated per item
    Batch,
    /// Extracted video frames; temporal stabilization applies
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Running,
    /// Ran to exhaustion, whatever the individual item outcomes
    Completed,
    Cancelled,
    /// Job-level fatal error, or the single item of a single-image job failed
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Cancelled | JobState::Failed
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Idle => "idle",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Cancelled => "cancelled",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Pending,
    Succeeded,
    Failed(String),
    /// Not processed because the job was cancelled first
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobItem {
    index: u64,
    input: PathBuf,
    output: PathBuf,
    status: ItemStatus,
}

impl JobItem {
    fn new(index: u64, input: PathBuf, output: PathBuf) -> Self {
        Self {
            index,
            input,
            output,
            status: ItemStatus::Pending,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn status(&self) -> &ItemStatus {
        &self.status
    }

    pub(crate) fn set_status(&mut self, status: ItemStatus) {
        self.status = status;
    }
}

/// An ordered set of inputs plus the configuration they are converted with.
///
/// Items are numbered 1..=N in processing order by the constructors.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    kind: JobKind,
    items: Vec<JobItem>,
    config: JobConfig,
    state: JobState,
}

impl ConversionJob {
    fn from_pairs(
        kind: JobKind,
        pairs: impl IntoIterator<Item = (PathBuf, PathBuf)>,
        config: JobConfig,
    ) -> Self {
        let items = (1u64..)
            .zip(pairs)
            .map(|(index, (input, output))| JobItem::new(index, input, output))
            .collect();
        Self {
            kind,
            items,
            config,
            state: JobState::Idle,
        }
    }

    pub fn single_image(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        config: JobConfig,
    ) -> Self {
        Self::from_pairs(
            JobKind::SingleImage,
            [(input.into(), output.into())],
            config,
        )
    }

    /// Independent `(input, output)` pairs, processed in the given order.
    pub fn batch(pairs: Vec<(PathBuf, PathBuf)>, config: JobConfig) -> Self {
        Self::from_pairs(JobKind::Batch, pairs, config)
    }

    /// Every file in `input_dir` whose extension is in `extensions` (case-insensitive),
    /// sorted by file name. Outputs keep the input file name inside `output_dir`.
    pub fn from_directory(
        input_dir: &Path,
        output_dir: &Path,
        extensions: &[&str],
        config: JobConfig,
    ) -> Result<Self> {
        let mut inputs = Vec::new();
        for entry in std::fs::read_dir(input_dir).map_err(|e| {
            StereoError::InputReadError(format!("{}: {}", input_dir.display(), e))
        })? {
            let path = entry?.path();
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)));
            if path.is_file() && matches {
                inputs.push(path);
            }
        }
        inputs.sort();

        let pairs = inputs.into_iter().filter_map(|input| {
            let name = input.file_name()?.to_owned();
            Some((input, output_dir.join(name)))
        });
        Ok(Self::from_pairs(JobKind::Batch, pairs, config))
    }

    /// Numbered frames in `frames_dir`, written under the same names into `output_dir`.
    pub fn video_frames(frames_dir: &Path, output_dir: &Path, config: JobConfig) -> Result<Self> {
        let frames = list_frame_files(frames_dir)?;
        let pairs = frames
            .into_iter()
            .map(|(index, input)| (input, output_dir.join(frame_file_name(index))));
        Ok(Self::from_pairs(JobKind::Video, pairs, config))
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn items(&self) -> &[JobItem] {
        &self.items
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn items_mut(&mut self) -> &mut [JobItem] {
        &mut self.items
    }

    pub(crate) fn set_state(&mut self, state: JobState) {
        self.state = state;
    }
}
