//! Conversions module
//!
//! Job configuration and ledger, the ordered frame pipeline, and the worker/event
//! surface used to run jobs off the caller's thread.

mod config;
mod events;
mod job;
mod pipeline;
mod result;
mod timing;
mod video_job;
mod worker;


pub use config::{JobConfig, JobConfigBuilder};
pub use events::{CancellationToken, PipelineEvent};
pub use job::{ConversionJob, ItemStatus, JobItem, JobKind, JobState};
pub use pipeline::FramePipeline;
pub use result::PipelineResult;
pub use timing::{PipelineTimings, StageTiming, Timer};
pub use video_job::{VideoConversion, VideoOutcome};
pub use worker::{JobHandle, spawn_job, spawn_worker};
