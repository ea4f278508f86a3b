//! Stereoscopic conversion pipeline
//!
//! Turns ordinary 2D images and videos into stereo 3D: a depth map per frame, depth to
//! disparity, left/right view synthesis, disocclusion filling, temporal smoothing for
//! video, and composition into a stereo output format.

pub mod common;
pub mod conversions;
pub mod depth;
pub mod frame;
pub mod render;
pub mod temporal;
pub mod video;

pub use common::{ErrorKind, Result, StereoError};

pub use frame::{DepthMap, DisparityMap, Frame, FrameReader, FrameWriter, StereoPair};

pub use depth::{DepthEstimator, GradientDepthEstimator, SidecarDepthEstimator};

pub use render::{ContentPreset, HoleFillMethod, OutputFormat, RenderParams};

pub use temporal::{TemporalMethod, TemporalSettings};

pub use conversions::{
    CancellationToken, ConversionJob, FramePipeline, JobConfig, JobConfigBuilder, JobState,
    PipelineEvent, PipelineResult, VideoConversion,
};
