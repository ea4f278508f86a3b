use std::path::{Path, PathBuf};

use crate::stereo_pipeline::common::error::Result;
use crate::stereo_pipeline::video::types::VideoInfo;

/// Splits a video into numbered still frames.
pub trait FrameSource {
    fn probe(&self, video: &Path) -> Result<VideoInfo>;

    /// Writes `frame_000001.png`, `frame_000002.png`, ... into `out_dir` and returns how
    /// many frames were written. `fps` resamples the frame rate when set.
    fn extract_frames(&self, video: &Path, out_dir: &Path, fps: Option<f64>) -> Result<usize>;

    /// Copies the first audio track into `out_dir`. `Ok(None)` when there is no audio.
    fn extract_audio(&self, video: &Path, out_dir: &Path) -> Result<Option<PathBuf>>;
}
