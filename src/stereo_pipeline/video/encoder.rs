use std::path::Path;

use crate::stereo_pipeline::common::error::Result;

/// Assembles numbered frames (same naming as the frame source) into a video file.
pub trait VideoEncoder {
    /// `audio` is only ever a file that exists and is non-empty.
    fn encode(&self, frames_dir: &Path, fps: f64, audio: Option<&Path>, output: &Path) -> Result<()>;
}
