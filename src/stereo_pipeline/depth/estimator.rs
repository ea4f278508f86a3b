use crate::stereo_pipeline::common::error::Result;
use crate::stereo_pipeline::frame::{DepthMap, Frame};

/// Produces a normalized depth map (0 = near, 1 = far) for a frame.
///
/// Returned maps must have the frame's dimensions; resizing model output is the
/// estimator's job. One estimator instance is reused for every item of a job.
pub trait DepthEstimator {
    /// Called once before the first item. An error here fails the whole job.
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn estimate(&self, frame: &Frame) -> Result<DepthMap>;

    /// Results are returned in the same order as `frames`.
    fn estimate_batch(&self, frames: &[Frame]) -> Result<Vec<DepthMap>> {
        frames.iter().map(|frame| self.estimate(frame)).collect()
    }

    /// Preferred number of frames per [`estimate_batch`](Self::estimate_batch) call.
    fn batch_size(&self) -> usize {
        1
    }
}
