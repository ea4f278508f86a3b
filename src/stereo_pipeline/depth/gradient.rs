use tracing::trace;

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::depth::estimator::DepthEstimator;
use crate::stereo_pipeline::depth::postprocess::normalize;
use crate::stereo_pipeline::frame::{CHANNELS, DepthMap, Frame};

/// Model-free estimator: the bottom of the frame is near, the top is far, and brighter
/// pixels are pulled slightly forward.
///
/// Good enough for previews and for running the pipeline without an inference backend.
#[derive(Debug, Clone, Copy)]
pub struct GradientDepthEstimator {
    luma_weight: f32,
}

impl GradientDepthEstimator {
    pub const DEFAULT_LUMA_WEIGHT: f32 = 0.25;

    pub fn new(luma_weight: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&luma_weight) {
            return Err(StereoError::InvalidParameter(format!(
                "luma weight {luma_weight} outside 0-1"
            )));
        }
        Ok(Self { luma_weight })
    }

    pub fn luma_weight(&self) -> f32 {
        self.luma_weight
    }
}

impl Default for GradientDepthEstimator {
    fn default() -> Self {
        Self {
            luma_weight: Self::DEFAULT_LUMA_WEIGHT,
        }
    }
}

impl DepthEstimator for GradientDepthEstimator {
    fn estimate(&self, frame: &Frame) -> Result<DepthMap> {
        let (width, height) = frame.dimensions();
        trace!(width, height, index = frame.index(), "Gradient depth estimate");

        let rows = (height.max(2) - 1) as f32;
        let data = frame
            .data()
            .chunks_exact(CHANNELS)
            .enumerate()
            .map(|(i, px)| {
                let vertical = if height == 1 {
                    0.5
                } else {
                    1.0 - (i / width) as f32 / rows
                };
                let luma = (0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32)
                    / 255.0;
                (1.0 - self.luma_weight) * vertical + self.luma_weight * (1.0 - luma)
            })
            .collect();

        Ok(normalize(&DepthMap::new(width, height, data)?))
    }
}
