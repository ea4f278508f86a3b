use tracing::warn;

use crate::stereo_pipeline::frame::{DepthMap, DisparityMap};
use crate::stereo_pipeline::render::types::RenderParams;

/// Disparity ratio (max disparity / width) above which viewing becomes uncomfortable.
const COMFORT_RATIO_LIMIT: f64 = 0.03;

/// Recommended maximum disparity as a fraction of image width.
const RECOMMENDED_RATIO: f64 = 0.02;

/// Largest shift in pixels, applied to content at depth 0.
pub fn max_disparity(ipd_mm: f64, depth_intensity: f64) -> f64 {
    ipd_mm * (depth_intensity / 100.0) * 0.5
}

/// Converts a normalized depth map into per-pixel disparity.
///
/// `disparity = max_disparity * (1 - depth)`. Depth is not clamped: values outside
/// [0, 1] from a misbehaving estimator show up as out-of-range disparity.
pub fn compute_disparity(depth: &DepthMap, ipd_mm: f64, depth_intensity: f64) -> DisparityMap {
    let max = max_disparity(ipd_mm, depth_intensity) as f32;
    let data = depth.data().iter().map(|&d| max * (1.0 - d)).collect();
    DisparityMap::from_parts(depth.width(), depth.height(), data)
}

pub struct DisparityMapper {
    params: RenderParams,
}

impl DisparityMapper {
    pub fn new(params: RenderParams) -> Self {
        Self { params }
    }

    pub fn max_disparity(&self) -> f64 {
        max_disparity(self.params.ipd_mm(), self.params.depth_intensity())
    }

    pub fn compute(&self, depth: &DepthMap) -> DisparityMap {
        compute_disparity(depth, self.params.ipd_mm(), self.params.depth_intensity())
    }

    /// Logs a warning if the configured shift is uncomfortable at this width.
    pub fn check_comfort(&self, image_width: usize) -> ComfortZone {
        let zone = ComfortZone::evaluate(self.max_disparity(), image_width);
        if !zone.is_comfortable {
            warn!(
                max_disparity_px = self.max_disparity(),
                ratio = zone.disparity_ratio,
                recommended_max_px = zone.recommended_max_px,
                "Disparity exceeds comfortable viewing range"
            );
        }
        zone
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComfortZone {
    pub disparity_ratio: f64,
    pub is_comfortable: bool,
    pub recommended_max_px: f64,
}

impl ComfortZone {
    pub fn evaluate(max_disparity_px: f64, image_width: usize) -> Self {
        let width = image_width.max(1) as f64;
        let disparity_ratio = max_disparity_px / width;
        Self {
            disparity_ratio,
            is_comfortable: disparity_ratio < COMFORT_RATIO_LIMIT,
            recommended_max_px: width * RECOMMENDED_RATIO,
        }
    }
}
