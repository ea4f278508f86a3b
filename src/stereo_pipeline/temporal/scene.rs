use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::frame::DepthMap;

pub const DEFAULT_SCENE_CUT_THRESHOLD: f32 = 0.3;

/// Mean absolute per-pixel difference between two depth maps.
pub fn mean_abs_difference(a: &DepthMap, b: &DepthMap) -> Result<f32> {
    if a.dimensions() != b.dimensions() {
        return Err(StereoError::mismatch(
            "scene change detection",
            a.dimensions(),
            b.dimensions(),
        ));
    }
    let sum: f64 = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| (x - y).abs() as f64)
        .sum();
    Ok((sum / a.data().len() as f64) as f32)
}

/// True when consecutive raw depth maps differ by more than `threshold` on average.
pub fn is_scene_change(previous: &DepthMap, current: &DepthMap, threshold: f32) -> Result<bool> {
    Ok(mean_abs_difference(previous, current)? > threshold)
}
