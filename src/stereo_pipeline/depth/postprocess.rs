//! Depth map post-processing applied between estimation and temporal filtering

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::frame::DepthMap;

/// Ranges narrower than this are treated as flat.
const FLAT_RANGE: f32 = 1e-6;

/// Min-max normalization to [0, 1]. A flat map becomes all zeros.
pub fn normalize(depth: &DepthMap) -> DepthMap {
    let (min, max) = depth
        .data()
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    let data = if range > FLAT_RANGE {
        depth.data().iter().map(|&v| (v - min) / range).collect()
    } else {
        vec![0.0; depth.data().len()]
    };
    DepthMap::from_parts(depth.width(), depth.height(), data)
}

fn check_range(near: f32, far: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&near) || !(0.0..=1.0).contains(&far) || near >= far {
        return Err(StereoError::InvalidParameter(format!(
            "depth range [{near}, {far}] must satisfy 0 <= near < far <= 1"
        )));
    }
    Ok(())
}

/// Clips depth to `[near, far]` and stretches that band back to [0, 1].
pub fn adjust_depth_range(depth: &DepthMap, near: f32, far: f32) -> Result<DepthMap> {
    check_range(near, far)?;
    let span = far - near;
    let data = depth
        .data()
        .iter()
        .map(|&v| {
            let clipped = v.clamp(near, far);
            if span > FLAT_RANGE {
                (clipped - near) / span
            } else {
                clipped
            }
        })
        .collect();
    DepthMap::new(depth.width(), depth.height(), data)
}

type DepthView<'a> = ImageBuffer<Luma<f32>, &'a [f32]>;

fn view(depth: &DepthMap) -> Result<DepthView<'_>> {
    let (width, height) = depth.dimensions();
    ImageBuffer::from_raw(width as u32, height as u32, depth.data()).ok_or_else(|| {
        StereoError::mismatch("depth buffer", (width * height, 1), (depth.data().len(), 1))
    })
}

/// Gaussian blur over a `(2 * radius + 1)`-pixel neighbourhood, clamped to [0, 1].
pub fn smooth_gaussian(depth: &DepthMap, radius: usize) -> Result<DepthMap> {
    if radius == 0 {
        return Ok(depth.clone());
    }
    let size = 2 * radius + 1;
    // Same sigma an OpenCV GaussianBlur picks for this kernel size.
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let blurred = imageops::blur(&view(depth)?, sigma);
    DepthMap::new(depth.width(), depth.height(), blurred.into_raw())
}

/// Bilinear (triangle filter) resize, as used for frames. Values are kept in [0, 1].
pub fn resize_depth(depth: &DepthMap, width: usize, height: usize) -> Result<DepthMap> {
    if width == 0 || height == 0 {
        return Err(StereoError::InvalidDimensions(width, height));
    }
    if depth.dimensions() == (width, height) {
        return Ok(depth.clone());
    }
    let resized = imageops::resize(
        &view(depth)?,
        width as u32,
        height as u32,
        FilterType::Triangle,
    );
    DepthMap::new(width, height, resized.into_raw())
}

/// Post-processing chain applied to every estimated depth map of a job.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DepthPostprocess {
    /// `(near, far)` clip planes in normalized depth
    pub range: Option<(f32, f32)>,
    /// Gaussian smoothing radius in pixels
    pub smoothing_radius: Option<usize>,
}

impl DepthPostprocess {
    pub fn validate(&self) -> Result<()> {
        match self.range {
            Some((near, far)) => check_range(near, far),
            None => Ok(()),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.range.is_none() && self.smoothing_radius.unwrap_or(0) == 0
    }

    pub fn apply(&self, depth: DepthMap) -> Result<DepthMap> {
        let depth = match self.smoothing_radius {
            Some(radius) if radius > 0 => smooth_gaussian(&depth, radius)?,
            _ => depth,
        };
        match self.range {
            Some((near, far)) => adjust_depth_range(&depth, near, far),
            None => Ok(depth),
        }
    }
}
