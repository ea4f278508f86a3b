//! Depth-image-based rendering: horizontal resampling of a frame by a disparity map.

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::frame::{CHANNELS, DisparityMap, Frame, StereoPair};
use crate::stereo_pipeline::render::types::Eye;

/// Sampling offset for one eye: `-d/2` for the left view, `+d/2` for the right.
pub fn view_shift(disparity: f32, eye: Eye) -> f32 {
    disparity * eye.shift_factor()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ViewWarper;

impl ViewWarper {
    pub fn new() -> Self {
        Self
    }

    /// Resamples `frame` so output pixel (x, y) reads source (x + shift, y).
    ///
    /// Sampling is linear along x with the coordinate clamped to [0, width - 1]
    /// (edge replicate). Rows are never mixed.
    pub fn warp(&self, frame: &Frame, disparity: &DisparityMap, eye: Eye) -> Result<Frame> {
        if frame.dimensions() != disparity.dimensions() {
            return Err(StereoError::mismatch(
                "view warp",
                frame.dimensions(),
                disparity.dimensions(),
            ));
        }

        let (width, height) = frame.dimensions();
        let src = frame.data();
        let max_x = (width - 1) as f32;
        let mut out = vec![0u8; src.len()];

        for y in 0..height {
            let row = y * width;
            for x in 0..width {
                let shift = view_shift(disparity.get(x, y), eye);
                let sx = (x as f32 + shift).clamp(0.0, max_x);
                let x0 = sx.floor() as usize;
                let x1 = (x0 + 1).min(width - 1);
                let t = sx - x0 as f32;

                let p0 = (row + x0) * CHANNELS;
                let p1 = (row + x1) * CHANNELS;
                let dst = (row + x) * CHANNELS;
                for c in 0..CHANNELS {
                    let v = src[p0 + c] as f32 * (1.0 - t) + src[p1 + c] as f32 * t;
                    out[dst + c] = v.round().clamp(0.0, 255.0) as u8;
                }
            }
        }

        Frame::new(width, height, frame.index(), out)
    }

    /// Warps the frame for both eyes.
    pub fn render_pair(&self, frame: &Frame, disparity: &DisparityMap) -> Result<StereoPair> {
        let left = self.warp(frame, disparity, Eye::Left)?;
        let right = self.warp(frame, disparity, Eye::Right)?;
        StereoPair::new(left, right)
    }
}
