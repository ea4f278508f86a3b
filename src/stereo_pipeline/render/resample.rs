use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb};

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::frame::{CHANNELS, Frame};

/// Bilinear (triangle filter) resize of an RGB frame. The whole field of view is kept.
pub fn resize_linear(frame: &Frame, width: usize, height: usize) -> Result<Frame> {
    if width == 0 || height == 0 {
        return Err(StereoError::InvalidDimensions(width, height));
    }
    if frame.dimensions() == (width, height) {
        return Ok(frame.clone());
    }

    let (src_w, src_h) = frame.dimensions();
    let view: ImageBuffer<Rgb<u8>, &[u8]> =
        ImageBuffer::from_raw(src_w as u32, src_h as u32, frame.data()).ok_or_else(|| {
            StereoError::mismatch(
                "frame buffer",
                (src_w * src_h * CHANNELS, 1),
                (frame.data().len(), 1),
            )
        })?;
    let resized = imageops::resize(&view, width as u32, height as u32, FilterType::Triangle);

    Frame::new(width, height, frame.index(), resized.into_raw())
}
