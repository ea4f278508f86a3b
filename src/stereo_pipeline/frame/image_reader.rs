//! Frame reader backed by the `image` crate.
//!
//! Handles any still format the crate is built with (PNG, JPEG, TIFF). Images with an
//! alpha channel or 16-bit samples are converted to 8-bit RGB.

use std::path::Path;

use image::ImageError;
use tracing::debug;

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::frame::reader::FrameReader;
use crate::stereo_pipeline::frame::types::Frame;

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFrameReader;

impl FrameReader for ImageFrameReader {
    fn read_frame(&self, path: &Path, index: u64) -> Result<Frame> {
        debug!("Reading frame {} from {}", index, path.display());

        let decoded = image::open(path).map_err(|e| match e {
            ImageError::IoError(io) => {
                StereoError::InputReadError(format!("{}: {}", path.display(), io))
            }
            other => StereoError::DecodeError(format!("{}: {}", path.display(), other)),
        })?;

        let rgb = decoded.to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);

        debug!("Decoded frame: {}x{}", width, height);

        Frame::new(width, height, index, rgb.into_raw())
    }
}
