use std::path::Path;

use image::{ImageFormat, RgbImage};
use tracing::debug;

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::frame::tiff_writer::TiffFrameWriter;
use crate::stereo_pipeline::frame::types::Frame;
use crate::stereo_pipeline::frame::writer::FrameWriter;

/// Writes frames in the format implied by the output extension.
///
/// `.tif`/`.tiff` go through [`TiffFrameWriter`], `.jpg`/`.jpeg` are JPEG-encoded, and
/// anything else (including a missing extension) is written as PNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageFrameWriter {
    pub tiff: TiffFrameWriter,
}

impl ImageFrameWriter {
    pub fn new(tiff: TiffFrameWriter) -> Self {
        Self { tiff }
    }
}

/// Creates the parent directory of `path` if it is missing.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| StereoError::OutputWriteError(format!("{}: {}", parent.display(), e))),
        _ => Ok(()),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

impl FrameWriter for ImageFrameWriter {
    fn write_frame(&self, frame: &Frame, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        let format = match extension(path).as_str() {
            "tif" | "tiff" => return self.tiff.write_frame(frame, path),
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            _ => ImageFormat::Png,
        };

        debug!(
            "Writing {:?} frame {}x{} to {}",
            format,
            frame.width(),
            frame.height(),
            path.display()
        );

        let buffer = RgbImage::from_raw(
            frame.width() as u32,
            frame.height() as u32,
            frame.data().to_vec(),
        )
        .ok_or_else(|| StereoError::EncodeError(format!("{}: bad frame buffer", path.display())))?;

        buffer.save_with_format(path, format).map_err(|e| match e {
            image::ImageError::IoError(io) => {
                StereoError::OutputWriteError(format!("{}: {}", path.display(), io))
            }
            other => StereoError::EncodeError(format!("{}: {}", path.display(), other)),
        })
    }
}
