use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::frame::image_writer::ensure_parent;
use crate::stereo_pipeline::frame::types::Frame;
use crate::stereo_pipeline::frame::writer::FrameWriter;

/// Compression applied to intermediate and output TIFF frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TiffCompression {
    #[default]
    None,
    Lzw,
    DeflateFast,
    DeflateBalanced,
    DeflateBest,
}

/// Lossless 8-bit RGB TIFF writer
#[derive(Debug, Default, Clone, Copy)]
pub struct TiffFrameWriter {
    pub compression: TiffCompression,
    /// Horizontal differencing predictor; only useful with LZW or Deflate
    pub horizontal_predictor: bool,
}

impl TiffFrameWriter {
    pub fn new(compression: TiffCompression) -> Self {
        Self {
            compression,
            horizontal_predictor: !matches!(compression, TiffCompression::None),
        }
    }

    pub fn encode(&self, frame: &Frame, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding TIFF frame: {}x{}", frame.width(), frame.height());

        let mut buffer = Vec::new();

        let compression = match self.compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(
                tiff::encoder::compression::DeflateLevel::Fast,
            ),
            TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(
                tiff::encoder::compression::DeflateLevel::Balanced,
            ),
            TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(
                tiff::encoder::compression::DeflateLevel::Best,
            ),
        };

        let mut encoder = tiff::encoder::TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| StereoError::EncodeError(e.to_string()))?
            .with_compression(compression);

        if self.horizontal_predictor {
            encoder = encoder.with_predictor(tiff::tags::Predictor::Horizontal);
        }

        encoder
            .write_image::<tiff::encoder::colortype::RGB8>(
                frame.width() as u32,
                frame.height() as u32,
                frame.data(),
            )
            .map_err(|e| StereoError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete");
        Ok(())
    }
}

impl FrameWriter for TiffFrameWriter {
    fn write_frame(&self, frame: &Frame, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        let mut file = std::fs::File::create(path).map_err(|e| {
            StereoError::OutputWriteError(format!("{}: {}", path.display(), e))
        })?;
        self.encode(frame, &mut file)
    }
}
