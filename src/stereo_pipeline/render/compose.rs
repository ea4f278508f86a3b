//! Stereo output composition
//!
//! Every format takes a left/right pair of identical size. Squeezed formats resample
//! with linear interpolation and never crop.

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::frame::{CHANNELS, Frame, StereoPair};
use crate::stereo_pipeline::render::resample::resize_linear;
use crate::stereo_pipeline::render::types::{AnaglyphMode, OutputFormat};

fn require_same_size(left: &Frame, right: &Frame) -> Result<()> {
    if left.dimensions() != right.dimensions() {
        return Err(StereoError::mismatch(
            "format composition",
            left.dimensions(),
            right.dimensions(),
        ));
    }
    Ok(())
}

fn hconcat(left: &Frame, right: &Frame) -> Result<Frame> {
    debug_assert_eq!(left.height(), right.height());
    let height = left.height();
    let lrow = left.width() * CHANNELS;
    let rrow = right.width() * CHANNELS;
    let mut out = Vec::with_capacity((lrow + rrow) * height);
    for y in 0..height {
        out.extend_from_slice(&left.data()[y * lrow..(y + 1) * lrow]);
        out.extend_from_slice(&right.data()[y * rrow..(y + 1) * rrow]);
    }
    Frame::new(left.width() + right.width(), height, left.index(), out)
}

fn vconcat(top: &Frame, bottom: &Frame) -> Result<Frame> {
    debug_assert_eq!(top.width(), bottom.width());
    let mut out = Vec::with_capacity(top.data().len() + bottom.data().len());
    out.extend_from_slice(top.data());
    out.extend_from_slice(bottom.data());
    Frame::new(top.width(), top.height() + bottom.height(), top.index(), out)
}

/// Both eyes squeezed into one frame of the source width.
///
/// With an odd width the right eye gets the extra column.
pub fn compose_half_sbs(left: &Frame, right: &Frame) -> Result<Frame> {
    require_same_size(left, right)?;
    let (width, height) = left.dimensions();
    if width < 2 {
        return Err(StereoError::InvalidDimensions(width, height));
    }
    let left_w = width / 2;
    let left_half = resize_linear(left, left_w, height)?;
    let right_half = resize_linear(right, width - left_w, height)?;
    hconcat(&left_half, &right_half)
}

pub fn compose_full_sbs(left: &Frame, right: &Frame) -> Result<Frame> {
    require_same_size(left, right)?;
    hconcat(left, right)
}

pub fn compose_top_bottom(left: &Frame, right: &Frame, half_resolution: bool) -> Result<Frame> {
    require_same_size(left, right)?;
    if !half_resolution {
        return vconcat(left, right);
    }
    let (width, height) = left.dimensions();
    if height < 2 {
        return Err(StereoError::InvalidDimensions(width, height));
    }
    let top_h = height / 2;
    let top = resize_linear(left, width, top_h)?;
    let bottom = resize_linear(right, width, height - top_h)?;
    vconcat(&top, &bottom)
}

pub fn compose_anaglyph(left: &Frame, right: &Frame, mode: AnaglyphMode) -> Result<Frame> {
    require_same_size(left, right)?;
    let out = left
        .data()
        .chunks_exact(CHANNELS)
        .zip(right.data().chunks_exact(CHANNELS))
        .flat_map(|(l, r)| match mode {
            AnaglyphMode::RedCyan => [l[0], r[1], r[2]],
            AnaglyphMode::AmberBlue => [l[0], l[1], r[2]],
        })
        .collect();
    Frame::new(left.width(), left.height(), left.index(), out)
}

#[derive(Debug, Clone, Copy)]
pub struct FormatComposer {
    format: OutputFormat,
}

impl FormatComposer {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn compose(&self, left: &Frame, right: &Frame) -> Result<Frame> {
        match self.format {
            OutputFormat::HalfSideBySide => compose_half_sbs(left, right),
            OutputFormat::FullSideBySide => compose_full_sbs(left, right),
            OutputFormat::Anaglyph(mode) => compose_anaglyph(left, right, mode),
            OutputFormat::TopBottom { half_resolution } => {
                compose_top_bottom(left, right, half_resolution)
            }
        }
    }

    pub fn compose_pair(&self, pair: &StereoPair) -> Result<Frame> {
        self.compose(pair.left(), pair.right())
    }
}
