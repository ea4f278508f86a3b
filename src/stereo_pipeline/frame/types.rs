//! Frame and depth buffer types

use crate::stereo_pipeline::common::error::{Result, StereoError};

/// Number of interleaved channels in a [`Frame`].
pub const CHANNELS: usize = 3;

/// Immutable RGB frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    /// Sequence index within a job (1-based for extracted video frames)
    index: u64,
    /// RGB pixel data interleaved [R, G, B, R, G, B, ...]
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: usize, height: usize, index: u64, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(StereoError::InvalidDimensions(width, height));
        }
        if data.len() != width * height * CHANNELS {
            return Err(StereoError::InvalidParameter(format!(
                "frame buffer holds {} bytes, {}x{} RGB needs {}",
                data.len(),
                width,
                height,
                width * height * CHANNELS
            )));
        }
        Ok(Self {
            width,
            height,
            index,
            data,
        })
    }

    /// Frame where every pixel has the same color.
    pub fn filled(width: usize, height: usize, index: u64, rgb: [u8; 3]) -> Result<Self> {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width * height * CHANNELS)
            .collect();
        Self::new(width, height, index, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Same pixels, different sequence index.
    pub fn with_index(mut self, index: u64) -> Self {
        self.index = index;
        self
    }
}

/// Single-channel depth map, nominally normalized to [0, 1]
///
/// 0 is nearest to the viewer, 1 is farthest.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl DepthMap {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(StereoError::InvalidDimensions(width, height));
        }
        if data.len() != width * height {
            return Err(StereoError::InvalidParameter(format!(
                "depth buffer holds {} values, {}x{} needs {}",
                data.len(),
                width,
                height,
                width * height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Caller guarantees non-zero dimensions and a matching buffer length.
    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn constant(width: usize, height: usize, value: f32) -> Result<Self> {
        Self::new(width, height, vec![value; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Grayscale rendering for intermediate output (near = dark).
    pub fn to_frame(&self, index: u64) -> Result<Frame> {
        let data = self
            .data
            .iter()
            .flat_map(|&d| {
                let v = (d * 255.0).round().clamp(0.0, 255.0) as u8;
                [v, v, v]
            })
            .collect();
        Frame::new(self.width, self.height, index, data)
    }
}

/// Signed horizontal pixel shift per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct DisparityMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl DisparityMap {
    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    pub fn max_value(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Left and right views synthesized from one source frame
#[derive(Debug, Clone, PartialEq)]
pub struct StereoPair {
    left: Frame,
    right: Frame,
}

impl StereoPair {
    pub fn new(left: Frame, right: Frame) -> Result<Self> {
        if left.dimensions() != right.dimensions() {
            return Err(StereoError::mismatch(
                "stereo pair",
                left.dimensions(),
                right.dimensions(),
            ));
        }
        Ok(Self { left, right })
    }

    pub fn left(&self) -> &Frame {
        &self.left
    }

    pub fn right(&self) -> &Frame {
        &self.right
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.left.dimensions()
    }

    pub fn into_views(self) -> (Frame, Frame) {
        (self.left, self.right)
    }
}
