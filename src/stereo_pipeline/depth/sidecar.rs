use std::path::{Path, PathBuf};

use image::ImageError;
use tracing::debug;

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::depth::estimator::DepthEstimator;
use crate::stereo_pipeline::depth::postprocess::resize_depth;
use crate::stereo_pipeline::frame::{DepthMap, Frame, frame_file_name};

/// Loads precomputed grayscale depth images (black = near, white = far).
///
/// The depth map for the item with index `i` is `<dir>/frame_<i:06>.png`, the same
/// naming the frame source uses. Maps of a different size are bilinearly resized.
#[derive(Debug, Clone)]
pub struct SidecarDepthEstimator {
    depth_dir: PathBuf,
}

impl SidecarDepthEstimator {
    pub fn new(depth_dir: impl Into<PathBuf>) -> Self {
        Self {
            depth_dir: depth_dir.into(),
        }
    }

    pub fn depth_dir(&self) -> &Path {
        &self.depth_dir
    }

    pub fn path_for(&self, index: u64) -> PathBuf {
        self.depth_dir.join(frame_file_name(index))
    }
}

impl DepthEstimator for SidecarDepthEstimator {
    fn initialize(&mut self) -> Result<()> {
        if !self.depth_dir.is_dir() {
            return Err(StereoError::DepthEstimation(format!(
                "depth directory {} does not exist",
                self.depth_dir.display()
            )));
        }
        Ok(())
    }

    fn estimate(&self, frame: &Frame) -> Result<DepthMap> {
        let path = self.path_for(frame.index());
        debug!("Loading depth map {}", path.display());

        let luma = image::open(&path)
            .map_err(|e| match e {
                ImageError::IoError(io) => {
                    StereoError::DepthEstimation(format!("{}: {}", path.display(), io))
                }
                other => StereoError::DecodeError(format!("{}: {}", path.display(), other)),
            })?
            .to_luma16();

        let (width, height) = (luma.width() as usize, luma.height() as usize);
        let data = luma
            .into_raw()
            .into_iter()
            .map(|v| v as f32 / u16::MAX as f32)
            .collect();
        let depth = DepthMap::new(width, height, data)?;

        if depth.dimensions() == frame.dimensions() {
            Ok(depth)
        } else {
            resize_depth(&depth, frame.width(), frame.height())
        }
    }
}
