use std::path::Path;

use crate::stereo_pipeline::common::error::Result;
use crate::stereo_pipeline::frame::types::Frame;

pub trait FrameReader {
    fn read_frame(&self, path: &Path, index: u64) -> Result<Frame>;
}
