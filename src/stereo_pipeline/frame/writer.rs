use std::path::Path;

use crate::stereo_pipeline::common::error::Result;
use crate::stereo_pipeline::frame::types::Frame;

pub trait FrameWriter {
    fn write_frame(&self, frame: &Frame, path: &Path) -> Result<()>;
}
