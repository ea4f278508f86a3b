//! Frame module
//!
//! Pixel and depth buffers plus the reader/writer seams used to move frames on and off disk.

mod image_reader;
mod image_writer;
pub mod naming;
mod reader;
mod tiff_writer;
pub mod types;
mod writer;


pub use image_reader::ImageFrameReader;
pub use image_writer::ImageFrameWriter;
pub use naming::{FRAME_PATTERN, frame_file_name, list_frame_files, parse_frame_index};
pub use reader::FrameReader;
pub use tiff_writer::{TiffCompression, TiffFrameWriter};
pub use types::{CHANNELS, DepthMap, DisparityMap, Frame, StereoPair};
pub use writer::FrameWriter;
