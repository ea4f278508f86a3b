//! Video module
//!
//! Frame extraction, metadata probing and re-encoding are delegated to external tools
//! behind the [`FrameSource`] and [`VideoEncoder`] seams.

mod encoder;
mod ffmpeg;
mod probe;
mod source;
pub mod types;

#[cfg(test)]
mod tests;

pub use encoder::VideoEncoder;
pub use ffmpeg::{FfmpegEncoder, FfmpegFrameSource, encode_args, extract_audio_args, extract_frames_args};
pub use probe::{parse_frame_rate, parse_probe_output};
pub use source::FrameSource;
pub use types::{EncoderSettings, VideoInfo};
