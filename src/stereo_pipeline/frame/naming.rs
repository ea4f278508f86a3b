//! Zero-padded frame file naming shared by the frame source, the pipeline and the encoder.

use std::path::{Path, PathBuf};

use crate::stereo_pipeline::common::error::{Result, StereoError};

pub const FRAME_PREFIX: &str = "frame_";
pub const FRAME_EXTENSION: &str = "png";
/// printf-style pattern understood by ffmpeg, matching [`frame_file_name`].
pub const FRAME_PATTERN: &str = "frame_%06d.png";

pub fn frame_file_name(index: u64) -> String {
    format!("{FRAME_PREFIX}{index:06}.{FRAME_EXTENSION}")
}

/// Parses `frame_000042.png` into 42.
pub fn parse_frame_index(path: &Path) -> Option<u64> {
    if path.extension()?.to_str()? != FRAME_EXTENSION {
        return None;
    }
    let digits = path.file_stem()?.to_str()?.strip_prefix(FRAME_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Lists the numbered frames in `dir`, sorted by index.
///
/// Fails unless the indices run 1..=N without gaps; unrelated files are ignored.
pub fn list_frame_files(dir: &Path) -> Result<Vec<(u64, PathBuf)>> {
    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir)
        .map_err(|e| StereoError::InputReadError(format!("{}: {}", dir.display(), e)))?
    {
        let path = entry?.path();
        if let Some(index) = parse_frame_index(&path) {
            frames.push((index, path));
        }
    }
    frames.sort_by_key(|(index, _)| *index);

    for (expected, (index, path)) in (1u64..).zip(frames.iter()) {
        if *index != expected {
            return Err(StereoError::FrameSource(format!(
                "frame sequence in {} is not gapless: expected index {}, found {}",
                dir.display(),
                expected,
                path.display()
            )));
        }
    }

    Ok(frames)
}
