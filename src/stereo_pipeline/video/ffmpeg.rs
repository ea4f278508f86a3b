//! `ffmpeg`/`ffprobe` subprocess implementations of the video seams

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, instrument, warn};

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::frame::{FRAME_PATTERN, list_frame_files};
use crate::stereo_pipeline::video::encoder::VideoEncoder;
use crate::stereo_pipeline::video::probe::parse_probe_output;
use crate::stereo_pipeline::video::source::FrameSource;
use crate::stereo_pipeline::video::types::{EncoderSettings, VideoInfo};

/// Matroska audio holds any codec, so the track can be stream-copied unchanged.
const AUDIO_FILE_NAME: &str = "audio.mka";

fn os(arg: &str) -> OsString {
    OsString::from(arg)
}

/// Runs a tool to completion and returns its stdout. A non-zero exit becomes an error
/// built by `fail` from the trimmed stderr.
fn run(mut cmd: Command, fail: impl Fn(String) -> StereoError) -> Result<Vec<u8>> {
    debug!("Running {:?}", cmd);
    let program = cmd.get_program().to_owned();
    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| fail(format!("failed to start {:?}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(fail(format!(
            "{:?} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }
    Ok(output.stdout)
}

pub fn extract_frames_args(video: &Path, out_dir: &Path, fps: Option<f64>) -> Vec<OsString> {
    let mut args = vec![
        os("-hide_banner"),
        os("-loglevel"),
        os("error"),
        os("-i"),
        video.as_os_str().to_owned(),
    ];
    if let Some(fps) = fps {
        args.push(os("-vf"));
        args.push(OsString::from(format!("fps={fps}")));
    }
    args.push(os("-start_number"));
    args.push(os("1"));
    args.push(out_dir.join(FRAME_PATTERN).into_os_string());
    args
}

pub fn extract_audio_args(video: &Path, output: &Path) -> Vec<OsString> {
    vec![
        os("-hide_banner"),
        os("-loglevel"),
        os("error"),
        os("-i"),
        video.as_os_str().to_owned(),
        os("-vn"),
        os("-map"),
        os("0:a:0"),
        os("-c:a"),
        os("copy"),
        os("-y"),
        output.as_os_str().to_owned(),
    ]
}

/// Arguments for assembling `frames_dir` into `output`.
///
/// Audio options are only added when `audio` is given; the caller checks it exists
/// and is non-empty.
pub fn encode_args(
    settings: &EncoderSettings,
    frames_dir: &Path,
    fps: f64,
    audio: Option<&Path>,
    output: &Path,
) -> Vec<OsString> {
    let mut args = vec![
        os("-hide_banner"),
        os("-loglevel"),
        os("error"),
        os("-framerate"),
        OsString::from(fps.to_string()),
        os("-start_number"),
        os("1"),
        os("-i"),
        frames_dir.join(FRAME_PATTERN).into_os_string(),
    ];
    if let Some(audio) = audio {
        args.push(os("-i"));
        args.push(audio.as_os_str().to_owned());
    }
    args.extend([
        os("-c:v"),
        OsString::from(&settings.video_codec),
        os("-crf"),
        OsString::from(settings.crf.to_string()),
        os("-preset"),
        OsString::from(&settings.preset),
        os("-pix_fmt"),
        OsString::from(&settings.pixel_format),
    ]);
    if audio.is_some() {
        args.extend([
            os("-map"),
            os("0:v:0"),
            os("-map"),
            os("1:a:0"),
            os("-c:a"),
            OsString::from(&settings.audio_codec),
            os("-b:a"),
            OsString::from(&settings.audio_bitrate),
            os("-shortest"),
        ]);
    }
    args.push(os("-y"));
    args.push(output.as_os_str().to_owned());
    args
}

#[derive(Debug, Clone)]
pub struct FfmpegFrameSource {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegFrameSource {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }
}

impl Default for FfmpegFrameSource {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl FrameSource for FfmpegFrameSource {
    #[instrument(skip(self))]
    fn probe(&self, video: &Path) -> Result<VideoInfo> {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(video);
        let stdout = run(cmd, StereoError::FrameSource)?;
        let info = parse_probe_output(&String::from_utf8_lossy(&stdout))?;
        info!(
            "Video info: {}x{} @ {:.2} fps, {:.1}s, codec {}, audio: {}",
            info.width, info.height, info.fps, info.duration, info.codec, info.has_audio
        );
        Ok(info)
    }

    #[instrument(skip(self))]
    fn extract_frames(&self, video: &Path, out_dir: &Path, fps: Option<f64>) -> Result<usize> {
        std::fs::create_dir_all(out_dir)?;
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(extract_frames_args(video, out_dir, fps));
        run(cmd, StereoError::FrameSource)?;

        let count = list_frame_files(out_dir)?.len();
        if count == 0 {
            return Err(StereoError::FrameSource(format!(
                "no frames extracted from {}",
                video.display()
            )));
        }
        info!("Extracted {} frames", count);
        Ok(count)
    }

    #[instrument(skip(self))]
    fn extract_audio(&self, video: &Path, out_dir: &Path) -> Result<Option<PathBuf>> {
        if !self.probe(video)?.has_audio {
            info!("No audio track found in video");
            return Ok(None);
        }
        std::fs::create_dir_all(out_dir)?;
        let output = out_dir.join(AUDIO_FILE_NAME);
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(extract_audio_args(video, &output));
        if let Err(e) = run(cmd, StereoError::FrameSource) {
            warn!("Audio extraction failed, continuing without audio: {}", e);
            return Ok(None);
        }
        Ok(Some(output))
    }
}

#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg: PathBuf,
    settings: EncoderSettings,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg: impl Into<PathBuf>, settings: EncoderSettings) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            settings,
        }
    }

    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg", EncoderSettings::default())
    }
}

impl VideoEncoder for FfmpegEncoder {
    #[instrument(skip(self))]
    fn encode(&self, frames_dir: &Path, fps: f64, audio: Option<&Path>, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        info!(
            "Encoding {} ({}, CRF {}, preset {}, {} fps)",
            output.display(),
            self.settings.video_codec,
            self.settings.crf,
            self.settings.preset,
            fps
        );
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(encode_args(&self.settings, frames_dir, fps, audio, output));
        run(cmd, StereoError::Encoder)?;

        let size = std::fs::metadata(output)
            .map_err(|e| StereoError::Encoder(format!("{}: {}", output.display(), e)))?
            .len();
        info!("Output size: {:.2} MB", size as f64 / (1024.0 * 1024.0));
        Ok(())
    }
}
