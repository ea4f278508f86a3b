//! ffprobe JSON output parsing

use serde::Deserialize;

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::video::types::VideoInfo;

const FALLBACK_FPS: f64 = 30.0;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: ProbeFormat,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<usize>,
    height: Option<usize>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

/// Parses an ffprobe rate such as `30000/1001` or `25`. Falls back to 30 fps.
pub fn parse_frame_rate(rate: &str) -> f64 {
    let parsed = match rate.split_once('/') {
        Some((num, den)) => match (num.trim().parse::<f64>(), den.trim().parse::<f64>()) {
            (Ok(num), Ok(den)) if den != 0.0 => Some(num / den),
            _ => None,
        },
        None => rate.trim().parse::<f64>().ok(),
    };
    parsed
        .filter(|fps| fps.is_finite() && *fps > 0.0)
        .unwrap_or(FALLBACK_FPS)
}

/// Builds [`VideoInfo`] from `ffprobe -print_format json -show_format -show_streams`.
pub fn parse_probe_output(json: &str) -> Result<VideoInfo> {
    let probe: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| StereoError::FrameSource(format!("unreadable ffprobe output: {e}")))?;

    let kind = |s: &&ProbeStream, wanted: &str| s.codec_type.as_deref() == Some(wanted);
    let video = probe
        .streams
        .iter()
        .find(|s| kind(s, "video"))
        .ok_or_else(|| StereoError::FrameSource("no video stream found".to_string()))?;
    let audio = probe.streams.iter().find(|s| kind(s, "audio"));

    let number = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<f64>().ok());

    Ok(VideoInfo {
        width: video.width.unwrap_or(0),
        height: video.height.unwrap_or(0),
        fps: video
            .r_frame_rate
            .as_deref()
            .map_or(FALLBACK_FPS, parse_frame_rate),
        duration: number(&probe.format.duration).unwrap_or(0.0),
        codec: video
            .codec_name
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        bitrate: number(&probe.format.bit_rate).map_or(0, |b| b as u64),
        has_audio: audio.is_some(),
        audio_codec: audio.and_then(|a| a.codec_name.clone()),
        frame_count: number(&video.nb_frames).map_or(0, |n| n as u64),
    })
}
