use serde::Deserialize;

/// Container metadata reported by the frame source
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub width: usize,
    pub height: usize,
    pub fps: f64,
    /// Seconds
    pub duration: f64,
    pub codec: String,
    /// Bits per second, 0 when unknown
    pub bitrate: u64,
    pub has_audio: bool,
    pub audio_codec: Option<String>,
    /// 0 when the container does not record it
    pub frame_count: u64,
}

impl VideoInfo {
    /// Frame count from the container, or duration x fps when it is missing.
    pub fn estimated_frames(&self) -> u64 {
        if self.frame_count > 0 {
            self.frame_count
        } else {
            (self.duration * self.fps).round().max(0.0) as u64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    pub video_codec: String,
    /// Constant rate factor, 0-51 (lower is better)
    pub crf: u8,
    pub preset: String,
    pub pixel_format: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            crf: 18,
            preset: "medium".to_string(),
            pixel_format: "yuv420p".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
        }
    }
}
