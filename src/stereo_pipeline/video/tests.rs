#[cfg(test)]
mod tests {
    use std::ffi::OsString;
    use std::path::Path;

    use crate::stereo_pipeline::common::error::StereoError;
    use crate::stereo_pipeline::video::{
        EncoderSettings, FfmpegEncoder, FfmpegFrameSource, FrameSource, VideoEncoder,
        encode_args, extract_frames_args, parse_frame_rate, parse_probe_output,
    };

    const PROBE_JSON: &str = r#"{
        "streams": [
            {
                "index": 0,
                "codec_name": "h264",
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "r_frame_rate": "30000/1001",
                "nb_frames": "300"
            },
            {
                "index": 1,
                "codec_name": "aac",
                "codec_type": "audio",
                "sample_rate": "48000"
            }
        ],
        "format": {
            "filename": "clip.mp4",
            "duration": "10.010000",
            "bit_rate": "8000000"
        }
    }"#;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_parse_probe_output() {
        let info = parse_probe_output(PROBE_JSON).unwrap();
        assert_eq!((info.width, info.height), (1920, 1080));
        assert!((info.fps - 29.97).abs() < 0.01);
        assert!((info.duration - 10.01).abs() < 1e-9);
        assert_eq!(info.codec, "h264");
        assert_eq!(info.bitrate, 8_000_000);
        assert!(info.has_audio);
        assert_eq!(info.audio_codec.as_deref(), Some("aac"));
        assert_eq!(info.frame_count, 300);
        assert_eq!(info.estimated_frames(), 300);
    }

    #[test]
    fn test_parse_probe_without_audio_or_frame_count() {
        let json = r#"{
            "streams": [{"codec_type": "video", "width": 640, "height": 360, "r_frame_rate": "25/1"}],
            "format": {"duration": "4.0"}
        }"#;
        let info = parse_probe_output(json).unwrap();
        assert!(!info.has_audio);
        assert_eq!(info.audio_codec, None);
        assert_eq!(info.codec, "unknown");
        assert_eq!(info.frame_count, 0);
        assert_eq!(info.estimated_frames(), 100);
    }

    #[test]
    fn test_parse_probe_rejects_audio_only() {
        let json = r#"{"streams": [{"codec_type": "audio"}], "format": {}}"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(StereoError::FrameSource(_))
        ));
        assert!(parse_probe_output("not json").is_err());
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25/1"), 25.0);
        assert_eq!(parse_frame_rate("24"), 24.0);
        assert_eq!(parse_frame_rate("0/0"), 30.0);
        assert_eq!(parse_frame_rate("garbage"), 30.0);
    }

    #[test]
    fn test_extract_frames_args() {
        let args = strings(&extract_frames_args(
            Path::new("in.mp4"),
            Path::new("/tmp/frames"),
            Some(24.0),
        ));
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "fps=24");
        assert!(args.last().unwrap().ends_with("frame_%06d.png"));

        let args = strings(&extract_frames_args(Path::new("in.mp4"), Path::new("out"), None));
        assert!(!args.iter().any(|a| a == "-vf"));
    }

    #[test]
    fn test_encode_args_default_settings() {
        let args = strings(&encode_args(
            &EncoderSettings::default(),
            Path::new("frames"),
            30.0,
            None,
            Path::new("out.mp4"),
        ));
        let value = |flag: &str| {
            let i = args.iter().position(|a| a == flag).unwrap();
            args[i + 1].clone()
        };
        assert_eq!(value("-framerate"), "30");
        assert_eq!(value("-c:v"), "libx264");
        assert_eq!(value("-crf"), "18");
        assert_eq!(value("-preset"), "medium");
        assert_eq!(value("-pix_fmt"), "yuv420p");
        assert!(!args.iter().any(|a| a == "-c:a" || a == "-shortest"));
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 1);
        assert_eq!(args.last().unwrap(), "out.mp4");
    }

    #[test]
    fn test_encode_args_with_audio() {
        let args = strings(&encode_args(
            &EncoderSettings::default(),
            Path::new("frames"),
            25.0,
            Some(Path::new("audio.mka")),
            Path::new("out.mp4"),
        ));
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 2);
        assert!(args.iter().any(|a| a == "audio.mka"));
        let i = args.iter().position(|a| a == "-b:a").unwrap();
        assert_eq!(args[i + 1], "192k");
        assert!(args.iter().any(|a| a == "-shortest"));
    }

    #[test]
    fn test_missing_tools_are_collaborator_failures() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-ffmpeg");

        let source = FfmpegFrameSource::new(&missing, &missing);
        assert!(matches!(
            source.probe(Path::new("clip.mp4")),
            Err(StereoError::FrameSource(_))
        ));

        let encoder = FfmpegEncoder::new(&missing, EncoderSettings::default());
        let result = encoder.encode(dir.path(), 30.0, None, &dir.path().join("out.mp4"));
        assert!(matches!(result, Err(StereoError::Encoder(_))));
    }
}
