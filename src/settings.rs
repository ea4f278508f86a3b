//! Layered application settings
//!
//! Defaults, then an optional TOML file, then `STEREO_*` environment variables
//! (`STEREO_IPD_MM=62`, `STEREO_TEMPORAL__METHOD=median`). Command line flags are applied
//! on top of the resulting [`JobConfigBuilder`] by the binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::stereo_pipeline::conversions::JobConfigBuilder;
use crate::stereo_pipeline::render::{ContentPreset, HoleFillMethod, OutputFormat};
use crate::stereo_pipeline::temporal::{TemporalMethod, TemporalSettings};
use crate::stereo_pipeline::video::EncoderSettings;

const ENV_PREFIX: &str = "STEREO";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TemporalSection {
    pub enabled: Option<bool>,
    pub method: Option<TemporalMethod>,
    pub alpha: Option<f32>,
    pub window: Option<usize>,
    pub sigma: Option<f32>,
    pub scene_cut_threshold: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DepthSection {
    /// Directory of precomputed `frame_NNNNNN.png` depth maps
    pub depth_dir: Option<PathBuf>,
    pub near: Option<f32>,
    pub far: Option<f32>,
    pub smoothing_radius: Option<usize>,
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VideoSection {
    pub keep_audio: Option<bool>,
    pub fps: Option<f64>,
    pub work_dir: Option<PathBuf>,
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
    pub encoder: EncoderSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub preset: Option<ContentPreset>,
    pub ipd_mm: Option<f64>,
    pub depth_intensity: Option<f64>,
    pub convergence: Option<f64>,
    /// Output format name, e.g. `half-sbs` or `anaglyph`
    pub format: Option<String>,
    pub hole_fill: Option<HoleFillMethod>,
    pub hole_threshold: Option<u8>,
    pub inpaint_radius: Option<usize>,
    pub intermediate_dir: Option<PathBuf>,
    pub temporal: TemporalSection,
    pub depth: DepthSection,
    pub video: VideoSection,
}

impl Settings {
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::new(&path.to_string_lossy(), FileFormat::Toml));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| match file {
                Some(path) => format!("Failed to load settings from {}", path.display()),
                None => "Failed to load settings from the environment".to_string(),
            })?;
        config
            .try_deserialize()
            .context("Settings have an invalid shape")
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize()
            .context("Settings have an invalid shape")
    }

    /// Temporal settings to run with, or `None` when smoothing is switched off.
    pub fn temporal_settings(&self) -> Option<TemporalSettings> {
        if self.temporal.enabled == Some(false) {
            return None;
        }
        let default = TemporalSettings::default();
        Some(TemporalSettings {
            method: self.temporal.method.unwrap_or(default.method),
            alpha: self.temporal.alpha.unwrap_or(default.alpha),
            window: self.temporal.window.unwrap_or(default.window),
            sigma: self.temporal.sigma.unwrap_or(default.sigma),
        })
    }

    /// Seeds a job builder with every value these settings carry.
    pub fn job_builder(&self) -> Result<JobConfigBuilder> {
        let mut builder = JobConfigBuilder::default().temporal(self.temporal_settings());

        if let Some(preset) = self.preset {
            builder = builder.preset(preset);
        }
        if let Some(ipd) = self.ipd_mm {
            builder = builder.ipd_mm(ipd);
        }
        if let Some(intensity) = self.depth_intensity {
            builder = builder.depth_intensity(intensity);
        }
        if let Some(convergence) = self.convergence {
            builder = builder.convergence(convergence);
        }
        if let Some(format) = &self.format {
            let format: OutputFormat = format
                .parse()
                .with_context(|| format!("Invalid output format in settings: {format}"))?;
            builder = builder.format(format);
        }
        if let Some(method) = self.hole_fill {
            builder = builder.hole_fill_method(method);
        }
        if let Some(threshold) = self.hole_threshold {
            builder = builder.hole_threshold(threshold);
        }
        if let Some(radius) = self.inpaint_radius {
            builder = builder.inpaint_radius(radius);
        }
        if let Some(dir) = &self.intermediate_dir {
            builder = builder.intermediate_dir(dir);
        }
        if let Some(threshold) = self.temporal.scene_cut_threshold {
            builder = builder.scene_cut_threshold(Some(threshold));
        }

        match (self.depth.near, self.depth.far) {
            (Some(near), Some(far)) => builder = builder.depth_range(near, far),
            (None, None) => {}
            _ => anyhow::bail!("Depth range needs both `near` and `far`"),
        }
        if let Some(radius) = self.depth.smoothing_radius {
            builder = builder.smoothing_radius(radius);
        }
        if let Some(size) = self.depth.batch_size {
            builder = builder.batch_size(size);
        }

        if let Some(keep) = self.video.keep_audio {
            builder = builder.keep_audio(keep);
        }
        if let Some(fps) = self.video.fps {
            builder = builder.fps_override(fps);
        }
        if let Some(dir) = &self.video.work_dir {
            builder = builder.work_dir_root(dir);
        }
        Ok(builder)
    }
}
