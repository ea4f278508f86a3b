//! Job configuration
//!
//! Built once per job through [`JobConfigBuilder`], validated in `build()`, and
//! read-only afterwards.

use std::path::{Path, PathBuf};

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::depth::DepthPostprocess;
use crate::stereo_pipeline::render::{
    ContentPreset, HoleFillMethod, HoleFillSettings, OutputFormat, RenderParams,
};
use crate::stereo_pipeline::temporal::{DEFAULT_SCENE_CUT_THRESHOLD, TemporalSettings};

/// Everything a job needs besides its inputs and collaborators
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    render: RenderParams,
    format: OutputFormat,
    hole_fill: HoleFillSettings,
    temporal: Option<TemporalSettings>,
    scene_cut_threshold: Option<f32>,
    depth: DepthPostprocess,
    batch_size: Option<usize>,
    intermediate_dir: Option<PathBuf>,
    fps_override: Option<f64>,
    keep_audio: bool,
    work_dir_root: Option<PathBuf>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            render: RenderParams::default(),
            format: OutputFormat::default(),
            hole_fill: HoleFillSettings::default(),
            temporal: Some(TemporalSettings::default()),
            scene_cut_threshold: Some(DEFAULT_SCENE_CUT_THRESHOLD),
            depth: DepthPostprocess::default(),
            batch_size: None,
            intermediate_dir: None,
            fps_override: None,
            keep_audio: true,
            work_dir_root: None,
        }
    }
}

impl JobConfig {
    pub fn builder() -> JobConfigBuilder {
        JobConfigBuilder::default()
    }

    pub fn render(&self) -> &RenderParams {
        &self.render
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn hole_fill(&self) -> &HoleFillSettings {
        &self.hole_fill
    }

    /// `None` disables temporal stabilization. Only video jobs use it.
    pub fn temporal(&self) -> Option<&TemporalSettings> {
        self.temporal.as_ref()
    }

    /// `None` disables the reset on scene cuts.
    pub fn scene_cut_threshold(&self) -> Option<f32> {
        self.scene_cut_threshold
    }

    pub fn depth(&self) -> &DepthPostprocess {
        &self.depth
    }

    /// Frames per depth-estimation call; `None` defers to the estimator.
    pub fn batch_size(&self) -> Option<usize> {
        self.batch_size
    }

    pub fn intermediate_dir(&self) -> Option<&Path> {
        self.intermediate_dir.as_deref()
    }

    pub fn fps_override(&self) -> Option<f64> {
        self.fps_override
    }

    pub fn keep_audio(&self) -> bool {
        self.keep_audio
    }

    /// Parent for job work directories; the system temp dir when unset.
    pub fn work_dir_root(&self) -> Option<&Path> {
        self.work_dir_root.as_deref()
    }
}

#[derive(Debug, Default, Clone)]
pub struct JobConfigBuilder {
    preset: Option<ContentPreset>,
    ipd_mm: Option<f64>,
    depth_intensity: Option<f64>,
    convergence: Option<f64>,
    format: Option<OutputFormat>,
    hole_fill_method: Option<HoleFillMethod>,
    hole_threshold: Option<u8>,
    inpaint_radius: Option<usize>,
    temporal: Option<Option<TemporalSettings>>,
    scene_cut_threshold: Option<Option<f32>>,
    depth_range: Option<(f32, f32)>,
    smoothing_radius: Option<usize>,
    batch_size: Option<usize>,
    intermediate_dir: Option<PathBuf>,
    fps_override: Option<f64>,
    keep_audio: Option<bool>,
    work_dir_root: Option<PathBuf>,
}

impl JobConfigBuilder {
    /// Seeds depth intensity and convergence; explicit values still win.
    pub fn preset(mut self, preset: ContentPreset) -> Self {
        self.preset = Some(preset);
        self
    }

    pub fn ipd_mm(mut self, ipd_mm: f64) -> Self {
        self.ipd_mm = Some(ipd_mm);
        self
    }

    pub fn depth_intensity(mut self, depth_intensity: f64) -> Self {
        self.depth_intensity = Some(depth_intensity);
        self
    }

    pub fn convergence(mut self, convergence: f64) -> Self {
        self.convergence = Some(convergence);
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn hole_fill_method(mut self, method: HoleFillMethod) -> Self {
        self.hole_fill_method = Some(method);
        self
    }

    pub fn hole_threshold(mut self, threshold: u8) -> Self {
        self.hole_threshold = Some(threshold);
        self
    }

    pub fn inpaint_radius(mut self, radius: usize) -> Self {
        self.inpaint_radius = Some(radius);
        self
    }

    pub fn temporal(mut self, temporal: Option<TemporalSettings>) -> Self {
        self.temporal = Some(temporal);
        self
    }

    pub fn scene_cut_threshold(mut self, threshold: Option<f32>) -> Self {
        self.scene_cut_threshold = Some(threshold);
        self
    }

    pub fn depth_range(mut self, near: f32, far: f32) -> Self {
        self.depth_range = Some((near, far));
        self
    }

    pub fn smoothing_radius(mut self, radius: usize) -> Self {
        self.smoothing_radius = Some(radius);
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn intermediate_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.intermediate_dir = Some(dir.into());
        self
    }

    pub fn fps_override(mut self, fps: f64) -> Self {
        self.fps_override = Some(fps);
        self
    }

    pub fn keep_audio(mut self, keep: bool) -> Self {
        self.keep_audio = Some(keep);
        self
    }

    pub fn work_dir_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_dir_root = Some(root.into());
        self
    }

    pub fn build(self) -> Result<JobConfig> {
        let default = JobConfig::default();

        let (preset_intensity, preset_convergence) = self
            .preset
            .map(ContentPreset::values)
            .unwrap_or((default.render.depth_intensity(), default.render.convergence()));
        let render = RenderParams::new(
            self.ipd_mm.unwrap_or(default.render.ipd_mm()),
            self.depth_intensity.unwrap_or(preset_intensity),
            self.convergence.unwrap_or(preset_convergence),
        )?;

        let hole_fill = HoleFillSettings {
            method: self.hole_fill_method.unwrap_or(default.hole_fill.method),
            darkness_threshold: self
                .hole_threshold
                .unwrap_or(default.hole_fill.darkness_threshold),
            inpaint_radius: self.inpaint_radius.unwrap_or(default.hole_fill.inpaint_radius),
        };
        if hole_fill.inpaint_radius == 0 {
            return Err(StereoError::InvalidParameter(
                "inpaint radius must be at least 1 pixel".to_string(),
            ));
        }

        let temporal = self.temporal.unwrap_or(default.temporal);
        if let Some(settings) = &temporal {
            settings.validate()?;
        }

        let scene_cut_threshold = self
            .scene_cut_threshold
            .unwrap_or(default.scene_cut_threshold);
        if let Some(threshold) = scene_cut_threshold {
            if !(threshold > 0.0 && threshold <= 1.0) {
                return Err(StereoError::InvalidParameter(format!(
                    "scene cut threshold {threshold} outside (0, 1]"
                )));
            }
        }

        let depth = DepthPostprocess {
            range: self.depth_range,
            smoothing_radius: self.smoothing_radius,
        };
        depth.validate()?;

        if self.batch_size == Some(0) {
            return Err(StereoError::InvalidParameter(
                "batch size must be at least 1".to_string(),
            ));
        }
        if let Some(fps) = self.fps_override {
            if !(fps.is_finite() && fps > 0.0) {
                return Err(StereoError::InvalidParameter(format!(
                    "frame rate {fps} must be positive"
                )));
            }
        }

        Ok(JobConfig {
            render,
            format: self.format.unwrap_or(default.format),
            hole_fill,
            temporal,
            scene_cut_threshold,
            depth,
            batch_size: self.batch_size,
            intermediate_dir: self.intermediate_dir,
            fps_override: self.fps_override,
            keep_audio: self.keep_audio.unwrap_or(default.keep_audio),
            work_dir_root: self.work_dir_root,
        })
    }
}
