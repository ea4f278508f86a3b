//! Rendering parameter types

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::stereo_pipeline::common::error::{Result, StereoError};

/// Viewer parameters for disparity computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    ipd_mm: f64,
    depth_intensity: f64,
    convergence: f64,
}

impl RenderParams {
    pub const IPD_MIN: f64 = 50.0;
    pub const IPD_MAX: f64 = 80.0;
    pub const IPD_DEFAULT: f64 = 65.0;
    pub const DEPTH_INTENSITY_DEFAULT: f64 = 75.0;
    pub const CONVERGENCE_MIN: f64 = 0.1;
    pub const CONVERGENCE_MAX: f64 = 2.0;

    pub fn new(ipd_mm: f64, depth_intensity: f64, convergence: f64) -> Result<Self> {
        if !(Self::IPD_MIN..=Self::IPD_MAX).contains(&ipd_mm) {
            return Err(StereoError::InvalidParameter(format!(
                "IPD {ipd_mm}mm outside {}-{}mm",
                Self::IPD_MIN,
                Self::IPD_MAX
            )));
        }
        if !(0.0..=100.0).contains(&depth_intensity) {
            return Err(StereoError::InvalidParameter(format!(
                "depth intensity {depth_intensity} outside 0-100"
            )));
        }
        if !(Self::CONVERGENCE_MIN..=Self::CONVERGENCE_MAX).contains(&convergence) {
            return Err(StereoError::InvalidParameter(format!(
                "convergence {convergence} outside {}-{}",
                Self::CONVERGENCE_MIN,
                Self::CONVERGENCE_MAX
            )));
        }
        Ok(Self {
            ipd_mm,
            depth_intensity,
            convergence,
        })
    }

    pub fn from_preset(preset: ContentPreset, ipd_mm: f64) -> Result<Self> {
        let (depth_intensity, convergence) = preset.values();
        Self::new(ipd_mm, depth_intensity, convergence)
    }

    /// Interpupillary distance in millimetres
    pub fn ipd_mm(&self) -> f64 {
        self.ipd_mm
    }

    /// Percentage (0-100) of the maximum shift
    pub fn depth_intensity(&self) -> f64 {
        self.depth_intensity
    }

    pub fn convergence(&self) -> f64 {
        self.convergence
    }
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            ipd_mm: Self::IPD_DEFAULT,
            depth_intensity: Self::DEPTH_INTENSITY_DEFAULT,
            convergence: 1.0,
        }
    }
}

/// Depth/convergence starting points per kind of footage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentPreset {
    #[default]
    Standard,
    Action,
    Documentary,
    Animation,
    TalkingHead,
}

impl ContentPreset {
    /// (depth intensity, convergence)
    pub fn values(self) -> (f64, f64) {
        match self {
            ContentPreset::Standard => (75.0, 1.0),
            ContentPreset::Action => (85.0, 1.2),
            ContentPreset::Documentary => (65.0, 1.0),
            ContentPreset::Animation => (90.0, 1.3),
            ContentPreset::TalkingHead => (50.0, 0.8),
        }
    }
}

impl FromStr for ContentPreset {
    type Err = StereoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "standard" => Ok(ContentPreset::Standard),
            "action" => Ok(ContentPreset::Action),
            "documentary" => Ok(ContentPreset::Documentary),
            "animation" => Ok(ContentPreset::Animation),
            "talking-head" => Ok(ContentPreset::TalkingHead),
            other => Err(StereoError::InvalidParameter(format!(
                "unknown content preset '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnaglyphMode {
    /// Red from the left view, green and blue from the right
    RedCyan,
    /// Red and green from the left view, blue from the right
    AmberBlue,
}

/// Stereoscopic output layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Each eye squeezed to half width; output keeps the source size
    #[default]
    HalfSideBySide,
    /// Eyes side by side at full width; output is twice as wide
    FullSideBySide,
    Anaglyph(AnaglyphMode),
    /// Left on top; `half_resolution` squeezes each eye to half height
    TopBottom { half_resolution: bool },
}

impl OutputFormat {
    /// Output (width, height) for a source of `(width, height)`.
    pub fn output_dimensions(&self, width: usize, height: usize) -> (usize, usize) {
        match self {
            OutputFormat::HalfSideBySide | OutputFormat::Anaglyph(_) => (width, height),
            OutputFormat::FullSideBySide => (width * 2, height),
            OutputFormat::TopBottom {
                half_resolution: true,
            } => (width, height),
            OutputFormat::TopBottom {
                half_resolution: false,
            } => (width, height * 2),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::HalfSideBySide => "half-sbs",
            OutputFormat::FullSideBySide => "full-sbs",
            OutputFormat::Anaglyph(AnaglyphMode::RedCyan) => "anaglyph",
            OutputFormat::Anaglyph(AnaglyphMode::AmberBlue) => "anaglyph-amber",
            OutputFormat::TopBottom {
                half_resolution: true,
            } => "top-bottom",
            OutputFormat::TopBottom {
                half_resolution: false,
            } => "top-bottom-full",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = StereoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "half-sbs" => Ok(OutputFormat::HalfSideBySide),
            "full-sbs" => Ok(OutputFormat::FullSideBySide),
            "anaglyph" | "anaglyph-red-cyan" => Ok(OutputFormat::Anaglyph(AnaglyphMode::RedCyan)),
            "anaglyph-amber" | "anaglyph-amber-blue" => {
                Ok(OutputFormat::Anaglyph(AnaglyphMode::AmberBlue))
            }
            "top-bottom" => Ok(OutputFormat::TopBottom {
                half_resolution: true,
            }),
            "top-bottom-full" => Ok(OutputFormat::TopBottom {
                half_resolution: false,
            }),
            other => Err(StereoError::InvalidParameter(format!(
                "unknown output format '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    /// Fraction of the disparity applied to this eye's sampling offset.
    pub fn shift_factor(self) -> f32 {
        match self {
            Eye::Left => -0.5,
            Eye::Right => 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HoleFillMethod {
    /// Fast-marching inpainting that propagates border color inward
    #[default]
    Inpaint,
    /// Copy the nearest non-hole pixel (Manhattan distance)
    Nearest,
}

impl FromStr for HoleFillMethod {
    type Err = StereoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "inpaint" | "fast-marching" => Ok(HoleFillMethod::Inpaint),
            "nearest" => Ok(HoleFillMethod::Nearest),
            other => Err(StereoError::InvalidParameter(format!(
                "unknown hole fill method '{other}'"
            ))),
        }
    }
}

/// Hole detection and filling configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleFillSettings {
    pub method: HoleFillMethod,
    /// Pixels whose luma is strictly below this value are treated as holes
    pub darkness_threshold: u8,
    /// Neighbourhood radius in pixels used by the inpainting strategy
    pub inpaint_radius: usize,
}

impl Default for HoleFillSettings {
    fn default() -> Self {
        Self {
            method: HoleFillMethod::Inpaint,
            darkness_threshold: 10,
            inpaint_radius: 3,
        }
    }
}
