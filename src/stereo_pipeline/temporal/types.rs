use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::stereo_pipeline::common::error::{Result, StereoError};
use crate::stereo_pipeline::frame::DepthMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemporalMethod {
    /// Recursive blend of the new depth with the previous filtered output
    #[default]
    Ema,
    /// Per-pixel median over the raw history window
    Median,
    /// Gaussian-weighted mean over the raw history window, newest weighted highest
    Gaussian,
}

impl fmt::Display for TemporalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TemporalMethod::Ema => "ema",
            TemporalMethod::Median => "median",
            TemporalMethod::Gaussian => "gaussian",
        };
        f.write_str(name)
    }
}

impl FromStr for TemporalMethod {
    type Err = StereoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ema" => Ok(TemporalMethod::Ema),
            "median" => Ok(TemporalMethod::Median),
            "gaussian" => Ok(TemporalMethod::Gaussian),
            other => Err(StereoError::InvalidParameter(format!(
                "unknown temporal method '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalSettings {
    pub method: TemporalMethod,
    /// Weight of the new raw depth in the EMA blend (0, 1]
    pub alpha: f32,
    /// Number of raw depth maps kept for the windowed methods
    pub window: usize,
    /// Gaussian width, in frames
    pub sigma: f32,
}

impl TemporalSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(StereoError::InvalidParameter(format!(
                "temporal alpha {} outside (0, 1]",
                self.alpha
            )));
        }
        if self.window == 0 {
            return Err(StereoError::InvalidParameter(
                "temporal window must hold at least one frame".to_string(),
            ));
        }
        if !(self.sigma > 0.0) {
            return Err(StereoError::InvalidParameter(format!(
                "temporal sigma {} must be positive",
                self.sigma
            )));
        }
        Ok(())
    }
}

impl Default for TemporalSettings {
    fn default() -> Self {
        Self {
            method: TemporalMethod::Ema,
            alpha: 0.7,
            window: 3,
            sigma: 1.0,
        }
    }
}

/// Filter state carried from one frame to the next.
///
/// Empty at the start of a job and after a reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemporalState {
    pub(crate) previous: Option<DepthMap>,
    pub(crate) history: VecDeque<DepthMap>,
}

impl TemporalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent filtered output
    pub fn previous(&self) -> Option<&DepthMap> {
        self.previous.as_ref()
    }

    /// Raw depth maps, oldest first
    pub fn history(&self) -> impl Iterator<Item = &DepthMap> {
        self.history.iter()
    }

    pub fn last_raw(&self) -> Option<&DepthMap> {
        self.history.back()
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_none() && self.history.is_empty()
    }

    /// Rejects a depth map whose size differs from what the state already holds.
    pub fn check_dimensions(&self, depth: &DepthMap) -> Result<()> {
        let held = self
            .previous
            .as_ref()
            .or_else(|| self.history.back())
            .map(DepthMap::dimensions);
        match held {
            Some(expected) if expected != depth.dimensions() => Err(StereoError::mismatch(
                "temporal filter",
                expected,
                depth.dimensions(),
            )),
            _ => Ok(()),
        }
    }
}
