use tracing::debug;

use crate::stereo_pipeline::common::error::Result;
use crate::stereo_pipeline::frame::DepthMap;
use crate::stereo_pipeline::temporal::filter::filter_depth;
use crate::stereo_pipeline::temporal::types::{TemporalSettings, TemporalState};

/// Owns the temporal state of one job.
#[derive(Debug, Clone, Default)]
pub struct TemporalStabilizer {
    settings: TemporalSettings,
    state: TemporalState,
}

impl TemporalStabilizer {
    pub fn new(settings: TemporalSettings) -> Self {
        Self {
            settings,
            state: TemporalState::new(),
        }
    }

    pub fn settings(&self) -> &TemporalSettings {
        &self.settings
    }

    pub fn state(&self) -> &TemporalState {
        &self.state
    }

    pub fn filter(&mut self, raw: DepthMap) -> Result<DepthMap> {
        // Checked up front so a rejected map leaves the state intact.
        self.state.check_dimensions(&raw)?;
        let state = std::mem::take(&mut self.state);
        let (state, filtered) = filter_depth(state, raw, &self.settings)?;
        self.state = state;
        Ok(filtered)
    }

    pub fn reset(&mut self) {
        debug!("Resetting temporal state");
        self.state = TemporalState::new();
    }
}
