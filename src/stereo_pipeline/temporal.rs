//! Temporal module
//!
//! Depth stabilization across a frame sequence. Filtering is a pure function over an
//! explicit [`TemporalState`]; [`TemporalStabilizer`] owns one state for the length of a job.

mod filter;
mod scene;
mod stabilizer;
pub mod types;

#[cfg(test)]
mod tests;

pub use filter::filter_depth;
pub use scene::{DEFAULT_SCENE_CUT_THRESHOLD, is_scene_change, mean_abs_difference};
pub use stabilizer::TemporalStabilizer;
pub use types::{TemporalMethod, TemporalSettings, TemporalState};
