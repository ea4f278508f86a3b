//! Render module
//!
//! Depth to disparity mapping, view synthesis, disocclusion filling and output
//! composition for a single frame.

mod compose;
mod disparity;
mod hole_fill;
pub(crate) mod resample;
pub mod types;
mod warp;

#[cfg(test)]
mod tests;

pub use compose::{
    FormatComposer, compose_anaglyph, compose_full_sbs, compose_half_sbs, compose_top_bottom,
};
pub use disparity::{ComfortZone, DisparityMapper, compute_disparity, max_disparity};
pub use hole_fill::{HoleFiller, HoleMask, detect_holes, fill_inpaint, fill_nearest};
pub use resample::resize_linear;
pub use types::{
    AnaglyphMode, ContentPreset, Eye, HoleFillMethod, HoleFillSettings, OutputFormat,
    RenderParams,
};
pub use warp::{ViewWarper, view_shift};
