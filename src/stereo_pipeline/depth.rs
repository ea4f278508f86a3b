//! Depth module
//!
//! The depth-estimation seam and the estimators shipped with the crate. Model-backed
//! estimators live outside this crate and plug in through [`DepthEstimator`].

mod estimator;
mod gradient;
pub mod postprocess;
mod sidecar;


pub use estimator::DepthEstimator;
pub use gradient::GradientDepthEstimator;
pub use postprocess::{DepthPostprocess, adjust_depth_range, normalize, resize_depth, smooth_gaussian};
pub use sidecar::SidecarDepthEstimator;
