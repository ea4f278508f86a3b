//! Common utilities module
//!
//! This module contains shared utilities used across the stereo pipeline.

pub mod error;

pub use error::{ErrorKind, Result, StereoError};
