//! End-to-end fiber detection.
//!
//! This module wires the stages together: foreground sampling, local line
//! estimation at random anchors, mean-shift line selection and segment
//! assembly along the selected lines.

mod params;
mod pipeline;
mod result;

pub use params::FiberDetectorParams;
pub use pipeline::{detect_fibers, FiberDetector};
pub use result::FiberDetection;
