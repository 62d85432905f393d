//! Straight DNA fiber segment detection in binary skeleton images.
//!
//! The detector works on an already skeletonized, binarized image:
//! - random foreground anchors get a robust local line estimate, giving a
//!   sparse cloud of `(θ, ρ)` points ([`build_hough_space`]);
//! - the cloud is padded across the angular wrap and clustered with
//!   anisotropic mean-shift; well-populated modes are the fiber lines
//!   ([`select_peaks`]);
//! - foreground pixels close to each line are ordered, split on gaps and
//!   turned into segments ([`build_segments`]).
//!
//! [`FiberDetector`] runs all three stages with one set of parameters.
//!
//! ## Quickstart
//!
//! ```
//! use dna_fibers::{detect_fibers, FiberDetectorParams};
//! use dna_fibers::core::BinaryRaster;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // A 120 px vertical fiber in a 160x160 skeleton.
//! let raster = BinaryRaster::from_pixels(160, 160, (20..140).map(|y| (40, y)));
//! let result = detect_fibers(&raster.view(), None, FiberDetectorParams::default())?;
//! assert_eq!(result.segments.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `dna_fibers::core`: points, lines, rasters, ROI and the worker pool.
//! - `dna_fibers::meanshift`: kernels, mean-shift and border padding.
//! - `dna_fibers::io`: JSON config and report files.
//! - `dna_fibers::detect` (feature `image`): helpers for `image::GrayImage`.

pub use dna_fibers_core as core;
pub use dna_fibers_meanshift as meanshift;

mod detector;
mod error;
mod hough_space;
pub mod io;
mod local_line;
mod segments;
mod selection;

#[cfg(feature = "image")]
pub mod detect;

pub use detector::{detect_fibers, FiberDetection, FiberDetector, FiberDetectorParams};
pub use error::{FiberDetectError, Stage};
pub use hough_space::{build_hough_space, HoughSpaceParams};
pub use local_line::{estimate_local_line, neighborhood};
pub use segments::{build_segments, SegmentParams};
pub use selection::{
    select_peak_candidates, select_peaks, PeakCandidate, PeakSelection, SelectionParams,
};

pub use dna_fibers_core::{HoughPoint, ImagePoint, Roi, Segment};
