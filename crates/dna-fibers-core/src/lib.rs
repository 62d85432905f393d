//! Core types for DNA fiber segment detection.
//!
//! This crate holds the pieces every stage of the detector shares: integer
//! image points, Hesse-normal-form lines ([`HoughPoint`]), segments, binary
//! raster views with a region of interest, and the [`WorkerPool`] that runs
//! per-item work in parallel. It knows nothing about clustering or selection.

mod geometry;
mod logger;
mod parallel;
mod raster;

pub use geometry::{convert_image_points_to_hough_point, HoughPoint, ImagePoint, Segment};
pub use parallel::{ParallelError, WorkerPool};
pub use raster::{
    foreground_points, image_center, BinaryRaster, BinaryRasterView, RasterError, Roi,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, LOG_ENV_VAR};
