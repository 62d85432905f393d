//! Sparse Hough space built from randomly anchored local line estimates.

use dna_fibers_core::{
    foreground_points, BinaryRasterView, HoughPoint, ImagePoint, ParallelError, Roi, WorkerPool,
};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::{invalid, FiberDetectError};
use crate::local_line::{estimate_local_line, neighborhood};

/// Parameters of the Hough point cloud construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughSpaceParams {
    /// Number of anchors drawn (with replacement) from the foreground.
    pub num_samples: usize,
    /// Radius, in pixels, of the neighborhood used for each local estimate.
    pub window_size: u32,
    /// Seed of the anchor sampler.
    pub seed: u64,
}

impl Default for HoughSpaceParams {
    fn default() -> Self {
        Self {
            num_samples: 1000,
            window_size: 25,
            seed: 0,
        }
    }
}

impl HoughSpaceParams {
    pub fn validate(&self) -> Result<(), FiberDetectError> {
        if self.num_samples == 0 {
            return Err(invalid("hough.num_samples", "must be at least 1"));
        }
        if self.window_size < 2 {
            return Err(invalid(
                "hough.window_size",
                format!("must be at least 2, got {}", self.window_size),
            ));
        }
        Ok(())
    }
}

/// Local line estimates at random foreground anchors of `raster` inside `roi`.
///
/// Coordinates are relative to the raster center. Anchors without neighbors
/// contribute nothing, so the result may hold fewer than `num_samples` points.
pub fn build_hough_space(
    raster: &BinaryRasterView<'_>,
    roi: &Roi,
    params: &HoughSpaceParams,
    pool: &WorkerPool,
) -> Result<Vec<HoughPoint>, ParallelError> {
    let foreground = foreground_points(raster, roi, raster.center());
    hough_points_from_foreground(&foreground, params, pool)
}

#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(foreground, params, pool),
        fields(foreground = foreground.len(), samples = params.num_samples)
    )
)]
pub(crate) fn hough_points_from_foreground(
    foreground: &[ImagePoint],
    params: &HoughSpaceParams,
    pool: &WorkerPool,
) -> Result<Vec<HoughPoint>, ParallelError> {
    if foreground.is_empty() {
        warn!("no foreground pixels, Hough space is empty");
        return Ok(Vec::new());
    }

    let mut rng = StdRng::seed_from_u64(params.seed);
    let anchors: Vec<ImagePoint> = (0..params.num_samples)
        .map(|_| foreground[rng.gen_range(0..foreground.len())])
        .collect();

    let estimates = pool.map(&anchors, |_, &anchor| {
        let neighbors = neighborhood(foreground, anchor, params.window_size);
        estimate_local_line(anchor, &neighbors)
    })?;
    let points: Vec<HoughPoint> = estimates.into_iter().flatten().collect();

    debug!(
        "hough space: {} anchors over {} foreground pixels -> {} points",
        anchors.len(),
        foreground.len(),
        points.len()
    );
    Ok(points)
}
