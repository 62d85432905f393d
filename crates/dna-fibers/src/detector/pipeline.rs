use dna_fibers_core::{foreground_points, BinaryRasterView, Roi, WorkerPool};
use log::info;

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{FiberDetection, FiberDetectorParams};
use crate::error::{FiberDetectError, Stage};
use crate::hough_space::hough_points_from_foreground;
use crate::segments::segments_from_foreground;
use crate::selection::select_peak_candidates;

/// Straight fiber segment detector.
///
/// Holds validated parameters and the worker pool, so one detector can be
/// reused across images.
#[derive(Clone, Debug)]
pub struct FiberDetector {
    params: FiberDetectorParams,
    pool: WorkerPool,
}

impl FiberDetector {
    /// Validate `params` and start the worker pool.
    pub fn new(params: FiberDetectorParams) -> Result<Self, FiberDetectError> {
        params.validate()?;
        let pool = WorkerPool::from_threads(params.threads).map_err(FiberDetectError::WorkerPool)?;
        Ok(Self { params, pool })
    }

    /// Detector parameters.
    #[inline]
    pub fn params(&self) -> &FiberDetectorParams {
        &self.params
    }

    #[inline]
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Detect straight fiber segments in `raster`, restricted to `roi`
    /// (the whole raster when `None`).
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, raster),
            fields(width = raster.width, height = raster.height)
        )
    )]
    pub fn detect(
        &self,
        raster: &BinaryRasterView<'_>,
        roi: Option<Roi>,
    ) -> Result<FiberDetection, FiberDetectError> {
        let roi = roi.unwrap_or_else(|| raster.full_roi());
        let origin = raster.center();
        let foreground = foreground_points(raster, &roi, origin);

        let hough = hough_points_from_foreground(&foreground, &self.params.hough, &self.pool)
            .map_err(FiberDetectError::stage(Stage::HoughSpace))?;
        let selection = select_peak_candidates(&hough, &self.params.selection, &self.pool)?;
        let lines: Vec<_> = selection.peaks.iter().map(|p| p.line).collect();
        let segments = segments_from_foreground(
            &foreground,
            origin,
            &lines,
            &self.params.segments,
            &self.pool,
        )
        .map_err(FiberDetectError::stage(Stage::Segments))?;

        info!(
            "detected {} segments on {} lines ({} foreground pixels, {} hough points)",
            segments.len(),
            lines.len(),
            foreground.len(),
            hough.len()
        );
        Ok(FiberDetection {
            roi,
            origin,
            num_foreground: foreground.len(),
            num_hough_points: hough.len(),
            num_replicated: selection.num_replicated,
            num_modes: selection.num_modes,
            peaks: selection.peaks,
            segments,
        })
    }
}

/// One-shot detection with fresh parameters.
pub fn detect_fibers(
    raster: &BinaryRasterView<'_>,
    roi: Option<Roi>,
    params: FiberDetectorParams,
) -> Result<FiberDetection, FiberDetectError> {
    FiberDetector::new(params)?.detect(raster, roi)
}
