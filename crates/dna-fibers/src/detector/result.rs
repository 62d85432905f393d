use dna_fibers_core::{HoughPoint, ImagePoint, Roi, Segment};
use serde::{Deserialize, Serialize};

use crate::selection::PeakCandidate;

/// Output of a detection run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiberDetection {
    /// Region the detector looked at.
    pub roi: Roi,
    /// Raster center; selected lines are relative to it.
    pub origin: ImagePoint,
    pub num_foreground: usize,
    pub num_hough_points: usize,
    /// Hough points after padding across the angular wrap.
    pub num_replicated: usize,
    pub num_modes: usize,
    pub peaks: Vec<PeakCandidate>,
    /// Segments in absolute raster coordinates, grouped by peak.
    pub segments: Vec<Segment>,
}

impl FiberDetection {
    /// Selected lines, relative to [`FiberDetection::origin`].
    pub fn lines(&self) -> Vec<HoughPoint> {
        self.peaks.iter().map(|p| p.line).collect()
    }
}
