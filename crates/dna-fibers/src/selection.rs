//! Dominant-line selection in the Hough point cloud.
//!
//! The cloud is padded across the `±π/2` wrap, clustered with mean-shift,
//! and the modes whose basins are populated enough (relative to the largest
//! basin) are kept as fiber lines.

use std::f64::consts::FRAC_PI_2;

use dna_fibers_core::{HoughPoint, WorkerPool};
use dna_fibers_meanshift::{
    kernel_density, replicate_borders, Bandwidth, KernelKind, MeanShift, MeanShiftParams,
};
use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::{invalid, require_positive, FiberDetectError};

/// Parameters of the line selection stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionParams {
    /// A mode is kept when its population exceeds this fraction of the largest
    /// population. Must lie in `(0, 1)`.
    pub selection_sensitivity: f64,
    /// Angular bandwidth of the mean-shift, in degrees.
    pub angular_sensitivity_deg: f64,
    /// Offset bandwidth of the mean-shift, in pixels.
    pub shift_sensitivity: f64,
    pub kernel: KernelKind,
    /// Convergence threshold on the squared mean-shift step.
    pub tolerance: f64,
    /// Distance under which converged points share a mode.
    pub merge_epsilon: f64,
    pub max_iterations: usize,
}

impl Default for SelectionParams {
    fn default() -> Self {
        let ms = MeanShiftParams::default();
        Self {
            selection_sensitivity: 0.33,
            angular_sensitivity_deg: 2.5,
            shift_sensitivity: 5.0,
            kernel: KernelKind::default(),
            tolerance: ms.tolerance,
            merge_epsilon: ms.merge_epsilon,
            max_iterations: ms.max_iterations,
        }
    }
}

impl SelectionParams {
    pub fn validate(&self) -> Result<(), FiberDetectError> {
        let s = self.selection_sensitivity;
        if !(s > 0.0 && s < 1.0) {
            return Err(invalid(
                "selection.selection_sensitivity",
                format!("must lie strictly between 0 and 1, got {s}"),
            ));
        }
        require_positive("selection.angular_sensitivity_deg", self.angular_sensitivity_deg)?;
        require_positive("selection.shift_sensitivity", self.shift_sensitivity)?;
        require_positive("selection.tolerance", self.tolerance)?;
        require_positive("selection.merge_epsilon", self.merge_epsilon)?;
        if self.max_iterations == 0 {
            return Err(invalid("selection.max_iterations", "must be at least 1"));
        }
        if let KernelKind::Gaussian {
            truncation_squared: Some(t),
        } = self.kernel
        {
            require_positive("selection.kernel.truncation_squared", t)?;
        }
        Ok(())
    }

    /// Mean-shift bandwidth in `(radians, pixels)`.
    pub fn bandwidth(&self) -> Bandwidth {
        Bandwidth::new(self.angular_sensitivity_deg.to_radians(), self.shift_sensitivity)
    }

    pub fn mean_shift_params(&self) -> MeanShiftParams {
        MeanShiftParams {
            bandwidth: self.bandwidth(),
            kernel: self.kernel,
            tolerance: self.tolerance,
            merge_epsilon: self.merge_epsilon,
            max_iterations: self.max_iterations,
        }
    }
}

/// Selected line with the support it was selected on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeakCandidate {
    pub line: HoughPoint,
    /// Number of (padded) Hough points in the mode's basin.
    pub population: usize,
    /// Kernel density of the padded cloud at the mode.
    pub density: f64,
}

/// Outcome of the selection stage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakSelection {
    pub peaks: Vec<PeakCandidate>,
    /// Size of the cloud after border padding.
    pub num_replicated: usize,
    /// Modes found before filtering.
    pub num_modes: usize,
}

/// Dominant lines of a Hough point cloud.
pub fn select_peaks(
    points: &[HoughPoint],
    params: &SelectionParams,
    pool: &WorkerPool,
) -> Result<Vec<HoughPoint>, FiberDetectError> {
    Ok(select_peak_candidates(points, params, pool)?
        .peaks
        .into_iter()
        .map(|p| p.line)
        .collect())
}

/// Like [`select_peaks`], keeping populations, densities and stage counts.
///
/// Modes on or past `±π/2` are dropped even when well populated: they are the
/// padded copies of modes already seen inside the range.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(points, params, pool), fields(points = points.len()))
)]
pub fn select_peak_candidates(
    points: &[HoughPoint],
    params: &SelectionParams,
    pool: &WorkerPool,
) -> Result<PeakSelection, FiberDetectError> {
    let bandwidth = params.bandwidth();
    let padded = replicate_borders(points, bandwidth.theta, FRAC_PI_2, -FRAC_PI_2, true);
    if padded.is_empty() {
        return Ok(PeakSelection::default());
    }

    let ms = MeanShift::new(params.mean_shift_params())?;
    let clusters = ms.run(&padded, pool).map_err(FiberDetectError::clustering)?;

    let populations = clusters.populations();
    let max_population = populations.iter().copied().max().unwrap_or(0);
    let threshold = params.selection_sensitivity * max_population as f64;

    let peaks: Vec<PeakCandidate> = clusters
        .modes
        .iter()
        .zip(&populations)
        .filter(|(mode, count)| {
            **count as f64 > threshold && mode.theta > -FRAC_PI_2 && mode.theta < FRAC_PI_2
        })
        .map(|(&line, &population)| PeakCandidate {
            line,
            population,
            density: kernel_density(&padded, line, bandwidth, &params.kernel),
        })
        .collect();

    debug!(
        "selection: {} points ({} padded) -> {} modes -> {} peaks",
        points.len(),
        padded.len(),
        clusters.modes.len(),
        peaks.len()
    );
    Ok(PeakSelection {
        peaks,
        num_replicated: padded.len(),
        num_modes: clusters.modes.len(),
    })
}
