//! Anisotropic mean-shift over `(θ, ρ)` points.
//!
//! Every input point climbs the kernel density estimate independently on the
//! worker pool, each in its own private trajectory. The converged positions
//! are then merged into modes sequentially, in input order, so the mode list
//! and the labels are deterministic.

use dna_fibers_core::{HoughPoint, ParallelError, WorkerPool};
use log::{debug, warn};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::kernel::{Kernel, KernelKind};

#[derive(thiserror::Error, Debug)]
pub enum MeanShiftError {
    #[error("bandwidth must be positive and finite, got (θ: {theta}, ρ: {rho})")]
    InvalidBandwidth { theta: f64, rho: f64 },
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}

/// Per-axis smoothing bandwidth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bandwidth {
    /// Angular bandwidth in radians.
    pub theta: f64,
    /// Offset bandwidth in pixels.
    pub rho: f64,
}

impl Bandwidth {
    pub const fn new(theta: f64, rho: f64) -> Self {
        Self { theta, rho }
    }

    fn is_valid(&self) -> bool {
        self.theta.is_finite() && self.rho.is_finite() && self.theta > 0.0 && self.rho > 0.0
    }

    /// Squared kernel argument between `a` and `b`, split into its θ part and the total.
    #[inline]
    fn scaled_squared(&self, a: HoughPoint, b: HoughPoint) -> (f64, f64) {
        let dt = (a.theta - b.theta) / self.theta;
        let dr = (a.rho - b.rho) / self.rho;
        let dt2 = dt * dt;
        (dt2, dt2 + dr * dr)
    }
}

/// Parameters of a mean-shift run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanShiftParams {
    pub bandwidth: Bandwidth,
    pub kernel: KernelKind,
    /// A trajectory stops once its squared displacement drops below this.
    pub tolerance: f64,
    /// Converged positions closer than this share a mode.
    pub merge_epsilon: f64,
    /// Hard cap on iterations per trajectory.
    pub max_iterations: usize,
}

impl Default for MeanShiftParams {
    fn default() -> Self {
        Self {
            bandwidth: Bandwidth::new(1.0, 1.0),
            kernel: KernelKind::default(),
            tolerance: 1e-10,
            merge_epsilon: 1e-2,
            max_iterations: 1000,
        }
    }
}

/// Modes found by a run and the mode index of every input point.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanShiftResult {
    pub modes: Vec<HoughPoint>,
    /// `labels[i]` indexes `modes` for input point `i`.
    pub labels: Vec<usize>,
    /// Trajectories stopped by the iteration cap instead of the tolerance.
    pub unconverged: usize,
}

impl MeanShiftResult {
    /// Number of input points attached to each mode.
    pub fn populations(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.modes.len()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }
}

#[derive(Clone, Copy, Debug)]
struct Trajectory {
    position: HoughPoint,
    converged: bool,
}

/// Mean-shift mode seeker.
#[derive(Clone, Debug)]
pub struct MeanShift {
    params: MeanShiftParams,
}

impl MeanShift {
    pub fn new(params: MeanShiftParams) -> Result<Self, MeanShiftError> {
        if !params.bandwidth.is_valid() {
            return Err(MeanShiftError::InvalidBandwidth {
                theta: params.bandwidth.theta,
                rho: params.bandwidth.rho,
            });
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &MeanShiftParams {
        &self.params
    }

    /// Shift every point of `data` to its mode and merge the modes.
    ///
    /// A panic in any trajectory fails the whole run.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, data, pool), fields(points = data.len()))
    )]
    pub fn run(
        &self,
        data: &[HoughPoint],
        pool: &WorkerPool,
    ) -> Result<MeanShiftResult, MeanShiftError> {
        let trajectories = pool.map(data, |_, &start| self.converge(start, data))?;

        let unconverged = trajectories.iter().filter(|t| !t.converged).count();
        if unconverged > 0 {
            warn!(
                "{unconverged} of {} trajectories hit the {}-iteration cap",
                data.len(),
                self.params.max_iterations
            );
        }

        let (modes, labels) = self.merge(trajectories.iter().map(|t| t.position));
        debug!("mean-shift: {} points -> {} modes", data.len(), modes.len());
        Ok(MeanShiftResult {
            modes,
            labels,
            unconverged,
        })
    }

    fn converge(&self, start: HoughPoint, data: &[HoughPoint]) -> Trajectory {
        let bandwidth = self.params.bandwidth;
        let kernel = &self.params.kernel;
        let support = kernel.support_squared();

        let mut position = start;
        for _ in 0..self.params.max_iterations {
            let origin = position.to_vector();
            let mut weight_sum = 0.0;
            // Displacements, not positions: a point among exact duplicates stays put.
            let mut acc = Vector2::<f64>::zeros();
            for &q in data {
                let (dt2, u2) = bandwidth.scaled_squared(position, q);
                if support.is_some_and(|s| dt2 > s) {
                    continue;
                }
                let w = kernel.evaluate_squared(u2);
                if w > 0.0 {
                    weight_sum += w;
                    acc += (q.to_vector() - origin) * w;
                }
            }
            if weight_sum <= 0.0 {
                // Nothing in reach: the point is its own mode.
                return Trajectory {
                    position,
                    converged: true,
                };
            }

            let step = Vector2::new(acc.x / weight_sum, acc.y / weight_sum);
            let shift = step.norm_squared();
            position = HoughPoint::from_vector(origin + step);
            if shift < self.params.tolerance {
                return Trajectory {
                    position,
                    converged: true,
                };
            }
        }
        Trajectory {
            position,
            converged: false,
        }
    }

    fn merge(&self, positions: impl Iterator<Item = HoughPoint>) -> (Vec<HoughPoint>, Vec<usize>) {
        let eps2 = self.params.merge_epsilon * self.params.merge_epsilon;
        let mut modes: Vec<HoughPoint> = Vec::new();
        let mut labels = Vec::new();
        for p in positions {
            match modes.iter().position(|m| m.squared_distance(p) < eps2) {
                Some(label) => labels.push(label),
                None => {
                    labels.push(modes.len());
                    modes.push(p);
                }
            }
        }
        (modes, labels)
    }
}

/// Kernel density estimate of `data` at `at`.
///
/// Normalized by the sample count, the bandwidth area and the kernel constant
/// applied once per axis.
pub fn kernel_density<K: Kernel + ?Sized>(
    data: &[HoughPoint],
    at: HoughPoint,
    bandwidth: Bandwidth,
    kernel: &K,
) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data
        .iter()
        .map(|&q| kernel.evaluate_squared(bandwidth.scaled_squared(at, q).1))
        .sum();
    let c = kernel.norm_const();
    c * c * sum / (data.len() as f64 * bandwidth.theta * bandwidth.rho)
}
