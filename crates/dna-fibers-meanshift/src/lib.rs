//! Mean-shift mode seeking in the `(θ, ρ)` line-parameter plane.
//!
//! The clusterer uses separate bandwidths for the angle and the offset and is
//! generic over a family of radially symmetric [`Kernel`]s. Angles are
//! periodic, so callers usually pad the data with [`replicate_borders`] first.
//!
//! ```
//! use dna_fibers_core::{HoughPoint, WorkerPool};
//! use dna_fibers_meanshift::{Bandwidth, MeanShift, MeanShiftParams};
//!
//! let data = vec![
//!     HoughPoint::new(0.10, 4.0),
//!     HoughPoint::new(0.11, 4.2),
//!     HoughPoint::new(-1.2, 30.0),
//! ];
//! let ms = MeanShift::new(MeanShiftParams {
//!     bandwidth: Bandwidth::new(0.05, 1.0),
//!     ..MeanShiftParams::default()
//! })?;
//! let result = ms.run(&data, &WorkerPool::global())?;
//! assert_eq!(result.modes.len(), 2);
//! # Ok::<(), dna_fibers_meanshift::MeanShiftError>(())
//! ```

mod border;
mod kernel;
mod mean_shift;

pub use border::replicate_borders;
pub use kernel::{EpanechnikovKernel, GaussianKernel, Kernel, KernelKind, UniformKernel};
pub use mean_shift::{
    kernel_density, Bandwidth, MeanShift, MeanShiftError, MeanShiftParams, MeanShiftResult,
};
