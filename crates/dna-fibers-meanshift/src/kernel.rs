//! Radially symmetric smoothing kernels.
//!
//! Kernels are evaluated on a scalar `u` (already divided by the bandwidth)
//! and return the *unnormalized* profile; multiply by [`Kernel::norm_const`]
//! to get a density.

use serde::{Deserialize, Serialize};

/// Smoothing kernel used by the mean-shift iteration.
pub trait Kernel: Send + Sync {
    /// Normalization constant of the profile.
    fn norm_const(&self) -> f64;

    /// Profile value at `u`.
    fn evaluate(&self, u: f64) -> f64;

    /// Profile value at `sqrt(u2)`, without taking the square root when the
    /// kernel can avoid it.
    fn evaluate_squared(&self, u2: f64) -> f64 {
        self.evaluate(u2.sqrt())
    }

    /// First derivative of the profile at `u`.
    fn derivative(&self, u: f64) -> f64;

    /// Squared radius outside which the profile is zero, `None` for infinite support.
    fn support_squared(&self) -> Option<f64> {
        None
    }
}

/// Gaussian profile `exp(−u²/2)`, optionally cut to zero once `u² ≥ truncation_squared`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GaussianKernel {
    pub truncation_squared: Option<f64>,
}

impl GaussianKernel {
    pub fn truncated(truncation_squared: f64) -> Self {
        Self {
            truncation_squared: Some(truncation_squared),
        }
    }
}

impl Kernel for GaussianKernel {
    fn norm_const(&self) -> f64 {
        1.0 / (2.0 * std::f64::consts::PI).sqrt()
    }

    fn evaluate(&self, u: f64) -> f64 {
        self.evaluate_squared(u * u)
    }

    fn evaluate_squared(&self, u2: f64) -> f64 {
        match self.truncation_squared {
            Some(t) if u2 >= t => 0.0,
            _ => (-0.5 * u2).exp(),
        }
    }

    fn derivative(&self, u: f64) -> f64 {
        -u * self.evaluate(u)
    }

    fn support_squared(&self) -> Option<f64> {
        self.truncation_squared
    }
}

/// Epanechnikov profile `1 − u²` on `|u| ≤ 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EpanechnikovKernel;

impl Kernel for EpanechnikovKernel {
    fn norm_const(&self) -> f64 {
        0.75
    }

    fn evaluate(&self, u: f64) -> f64 {
        if u.abs() <= 1.0 {
            1.0 - u * u
        } else {
            0.0
        }
    }

    fn evaluate_squared(&self, u2: f64) -> f64 {
        if u2 <= 1.0 {
            1.0 - u2
        } else {
            0.0
        }
    }

    fn derivative(&self, u: f64) -> f64 {
        if u.abs() <= 1.0 {
            -2.0 * u
        } else {
            0.0
        }
    }

    fn support_squared(&self) -> Option<f64> {
        Some(1.0)
    }
}

/// Flat profile on `|u| ≤ 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UniformKernel;

impl Kernel for UniformKernel {
    fn norm_const(&self) -> f64 {
        0.5
    }

    fn evaluate(&self, u: f64) -> f64 {
        if u.abs() <= 1.0 {
            1.0
        } else {
            0.0
        }
    }

    fn evaluate_squared(&self, u2: f64) -> f64 {
        if u2 <= 1.0 {
            1.0
        } else {
            0.0
        }
    }

    fn derivative(&self, _u: f64) -> f64 {
        0.0
    }

    fn support_squared(&self) -> Option<f64> {
        Some(1.0)
    }
}

/// Serializable kernel choice.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KernelKind {
    Gaussian {
        #[serde(default)]
        truncation_squared: Option<f64>,
    },
    Epanechnikov,
    Uniform,
}

impl Default for KernelKind {
    /// Gaussian truncated at `u² < 5`, the profile used for line selection.
    fn default() -> Self {
        KernelKind::Gaussian {
            truncation_squared: Some(5.0),
        }
    }
}

impl Kernel for KernelKind {
    fn norm_const(&self) -> f64 {
        match *self {
            KernelKind::Gaussian { truncation_squared } => {
                GaussianKernel { truncation_squared }.norm_const()
            }
            KernelKind::Epanechnikov => EpanechnikovKernel.norm_const(),
            KernelKind::Uniform => UniformKernel.norm_const(),
        }
    }

    fn evaluate(&self, u: f64) -> f64 {
        match *self {
            KernelKind::Gaussian { truncation_squared } => {
                GaussianKernel { truncation_squared }.evaluate(u)
            }
            KernelKind::Epanechnikov => EpanechnikovKernel.evaluate(u),
            KernelKind::Uniform => UniformKernel.evaluate(u),
        }
    }

    fn evaluate_squared(&self, u2: f64) -> f64 {
        match *self {
            KernelKind::Gaussian { truncation_squared } => {
                GaussianKernel { truncation_squared }.evaluate_squared(u2)
            }
            KernelKind::Epanechnikov => EpanechnikovKernel.evaluate_squared(u2),
            KernelKind::Uniform => UniformKernel.evaluate_squared(u2),
        }
    }

    fn derivative(&self, u: f64) -> f64 {
        match *self {
            KernelKind::Gaussian { truncation_squared } => {
                GaussianKernel { truncation_squared }.derivative(u)
            }
            KernelKind::Epanechnikov => EpanechnikovKernel.derivative(u),
            KernelKind::Uniform => UniformKernel.derivative(u),
        }
    }

    fn support_squared(&self) -> Option<f64> {
        match *self {
            KernelKind::Gaussian { truncation_squared } => truncation_squared,
            KernelKind::Epanechnikov | KernelKind::Uniform => Some(1.0),
        }
    }
}
