use std::fmt;

use dna_fibers_core::ParallelError;
use dna_fibers_meanshift::MeanShiftError;
use serde::{Deserialize, Serialize};

/// Parallel stage of the detection pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    HoughSpace,
    Clustering,
    Segments,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::HoughSpace => "hough space",
            Stage::Clustering => "clustering",
            Stage::Segments => "segment building",
        })
    }
}

/// Errors returned by the fiber detector.
#[derive(thiserror::Error, Debug)]
pub enum FiberDetectError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: ParallelError,
    },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[source] ParallelError),

    #[error(transparent)]
    MeanShift(#[from] MeanShiftError),
}

impl FiberDetectError {
    /// Wraps a worker-pool failure of `stage`.
    pub(crate) fn stage(stage: Stage) -> impl FnOnce(ParallelError) -> Self {
        move |source| FiberDetectError::StageFailed { stage, source }
    }

    /// Wraps a mean-shift failure. Worker panics are clustering stage failures.
    pub(crate) fn clustering(err: MeanShiftError) -> Self {
        match err {
            MeanShiftError::Parallel(source) => FiberDetectError::StageFailed {
                stage: Stage::Clustering,
                source,
            },
            other => FiberDetectError::MeanShift(other),
        }
    }
}

pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> FiberDetectError {
    FiberDetectError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

/// Rejects values that are not finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), FiberDetectError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(
            name,
            format!("must be positive and finite, got {value}"),
        ))
    }
}
