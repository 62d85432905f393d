use serde::{Deserialize, Serialize};

use crate::error::{invalid, FiberDetectError};
use crate::hough_space::HoughSpaceParams;
use crate::segments::SegmentParams;
use crate::selection::SelectionParams;

/// Configuration for the fiber detector.
///
/// Every field has a default, so a JSON config only needs the values it
/// overrides.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiberDetectorParams {
    /// Random anchoring and local line estimation.
    pub hough: HoughSpaceParams,
    /// Mean-shift clustering and mode selection.
    pub selection: SelectionParams,
    /// Pixel-to-line association and segment splitting.
    pub segments: SegmentParams,
    /// Worker threads; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl FiberDetectorParams {
    /// Check every value against its domain before any work is done.
    pub fn validate(&self) -> Result<(), FiberDetectError> {
        self.hough.validate()?;
        self.selection.validate()?;
        self.segments.validate()?;
        if self.threads == Some(0) {
            return Err(invalid("threads", "must be at least 1 when set"));
        }
        Ok(())
    }
}
