use std::path::Path;

use dna_fibers_core::{BinaryRasterView, Roi};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{FiberDetectError, FiberDetection, FiberDetector, FiberDetectorParams};

/// View an `image::GrayImage` as a binary raster (non-zero pixels are foreground).
pub fn raster_view(img: &::image::GrayImage) -> BinaryRasterView<'_> {
    BinaryRasterView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Load an image from disk and reduce it to 8-bit luma.
pub fn load_gray_image(path: impl AsRef<Path>) -> Result<::image::GrayImage, ::image::ImageError> {
    Ok(::image::open(path)?.to_luma8())
}

/// Run a prepared detector on an image.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(img, detector),
        fields(width = img.width(), height = img.height())
    )
)]
pub fn detect_fibers_image(
    img: &::image::GrayImage,
    roi: Option<Roi>,
    detector: &FiberDetector,
) -> Result<FiberDetection, FiberDetectError> {
    detector.detect(&raster_view(img), roi)
}

/// Convenience overload building the detector from `params`.
pub fn detect_fibers_image_with(
    img: &::image::GrayImage,
    roi: Option<Roi>,
    params: FiberDetectorParams,
) -> Result<FiberDetection, FiberDetectError> {
    detect_fibers_image(img, roi, &FiberDetector::new(params)?)
}
