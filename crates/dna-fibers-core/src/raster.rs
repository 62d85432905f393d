//! Binary raster views, regions of interest and foreground sampling.

use serde::{Deserialize, Serialize};

use crate::geometry::ImagePoint;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RasterError {
    #[error("raster buffer has {len} bytes, expected {width}x{height}")]
    DataLength {
        width: usize,
        height: usize,
        len: usize,
    },
}

/// Borrowed binary raster, row-major. Any non-zero byte is foreground.
#[derive(Clone, Copy, Debug)]
pub struct BinaryRasterView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // len = width * height
}

impl<'a> BinaryRasterView<'a> {
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, RasterError> {
        if width.checked_mul(height) != Some(data.len()) {
            return Err(RasterError::DataLength {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn is_foreground(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.data[y * self.width + x] > 0
    }

    /// Origin used to re-center pixel coordinates.
    pub fn center(&self) -> ImagePoint {
        image_center(self.width, self.height)
    }

    pub fn full_roi(&self) -> Roi {
        Roi::full(self.width, self.height)
    }
}

/// Owned binary raster, mostly used to build synthetic inputs.
#[derive(Clone, Debug, Default)]
pub struct BinaryRaster {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl BinaryRaster {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Raster with the given absolute pixels set. Pixels outside the raster are ignored.
    pub fn from_pixels<I>(width: usize, height: usize, pixels: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut raster = Self::new(width, height);
        for (x, y) in pixels {
            raster.set(x, y, true);
        }
        raster
    }

    pub fn set(&mut self, x: usize, y: usize, foreground: bool) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = if foreground { 255 } else { 0 };
        }
    }

    pub fn view(&self) -> BinaryRasterView<'_> {
        BinaryRasterView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Axis-aligned region of interest in absolute raster coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Roi {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Column and row ranges of this ROI clipped to a `width × height` raster.
    fn clipped_ranges(
        &self,
        width: usize,
        height: usize,
    ) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        let x_end = self.x.saturating_add(self.width).min(width);
        let y_end = self.y.saturating_add(self.height).min(height);
        (self.x.min(x_end)..x_end, self.y.min(y_end)..y_end)
    }
}

/// Center of a `width × height` raster, rounded down.
pub fn image_center(width: usize, height: usize) -> ImagePoint {
    ImagePoint::new((width / 2) as i32, (height / 2) as i32)
}

/// Foreground pixels inside `roi`, re-centered on `origin`.
///
/// Pixels are enumerated row by row; callers must not rely on the order.
pub fn foreground_points(
    raster: &BinaryRasterView<'_>,
    roi: &Roi,
    origin: ImagePoint,
) -> Vec<ImagePoint> {
    let (cols, rows) = roi.clipped_ranges(raster.width, raster.height);
    rows.flat_map(|y| cols.clone().map(move |x| (x, y)))
        .filter(|&(x, y)| raster.is_foreground(x, y))
        .map(|(x, y)| ImagePoint::new(x as i32, y as i32) - origin)
        .collect()
}
