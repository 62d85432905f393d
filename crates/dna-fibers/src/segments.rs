//! Segment assembly along selected lines.
//!
//! Foreground pixels within `width_tolerance` of a line are ordered along the
//! line's dominant axis and split wherever two consecutive pixels are more
//! than `max_gap` apart. Each piece long enough becomes a segment.

use dna_fibers_core::{
    foreground_points, BinaryRasterView, HoughPoint, ImagePoint, ParallelError, Roi, Segment,
    WorkerPool,
};
use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::{require_positive, FiberDetectError};

/// Parameters of segment assembly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentParams {
    /// Largest gap, in pixels, bridged within one segment.
    pub max_gap: f64,
    /// Shortest segment kept, in pixels. Segments of exactly this length are kept.
    pub min_length: f64,
    /// Largest distance, in pixels, between a pixel and the line it is assigned to.
    pub width_tolerance: f64,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            max_gap: 30.0,
            min_length: 50.0,
            width_tolerance: 1.0,
        }
    }
}

impl SegmentParams {
    pub fn validate(&self) -> Result<(), FiberDetectError> {
        require_positive("segments.max_gap", self.max_gap)?;
        require_positive("segments.min_length", self.min_length)?;
        require_positive("segments.width_tolerance", self.width_tolerance)?;
        Ok(())
    }
}

/// Segments of `raster` inside `roi` supported by `lines`.
///
/// `lines` are relative to the raster center; segments are returned in
/// absolute raster coordinates, grouped by line in input order.
pub fn build_segments(
    raster: &BinaryRasterView<'_>,
    roi: &Roi,
    lines: &[HoughPoint],
    params: &SegmentParams,
    pool: &WorkerPool,
) -> Result<Vec<Segment>, ParallelError> {
    let origin = raster.center();
    let foreground = foreground_points(raster, roi, origin);
    segments_from_foreground(&foreground, origin, lines, params, pool)
}

#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(foreground, lines, params, pool),
        fields(lines = lines.len())
    )
)]
pub(crate) fn segments_from_foreground(
    foreground: &[ImagePoint],
    origin: ImagePoint,
    lines: &[HoughPoint],
    params: &SegmentParams,
    pool: &WorkerPool,
) -> Result<Vec<Segment>, ParallelError> {
    let per_line = pool.map(lines, |_, &line| {
        segments_along(foreground, line, params, origin)
    })?;
    let segments: Vec<Segment> = per_line.into_iter().flatten().collect();
    debug!("segments: {} lines -> {} segments", lines.len(), segments.len());
    Ok(segments)
}

fn segments_along(
    foreground: &[ImagePoint],
    line: HoughPoint,
    params: &SegmentParams,
    origin: ImagePoint,
) -> Vec<Segment> {
    let mut on_line: Vec<ImagePoint> = foreground
        .iter()
        .copied()
        .filter(|&p| line.residual(p).abs() <= params.width_tolerance)
        .collect();
    if on_line.len() < 2 {
        return Vec::new();
    }
    sort_along_dominant_axis(&mut on_line);

    let max_gap2 = params.max_gap * params.max_gap;
    let min_length2 = params.min_length * params.min_length;
    let mut out = Vec::new();
    let mut start = 0;
    for i in 1..=on_line.len() {
        let split =
            i == on_line.len() || on_line[i - 1].squared_distance(on_line[i]) as f64 > max_gap2;
        if !split {
            continue;
        }
        let segment = Segment::new(on_line[start] + origin, on_line[i - 1] + origin);
        if segment.squared_length() as f64 >= min_length2 {
            out.push(segment);
        }
        start = i;
    }
    out
}

/// Sorts by the axis with the larger extent first, the other axis second.
/// Ties go to `x`.
fn sort_along_dominant_axis(points: &mut [ImagePoint]) {
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (i32::MAX, i32::MIN, i32::MAX, i32::MIN);
    for p in points.iter() {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    if i64::from(max_x) - i64::from(min_x) < i64::from(max_y) - i64::from(min_y) {
        points.sort_unstable_by_key(|p| (p.y, p.x));
    } else {
        points.sort_unstable_by_key(|p| (p.x, p.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dna_fibers_core::BinaryRaster;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn pt(x: i32, y: i32) -> ImagePoint {
        ImagePoint::new(x, y)
    }

    fn params(max_gap: f64, min_length: f64) -> SegmentParams {
        SegmentParams {
            max_gap,
            min_length,
            width_tolerance: 1.0,
        }
    }

    #[test]
    fn vertical_run_becomes_one_segment() {
        let fg: Vec<_> = (-20..=20).map(|y| pt(3, y)).collect();
        let line = HoughPoint::new(0.0, 3.0);
        let segs = segments_along(&fg, line, &params(5.0, 10.0), pt(10, 10));
        assert_eq!(segs, vec![Segment::new(pt(13, -10), pt(13, 30))]);
    }

    #[test]
    fn gap_splits_the_run() {
        let mut fg: Vec<_> = (0..=20).map(|x| pt(x, 0)).collect();
        fg.extend((40..=70).map(|x| pt(x, 0)));
        let line = HoughPoint::new(-FRAC_PI_2, 0.0);
        let segs = segments_along(&fg, line, &params(10.0, 5.0), pt(0, 0));
        assert_eq!(
            segs,
            vec![
                Segment::new(pt(0, 0), pt(20, 0)),
                Segment::new(pt(40, 0), pt(70, 0))
            ]
        );
        // A gap of exactly `max_gap` is bridged.
        let bridged = segments_along(&fg, line, &params(20.0, 5.0), pt(0, 0));
        assert_eq!(bridged, vec![Segment::new(pt(0, 0), pt(70, 0))]);
    }

    #[test]
    fn min_length_boundary_is_inclusive() {
        let fg: Vec<_> = (0..=50).map(|y| pt(0, y)).collect();
        let line = HoughPoint::new(0.0, 0.0);
        let exact = segments_along(&fg, line, &params(2.0, 50.0), pt(0, 0));
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].length(), 50.0);
        assert!(segments_along(&fg, line, &params(2.0, 50.5), pt(0, 0)).is_empty());
    }

    #[test]
    fn pixels_off_the_line_are_ignored() {
        let mut fg: Vec<_> = (0..=30).map(|t| pt(t, t)).collect();
        fg.extend([pt(0, 10), pt(25, 3), pt(5, 30)]);
        let line = HoughPoint::new(-FRAC_PI_4, 0.0);
        let segs = segments_along(&fg, line, &params(3.0, 10.0), pt(0, 0));
        assert_eq!(segs, vec![Segment::new(pt(0, 0), pt(30, 30))]);
    }

    #[test]
    fn fewer_than_two_pixels_give_nothing() {
        let line = HoughPoint::new(0.0, 0.0);
        assert!(segments_along(&[], line, &params(3.0, 1.0), pt(0, 0)).is_empty());
        assert!(segments_along(&[pt(0, 4)], line, &params(3.0, 1.0), pt(0, 0)).is_empty());
    }

    #[test]
    fn every_segment_meets_min_length() {
        let raster = BinaryRaster::from_pixels(
            64,
            64,
            (2..60).filter(|y| y % 9 != 0).map(|y| (20, y)),
        );
        let view = raster.view();
        let p = params(4.0, 6.0);
        let segs = build_segments(
            &view,
            &view.full_roi(),
            &[HoughPoint::new(0.0, -12.0)],
            &p,
            &WorkerPool::global(),
        )
        .expect("segments");
        assert!(!segs.is_empty());
        for s in &segs {
            assert!(s.length() >= p.min_length);
            assert_eq!(s.start.x, 20);
            assert_eq!(s.end.x, 20);
        }
    }

    #[test]
    fn segments_are_grouped_by_line() {
        let raster = BinaryRaster::from_pixels(
            40,
            40,
            (0..40).map(|y| (5, y)).chain((0..40).map(|x| (x, 30))),
        );
        let view = raster.view();
        let lines = [
            HoughPoint::new(0.0, -15.0),
            HoughPoint::new(-FRAC_PI_2 + 1e-9, -10.0),
        ];
        let segs = build_segments(
            &view,
            &view.full_roi(),
            &lines,
            &params(2.0, 20.0),
            &WorkerPool::global(),
        )
        .expect("segments");
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0], Segment::new(pt(5, 0), pt(5, 39)));
        assert_eq!(segs[1].start.y, 30);
        assert_eq!(segs[1].end.y, 30);
    }
}
