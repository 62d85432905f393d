//! Robust line estimate through one anchor pixel.
//!
//! Every neighbor defines a line through the anchor. Line directions are axial
//! (θ and θ + π are the same line), so the estimate is a median taken on the
//! half circle centered at the axial mean of the neighbor angles. The median
//! ignores the neighbors that belong to crossing fibers or noise as long as
//! they are a minority.

use std::f64::consts::{FRAC_PI_2, PI};

use dna_fibers_core::{HoughPoint, ImagePoint};
use nalgebra::Vector2;

/// Resultants shorter than this have no usable mean direction.
const MIN_RESULTANT: f64 = 1e-12;

/// Candidate position on the unwrapped angle axis and the line angle it stands for.
#[derive(Clone, Copy, Debug)]
struct AxialSample {
    unwrapped: f64,
    theta: f64,
}

/// Foreground points other than `anchor` within `window_size` pixels of it.
pub fn neighborhood(
    points: &[ImagePoint],
    anchor: ImagePoint,
    window_size: u32,
) -> Vec<ImagePoint> {
    let reach = i64::from(window_size) * i64::from(window_size);
    points
        .iter()
        .copied()
        .filter(|&q| q != anchor && anchor.squared_distance(q) <= reach)
        .collect()
}

/// Line through `anchor` that best agrees with its `neighbors`.
///
/// The returned angle is one of the anchor-to-neighbor angles, so it stays in
/// `[−π/2, π/2)`, and `ρ` is the anchor's projection on that normal. `None`
/// when there are no neighbors.
pub fn estimate_local_line(anchor: ImagePoint, neighbors: &[ImagePoint]) -> Option<HoughPoint> {
    if neighbors.is_empty() {
        return None;
    }
    let angles: Vec<f64> = neighbors.iter().map(|&q| anchor.line_angle(q)).collect();

    let center = axial_mean(&angles);
    let (lo, hi) = (center - FRAC_PI_2, center + FRAC_PI_2);
    let mut window: Vec<AxialSample> = angles
        .iter()
        .flat_map(|&theta| {
            [
                AxialSample {
                    unwrapped: theta,
                    theta,
                },
                AxialSample {
                    unwrapped: theta + PI,
                    theta,
                },
            ]
        })
        .filter(|s| s.unwrapped >= lo && s.unwrapped <= hi)
        .collect();
    if window.is_empty() {
        return None;
    }
    window.sort_by(|a, b| a.unwrapped.total_cmp(&b.unwrapped));

    let theta = window[(window.len() - 1) / 2].theta;
    let (sin, cos) = theta.sin_cos();
    Some(HoughPoint::new(
        theta,
        f64::from(anchor.x) * cos + f64::from(anchor.y) * sin,
    ))
}

/// Axial mean of `angles`, in `[0, π)`.
///
/// Computed on the doubled angles `2θ + π`; a vanishing resultant (perfectly
/// balanced directions) falls back to `0`.
fn axial_mean(angles: &[f64]) -> f64 {
    let resultant: Vector2<f64> = angles
        .iter()
        .map(|&theta| {
            let (s, c) = (2.0 * theta + PI).sin_cos();
            Vector2::new(c, s)
        })
        .sum();
    if resultant.norm() <= MIN_RESULTANT * angles.len() as f64 {
        return 0.0;
    }
    let mean = 0.5 * (-resultant.y).atan2(-resultant.x);
    if mean < 0.0 {
        mean + PI
    } else {
        mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use dna_fibers_core::convert_image_points_to_hough_point;
    use std::f64::consts::FRAC_PI_4;

    fn pt(x: i32, y: i32) -> ImagePoint {
        ImagePoint::new(x, y)
    }

    #[test]
    fn no_neighbors_no_estimate() {
        assert!(estimate_local_line(pt(3, 4), &[]).is_none());
    }

    #[test]
    fn vertical_run_gives_zero_angle() {
        let anchor = pt(-4, 0);
        let neighbors: Vec<_> = (-5..=5).filter(|&y| y != 0).map(|y| pt(-4, y)).collect();
        let h = estimate_local_line(anchor, &neighbors).expect("estimate");
        assert_eq!(h.theta, 0.0);
        assert_abs_diff_eq!(h.rho, -4.0, epsilon = 1e-12);
    }

    #[test]
    fn diagonal_run_gives_minus_quarter_pi() {
        let anchor = pt(2, 2);
        let neighbors: Vec<_> = (-3..=7).filter(|&t| t != 2).map(|t| pt(t, t)).collect();
        let h = estimate_local_line(anchor, &neighbors).expect("estimate");
        assert_abs_diff_eq!(h.theta, -FRAC_PI_4, epsilon = 1e-12);
        assert_abs_diff_eq!(h.rho, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn majority_line_wins_over_crossing_pixels() {
        let anchor = pt(0, 0);
        let mut neighbors: Vec<_> = (-8..=8).filter(|&y| y != 0).map(|y| pt(0, y)).collect();
        neighbors.extend([pt(3, 1), pt(-2, 5), pt(4, -4), pt(6, 2)]);
        let h = estimate_local_line(anchor, &neighbors).expect("estimate");
        assert_eq!(h.theta, 0.0);
    }

    #[test]
    fn angles_near_the_wrap_are_treated_as_one_direction() {
        // Nearly horizontal neighbors on both sides of ±π/2.
        let anchor = pt(0, 0);
        let neighbors = [pt(20, 1), pt(-20, 1), pt(20, -1), pt(-20, -1), pt(19, 1)];
        let h = estimate_local_line(anchor, &neighbors).expect("estimate");
        assert!(h.theta.abs() > 1.4, "theta {} should be near ±π/2", h.theta);
        assert!((-FRAC_PI_2..FRAC_PI_2).contains(&h.theta));
    }

    #[test]
    fn even_window_takes_the_lower_median() {
        // Angles 0 and −π/4 re-center around 7π/8 as π and 3π/4.
        let anchor = pt(2, 1);
        let h = estimate_local_line(anchor, &[pt(2, 6), pt(7, 6)]).expect("estimate");
        assert_abs_diff_eq!(h.theta, -FRAC_PI_4, epsilon = 1e-12);
        assert_abs_diff_eq!(h.rho, FRAC_PI_4.cos(), epsilon = 1e-12);

        let reversed = estimate_local_line(anchor, &[pt(7, 6), pt(2, 6)]).expect("estimate");
        assert_eq!(reversed, h);
    }

    #[test]
    fn three_point_estimates_are_pairwise_lines() {
        let pts = [pt(0, -7), pt(5, 2), pt(-6, 5)];
        for (i, &anchor) in pts.iter().enumerate() {
            let others: Vec<_> = pts
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, &p)| p)
                .collect();
            let h = estimate_local_line(anchor, &others).expect("estimate");
            let matches = others.iter().any(|&q| {
                let expected = convert_image_points_to_hough_point(anchor, q);
                (expected.theta - h.theta).abs() < 1e-9 && (expected.rho - h.rho).abs() < 1e-9
            });
            assert!(matches, "anchor {anchor:?} gave {h:?}");
        }
    }

    #[test]
    fn neighborhood_excludes_anchor_and_far_points() {
        let pts = [pt(0, 0), pt(3, 4), pt(6, 8), pt(-5, 0), pt(0, 6)];
        let near = neighborhood(&pts, pt(0, 0), 5);
        assert_eq!(near, vec![pt(3, 4), pt(-5, 0)]);
    }
}
