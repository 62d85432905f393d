//! Periodic padding of the angular axis.
//!
//! Lines with θ close to one end of `[inf, sup)` are the same lines as those
//! just past the other end. Copying them across lets mean-shift see a
//! continuous density at the wrap-around.

use dna_fibers_core::HoughPoint;

/// Number of angular bandwidths treated as "close to the border".
const BORDER_BANDWIDTHS: f64 = 5.0;

/// All `points`, followed by shifted copies of those near either angular bound.
///
/// A point with `θ ≥ sup − 5h` is copied to `θ − (sup − inf)` and a point with
/// `θ ≤ inf + 5h` to `θ + (sup − inf)`. Copies keep `ρ`, or negate it when
/// `inverse_sign` is set. A point close to both bounds is copied twice.
pub fn replicate_borders(
    points: &[HoughPoint],
    angular_bandwidth: f64,
    sup_bound: f64,
    inf_bound: f64,
    inverse_sign: bool,
) -> Vec<HoughPoint> {
    let range = sup_bound - inf_bound;
    let margin = BORDER_BANDWIDTHS * angular_bandwidth;
    let sign = if inverse_sign { -1.0 } else { 1.0 };

    let mut out = points.to_vec();
    for p in points {
        if p.theta >= sup_bound - margin {
            out.push(HoughPoint::new(p.theta - range, sign * p.rho));
        }
        if p.theta <= inf_bound + margin {
            out.push(HoughPoint::new(p.theta + range, sign * p.rho));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn eight_points() -> Vec<HoughPoint> {
        [-2.9, -2.5, -2.0, -1.0, 1.0, 2.0, 2.5, 2.9]
            .iter()
            .enumerate()
            .map(|(i, &t)| HoughPoint::new(t, i as f64 + 1.0))
            .collect()
    }

    #[test]
    fn narrow_bandwidth_copies_only_extreme_points() {
        let pts = eight_points();
        let out = replicate_borders(&pts, 0.05, 3.0, -3.0, false);
        assert_eq!(out.len(), 10);
        assert_eq!(&out[..8], &pts[..]);
        assert_abs_diff_eq!(out[8].theta, 3.1, epsilon = 1e-12);
        assert_eq!(out[8].rho, 1.0);
        assert_abs_diff_eq!(out[9].theta, -3.1, epsilon = 1e-12);
        assert_eq!(out[9].rho, 8.0);
    }

    #[test]
    fn wide_bandwidth_copies_every_point_once() {
        let pts = eight_points();
        let out = replicate_borders(&pts, 0.6, 3.0, -3.0, true);
        assert_eq!(out.len(), 16);
        for copy in &out[8..] {
            assert!(copy.theta.abs() > 3.0);
            assert!(copy.rho < 0.0);
        }
    }

    #[test]
    fn inverse_sign_negates_rho_of_copies_only() {
        let pts = vec![HoughPoint::new(1.5, 7.0)];
        let (upper, lower) = (std::f64::consts::FRAC_PI_2, -std::f64::consts::FRAC_PI_2);
        let out = replicate_borders(&pts, 0.1, upper, lower, true);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], pts[0]);
        assert_abs_diff_eq!(out[1].theta, 1.5 - std::f64::consts::PI, epsilon = 1e-12);
        assert_eq!(out[1].rho, -7.0);
    }

    #[test]
    fn no_points_no_copies() {
        assert!(replicate_borders(&[], 0.1, 1.0, -1.0, false).is_empty());
    }
}
