//! Integer image points, Hesse-normal-form lines and the segments joining them.
//!
//! A [`HoughPoint`] `(θ, ρ)` describes the line `x·cos θ + y·sin θ = ρ`. Angles
//! live in `[−π/2, π/2)` and `ρ` is fixed by convention: the same line is never
//! re-expressed with a flipped sign.

use std::f64::consts::FRAC_PI_2;
use std::ops::{Add, Sub};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Tolerance used when intersecting a line with the raster border.
const CLIP_EPS: f64 = 1e-9;

/// Integer pixel position, usually relative to an origin such as the raster center.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: i32,
    pub y: i32,
}

impl ImagePoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn squared_distance(self, other: Self) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        (self.squared_distance(other) as f64).sqrt()
    }

    /// Normal angle of the line through `self` and `other`.
    ///
    /// Vertical pairs (equal `x`) map to `0`, horizontal pairs to `−π/2`, and
    /// everything else to `−atan(Δx / Δy)`, which always lies in `(−π/2, π/2)`.
    #[inline]
    pub fn line_angle(self, other: Self) -> f64 {
        let a = self.x - other.x;
        let b = self.y - other.y;
        if a == 0 {
            0.0
        } else if b == 0 {
            -FRAC_PI_2
        } else {
            -(f64::from(a) / f64::from(b)).atan()
        }
    }
}

impl Add for ImagePoint {
    type Output = ImagePoint;

    fn add(self, rhs: Self) -> Self::Output {
        ImagePoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for ImagePoint {
    type Output = ImagePoint;

    fn sub(self, rhs: Self) -> Self::Output {
        ImagePoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Line in Hesse normal form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HoughPoint {
    /// Normal angle in radians.
    pub theta: f64,
    /// Signed offset from the origin along the normal.
    pub rho: f64,
}

impl HoughPoint {
    pub const fn new(theta: f64, rho: f64) -> Self {
        Self { theta, rho }
    }

    #[inline]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.theta, self.rho)
    }

    #[inline]
    pub fn from_vector(v: Vector2<f64>) -> Self {
        Self::new(v.x, v.y)
    }

    #[inline]
    pub fn squared_distance(self, other: Self) -> f64 {
        (self.to_vector() - other.to_vector()).norm_squared()
    }

    #[inline]
    pub fn distance(self, other: Self) -> f64 {
        self.squared_distance(other).sqrt()
    }

    /// Signed residual `x·cos θ + y·sin θ − ρ` of `p` against this line.
    #[inline]
    pub fn residual(self, p: ImagePoint) -> f64 {
        let (sin, cos) = self.theta.sin_cos();
        f64::from(p.x) * cos + f64::from(p.y) * sin - self.rho
    }

    /// Visible chord of this line inside a `width × height` raster.
    ///
    /// The line is expressed relative to `origin`; the returned segment is in
    /// absolute raster coordinates. `None` when the line misses the raster.
    pub fn clip_to_raster(
        self,
        width: usize,
        height: usize,
        origin: ImagePoint,
    ) -> Option<Segment> {
        if width == 0 || height == 0 {
            return None;
        }
        let (sin, cos) = self.theta.sin_cos();
        let x_min = -f64::from(origin.x);
        let x_max = (width - 1) as f64 - f64::from(origin.x);
        let y_min = -f64::from(origin.y);
        let y_max = (height - 1) as f64 - f64::from(origin.y);

        let mut hits: Vec<Vector2<f64>> = Vec::with_capacity(4);
        if sin.abs() > CLIP_EPS {
            for x in [x_min, x_max] {
                let y = (self.rho - x * cos) / sin;
                if y >= y_min - CLIP_EPS && y <= y_max + CLIP_EPS {
                    hits.push(Vector2::new(x, y));
                }
            }
        }
        if cos.abs() > CLIP_EPS {
            for y in [y_min, y_max] {
                let x = (self.rho - y * sin) / cos;
                if x >= x_min - CLIP_EPS && x <= x_max + CLIP_EPS {
                    hits.push(Vector2::new(x, y));
                }
            }
        }

        let mut best: Option<(Vector2<f64>, Vector2<f64>, f64)> = None;
        for (i, a) in hits.iter().enumerate() {
            for b in &hits[i..] {
                let d2 = (a - b).norm_squared();
                if best.is_none_or(|(_, _, best_d2)| d2 > best_d2) {
                    best = Some((*a, *b, d2));
                }
            }
        }

        let to_pixel = |v: Vector2<f64>| {
            let x = (v.x + f64::from(origin.x)).round().clamp(0.0, (width - 1) as f64);
            let y = (v.y + f64::from(origin.y)).round().clamp(0.0, (height - 1) as f64);
            ImagePoint::new(x as i32, y as i32)
        };
        best.map(|(a, b, _)| Segment::new(to_pixel(a), to_pixel(b)))
    }
}

/// Straight segment between two image points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: ImagePoint,
    pub end: ImagePoint,
}

impl Segment {
    pub const fn new(start: ImagePoint, end: ImagePoint) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn squared_length(&self) -> i64 {
        self.start.squared_distance(self.end)
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }
}

/// Hesse-normal-form line through two image points.
///
/// Vertical pairs give `(0, p1.x)` and horizontal pairs `(−π/2, p1.y)`. Any
/// other pair gives `θ = −atan(Δx / Δy)` and the mean of both points'
/// projections onto the normal as `ρ`. The result does not depend on the
/// argument order.
pub fn convert_image_points_to_hough_point(p1: ImagePoint, p2: ImagePoint) -> HoughPoint {
    if p1.x == p2.x {
        return HoughPoint::new(0.0, f64::from(p1.x));
    }
    if p1.y == p2.y {
        return HoughPoint::new(-FRAC_PI_2, f64::from(p1.y));
    }
    let theta = p1.line_angle(p2);
    let (sin, cos) = theta.sin_cos();
    let project = |p: ImagePoint| f64::from(p.x) * cos + f64::from(p.y) * sin;
    HoughPoint::new(theta, 0.5 * (project(p1) + project(p2)))
}
