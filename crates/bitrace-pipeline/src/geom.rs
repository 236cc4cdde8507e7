//! Scalar 2D geometry kernel.
//!
//! Vectors are represented as [`Point`]s (or [`PixelPoint`]s on the
//! integer grid). All functions are pure.

use crate::types::{PixelPoint, Point};

/// Dot product of two vectors.
#[must_use]
pub fn dot(a: Point, b: Point) -> f64 {
    a.x.mul_add(b.x, a.y * b.y)
}

/// Z component of the cross product of two vectors.
///
/// Positive when `b` lies counter-clockwise of `a` in a y-up frame.
#[must_use]
pub fn cross(a: Point, b: Point) -> f64 {
    a.x.mul_add(b.y, -(a.y * b.x))
}

/// Exact integer cross product of two grid vectors.
#[must_use]
pub fn cross_grid(a: PixelPoint, b: PixelPoint) -> i64 {
    i64::from(a.x) * i64::from(b.y) - i64::from(a.y) * i64::from(b.x)
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    a.distance(b)
}

/// Chebyshev (max-norm) distance between two points.
#[must_use]
pub fn max_norm_distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Linear interpolation from `a` (`t = 0`) to `b` (`t = 1`).
#[must_use]
pub fn lerp(a: Point, b: Point, t: f64) -> Point {
    a.lerp(b, t)
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
///
/// Falls back to the distance from `p` to `a` when the line is degenerate.
#[must_use]
pub fn point_line_distance(a: Point, b: Point, p: Point) -> f64 {
    let ab = Point::new(b.x - a.x, b.y - a.y);
    let len = ab.x.hypot(ab.y);
    if len == 0.0 {
        return a.distance(p);
    }
    let ap = Point::new(p.x - a.x, p.y - a.y);
    cross(ab, ap).abs() / len
}

/// Max-norm distance from `p` to the closest point of segment `a`-`b`.
///
/// The closest point is found by Euclidean projection clamped to the
/// segment; a degenerate segment measures against `a`.
#[must_use]
pub fn point_segment_distance(a: Point, b: Point, p: Point) -> f64 {
    let ab = Point::new(b.x - a.x, b.y - a.y);
    let len_sq = dot(ab, ab);
    if len_sq == 0.0 {
        return max_norm_distance(a, p);
    }
    let ap = Point::new(p.x - a.x, p.y - a.y);
    let t = (dot(ab, ap) / len_sq).clamp(0.0, 1.0);
    let closest = Point::new(t.mul_add(ab.x, a.x), t.mul_add(ab.y, a.y));
    max_norm_distance(closest, p)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn dot_and_cross() {
        let a = Point::new(1.0, 0.0);
        let b = Point::new(0.0, 1.0);
        assert!(dot(a, b).abs() < EPS);
        assert!((cross(a, b) - 1.0).abs() < EPS);
        assert!((cross(b, a) + 1.0).abs() < EPS);
        assert!((dot(Point::new(2.0, 3.0), Point::new(4.0, -1.0)) - 5.0).abs() < EPS);
    }

    #[test]
    fn grid_cross_matches_float_cross() {
        let a = PixelPoint::new(3, -2);
        let b = PixelPoint::new(-1, 5);
        assert_eq!(cross_grid(a, b), 13);
        assert!((cross(a.to_point(), b.to_point()) - 13.0).abs() < EPS);
    }

    #[test]
    fn grid_cross_does_not_overflow() {
        let a = PixelPoint::new(i32::MAX, 0);
        let b = PixelPoint::new(0, i32::MAX);
        assert_eq!(cross_grid(a, b), i64::from(i32::MAX) * i64::from(i32::MAX));
    }

    #[test]
    fn line_distance_is_perpendicular() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        // Beyond the end of the segment, still measured to the line.
        assert!((point_line_distance(a, b, Point::new(20.0, 3.0)) - 3.0).abs() < EPS);
    }

    #[test]
    fn line_distance_degenerate_line() {
        let a = Point::new(1.0, 1.0);
        assert!((point_line_distance(a, a, Point::new(4.0, 5.0)) - 5.0).abs() < EPS);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_segment_distance(a, b, Point::new(5.0, 2.0)) - 2.0).abs() < EPS);
        // Past `b`: closest point is `b`, max-norm of (3, 1) is 3.
        assert!((point_segment_distance(a, b, Point::new(13.0, 1.0)) - 3.0).abs() < EPS);
    }

    #[test]
    fn segment_distance_vanishes_on_grid_segments() {
        let a = Point::new(1.0, 1.0);
        let b = Point::new(4.0, 1.0);
        for x in [1.0, 2.0, 3.0, 4.0] {
            let d = point_segment_distance(a, b, Point::new(x, 1.0));
            assert!(d.abs() < EPS, "x = {x}: {d}");
        }
        let c = Point::new(1.0, 8.0);
        for y in [2.0, 5.0, 7.0] {
            let d = point_segment_distance(a, c, Point::new(1.0, y));
            assert!(d.abs() < EPS, "y = {y}: {d}");
        }
    }

    #[test]
    fn segment_distance_uses_max_norm() {
        let a = Point::new(0.0, 0.0);
        assert!((point_segment_distance(a, a, Point::new(3.0, 4.0)) - 4.0).abs() < EPS);
    }

    #[test]
    fn lerp_and_distance_wrappers() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(6.0, 8.0);
        assert_eq!(lerp(a, b, 0.5), Point::new(3.0, 4.0));
        assert!((distance(a, b) - 10.0).abs() < EPS);
        assert!((max_norm_distance(a, b) - 8.0).abs() < EPS);
    }
}
