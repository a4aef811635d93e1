//! Shared 2D geometry for hit-testing and gesture math.
//!
//! All angles are in degrees. Canvas space is y-down, so a positive angle
//! turns a point clockwise on screen, matching how the overlay is drawn.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point (or offset) in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Rotates `point` about `pivot` by `angle_deg`.
pub fn rotate_point(point: Point, pivot: Point, angle_deg: f64) -> Point {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let dx = point.x - pivot.x;
    let dy = point.y - pivot.y;
    Point::new(
        pivot.x + dx * cos - dy * sin,
        pivot.y + dx * sin + dy * cos,
    )
}

/// Direction from `center` to `point`, in degrees within (-180, 180].
pub fn angle_between(center: Point, point: Point) -> f64 {
    (point.y - center.y).atan2(point.x - center.x).to_degrees()
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Maps any angle onto [0, 360).
pub fn normalize_degrees(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_rotate_point_quarter_turn_is_clockwise() {
        // +x rotated 90 degrees lands on +y, which is "down" on a canvas
        let rotated = rotate_point(Point::new(10.0, 0.0), Point::default(), 90.0);
        assert_close(rotated, Point::new(0.0, 10.0));
    }

    #[test]
    fn test_rotate_point_about_pivot() {
        let pivot = Point::new(100.0, 100.0);
        let rotated = rotate_point(Point::new(150.0, 100.0), pivot, 180.0);
        assert_close(rotated, Point::new(50.0, 100.0));
    }

    #[test]
    fn test_rotate_point_inverse() {
        let pivot = Point::new(12.0, -4.0);
        let p = Point::new(31.5, 7.25);
        let back = rotate_point(rotate_point(p, pivot, 37.0), pivot, -37.0);
        assert_close(back, p);
    }

    #[test]
    fn test_angle_between() {
        let c = Point::new(5.0, 5.0);
        assert!((angle_between(c, Point::new(10.0, 5.0)) - 0.0).abs() < EPS);
        assert!((angle_between(c, Point::new(5.0, 10.0)) - 90.0).abs() < EPS);
        assert!((angle_between(c, Point::new(0.0, 5.0)) - 180.0).abs() < EPS);
        assert!((angle_between(c, Point::new(5.0, 0.0)) + 90.0).abs() < EPS);
    }

    #[test]
    fn test_distance() {
        assert!((distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)) - 5.0).abs() < EPS);
        assert_eq!(distance(Point::new(2.0, 2.0), Point::new(2.0, 2.0)), 0.0);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert!(normalize_degrees(-1e-20) < 360.0);
    }
}
