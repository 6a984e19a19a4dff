use crate::math::polygon_2d::{is_convex_2d, point_in_polygon_2d, signed_area_2d};
use crate::math::{orient2d, points_equal, Point2, COLLINEAR_TOLERANCE};

use super::rect::Rect;

/// A closed polygon stored as an open ring of points.
///
/// The closing segment from the last point back to the first is implicit.
/// Points appended with [`Polygon::add_point`] are culled as they arrive:
/// duplicates, collinear middle points and `a, b, a` spikes never survive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    points: Vec<Point2>,
}

impl Polygon {
    /// Creates a polygon from raw points without any culling.
    #[must_use]
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Builds a polygon by adding each point in turn, then closing it.
    #[must_use]
    pub fn from_points_culled(points: impl IntoIterator<Item = Point2>) -> Self {
        let mut poly = Self::default();
        for p in points {
            poly.add_point(p);
        }
        poly.close();
        poly
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[must_use]
    pub fn into_points(self) -> Vec<Point2> {
        self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Point2> {
        self.points.last()
    }

    /// Appends a boundary point.
    ///
    /// A point within [`crate::math::MIN_POINT_SPACING`] of the previous
    /// one is ignored. If the last three points then form a spike or lie on
    /// one line, the middle point is dropped.
    pub fn add_point(&mut self, p: Point2) {
        if self.points.last().is_some_and(|last| points_equal(last, &p)) {
            return;
        }
        self.points.push(p);
        while self.points.len() >= 3 {
            let n = self.points.len();
            let (a, b, c) = (self.points[n - 3], self.points[n - 2], self.points[n - 1]);
            if points_equal(&a, &c) {
                self.points.truncate(n - 2);
            } else if is_collinear(&a, &b, &c) {
                self.points.remove(n - 2);
            } else {
                break;
            }
        }
    }

    /// Applies the same culling across the seam between the last and first
    /// points.
    pub fn close(&mut self) {
        loop {
            let n = self.points.len();
            if n < 3 {
                break;
            }
            let (first, second) = (self.points[0], self.points[1]);
            let (prev, last) = (self.points[n - 2], self.points[n - 1]);
            if points_equal(&last, &first) || points_equal(&prev, &first) {
                self.points.pop();
            } else if is_collinear(&prev, &last, &first) {
                self.points.pop();
            } else if points_equal(&last, &second) || is_collinear(&last, &first, &second) {
                self.points.remove(0);
            } else {
                break;
            }
        }
    }

    /// Signed shoelace area, positive when wound clockwise on screen.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.points)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Returns `true` when the ring winds clockwise on screen.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Reverses the winding of the ring in place.
    pub fn reverse_orientation(&mut self) {
        self.points.reverse();
    }

    /// Even-odd containment; boundary points are contained.
    #[must_use]
    pub fn contains_point(&self, p: &Point2) -> bool {
        point_in_polygon_2d(&self.points, p)
    }

    #[must_use]
    pub fn is_convex(&self) -> bool {
        is_convex_2d(&self.points)
    }

    /// Axis-aligned bounds, or `None` for an empty polygon.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let first = self.points.first()?;
        Some(
            self.points
                .iter()
                .fold(Rect::from_corners(*first, *first), |r, p| {
                    r.union(&Rect::from_corners(*p, *p))
                }),
        )
    }
}

/// Perpendicular distance of `b` from the line `a -> c` within tolerance.
fn is_collinear(a: &Point2, b: &Point2, c: &Point2) -> bool {
    let len = (c - a).norm();
    orient2d(a, c, b).abs() <= COLLINEAR_TOLERANCE * len
}
