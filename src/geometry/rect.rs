use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::{Point2, TOLERANCE};

/// An axis-aligned rectangle.
///
/// `min` is the top-left corner and `max` the bottom-right corner in
/// screen space (y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner.
    pub min: Point2,
    /// Bottom-right corner.
    pub max: Point2,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_corners(Point2::new(x, y), Point2::new(x + width, y + height))
    }

    /// Creates the rectangle spanned by two opposite corners, in any order.
    #[must_use]
    pub fn from_corners(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Square of half-size `half` centered at `center`.
    #[must_use]
    pub fn centered(center: Point2, half: f64) -> Self {
        Self::from_corners(
            Point2::new(center.x - half, center.y - half),
            Point2::new(center.x + half, center.y + half),
        )
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Closed containment test.
    #[must_use]
    pub fn contains_point(&self, p: &Point2) -> bool {
        p.x >= self.min.x - TOLERANCE
            && p.x <= self.max.x + TOLERANCE
            && p.y >= self.min.y - TOLERANCE
            && p.y <= self.max.y + TOLERANCE
    }

    /// Strict interior test.
    #[must_use]
    pub fn strictly_contains_point(&self, p: &Point2) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }

    /// Returns `true` if `other` lies entirely within this rectangle.
    #[must_use]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    /// Closed overlap test: touching rectangles overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// The overlapping region, or `None` when the rectangles are disjoint.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Rect {
            min: Point2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        })
    }

    /// The smallest rectangle enclosing both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Grows the rectangle by `amount` on every side.
    #[must_use]
    pub fn pad(&self, amount: f64) -> Rect {
        Rect {
            min: Point2::new(self.min.x - amount, self.min.y - amount),
            max: Point2::new(self.max.x + amount, self.max.y + amount),
        }
    }

    /// Rounds the corners outward to whole units.
    #[must_use]
    pub fn round_out(&self) -> Rect {
        Rect {
            min: Point2::new(self.min.x.floor(), self.min.y.floor()),
            max: Point2::new(self.max.x.ceil(), self.max.y.ceil()),
        }
    }

    /// Corners in screen-clockwise order starting at the top-left.
    #[must_use]
    pub fn corners(&self) -> [Point2; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }

    /// The four sides as `(start, end)` pairs, screen-clockwise.
    #[must_use]
    pub fn sides(&self) -> [(Point2, Point2); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    /// Returns `true` if the segment `a -> b` touches this rectangle.
    #[must_use]
    pub fn segment_intersects(&self, a: &Point2, b: &Point2) -> bool {
        if self.contains_point(a) || self.contains_point(b) {
            return true;
        }
        self.sides()
            .iter()
            .any(|(s, e)| segment_segment_intersect_2d(a, b, s, e).is_some())
    }
}
