use crate::error::{ClipError, Result};
use crate::math::intersect_2d::{closest_point_on_segment, segment_segment_intersect_2d};
use crate::math::{points_equal, Point2, TOLERANCE};

use super::circle::Circle;
use super::polygon::Polygon;
use super::rect::Rect;

/// A convex region usable as the clip operand of a Weiler-Atherton combine.
///
/// Boundary walks always run clockwise on screen, matching the winding of
/// the polygons produced by the sweep.
pub trait ClipShape {
    /// Closed containment: boundary points are contained.
    fn contains(&self, p: &Point2) -> bool;

    /// Crossings of the segment `a -> b` with the boundary as
    /// `(point, t)` pairs sorted by `t`.
    fn segment_intersections(&self, a: &Point2, b: &Point2) -> Vec<(Point2, f64)>;

    /// Boundary points strictly between `a` and `b`, both on the boundary,
    /// walking clockwise on screen from `a`.
    fn points_between(&self, a: &Point2, b: &Point2) -> Vec<Point2>;

    /// The whole boundary as a positively wound polygon.
    fn to_polygon(&self) -> Polygon;

    /// A point known to be strictly inside the shape.
    fn interior_point(&self) -> Point2;

    /// Position of boundary point `p` as a fraction of one clockwise loop,
    /// in `[0, 1)`.
    fn boundary_parameter(&self, p: &Point2) -> f64;
}

/// A validated convex polygon, wound clockwise on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPolygon {
    points: Vec<Point2>,
}

impl ConvexPolygon {
    /// Validates convexity and normalizes the winding.
    ///
    /// # Errors
    ///
    /// Returns `ClipError::TooFewPoints` for fewer than 3 points and
    /// `ClipError::NonConvexClipShape` if the ring is not convex.
    pub fn new(polygon: &Polygon) -> Result<Self> {
        if polygon.len() < 3 {
            return Err(ClipError::TooFewPoints(polygon.len()).into());
        }
        if !polygon.is_convex() {
            return Err(ClipError::NonConvexClipShape.into());
        }
        let mut points = polygon.points().to_vec();
        if !polygon.is_positive() {
            points.reverse();
        }
        Ok(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }
}

impl ClipShape for ConvexPolygon {
    fn contains(&self, p: &Point2) -> bool {
        Polygon::new(self.points.clone()).contains_point(p)
    }

    fn segment_intersections(&self, a: &Point2, b: &Point2) -> Vec<(Point2, f64)> {
        ring_segment_intersections(&self.points, a, b)
    }

    fn points_between(&self, a: &Point2, b: &Point2) -> Vec<Point2> {
        ring_points_between(&self.points, a, b)
    }

    fn to_polygon(&self) -> Polygon {
        Polygon::new(self.points.clone())
    }

    #[allow(clippy::cast_precision_loss)]
    fn interior_point(&self) -> Point2 {
        let n = self.points.len() as f64;
        let sum = self
            .points
            .iter()
            .fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
        Point2::from(sum / n)
    }

    fn boundary_parameter(&self, p: &Point2) -> f64 {
        ring_parameter(&self.points, p)
    }
}

impl ClipShape for Rect {
    fn contains(&self, p: &Point2) -> bool {
        self.contains_point(p)
    }

    fn segment_intersections(&self, a: &Point2, b: &Point2) -> Vec<(Point2, f64)> {
        ring_segment_intersections(&self.corners(), a, b)
    }

    fn points_between(&self, a: &Point2, b: &Point2) -> Vec<Point2> {
        ring_points_between(&self.corners(), a, b)
    }

    fn to_polygon(&self) -> Polygon {
        Polygon::new(self.corners().to_vec())
    }

    fn interior_point(&self) -> Point2 {
        self.center()
    }

    fn boundary_parameter(&self, p: &Point2) -> f64 {
        ring_parameter(&self.corners(), p)
    }
}

/// Crossings of `a -> b` with every side of a ring, deduplicated where the
/// segment passes through a ring vertex.
fn ring_segment_intersections(ring: &[Point2], a: &Point2, b: &Point2) -> Vec<(Point2, f64)> {
    let n = ring.len();
    let mut hits: Vec<(Point2, f64)> = Vec::new();
    for i in 0..n {
        let (s, e) = (&ring[i], &ring[(i + 1) % n]);
        if let Some((pt, t, _)) = segment_segment_intersect_2d(a, b, s, e) {
            if !hits.iter().any(|(h, _)| points_equal(h, &pt)) {
                hits.push((pt, t));
            }
        }
    }
    hits.sort_by(|x, y| x.1.total_cmp(&y.1));
    hits
}

/// Index of the ring side nearest to `p` and the fraction along it.
fn locate_on_ring(ring: &[Point2], p: &Point2) -> (usize, f64) {
    let n = ring.len();
    let mut best = (0, 0.0, f64::INFINITY);
    for i in 0..n {
        let (s, e) = (&ring[i], &ring[(i + 1) % n]);
        let c = closest_point_on_segment(p, s, e);
        let d = (p - c).norm();
        if d < best.2 - TOLERANCE {
            let len = (e - s).norm();
            let t = if len > 0.0 { (c - s).norm() / len } else { 0.0 };
            best = (i, t, d);
        }
    }
    (best.0, best.1)
}

#[allow(clippy::cast_precision_loss)]
fn ring_parameter(ring: &[Point2], p: &Point2) -> f64 {
    let (i, t) = locate_on_ring(ring, p);
    ((i as f64 + t) / ring.len() as f64).rem_euclid(1.0)
}

/// Ring vertices strictly between boundary points `a` and `b`, walking
/// forward along the ring.
fn ring_points_between(ring: &[Point2], a: &Point2, b: &Point2) -> Vec<Point2> {
    let n = ring.len();
    if n == 0 {
        return Vec::new();
    }
    let (ia, ta) = locate_on_ring(ring, a);
    let (ib, tb) = locate_on_ring(ring, b);
    if ia == ib && ta <= tb {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut i = (ia + 1) % n;
    loop {
        let p = ring[i];
        if !points_equal(&p, a) && !points_equal(&p, b) {
            out.push(p);
        }
        if i == ib {
            break;
        }
        i = (i + 1) % n;
    }
    out
}

/// A boundary that caps a sweep and may later clip its polygon.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BoundaryShape {
    #[default]
    Unbounded,
    Circle(Circle),
    Rectangle(Rect),
    Polygon(Polygon),
}

impl BoundaryShape {
    /// Axis-aligned bounds, `None` when unbounded.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Unbounded => None,
            Self::Circle(c) => Some(c.bounds()),
            Self::Rectangle(r) => Some(*r),
            Self::Polygon(p) => p.bounds(),
        }
    }

    /// The clip operand for this boundary, `None` when unbounded.
    ///
    /// # Errors
    ///
    /// Returns a `ClipError` when a polygon boundary is not convex.
    pub fn clip_object(&self) -> Result<Option<ClipObject>> {
        Ok(match self {
            Self::Unbounded => None,
            Self::Circle(c) => Some(ClipObject::Circle(*c)),
            Self::Rectangle(r) => Some(ClipObject::Rectangle(*r)),
            Self::Polygon(p) => Some(ClipObject::Convex(ConvexPolygon::new(p)?)),
        })
    }
}

/// A convex clip operand derived from a [`BoundaryShape`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClipObject {
    Circle(Circle),
    Rectangle(Rect),
    Convex(ConvexPolygon),
}

impl ClipShape for ClipObject {
    fn contains(&self, p: &Point2) -> bool {
        match self {
            Self::Circle(c) => c.contains(p),
            Self::Rectangle(r) => ClipShape::contains(r, p),
            Self::Convex(c) => c.contains(p),
        }
    }

    fn segment_intersections(&self, a: &Point2, b: &Point2) -> Vec<(Point2, f64)> {
        match self {
            Self::Circle(c) => c.segment_intersections(a, b),
            Self::Rectangle(r) => r.segment_intersections(a, b),
            Self::Convex(c) => c.segment_intersections(a, b),
        }
    }

    fn points_between(&self, a: &Point2, b: &Point2) -> Vec<Point2> {
        match self {
            Self::Circle(c) => c.points_between(a, b),
            Self::Rectangle(r) => r.points_between(a, b),
            Self::Convex(c) => c.points_between(a, b),
        }
    }

    fn to_polygon(&self) -> Polygon {
        match self {
            Self::Circle(c) => c.to_polygon(),
            Self::Rectangle(r) => r.to_polygon(),
            Self::Convex(c) => c.to_polygon(),
        }
    }

    fn interior_point(&self) -> Point2 {
        match self {
            Self::Circle(c) => c.interior_point(),
            Self::Rectangle(r) => r.interior_point(),
            Self::Convex(c) => c.interior_point(),
        }
    }

    fn boundary_parameter(&self, p: &Point2) -> f64 {
        match self {
            Self::Circle(c) => c.boundary_parameter(p),
            Self::Rectangle(r) => r.boundary_parameter(p),
            Self::Convex(c) => c.boundary_parameter(p),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rect_points_between_walks_clockwise() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        // From the top side to the bottom side passes the two right corners.
        let pts = r.points_between(&Point2::new(5.0, 0.0), &Point2::new(5.0, 10.0));
        assert_eq!(pts, vec![Point2::new(10.0, 0.0), Point2::new(10.0, 10.0)]);
        // Same side, forward: nothing between.
        assert!(r
            .points_between(&Point2::new(2.0, 0.0), &Point2::new(8.0, 0.0))
            .is_empty());
        // Same side, backward: the full loop.
        assert_eq!(
            r.points_between(&Point2::new(8.0, 0.0), &Point2::new(2.0, 0.0))
                .len(),
            4
        );
    }

    #[test]
    fn rect_segment_through_corner_reports_once() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let hits = r.segment_intersections(&Point2::new(-5.0, -5.0), &Point2::new(5.0, 5.0));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn rect_boundary_parameter_runs_clockwise() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let top = r.boundary_parameter(&Point2::new(5.0, 0.0));
        let right = r.boundary_parameter(&Point2::new(10.0, 5.0));
        let bottom = r.boundary_parameter(&Point2::new(5.0, 10.0));
        let left = r.boundary_parameter(&Point2::new(0.0, 5.0));
        assert!(top < right && right < bottom && bottom < left && left < 1.0);
        assert!((top - 0.125).abs() < 1e-12);
    }

    #[test]
    fn non_convex_polygon_rejected() {
        let dart = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 4.0),
        ]);
        let err = BoundaryShape::Polygon(dart).clip_object().unwrap_err();
        assert!(matches!(
            err,
            crate::error::SightlineError::Clip(ClipError::NonConvexClipShape)
        ));
    }

    #[test]
    fn convex_polygon_normalized_to_positive() {
        let tri = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 4.0),
            Point2::new(4.0, 0.0),
        ]);
        let convex = ConvexPolygon::new(&tri).unwrap();
        assert!(convex.to_polygon().is_positive());
        assert!(convex.contains(&convex.interior_point()));
    }
}
