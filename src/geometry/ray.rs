use crate::math::intersect_2d::ray_segment_intersect_2d;
use crate::math::{Point2, Vector2};

/// A directed segment cast from an origin.
///
/// `a` is the origin and `b` the far endpoint; parameters along the ray
/// are expressed as fractions of `b - a`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub a: Point2,
    pub b: Point2,
}

impl Ray {
    #[must_use]
    pub fn new(a: Point2, b: Point2) -> Self {
        Self { a, b }
    }

    /// A ray from `origin` through `target`, extended to `distance`.
    #[must_use]
    pub fn towards_point(origin: Point2, target: &Point2, distance: f64) -> Self {
        let d = target - origin;
        let len = d.norm();
        if len == 0.0 {
            return Self::new(origin, origin);
        }
        Self::new(origin, origin + d * (distance / len))
    }

    /// A ray at `angle` radians (screen space: 0 east, increasing clockwise).
    #[must_use]
    pub fn from_angle(origin: Point2, angle: f64, distance: f64) -> Self {
        Self::new(origin, origin + Vector2::new(angle.cos(), angle.sin()) * distance)
    }

    #[must_use]
    pub fn delta(&self) -> Vector2 {
        self.b - self.a
    }

    #[must_use]
    pub fn distance(&self) -> f64 {
        self.delta().norm()
    }

    /// Angle in radians, screen space.
    #[must_use]
    pub fn angle(&self) -> f64 {
        let d = self.delta();
        d.y.atan2(d.x)
    }

    /// The point at fraction `t` along the ray.
    #[must_use]
    pub fn project(&self, t: f64) -> Point2 {
        self.a + self.delta() * t
    }

    /// Where this ray meets the segment `a -> b`, as `(t, u)` fractions along
    /// the ray and the segment. Hits beyond the far endpoint are ignored.
    #[must_use]
    pub fn intersect_segment(&self, a: &Point2, b: &Point2) -> Option<(f64, f64)> {
        let (t, u) = ray_segment_intersect_2d(&self.a, &self.delta(), a, b)?;
        (t <= 1.0 + crate::math::TOLERANCE).then_some((t, u))
    }
}
