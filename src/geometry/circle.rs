use std::f64::consts::{PI, TAU};

use crate::error::{GeometryError, Result};
use crate::math::intersect_2d::segment_circle_intersect_2d;
use crate::math::{Point2, Vector2, TOLERANCE};

use super::polygon::Polygon;
use super::rect::Rect;
use super::shape::ClipShape;

/// A circle in the plane, approximated by a regular polygon when it has
/// to become one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    center: Point2,
    radius: f64,
    density: usize,
}

impl Circle {
    /// Creates a circle with a vertex density derived from its radius.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::InvalidShape` if the radius is not positive
    /// or `GeometryError::NonFinite` for non-finite input.
    pub fn new(center: Point2, radius: f64) -> Result<Self> {
        if !center.x.is_finite() || !center.y.is_finite() || !radius.is_finite() {
            return Err(GeometryError::NonFinite("circle").into());
        }
        if radius < TOLERANCE {
            return Err(
                GeometryError::InvalidShape("circle radius must be positive".into()).into(),
            );
        }
        Ok(Self {
            center,
            radius,
            density: Self::approximate_vertex_density(radius, 1.0),
        })
    }

    /// Overrides the number of vertices used for a full turn.
    #[must_use]
    pub fn with_density(mut self, density: usize) -> Self {
        self.density = density.max(4);
        self
    }

    /// Number of vertices needed so no chord strays more than `epsilon`
    /// from the true arc.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn approximate_vertex_density(radius: f64, epsilon: f64) -> usize {
        let n = (PI / (2.0 * (epsilon / radius)).sqrt()).ceil();
        (n as usize).max(4)
    }

    #[must_use]
    pub fn center(&self) -> &Point2 {
        &self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn density(&self) -> usize {
        self.density
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.center, self.radius)
    }

    /// The boundary point at `angle` radians (screen space).
    #[must_use]
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        self.center + Vector2::new(angle.cos(), angle.sin()) * self.radius
    }

    /// Points along the arc from `from` to `to`, travelling clockwise on
    /// screen (increasing angle), spaced by the circle's density.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn points_for_arc(&self, from: f64, to: f64, include_endpoints: bool) -> Vec<Point2> {
        let delta = TAU / self.density as f64;
        let mut sweep = to - from;
        while sweep <= 0.0 {
            sweep += TAU;
        }
        let n = (sweep / delta).round() as usize;
        let mut points = Vec::with_capacity(n + 2);
        if include_endpoints {
            points.push(self.point_at_angle(from));
        }
        for i in 1..n {
            points.push(self.point_at_angle(from + i as f64 * delta));
        }
        if include_endpoints {
            points.push(self.point_at_angle(to));
        }
        points
    }

    fn angle_of(&self, p: &Point2) -> f64 {
        (p.y - self.center.y).atan2(p.x - self.center.x)
    }
}

impl ClipShape for Circle {
    fn contains(&self, p: &Point2) -> bool {
        (p - self.center).norm() <= self.radius * (1.0 + TOLERANCE) + TOLERANCE
    }

    fn segment_intersections(&self, a: &Point2, b: &Point2) -> Vec<(Point2, f64)> {
        segment_circle_intersect_2d(a, b, &self.center, self.radius)
    }

    fn points_between(&self, a: &Point2, b: &Point2) -> Vec<Point2> {
        self.points_for_arc(self.angle_of(a), self.angle_of(b), false)
    }

    #[allow(clippy::cast_precision_loss)]
    fn to_polygon(&self) -> Polygon {
        let delta = TAU / self.density as f64;
        Polygon::new(
            (0..self.density)
                .map(|i| self.point_at_angle(i as f64 * delta))
                .collect(),
        )
    }

    fn interior_point(&self) -> Point2 {
        self.center
    }

    fn boundary_parameter(&self, p: &Point2) -> f64 {
        (self.angle_of(p).rem_euclid(TAU) / TAU).rem_euclid(1.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rejects_non_positive_radius() {
        assert!(Circle::new(Point2::origin(), 0.0).is_err());
        assert!(Circle::new(Point2::origin(), f64::NAN).is_err());
    }

    #[test]
    fn density_tracks_radius() {
        assert_eq!(Circle::approximate_vertex_density(100.0, 1.0), 23);
        assert!(
            Circle::approximate_vertex_density(1000.0, 1.0)
                > Circle::approximate_vertex_density(100.0, 1.0)
        );
    }

    #[test]
    fn polygon_winds_clockwise_on_screen() {
        let c = Circle::new(Point2::new(5.0, 5.0), 10.0).unwrap();
        let poly = c.to_polygon();
        assert_eq!(poly.len(), c.density());
        assert!(poly.is_positive());
        for p in poly.points() {
            assert_abs_diff_eq!((p - c.center()).norm(), 10.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn arc_between_quarter_points() {
        let c = Circle::new(Point2::origin(), 10.0).unwrap().with_density(8);
        // East to south is a quarter turn clockwise on screen: one interior point.
        let pts = c.points_between(&Point2::new(10.0, 0.0), &Point2::new(0.0, 10.0));
        assert_eq!(pts.len(), 1);
        assert!(pts[0].x > 0.0 && pts[0].y > 0.0);
    }
}
