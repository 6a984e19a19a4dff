use crate::geometry::Polygon;
use crate::math::Point2;

/// Point-in-polygon test against a computed visibility polygon.
///
/// Points on the boundary count as inside.
pub struct ContainsPoint {
    point: Point2,
}

impl ContainsPoint {
    #[must_use]
    pub fn new(point: Point2) -> Self {
        Self { point }
    }

    #[must_use]
    pub fn execute(&self, polygon: &Polygon) -> bool {
        polygon.contains_point(&self.point)
    }
}
