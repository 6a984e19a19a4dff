pub mod intersect_2d;
pub mod orient_2d;
pub mod polygon_2d;

pub use orient_2d::{orient2d, orientation, Orientation};

/// 2D point type. Scene coordinates, y pointing down.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons of
/// intersection parameters.
pub const TOLERANCE: f64 = 1e-10;

/// Perpendicular distance below which three boundary points are treated
/// as collinear when a polygon is built point by point.
pub const COLLINEAR_TOLERANCE: f64 = 1e-8;

/// Two boundary points closer than this are the same point.
pub const MIN_POINT_SPACING: f64 = 1e-6;

/// Vertex keys quantize coordinates to `1 / VERTEX_PRECISION` units.
pub const VERTEX_PRECISION: f64 = 1e6;

/// Squared distance between two points.
#[must_use]
pub fn distance_squared(a: &Point2, b: &Point2) -> f64 {
    (b - a).norm_squared()
}

/// Returns `true` when two points coincide within [`MIN_POINT_SPACING`].
#[must_use]
pub fn points_equal(a: &Point2, b: &Point2) -> bool {
    distance_squared(a, b) < MIN_POINT_SPACING * MIN_POINT_SPACING
}
