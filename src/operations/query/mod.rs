mod compute_polygon;
mod contains_point;
mod test_collision;

pub use compute_polygon::ComputePolygon;
pub use contains_point::ContainsPoint;
pub use test_collision::TestCollision;
