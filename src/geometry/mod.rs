pub mod circle;
pub mod polygon;
pub mod ray;
pub mod rect;
pub mod shape;

pub use circle::Circle;
pub use polygon::Polygon;
pub use ray::Ray;
pub use rect::Rect;
pub use shape::{BoundaryShape, ClipObject, ClipShape, ConvexPolygon};
