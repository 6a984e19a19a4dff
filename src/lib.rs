pub mod edge;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod spatial;

pub use edge::{Edge, EdgeId, EdgeOptions, EdgeStore, RestrictionLevel, SceneConfig, SenseType};
pub use error::{Result, SightlineError};
pub use geometry::{BoundaryShape, Polygon, Ray, Rect};
pub use math::Point2;
pub use operations::sweep::{ClockwiseSweepPolygon, CollisionMode, CollisionResult, SweepConfig};
