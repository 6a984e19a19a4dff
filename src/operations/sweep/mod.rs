mod active;
mod clockwise;
mod collision;
mod config;
mod vertex;

pub use active::{ActiveEdgeSet, RayHit, SweepEdge};
pub use clockwise::{ClockwiseSweepPolygon, SweepStage};
pub use collision::{first_blocking, Collision, CollisionMode, CollisionResult};
pub use config::{EdgeInclusion, EdgeTypeModes, SweepConfig, WallDirectionMode};
pub use vertex::{compare_angle, compare_vertices, PolygonVertex, VertexKey};
