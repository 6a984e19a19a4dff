pub mod quadtree;

pub use quadtree::{NodeId, Quadtree, QuadtreeConfig};
