use crate::edge::{EdgeStore, SenseType};
use crate::error::Result;
use crate::geometry::Ray;
use crate::math::Point2;
use crate::operations::sweep::{ClockwiseSweepPolygon, CollisionMode, CollisionResult, SweepConfig};

/// Tests whether the straight path between two points is blocked for a
/// sense, without computing a polygon.
pub struct TestCollision {
    origin: Point2,
    destination: Point2,
    config: SweepConfig,
    mode: CollisionMode,
}

impl TestCollision {
    /// Creates a test answering [`CollisionMode::Any`].
    #[must_use]
    pub fn new(origin: Point2, destination: Point2, sense: SenseType) -> Self {
        Self {
            origin,
            destination,
            config: SweepConfig::new(sense),
            mode: CollisionMode::Any,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: CollisionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replaces the edge filtering options, sense included.
    #[must_use]
    pub fn with_config(mut self, config: SweepConfig) -> Self {
        self.config = config;
        self
    }

    /// # Errors
    ///
    /// Returns an error if the origin or configuration is invalid.
    pub fn execute(&self, store: &EdgeStore) -> Result<CollisionResult> {
        let mut sweep = ClockwiseSweepPolygon::new();
        sweep.initialize(self.origin, self.config.clone())?;
        sweep.test_collision(store, &Ray::new(self.origin, self.destination), self.mode)
    }
}
