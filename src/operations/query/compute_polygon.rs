use crate::edge::EdgeStore;
use crate::error::Result;
use crate::geometry::Polygon;
use crate::math::Point2;
use crate::operations::sweep::{ClockwiseSweepPolygon, SweepConfig};

/// Computes the visibility polygons of a point in one call.
///
/// Builds a fresh [`ClockwiseSweepPolygon`]; keep one around instead when
/// the rays and contributing edges are needed afterwards.
pub struct ComputePolygon {
    origin: Point2,
    config: SweepConfig,
}

impl ComputePolygon {
    #[must_use]
    pub fn new(origin: Point2, config: SweepConfig) -> Self {
        Self { origin, config }
    }

    /// Executes the sweep, returning every clipped piece.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin or configuration is invalid.
    pub fn execute(&self, store: &EdgeStore) -> Result<Vec<Polygon>> {
        let mut sweep = ClockwiseSweepPolygon::new();
        sweep.initialize(self.origin, self.config.clone())?;
        Ok(sweep.compute(store)?.to_vec())
    }
}
