#![allow(dead_code)]

use sightline::{EdgeOptions, EdgeStore, Point2, Rect, SceneConfig};
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn p(x: f64, y: f64) -> Point2 {
    Point2::new(x, y)
}

/// A square scene of the given size.
pub fn scene(size: f64) -> EdgeStore {
    EdgeStore::new(SceneConfig::new(Rect::new(0.0, 0.0, size, size)))
}

pub fn add_wall(store: &mut EdgeStore, a: (f64, f64), b: (f64, f64)) {
    store
        .add_segment(p(a.0, a.1), p(b.0, b.1), EdgeOptions::blocking())
        .unwrap_or_else(|e| panic!("wall rejected: {e}"));
}

/// How many polygon points coincide with `q`.
pub fn count_points(points: &[Point2], q: Point2) -> usize {
    points.iter().filter(|r| sightline::math::points_equal(r, &q)).count()
}
