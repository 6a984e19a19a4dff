use std::collections::BTreeMap;

use slotmap::SlotMap;
use tracing::{trace, warn};

use super::{Edge, EdgeOptions, EdgeType, LineIntersection};
use crate::error::{EdgeError, Result};
use crate::geometry::Rect;
use crate::math::Point2;
use crate::spatial::{Quadtree, QuadtreeConfig};

slotmap::new_key_type! {
    /// Unique identifier for an edge in an [`EdgeStore`].
    pub struct EdgeId;
}

/// Scene-level settings shared by every sweep against one store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    /// Outer canvas rectangle. Seeds the quadtree root and the
    /// `OuterBounds` edges.
    pub rect: Rect,
    /// Playable scene rectangle inside `rect`. Seeds the `InnerBounds` edges.
    pub scene_rect: Rect,
    /// Coordinate units per scene distance unit.
    pub distance_pixels: f64,
    /// Split limits for the edge index.
    pub quadtree: QuadtreeConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let rect = Rect::new(0.0, 0.0, 4000.0, 3000.0);
        Self {
            rect,
            scene_rect: rect,
            distance_pixels: 1.0,
            quadtree: QuadtreeConfig::default(),
        }
    }
}

impl SceneConfig {
    /// A scene whose canvas and playable area are both `rect`.
    #[must_use]
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            scene_rect: rect,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_scene_rect(mut self, scene_rect: Rect) -> Self {
        self.scene_rect = scene_rect;
        self
    }

    #[must_use]
    pub fn with_distance_pixels(mut self, distance_pixels: f64) -> Self {
        self.distance_pixels = distance_pixels;
        self
    }

    #[must_use]
    pub fn with_quadtree(mut self, quadtree: QuadtreeConfig) -> Self {
        self.quadtree = quadtree;
        self
    }

    /// Converts a distance in scene units to coordinate units.
    #[must_use]
    pub fn to_pixels(&self, distance: f64) -> f64 {
        distance * self.distance_pixels
    }
}

/// Central arena that owns every registered edge.
///
/// Edges are indexed spatially by a [`Quadtree`] and pairwise crossings are
/// cached in a side table keyed by [`EdgeId`], so mutating or removing an
/// edge invalidates exactly its own entries. Sweeps borrow the store
/// immutably; edits need `&mut self` and so can never overlap a sweep.
#[derive(Debug, Clone)]
pub struct EdgeStore {
    edges: SlotMap<EdgeId, Edge>,
    index: Quadtree<EdgeId>,
    intersections: BTreeMap<EdgeId, BTreeMap<EdgeId, LineIntersection>>,
    scene: SceneConfig,
}

impl Default for EdgeStore {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

impl EdgeStore {
    /// Creates a store for `scene` with its outer and inner bounds edges
    /// already registered.
    #[must_use]
    pub fn new(scene: SceneConfig) -> Self {
        let mut store = Self {
            edges: SlotMap::with_key(),
            index: Quadtree::new(scene.rect, scene.quadtree),
            intersections: BTreeMap::new(),
            scene,
        };
        store.add_bounds_edges(scene.rect, EdgeType::OuterBounds);
        store.add_bounds_edges(scene.scene_rect, EdgeType::InnerBounds);
        store
    }

    fn add_bounds_edges(&mut self, rect: Rect, edge_type: EdgeType) {
        for (a, b) in rect.sides() {
            // A zero-size scene rectangle has degenerate sides.
            if let Ok(edge) = Edge::new(a, b, EdgeOptions::blocking().with_type(edge_type)) {
                self.add(edge);
            }
        }
    }

    #[must_use]
    pub fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    /// The spatial index over all edges.
    #[must_use]
    pub fn index(&self) -> &Quadtree<EdgeId> {
        &self.index
    }

    /// Number of edges, bounds edges included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Registers an edge and records its crossings with existing edges.
    pub fn add(&mut self, edge: Edge) -> EdgeId {
        let bounds = edge.bounds();
        let id = self.edges.insert(edge);
        self.index.insert(id, bounds);
        self.record_intersections(id);
        id
    }

    /// Builds and registers an edge from raw endpoints.
    ///
    /// # Errors
    ///
    /// Returns a `GeometryError` if the endpoints do not form a valid edge.
    /// Nothing is registered in that case.
    pub fn add_segment(&mut self, a: Point2, b: Point2, options: EdgeOptions) -> Result<EdgeId> {
        match Edge::new(a, b, options) {
            Ok(edge) => Ok(self.add(edge)),
            Err(err) => {
                warn!(%err, "rejected edge");
                Err(err)
            }
        }
    }

    /// Replaces the geometry and options of an existing edge, refreshing
    /// its index entry and intersection cache.
    ///
    /// # Errors
    ///
    /// Returns `EdgeError::NotFound` if `id` is not in the store.
    pub fn update(&mut self, id: EdgeId, edge: Edge) -> Result<()> {
        let slot = self.edges.get_mut(id).ok_or(EdgeError::NotFound)?;
        let bounds = edge.bounds();
        *slot = edge;
        self.remove_intersections(id);
        self.index.update(id, bounds);
        self.record_intersections(id);
        Ok(())
    }

    /// Removes an edge from the store, the index and every intersection
    /// cache. Returns `None` if it was already absent.
    pub fn remove(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.remove(id)?;
        self.remove_intersections(id);
        self.index.remove(&id);
        Some(edge)
    }

    #[must_use]
    pub fn get(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Returns the edge, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns `EdgeError::NotFound` if `id` is not in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge> {
        Ok(self.edges.get(id).ok_or(EdgeError::NotFound)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter()
    }

    /// Edges whose segment touches `rect`.
    ///
    /// The quadtree narrows the candidates and the exact segment test runs
    /// only on those.
    #[must_use]
    pub fn edges_in(&self, rect: &Rect) -> Vec<EdgeId> {
        self.index.get_objects_filtered(rect, |id, _| {
            self.edges
                .get(*id)
                .is_some_and(|e| rect.segment_intersects(e.a(), e.b()))
        })
    }

    /// Crossings of `id` with other edges, ordered by the other edge's id.
    pub fn intersections_of(
        &self,
        id: EdgeId,
    ) -> impl Iterator<Item = (EdgeId, &LineIntersection)> {
        self.intersections
            .get(&id)
            .into_iter()
            .flat_map(|m| m.iter().map(|(other, i)| (*other, i)))
    }

    /// Tests `id` against every edge whose bounds overlap it and caches the
    /// crossings on both sides.
    ///
    /// Edges meeting at a common endpoint already share a sweep vertex, so
    /// those contacts are not cached.
    pub fn record_intersections(&mut self, id: EdgeId) {
        let Some(edge) = self.edges.get(id) else {
            return;
        };
        let mut found = Vec::new();
        for other_id in self.index.get_objects(&edge.bounds()) {
            if other_id == id {
                continue;
            }
            let Some(other) = self.edges.get(other_id) else {
                continue;
            };
            if let Some(i) = edge.get_intersection(other) {
                if !i.shared_endpoint {
                    found.push((other_id, i));
                }
            }
        }
        for (other_id, i) in found {
            trace!(x = i.point.x, y = i.point.y, "recorded edge intersection");
            let mirrored = LineIntersection {
                t0: i.t1,
                t1: i.t0,
                ..i
            };
            self.intersections.entry(id).or_default().insert(other_id, i);
            self.intersections
                .entry(other_id)
                .or_default()
                .insert(id, mirrored);
        }
    }

    /// Drops every cached crossing involving `id`, on both sides.
    pub fn remove_intersections(&mut self, id: EdgeId) {
        let Some(others) = self.intersections.remove(&id) else {
            return;
        };
        for other in others.keys() {
            if let Some(m) = self.intersections.get_mut(other) {
                m.remove(&id);
                if m.is_empty() {
                    self.intersections.remove(other);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::edge::{RestrictionLevel, SenseType};

    fn scene() -> EdgeStore {
        EdgeStore::new(SceneConfig::new(Rect::new(0.0, 0.0, 100.0, 100.0)))
    }

    fn wall(store: &mut EdgeStore, ax: f64, ay: f64, bx: f64, by: f64) -> EdgeId {
        store
            .add_segment(Point2::new(ax, ay), Point2::new(bx, by), EdgeOptions::blocking())
            .unwrap()
    }

    #[test]
    fn new_store_has_bounds_edges() {
        let store = scene();
        // Four outer and four inner sides.
        assert_eq!(store.len(), 8);
        let outer = store
            .iter()
            .filter(|(_, e)| e.edge_type() == EdgeType::OuterBounds)
            .count();
        assert_eq!(outer, 4);
        for (_, e) in store.iter() {
            assert_eq!(e.restriction(SenseType::Sight), RestrictionLevel::Full);
        }
    }

    #[test]
    fn degenerate_segment_never_registered() {
        let mut store = scene();
        let p = Point2::new(5.0, 5.0);
        assert!(store.add_segment(p, p, EdgeOptions::blocking()).is_err());
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn intersections_are_bidirectional() {
        let mut store = scene();
        let a = wall(&mut store, 10.0, 10.0, 30.0, 30.0);
        let b = wall(&mut store, 10.0, 30.0, 30.0, 10.0);
        let from_a: Vec<_> = store.intersections_of(a).collect();
        let from_b: Vec<_> = store.intersections_of(b).collect();
        assert_eq!(from_a.len(), 1);
        assert_eq!(from_b.len(), 1);
        assert_eq!(from_a[0].0, b);
        assert_eq!(from_b[0].0, a);
        assert_eq!(from_a[0].1.point, from_b[0].1.point);
    }

    #[test]
    fn shared_endpoints_not_cached() {
        let mut store = scene();
        let a = wall(&mut store, 10.0, 10.0, 30.0, 10.0);
        wall(&mut store, 30.0, 10.0, 30.0, 30.0);
        assert_eq!(store.intersections_of(a).count(), 0);
    }

    #[test]
    fn remove_clears_both_sides() {
        let mut store = scene();
        let a = wall(&mut store, 10.0, 10.0, 30.0, 30.0);
        let b = wall(&mut store, 10.0, 30.0, 30.0, 10.0);
        assert!(store.remove(b).is_some());
        assert_eq!(store.intersections_of(a).count(), 0);
        assert!(!store.index().contains(&b));
        assert!(store.remove(b).is_none());
    }

    #[test]
    fn update_refreshes_cache_and_index() {
        let mut store = scene();
        let a = wall(&mut store, 10.0, 10.0, 30.0, 30.0);
        let b = wall(&mut store, 10.0, 30.0, 30.0, 10.0);
        let moved = Edge::new(
            Point2::new(60.0, 60.0),
            Point2::new(80.0, 60.0),
            EdgeOptions::blocking(),
        )
        .unwrap();
        store.update(b, moved).unwrap();
        assert_eq!(store.intersections_of(a).count(), 0);
        assert_eq!(store.edges_in(&Rect::new(55.0, 55.0, 10.0, 10.0)), vec![b]);
    }

    #[test]
    fn update_missing_edge_errors() {
        let mut store = scene();
        let a = wall(&mut store, 10.0, 10.0, 30.0, 30.0);
        let edge = store.get(a).unwrap().clone();
        store.remove(a);
        assert!(store.update(a, edge).is_err());
    }

    #[test]
    fn threshold_distance_conversion() {
        let config = SceneConfig::default().with_distance_pixels(20.0);
        assert!((config.to_pixels(5.0) - 100.0).abs() < 1e-12);
    }
}
