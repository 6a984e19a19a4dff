use std::collections::{BTreeSet, HashMap};

use crate::edge::{EdgeId, RestrictionLevel};
use crate::math::intersect_2d::line_line_intersect_2d;
use crate::math::{distance_squared, orient2d, Point2, TOLERANCE};

/// An edge as one sweep sees it.
///
/// Endpoints are ordered so that `start` is reached first when turning
/// clockwise around the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepEdge {
    /// Store id, `None` for the bounding box sides.
    pub id: Option<EdgeId>,
    pub start: Point2,
    pub end: Point2,
    pub level: RestrictionLevel,
    pub priority: i32,
}

impl SweepEdge {
    #[must_use]
    pub fn oriented(
        origin: &Point2,
        a: Point2,
        b: Point2,
        id: Option<EdgeId>,
        level: RestrictionLevel,
        priority: i32,
    ) -> Self {
        let (start, end) = if orient2d(origin, &a, &b) > 0.0 {
            (b, a)
        } else {
            (a, b)
        };
        Self {
            id,
            start,
            end,
            level,
            priority,
        }
    }
}

/// Where a cast ray stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Point2,
    pub distance_squared: f64,
    /// Index of the stopping edge in the sweep's edge list.
    pub edge: usize,
}

/// Edges spanning the current sweep angle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveEdgeSet {
    edges: BTreeSet<usize>,
}

impl ActiveEdgeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, edge: usize) -> bool {
        self.edges.insert(edge)
    }

    pub fn remove(&mut self, edge: usize) -> bool {
        self.edges.remove(&edge)
    }

    #[must_use]
    pub fn contains(&self, edge: usize) -> bool {
        self.edges.contains(&edge)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.edges.iter().copied()
    }

    /// Active edges crossed by the ray from `origin` through `toward`,
    /// nearest first.
    ///
    /// Edges listed in `anchors` meet the ray at a known vertex and use its
    /// exact coordinates. At equal distance the higher priority comes
    /// first, then the stronger restriction.
    #[must_use]
    pub fn ordered_along(
        &self,
        origin: &Point2,
        toward: &Point2,
        edges: &[SweepEdge],
        anchors: &HashMap<usize, Point2>,
    ) -> Vec<RayHit> {
        let dir = toward - origin;
        let mut hits: Vec<RayHit> = self
            .edges
            .iter()
            .filter_map(|&i| {
                let point = match anchors.get(&i) {
                    Some(p) => *p,
                    None => {
                        let e = &edges[i];
                        let (t, _) =
                            line_line_intersect_2d(origin, &dir, &e.start, &(e.end - e.start))?;
                        if t < -TOLERANCE {
                            return None;
                        }
                        origin + dir * t.max(0.0)
                    }
                };
                Some(RayHit {
                    point,
                    distance_squared: distance_squared(origin, &point),
                    edge: i,
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            let (ea, eb) = (&edges[a.edge], &edges[b.edge]);
            a.distance_squared
                .total_cmp(&b.distance_squared)
                .then_with(|| eb.priority.cmp(&ea.priority))
                .then_with(|| eb.level.cmp(&ea.level))
                .then_with(|| a.edge.cmp(&b.edge))
        });
        hits
    }

    /// Casts a ray and returns where it stops.
    ///
    /// The ray passes through the first `Limited` edge and stops at the
    /// second, or at the first edge of any stronger restriction.
    #[must_use]
    pub fn cast(
        &self,
        origin: &Point2,
        toward: &Point2,
        edges: &[SweepEdge],
        anchors: &HashMap<usize, Point2>,
    ) -> Option<RayHit> {
        let mut limited = 0;
        self.ordered_along(origin, toward, edges, anchors)
            .into_iter()
            .find(|hit| {
                if edges[hit.edge].level == RestrictionLevel::Limited {
                    limited += 1;
                    limited >= 2
                } else {
                    true
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(ax: f64, ay: f64, bx: f64, by: f64, level: RestrictionLevel) -> SweepEdge {
        SweepEdge::oriented(
            &Point2::origin(),
            Point2::new(ax, ay),
            Point2::new(bx, by),
            None,
            level,
            0,
        )
    }

    #[test]
    fn orientation_puts_start_first() {
        // North of the origin, heading east is clockwise.
        let e = edge(5.0, -10.0, -5.0, -10.0, RestrictionLevel::Full);
        assert_eq!(e.start, Point2::new(-5.0, -10.0));
        assert_eq!(e.end, Point2::new(5.0, -10.0));
    }

    #[test]
    fn cast_stops_at_nearest_full_edge() {
        let edges = vec![
            edge(10.0, -5.0, 10.0, 5.0, RestrictionLevel::Full),
            edge(20.0, -5.0, 20.0, 5.0, RestrictionLevel::Full),
        ];
        let mut active = ActiveEdgeSet::new();
        active.insert(1);
        active.insert(0);
        let hit = active
            .cast(&Point2::origin(), &Point2::new(1.0, 0.0), &edges, &HashMap::new())
            .map(|h| h.edge);
        assert_eq!(hit, Some(0));
    }

    #[test]
    fn limited_edges_pass_one() {
        let edges = vec![
            edge(10.0, -5.0, 10.0, 5.0, RestrictionLevel::Limited),
            edge(20.0, -5.0, 20.0, 5.0, RestrictionLevel::Limited),
            edge(30.0, -5.0, 30.0, 5.0, RestrictionLevel::Full),
        ];
        let mut active = ActiveEdgeSet::new();
        for i in 0..3 {
            active.insert(i);
        }
        let o = Point2::origin();
        let toward = Point2::new(1.0, 0.0);
        let hit = active.cast(&o, &toward, &edges, &HashMap::new()).map(|h| h.edge);
        assert_eq!(hit, Some(1));
        active.remove(1);
        let hit = active.cast(&o, &toward, &edges, &HashMap::new()).map(|h| h.edge);
        assert_eq!(hit, Some(2));
    }

    #[test]
    fn anchors_use_exact_vertex() {
        let edges = vec![edge(10.0, 0.0, 10.0, 10.0, RestrictionLevel::Full)];
        let mut active = ActiveEdgeSet::new();
        active.insert(0);
        let anchors = HashMap::from([(0, Point2::new(10.0, 0.0))]);
        let hit = active
            .cast(&Point2::origin(), &Point2::new(3.0, 0.0), &edges, &anchors)
            .unwrap_or_else(|| panic!("expected a hit"));
        assert_eq!(hit.point, Point2::new(10.0, 0.0));
    }

    #[test]
    fn edge_through_origin_stops_at_origin() {
        let o = Point2::new(0.0, 50.0);
        let side = SweepEdge {
            id: None,
            start: Point2::new(0.0, 100.0),
            end: Point2::new(0.0, 0.0),
            level: RestrictionLevel::Full,
            priority: 0,
        };
        let mut active = ActiveEdgeSet::new();
        active.insert(0);
        let hit = active
            .cast(&o, &Point2::new(-1.0, 20.0), &[side], &HashMap::new())
            .unwrap_or_else(|| panic!("expected a hit"));
        assert_eq!(hit.point, o);
    }

    #[test]
    fn priority_breaks_distance_ties() {
        let o = Point2::origin();
        let low = SweepEdge::oriented(
            &o,
            Point2::new(10.0, -5.0),
            Point2::new(10.0, 5.0),
            None,
            RestrictionLevel::Full,
            0,
        );
        let high = SweepEdge { priority: 5, ..low };
        let mut active = ActiveEdgeSet::new();
        active.insert(0);
        active.insert(1);
        let hits = active.ordered_along(&o, &Point2::new(1.0, 0.0), &[low, high], &HashMap::new());
        assert_eq!(hits[0].edge, 1);
    }
}
