use std::cmp::Ordering;

use crate::math::{distance_squared, orient2d, Point2, VERTEX_PRECISION};

/// Quantized coordinates identifying a vertex.
///
/// Endpoints that round to the same key are the same vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexKey(i64, i64);

impl VertexKey {
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn of(p: &Point2) -> Self {
        Self(
            (p.x * VERTEX_PRECISION).round() as i64,
            (p.y * VERTEX_PRECISION).round() as i64,
        )
    }
}

/// A deduplicated sweep point and the edges meeting there.
///
/// Indices refer to the sweep's edge list. An edge that starts here
/// continues clockwise and is in `cw_edges`; one that ends here is in
/// `ccw_edges`. An edge passing through a crossing is in both.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonVertex {
    pub point: Point2,
    pub key: VertexKey,
    pub cw_edges: Vec<usize>,
    pub ccw_edges: Vec<usize>,
    /// Squared distance from the sweep origin.
    pub distance_squared: f64,
}

impl PolygonVertex {
    #[must_use]
    pub fn new(point: Point2, origin: &Point2) -> Self {
        Self {
            point,
            key: VertexKey::of(&point),
            cw_edges: Vec::new(),
            ccw_edges: Vec::new(),
            distance_squared: distance_squared(origin, &point),
        }
    }

    pub(crate) fn attach_cw(&mut self, edge: usize) {
        if !self.cw_edges.contains(&edge) {
            self.cw_edges.push(edge);
        }
    }

    pub(crate) fn attach_ccw(&mut self, edge: usize) {
        if !self.ccw_edges.contains(&edge) {
            self.ccw_edges.push(edge);
        }
    }

    /// Edges that begin at this vertex.
    pub fn starting_edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.cw_edges
            .iter()
            .copied()
            .filter(|e| !self.ccw_edges.contains(e))
    }

    /// Edges that terminate at this vertex.
    pub fn ending_edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.ccw_edges
            .iter()
            .copied()
            .filter(|e| !self.cw_edges.contains(e))
    }

    /// `true` when `edge` is incident to this vertex in any role.
    #[must_use]
    pub fn touches(&self, edge: usize) -> bool {
        self.cw_edges.contains(&edge) || self.ccw_edges.contains(&edge)
    }
}

/// Half-plane of a direction: the due-west ray and everything north of the
/// origin come first, the due-east ray and everything south second.
fn half(origin: &Point2, p: &Point2) -> u8 {
    let (dx, dy) = (p.x - origin.x, p.y - origin.y);
    if dy < 0.0 || (dy == 0.0 && dx < 0.0) {
        0
    } else {
        1
    }
}

/// Orders two points by clockwise angle around `origin`, starting at due
/// west. Points on the same ray compare equal.
#[must_use]
pub fn compare_angle(origin: &Point2, a: &Point2, b: &Point2) -> Ordering {
    half(origin, a).cmp(&half(origin, b)).then_with(|| {
        let det = orient2d(origin, a, b);
        if det < 0.0 {
            Ordering::Less
        } else if det > 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

/// Clockwise angular order with nearer points first on a shared ray.
#[must_use]
pub fn compare_vertices(origin: &Point2, a: &PolygonVertex, b: &PolygonVertex) -> Ordering {
    compare_angle(origin, &a.point, &b.point)
        .then_with(|| a.distance_squared.total_cmp(&b.distance_squared))
}
