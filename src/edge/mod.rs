mod store;

pub use store::{EdgeId, EdgeStore, SceneConfig};

use crate::error::{GeometryError, Result};
use crate::geometry::Rect;
use crate::math::intersect_2d::{closest_point_on_segment, segment_segment_intersect_2d};
use crate::math::{orientation, points_equal, Orientation, Point2, TOLERANCE};

/// A perceptual channel an edge can restrict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SenseType {
    Sight,
    Light,
    Move,
    Sound,
}

impl SenseType {
    pub const ALL: [SenseType; 4] = [Self::Sight, Self::Light, Self::Move, Self::Sound];

    fn index(self) -> usize {
        match self {
            Self::Sight => 0,
            Self::Light => 1,
            Self::Move => 2,
            Self::Sound => 3,
        }
    }
}

/// A value per [`SenseType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SenseMap<T> {
    values: [T; 4],
}

impl<T: Copy> SenseMap<T> {
    /// The same value for every sense.
    #[must_use]
    pub fn uniform(value: T) -> Self {
        Self { values: [value; 4] }
    }

    #[must_use]
    pub fn get(&self, sense: SenseType) -> T {
        self.values[sense.index()]
    }

    pub fn set(&mut self, sense: SenseType, value: T) {
        self.values[sense.index()] = value;
    }

    /// Returns a copy with `sense` set to `value`.
    #[must_use]
    pub fn with(mut self, sense: SenseType, value: T) -> Self {
        self.set(sense, value);
        self
    }
}

/// How strongly an edge restricts one sense.
///
/// Ordering matters: a larger level is a stronger blocker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum RestrictionLevel {
    /// Transparent.
    #[default]
    None = 0,
    /// A ray passes one limited edge and stops at the second.
    Limited = 1,
    /// Blocks unless the source is within the edge's threshold distance.
    Proximity = 2,
    /// Always blocks.
    Full = 3,
}

/// Which side of an edge a point lies on, seen on screen while travelling
/// from `a` to `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeSide {
    Left,
    Right,
    Collinear,
}

/// One-way behavior of an edge.
///
/// A directional edge is see-through from the side it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeDirection {
    #[default]
    Both,
    Left,
    Right,
}

/// The family an edge belongs to, which decides how a sweep treats it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeType {
    #[default]
    Wall,
    Darkness,
    InnerBounds,
    OuterBounds,
}

/// Per-sense proximity distances, in scene coordinate units.
pub type Threshold = SenseMap<Option<f64>>;

/// Where two edges cross.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineIntersection {
    pub point: Point2,
    /// Fraction along the first edge.
    pub t0: f64,
    /// Fraction along the second edge.
    pub t1: f64,
    /// Both fractions are 0 or 1: the edges meet at a common endpoint.
    pub shared_endpoint: bool,
}

/// Construction options for an [`Edge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeOptions {
    pub restrictions: SenseMap<RestrictionLevel>,
    pub direction: EdgeDirection,
    pub edge_type: EdgeType,
    pub threshold: Option<Threshold>,
    pub priority: i32,
    /// Identifier of the scene object that registered the edge.
    pub source: Option<String>,
}

impl EdgeOptions {
    /// Options with every sense fully restricted.
    #[must_use]
    pub fn blocking() -> Self {
        Self {
            restrictions: SenseMap::uniform(RestrictionLevel::Full),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_restriction(mut self, sense: SenseType, level: RestrictionLevel) -> Self {
        self.restrictions.set(sense, level);
        self
    }

    #[must_use]
    pub fn with_direction(mut self, direction: EdgeDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_type(mut self, edge_type: EdgeType) -> Self {
        self.edge_type = edge_type;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, sense: SenseType, distance: f64) -> Self {
        let threshold = self.threshold.unwrap_or_default().with(sense, Some(distance));
        self.threshold = Some(threshold);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// An obstacle segment restricting one or more senses.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    a: Point2,
    b: Point2,
    options: EdgeOptions,
}

impl Edge {
    /// Creates an edge between two distinct points.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::DegenerateEdge` when `a` and `b` coincide and
    /// `GeometryError::NonFinite` for non-finite coordinates.
    pub fn new(a: Point2, b: Point2, options: EdgeOptions) -> Result<Self> {
        if ![a.x, a.y, b.x, b.y].iter().all(|v| v.is_finite()) {
            return Err(GeometryError::NonFinite("edge endpoint").into());
        }
        if points_equal(&a, &b) {
            return Err(GeometryError::DegenerateEdge { x: a.x, y: a.y }.into());
        }
        Ok(Self { a, b, options })
    }

    #[must_use]
    pub fn a(&self) -> &Point2 {
        &self.a
    }

    #[must_use]
    pub fn b(&self) -> &Point2 {
        &self.b
    }

    /// Component-wise minimum of the endpoints.
    #[must_use]
    pub fn nw(&self) -> Point2 {
        Point2::new(self.a.x.min(self.b.x), self.a.y.min(self.b.y))
    }

    /// Component-wise maximum of the endpoints.
    #[must_use]
    pub fn se(&self) -> Point2 {
        Point2::new(self.a.x.max(self.b.x), self.a.y.max(self.b.y))
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_corners(self.nw(), self.se())
    }

    #[must_use]
    pub fn options(&self) -> &EdgeOptions {
        &self.options
    }

    #[must_use]
    pub fn restriction(&self, sense: SenseType) -> RestrictionLevel {
        self.options.restrictions.get(sense)
    }

    #[must_use]
    pub fn is_limited(&self, sense: SenseType) -> bool {
        self.restriction(sense) == RestrictionLevel::Limited
    }

    #[must_use]
    pub fn edge_type(&self) -> EdgeType {
        self.options.edge_type
    }

    #[must_use]
    pub fn direction(&self) -> EdgeDirection {
        self.options.direction
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        self.options.priority
    }

    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.options.source.as_deref()
    }

    /// Which side of this edge `p` lies on.
    ///
    /// Points on the supporting line, including the endpoints themselves,
    /// are `Collinear`.
    #[must_use]
    pub fn orient_point(&self, p: &Point2) -> EdgeSide {
        match orientation(&self.a, &self.b, p) {
            Orientation::CounterClockwise => EdgeSide::Left,
            Orientation::Clockwise => EdgeSide::Right,
            Orientation::Collinear => EdgeSide::Collinear,
        }
    }

    /// Where this edge crosses `other`, if it does.
    ///
    /// Parallel and collinear edges never intersect. When the edges meet at
    /// a common endpoint the result carries `shared_endpoint = true` with
    /// the exact endpoint and fractions of 0 or 1.
    #[must_use]
    pub fn get_intersection(&self, other: &Edge) -> Option<LineIntersection> {
        for (p, t0) in [(&self.a, 0.0), (&self.b, 1.0)] {
            for (q, t1) in [(&other.a, 0.0), (&other.b, 1.0)] {
                if points_equal(p, q) {
                    return Some(LineIntersection {
                        point: *p,
                        t0,
                        t1,
                        shared_endpoint: true,
                    });
                }
            }
        }
        let (point, t0, t1) = segment_segment_intersect_2d(&self.a, &self.b, &other.a, &other.b)?;
        Some(LineIntersection {
            point,
            t0,
            t1,
            shared_endpoint: false,
        })
    }

    /// Returns `true` when a proximity threshold makes this edge transparent
    /// for `sense` as seen from `origin`.
    ///
    /// Only `Proximity` restrictions have thresholds. The edge turns
    /// transparent once the source, grown by `external_radius`, is within
    /// the threshold distance of the closest point on the edge.
    #[must_use]
    pub fn apply_threshold(&self, sense: SenseType, origin: &Point2, external_radius: f64) -> bool {
        if self.restriction(sense) != RestrictionLevel::Proximity {
            return false;
        }
        let Some(distance) = self.options.threshold.and_then(|t| t.get(sense)) else {
            return false;
        };
        let closest = closest_point_on_segment(origin, &self.a, &self.b);
        (origin - closest).norm() <= distance + external_radius + TOLERANCE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn edge(ax: f64, ay: f64, bx: f64, by: f64) -> Edge {
        Edge::new(Point2::new(ax, ay), Point2::new(bx, by), EdgeOptions::blocking()).unwrap()
    }

    #[test]
    fn degenerate_edge_rejected() {
        let p = Point2::new(3.0, 3.0);
        let err = Edge::new(p, p, EdgeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SightlineError::Geometry(GeometryError::DegenerateEdge { .. })
        ));
    }

    #[test]
    fn default_restriction_is_none() {
        let e = Edge::new(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), EdgeOptions::default())
            .unwrap();
        for sense in SenseType::ALL {
            assert_eq!(e.restriction(sense), RestrictionLevel::None);
        }
    }

    #[test]
    fn corners_are_derived() {
        let e = edge(10.0, 0.0, 0.0, 5.0);
        assert_eq!(e.nw(), Point2::new(0.0, 0.0));
        assert_eq!(e.se(), Point2::new(10.0, 5.0));
    }

    #[test]
    fn orient_point_sides() {
        // Heading east on screen, up (smaller y) is on the left.
        let e = edge(0.0, 0.0, 10.0, 0.0);
        assert_eq!(e.orient_point(&Point2::new(5.0, -1.0)), EdgeSide::Left);
        assert_eq!(e.orient_point(&Point2::new(5.0, 1.0)), EdgeSide::Right);
        assert_eq!(e.orient_point(&Point2::new(20.0, 0.0)), EdgeSide::Collinear);
        assert_eq!(e.orient_point(e.a()), EdgeSide::Collinear);
    }

    #[test]
    fn crossing_intersection() {
        let i = edge(0.0, 0.0, 10.0, 10.0)
            .get_intersection(&edge(0.0, 10.0, 10.0, 0.0))
            .unwrap();
        assert!(!i.shared_endpoint);
        assert_abs_diff_eq!(i.point.x, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(i.t0, 0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(i.t1, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn shared_endpoint_flagged() {
        let i = edge(0.0, 0.0, 10.0, 0.0)
            .get_intersection(&edge(10.0, 0.0, 10.0, 10.0))
            .unwrap();
        assert!(i.shared_endpoint);
        assert_abs_diff_eq!(i.t0, 1.0);
        assert_abs_diff_eq!(i.t1, 0.0);
        assert_eq!(i.point, Point2::new(10.0, 0.0));
    }

    #[test]
    fn parallel_edges_do_not_intersect() {
        assert!(edge(0.0, 0.0, 10.0, 0.0)
            .get_intersection(&edge(0.0, 1.0, 10.0, 1.0))
            .is_none());
        assert!(edge(0.0, 0.0, 10.0, 0.0)
            .get_intersection(&edge(5.0, 0.0, 15.0, 0.0))
            .is_none());
    }

    #[test]
    fn proximity_threshold() {
        let options = EdgeOptions::default()
            .with_restriction(SenseType::Sight, RestrictionLevel::Proximity)
            .with_threshold(SenseType::Sight, 10.0);
        let e = Edge::new(Point2::new(0.0, 0.0), Point2::new(0.0, 100.0), options).unwrap();
        assert!(e.apply_threshold(SenseType::Sight, &Point2::new(8.0, 50.0), 0.0));
        assert!(!e.apply_threshold(SenseType::Sight, &Point2::new(15.0, 50.0), 0.0));
        assert!(e.apply_threshold(SenseType::Sight, &Point2::new(15.0, 50.0), 5.0));
        // No threshold for sound, and light is not a proximity restriction.
        assert!(!e.apply_threshold(SenseType::Sound, &Point2::new(1.0, 50.0), 0.0));
        assert!(!e.apply_threshold(SenseType::Light, &Point2::new(1.0, 50.0), 0.0));
    }
}
