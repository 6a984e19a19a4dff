use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace};

use super::active::{ActiveEdgeSet, RayHit, SweepEdge};
use super::collision::{first_blocking, Collision, CollisionMode, CollisionResult};
use super::config::{EdgeInclusion, EdgeTypeModes, SweepConfig, WallDirectionMode};
use super::vertex::{compare_angle, compare_vertices, PolygonVertex, VertexKey};
use crate::edge::{Edge, EdgeDirection, EdgeId, EdgeSide, EdgeStore, EdgeType, RestrictionLevel};
use crate::error::{GeometryError, Result, SweepError};
use crate::geometry::{Circle, ClipObject, Polygon, Ray, Rect};
use crate::math::intersect_2d::{closest_point_on_segment, segment_segment_intersect_2d};
use crate::math::{points_equal, Point2, Vector2, MIN_POINT_SPACING};
use crate::operations::clip::{ClipType, WeilerAthertonClipper};

/// Progress of a [`ClockwiseSweepPolygon`] through one computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SweepStage {
    #[default]
    Uninitialized,
    Initialized,
    EdgesIdentified,
    VerticesIdentified,
    IntersectionsRecorded,
    Swept,
    Finalized,
}

/// One ray direction visited by the sweep, with the vertices on it.
#[derive(Debug, Clone)]
struct AngleGroup {
    toward: Point2,
    vertices: Vec<usize>,
    cone_boundary: bool,
}

/// Computes the region visible from a point by sweeping a ray clockwise
/// around it.
///
/// Candidate edges come from the store's quadtree. Their endpoints and
/// crossings become vertices, which are visited in clockwise order starting
/// due west. At each vertex angle the ray is cast once against the edges
/// active just before it and once against those active just after, and the
/// two stopping points become polygon vertices.
///
/// A sweep is reusable: call [`initialize`](Self::initialize) again to
/// compute for another origin or configuration.
#[derive(Debug, Clone)]
pub struct ClockwiseSweepPolygon {
    origin: Point2,
    config: SweepConfig,
    stage: SweepStage,
    edge_types: EdgeTypeModes,
    bounding_box: Rect,
    edges: Vec<SweepEdge>,
    included: HashMap<EdgeId, usize>,
    vertices: Vec<PolygonVertex>,
    vertex_index: HashMap<VertexKey, usize>,
    intersection_count: usize,
    polygons: Vec<Polygon>,
    segment_edges: Vec<Vec<Option<EdgeId>>>,
    rays: Vec<Ray>,
    contributing: BTreeSet<EdgeId>,
}

impl Default for ClockwiseSweepPolygon {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockwiseSweepPolygon {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Point2::origin(),
            config: SweepConfig::default(),
            stage: SweepStage::Uninitialized,
            edge_types: EdgeTypeModes::default(),
            bounding_box: Rect::centered(Point2::origin(), 0.0),
            edges: Vec::new(),
            included: HashMap::new(),
            vertices: Vec::new(),
            vertex_index: HashMap::new(),
            intersection_count: 0,
            polygons: Vec::new(),
            segment_edges: Vec::new(),
            rays: Vec::new(),
            contributing: BTreeSet::new(),
        }
    }

    /// Sets the origin and configuration, discarding any previous result.
    ///
    /// # Errors
    ///
    /// Returns a `GeometryError` for a non-finite origin, a
    /// `SweepError::InvalidConfig` for unusable numbers, and a `ClipError`
    /// when a boundary shape is not a convex clip operand.
    pub fn initialize(&mut self, origin: Point2, config: SweepConfig) -> Result<()> {
        if !origin.x.is_finite() || !origin.y.is_finite() {
            return Err(GeometryError::NonFinite("sweep origin").into());
        }
        config.validate()?;
        for shape in &config.boundary_shapes {
            shape.clip_object()?;
        }
        *self = Self::new();
        self.origin = origin;
        self.config = config;
        self.stage = SweepStage::Initialized;
        Ok(())
    }

    #[must_use]
    pub fn origin(&self) -> &Point2 {
        &self.origin
    }

    #[must_use]
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    #[must_use]
    pub fn stage(&self) -> SweepStage {
        self.stage
    }

    /// The result of the last [`compute`](Self::compute). A boundary shape
    /// that does not contain the origin can split the visible region, so
    /// there may be several pieces, or none when nothing is visible.
    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    #[must_use]
    pub fn bounding_box(&self) -> &Rect {
        &self.bounding_box
    }

    #[must_use]
    pub fn edge_types(&self) -> &EdgeTypeModes {
        &self.edge_types
    }

    /// Edges taken into the last sweep, bounding box sides last.
    #[must_use]
    pub fn edges(&self) -> &[SweepEdge] {
        &self.edges
    }

    #[must_use]
    pub fn vertices(&self) -> &[PolygonVertex] {
        &self.vertices
    }

    #[must_use]
    pub fn intersection_count(&self) -> usize {
        self.intersection_count
    }

    /// Rays cast to every point the sweep emitted, before culling and
    /// clipping. Meant for debugging.
    #[must_use]
    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    /// Store edges that stopped at least one ray.
    #[must_use]
    pub fn contributing_edges(&self) -> &BTreeSet<EdgeId> {
        &self.contributing
    }

    /// The store edge under each boundary segment, one list per polygon.
    ///
    /// Entry `i` of a list covers the segment from point `i` to point
    /// `i + 1` of the matching polygon, wrapping at the end. Shadow sides,
    /// cone sides and clipped arcs lie on no store edge and are `None`.
    #[must_use]
    pub fn segment_edges(&self) -> &[Vec<Option<EdgeId>>] {
        &self.segment_edges
    }

    /// Runs every stage of the sweep against `store`.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::NotInitialized` before
    /// [`initialize`](Self::initialize), or a geometry error from the radius
    /// circle.
    pub fn compute(&mut self, store: &EdgeStore) -> Result<&[Polygon]> {
        if self.stage == SweepStage::Uninitialized {
            return Err(SweepError::NotInitialized.into());
        }
        self.reset();
        self.edge_types = self.determine_edge_types(store);
        self.bounding_box = self.define_bounding_box(store);

        self.identify_edges(store);
        self.stage = SweepStage::EdgesIdentified;
        self.identify_vertices();
        self.stage = SweepStage::VerticesIdentified;
        self.identify_intersections(store);
        self.stage = SweepStage::IntersectionsRecorded;
        self.execute_sweep();
        self.stage = SweepStage::Swept;
        self.constrain_boundary_shapes()?;
        self.segment_edges = self.attribute_segments();
        self.stage = SweepStage::Finalized;

        debug!(
            edges = self.edges.len(),
            vertices = self.vertices.len(),
            intersections = self.intersection_count,
            pieces = self.polygons.len(),
            points = self.polygons.iter().map(Polygon::len).sum::<usize>(),
            "sweep complete"
        );
        Ok(&self.polygons)
    }

    fn reset(&mut self) {
        self.edges.clear();
        self.included.clear();
        self.vertices.clear();
        self.vertex_index.clear();
        self.intersection_count = 0;
        self.polygons.clear();
        self.segment_edges.clear();
        self.rays.clear();
        self.contributing.clear();
    }

    fn determine_edge_types(&self, store: &EdgeStore) -> EdgeTypeModes {
        let scene = store.scene();
        self.config.edge_type_modes(scene.scene_rect != scene.rect)
    }

    /// The scene rectangle narrowed by the radius and boundary shapes, then
    /// rounded outward and padded so the origin is strictly inside.
    fn define_bounding_box(&self, store: &EdgeStore) -> Rect {
        let scene = store.scene();
        let base = if self.config.use_inner_bounds {
            scene.scene_rect
        } else {
            scene.rect
        };
        let mut bounds = Some(base);
        if let Some(radius) = self.config.radius {
            let reach = Rect::centered(self.origin, radius);
            bounds = bounds.and_then(|b| b.intersection(&reach));
        }
        for shape in &self.config.boundary_shapes {
            if let Some(shape_bounds) = shape.bounds() {
                bounds = bounds.and_then(|b| b.intersection(&shape_bounds));
            }
        }
        let at_origin = Rect::from_corners(self.origin, self.origin);
        bounds
            .map_or(at_origin, |b| b.union(&at_origin))
            .round_out()
            .pad(1.0)
    }

    /// The restriction an edge imposes on this sweep, or `None` when it
    /// takes no part.
    fn test_edge_inclusion(&self, edge: &Edge, modes: &EdgeTypeModes) -> Option<RestrictionLevel> {
        let mode = modes.get(edge.edge_type());
        let level = edge.restriction(self.config.sense);
        match mode {
            EdgeInclusion::Never => return None,
            // Bounds edges block even with the origin lying on them.
            EdgeInclusion::Always => return Some(RestrictionLevel::Full),
            EdgeInclusion::Maybe if level == RestrictionLevel::None => return None,
            EdgeInclusion::Maybe
                if edge.edge_type() == EdgeType::Darkness
                    && edge.priority() < self.config.priority =>
            {
                return None;
            }
            EdgeInclusion::Maybe => {}
        }

        // A ray can never cross a wall lying on a line through the origin.
        let side = edge.orient_point(&self.origin);
        if side == EdgeSide::Collinear {
            return None;
        }

        let named = match edge.direction() {
            EdgeDirection::Both => None,
            EdgeDirection::Left => Some(EdgeSide::Left),
            EdgeDirection::Right => Some(EdgeSide::Right),
        };
        if let Some(named) = named {
            let mode = self.config.wall_direction_mode;
            if mode != WallDirectionMode::Both
                && (mode == WallDirectionMode::Normal) == (side == named)
            {
                return None;
            }
        }

        if self.config.use_threshold
            && edge.apply_threshold(self.config.sense, &self.origin, self.config.external_radius)
        {
            return None;
        }
        Some(level)
    }

    /// Included store edges whose segment touches `area`.
    fn candidate_edges(
        &self,
        store: &EdgeStore,
        area: &Rect,
        modes: &EdgeTypeModes,
    ) -> Vec<SweepEdge> {
        store
            .edges_in(area)
            .into_iter()
            .filter_map(|id| {
                let edge = store.get(id)?;
                let level = self.test_edge_inclusion(edge, modes)?;
                let (a, b) = (*edge.a(), *edge.b());
                if edge.orient_point(&self.origin) != EdgeSide::Collinear {
                    return Some(SweepEdge::oriented(
                        &self.origin,
                        a,
                        b,
                        Some(id),
                        level,
                        edge.priority(),
                    ));
                }
                let (start, end) = through_origin(&self.origin, a, b)?;
                Some(SweepEdge {
                    id: Some(id),
                    start,
                    end,
                    level,
                    priority: edge.priority(),
                })
            })
            .collect()
    }

    fn identify_edges(&mut self, store: &EdgeStore) {
        self.edges = self.candidate_edges(store, &self.bounding_box, &self.edge_types);
        self.included = self
            .edges
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.id.map(|id| (id, i)))
            .collect();
        // The box sides make sure every ray stops somewhere.
        for (a, b) in self.bounding_box.sides() {
            self.edges.push(SweepEdge::oriented(
                &self.origin,
                a,
                b,
                None,
                RestrictionLevel::Full,
                i32::MIN,
            ));
        }
    }

    fn vertex_at(&mut self, p: Point2) -> usize {
        let key = VertexKey::of(&p);
        if let Some(&i) = self.vertex_index.get(&key) {
            return i;
        }
        let i = self.vertices.len();
        self.vertices.push(PolygonVertex::new(p, &self.origin));
        self.vertex_index.insert(key, i);
        i
    }

    fn identify_vertices(&mut self) {
        for i in 0..self.edges.len() {
            let (start, end) = (self.edges[i].start, self.edges[i].end);
            let v = self.vertex_at(start);
            self.vertices[v].attach_cw(i);
            let v = self.vertex_at(end);
            self.vertices[v].attach_ccw(i);
        }
    }

    /// Adds a vertex wherever two included edges cross, using the store's
    /// cached crossings, plus where edges leave the bounding box.
    fn identify_intersections(&mut self, store: &EdgeStore) {
        let mut crossings: Vec<(Point2, usize, usize)> = Vec::new();
        for (i, edge) in self.edges.iter().enumerate() {
            let Some(id) = edge.id else {
                continue;
            };
            for (other, ix) in store.intersections_of(id) {
                if let Some(&j) = self.included.get(&other) {
                    if j > i {
                        crossings.push((ix.point, i, j));
                    }
                }
            }
        }
        let sides: Vec<usize> = (0..self.edges.len())
            .filter(|&j| self.edges[j].id.is_none())
            .collect();
        for (i, edge) in self.edges.iter().enumerate() {
            if edge.id.is_none() {
                continue;
            }
            for &j in &sides {
                let side = &self.edges[j];
                if let Some((p, _, _)) =
                    segment_segment_intersect_2d(&edge.start, &edge.end, &side.start, &side.end)
                {
                    crossings.push((p, i, j));
                }
            }
        }

        // The origin itself is never a vertex.
        crossings.retain(|(p, _, _)| !points_equal(p, &self.origin));
        self.intersection_count = crossings.len();
        for (p, i, j) in crossings {
            let v = self.vertex_at(p);
            let key = self.vertices[v].key;
            for k in [i, j] {
                let edge = self.edges[k];
                let is_endpoint = [edge.start, edge.end]
                    .iter()
                    .any(|q| points_equal(q, &p) || VertexKey::of(q) == key);
                // An edge meeting the crossing at its own endpoint already
                // starts or ends there.
                if !is_endpoint {
                    self.vertices[v].attach_cw(k);
                    self.vertices[v].attach_ccw(k);
                }
            }
        }
    }

    /// Edges crossing the due-west ray, active before the first vertex.
    fn initialize_active_edges(&self) -> ActiveEdgeSet {
        let mut active = ActiveEdgeSet::new();
        for (i, edge) in self.edges.iter().enumerate() {
            // The edge wraps past due west when its start sorts after its end.
            if compare_angle(&self.origin, &edge.start, &edge.end) == Ordering::Greater {
                active.insert(i);
            }
        }
        active
    }

    /// Unit-distance points along the cone's bounding rays.
    fn cone_rays(&self) -> Option<(Point2, Point2)> {
        if !self.config.has_limited_angle() {
            return None;
        }
        let half = self.config.angle / 2.0;
        let at = |degrees: f64| {
            let a = degrees.to_radians();
            self.origin + Vector2::new(a.cos(), a.sin())
        };
        Some((
            at(self.config.rotation - half),
            at(self.config.rotation + half),
        ))
    }

    /// Vertices in clockwise order from due west, grouped by ray.
    fn sort_vertices(&self) -> Vec<AngleGroup> {
        let o = self.origin;
        let mut order: Vec<usize> = (0..self.vertices.len()).collect();
        order.sort_by(|&a, &b| compare_vertices(&o, &self.vertices[a], &self.vertices[b]));

        let mut groups: Vec<AngleGroup> = Vec::new();
        for i in order {
            let p = self.vertices[i].point;
            let same_ray = groups
                .last()
                .is_some_and(|g| compare_angle(&o, &g.toward, &p) == Ordering::Equal);
            if let (true, Some(g)) = (same_ray, groups.last_mut()) {
                g.vertices.push(i);
                continue;
            }
            groups.push(AngleGroup {
                toward: p,
                vertices: vec![i],
                cone_boundary: false,
            });
        }

        if let Some((start, end)) = self.cone_rays() {
            for toward in [start, end] {
                let pos = groups.partition_point(|g| {
                    compare_angle(&o, &g.toward, &toward) == Ordering::Less
                });
                let existing = groups
                    .get(pos)
                    .is_some_and(|g| compare_angle(&o, &g.toward, &toward) == Ordering::Equal);
                if existing {
                    groups[pos].cone_boundary = true;
                } else {
                    groups.insert(
                        pos,
                        AngleGroup {
                            toward,
                            vertices: Vec::new(),
                            cone_boundary: true,
                        },
                    );
                }
            }
        }
        groups
    }

    /// Exact meeting points of edges touching a group's ray at a vertex.
    fn anchors(&self, group: &AngleGroup) -> HashMap<usize, Point2> {
        let mut anchors = HashMap::new();
        for &v in &group.vertices {
            let vertex = &self.vertices[v];
            for &e in vertex.cw_edges.iter().chain(&vertex.ccw_edges) {
                anchors.entry(e).or_insert(vertex.point);
            }
        }
        anchors
    }

    /// A vertex farther along its ray than where the ray already stops
    /// cannot change the boundary. A ray stopped at the origin by a bounds
    /// edge through it still marks a corner, so nothing is behind it.
    fn is_vertex_behind_active_edges(vertex: &PolygonVertex, hit: &RayHit) -> bool {
        let reach = hit.distance_squared.sqrt();
        reach > MIN_POINT_SPACING && vertex.distance_squared.sqrt() > reach + MIN_POINT_SPACING
    }

    fn execute_sweep(&mut self) {
        let groups = self.sort_vertices();
        let mut active = self.initialize_active_edges();
        let origin = self.origin;
        let mut emitted: Vec<Option<(RayHit, RayHit)>> = Vec::with_capacity(groups.len());

        for group in &groups {
            let anchors = self.anchors(group);
            let before = active.cast(&origin, &group.toward, &self.edges, &anchors);
            let hidden = !group.cone_boundary
                && !group.vertices.is_empty()
                && before.is_some_and(|hit| {
                    group
                        .vertices
                        .iter()
                        .all(|&v| Self::is_vertex_behind_active_edges(&self.vertices[v], &hit))
                });

            for &v in &group.vertices {
                for e in self.vertices[v].ending_edges() {
                    active.remove(e);
                }
            }
            for &v in &group.vertices {
                for e in self.vertices[v].starting_edges() {
                    active.insert(e);
                }
            }
            if hidden {
                emitted.push(None);
                continue;
            }

            let after = active.cast(&origin, &group.toward, &self.edges, &anchors);
            let pair = before.zip(after);
            if let Some((b, a)) = pair {
                trace!(x = a.point.x, y = a.point.y, active = active.len(), "sweep collision");
                self.rays.push(Ray::new(origin, b.point));
                if b.point != a.point {
                    self.rays.push(Ray::new(origin, a.point));
                }
                for hit in [b, a] {
                    if let Some(id) = self.edges[hit.edge].id {
                        self.contributing.insert(id);
                    }
                }
            }
            emitted.push(pair);
        }

        let polygon = self.assemble(&groups, &emitted);
        if !polygon.is_empty() {
            self.polygons.push(polygon);
        }
    }

    /// Joins the emitted points into the boundary. A cone starts and ends at
    /// the origin.
    fn assemble(&self, groups: &[AngleGroup], emitted: &[Option<(RayHit, RayHit)>]) -> Polygon {
        let mut polygon = Polygon::default();
        match self.cone_rays() {
            None => {
                for (b, a) in emitted.iter().flatten() {
                    polygon.add_point(b.point);
                    polygon.add_point(a.point);
                }
            }
            Some((start, end)) => {
                let o = self.origin;
                let find = |toward: &Point2| {
                    groups.iter().position(|g| {
                        g.cone_boundary && compare_angle(&o, &g.toward, toward) == Ordering::Equal
                    })
                };
                let (Some(s), Some(e)) = (find(&start), find(&end)) else {
                    return polygon;
                };
                polygon.add_point(o);
                if let Some((_, a)) = emitted[s] {
                    polygon.add_point(a.point);
                }
                let n = groups.len();
                let mut k = (s + 1) % n;
                while k != e {
                    if let Some((b, a)) = emitted[k] {
                        polygon.add_point(b.point);
                        polygon.add_point(a.point);
                    }
                    k = (k + 1) % n;
                }
                if let Some((b, _)) = emitted[e] {
                    polygon.add_point(b.point);
                }
            }
        }
        polygon.close();
        polygon
    }

    /// Intersects the swept polygon with the radius circle and every
    /// boundary shape.
    fn constrain_boundary_shapes(&mut self) -> Result<()> {
        let mut clips = Vec::new();
        if let Some(radius) = self.config.radius {
            let mut circle = Circle::new(self.origin, radius)?;
            if let Some(density) = self.config.density {
                circle = circle.with_density(density);
            }
            clips.push(ClipObject::Circle(circle));
        }
        for shape in &self.config.boundary_shapes {
            if let Some(clip) = shape.clip_object()? {
                clips.push(clip);
            }
        }
        for clip in &clips {
            self.polygons = self
                .polygons
                .iter()
                .flat_map(|piece| WeilerAthertonClipper::combine(piece, clip, ClipType::Intersect))
                .collect();
        }
        Ok(())
    }

    /// Matches every boundary segment to the store edge it lies on. Only
    /// edges that stopped a ray can carry a segment.
    fn attribute_segments(&self) -> Vec<Vec<Option<EdgeId>>> {
        let carriers: Vec<&SweepEdge> = self
            .contributing
            .iter()
            .filter_map(|id| self.included.get(id).map(|&i| &self.edges[i]))
            .collect();
        self.polygons
            .iter()
            .map(|polygon| {
                let points = polygon.points();
                let n = points.len();
                (0..n)
                    .map(|i| {
                        let (a, b) = (points[i], points[(i + 1) % n]);
                        carriers
                            .iter()
                            .find(|e| lies_on(&a, e) && lies_on(&b, e))
                            .and_then(|e| e.id)
                    })
                    .collect()
            })
            .collect()
    }

    /// Tests a ray from the origin against the edges it crosses, without
    /// building a polygon.
    ///
    /// Edges are filtered exactly as for a sweep, from this sweep's origin.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::NotInitialized` before
    /// [`initialize`](Self::initialize).
    pub fn test_collision(
        &self,
        store: &EdgeStore,
        ray: &Ray,
        mode: CollisionMode,
    ) -> Result<CollisionResult> {
        if self.stage == SweepStage::Uninitialized {
            return Err(SweepError::NotInitialized.into());
        }
        let modes = self.determine_edge_types(store);
        let area = Rect::from_corners(ray.a, ray.b).pad(1.0);

        let mut collisions: Vec<Collision> = Vec::new();
        for edge in self.candidate_edges(store, &area, &modes) {
            let Some(id) = edge.id else {
                continue;
            };
            let Some((t, _)) = ray.intersect_segment(&edge.start, &edge.end) else {
                continue;
            };
            let point = ray.project(t);
            match collisions.iter_mut().find(|c| points_equal(&c.point, &point)) {
                Some(c) => {
                    c.edges.push(id);
                    c.level = c.level.max(edge.level);
                }
                None => collisions.push(Collision {
                    point,
                    t,
                    edges: vec![id],
                    level: edge.level,
                }),
            }
        }
        collisions.sort_by(|a, b| a.t.total_cmp(&b.t));
        trace!(collisions = collisions.len(), ?mode, "tested collision ray");

        Ok(match mode {
            CollisionMode::Any => CollisionResult::Any(first_blocking(&collisions).is_some()),
            CollisionMode::Closest => CollisionResult::Closest(first_blocking(&collisions).cloned()),
            CollisionMode::All => CollisionResult::All(collisions),
        })
    }
}

/// Sweep endpoints for an edge on a line through the origin.
///
/// Such an edge stops rays only when the origin lies on it, which happens
/// for a bounds edge when the origin sits on the scene boundary. Kept in
/// store order, it is active over the half-plane on its left, which for
/// the clockwise bounds sides is the outside of the scene. An endpoint at
/// the origin is mirrored through it so the edge spans both directions.
fn through_origin(origin: &Point2, a: Point2, b: Point2) -> Option<(Point2, Point2)> {
    if !points_equal(&closest_point_on_segment(origin, &a, &b), origin) {
        return None;
    }
    let mirror = |p: &Point2| Point2::from(origin.coords * 2.0 - p.coords);
    if points_equal(&a, origin) {
        Some((mirror(&b), b))
    } else if points_equal(&b, origin) {
        Some((a, mirror(&a)))
    } else {
        Some((a, b))
    }
}

fn lies_on(p: &Point2, edge: &SweepEdge) -> bool {
    points_equal(&closest_point_on_segment(p, &edge.start, &edge.end), p)
}
