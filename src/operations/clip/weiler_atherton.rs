use tracing::trace;

use crate::error::Result;
use crate::geometry::{BoundaryShape, ClipObject, ClipShape, Polygon};
use crate::math::{points_equal, Point2};

/// Boolean operation applied by [`WeilerAthertonClipper::combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipType {
    Intersect,
    Union,
}

/// How the polygon boundary behaves where it meets the clip boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntersectionType {
    /// Enters the clip shape.
    OutIn,
    /// Leaves the clip shape.
    InOut,
    /// Touches the boundary without crossing it.
    Tangent,
}

/// Containment relation of two shapes whose boundaries never cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Envelopment {
    /// Disjoint.
    None,
    /// The polygon lies inside the clip shape.
    PolygonEnveloped,
    /// The clip shape lies inside the polygon.
    ClipEnveloped,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    point: Point2,
    /// Candidate for a crossing: an inserted boundary hit or a polygon
    /// vertex lying on the clip boundary.
    on_boundary: bool,
    kind: Option<IntersectionType>,
}

/// Weiler-Atherton combination of a simple polygon with a convex clip
/// shape.
///
/// The polygon boundary is labelled at every point where it meets the clip
/// boundary, then output rings are traced by following the polygon between
/// crossings and the clip boundary from each crossing to the next one along
/// it.
#[derive(Debug)]
pub struct WeilerAthertonClipper<'a, C: ClipShape> {
    nodes: Vec<Node>,
    clip: &'a C,
    clip_type: ClipType,
}

impl<'a, C: ClipShape> WeilerAthertonClipper<'a, C> {
    /// Combines `polygon` with `clip`.
    ///
    /// Usually a single ring. A union of disjoint shapes returns both, and
    /// an intersection of disjoint shapes returns nothing.
    #[must_use]
    pub fn combine(polygon: &Polygon, clip: &'a C, clip_type: ClipType) -> Vec<Polygon> {
        let mut polygon = polygon.clone();
        if !polygon.is_positive() {
            polygon.reverse_orientation();
        }
        if polygon.len() < 3 {
            return match clip_type {
                ClipType::Intersect => Vec::new(),
                ClipType::Union => vec![clip.to_polygon()],
            };
        }

        let mut clipper = Self {
            nodes: build_nodes(&polygon, clip),
            clip,
            clip_type,
        };
        clipper.label_crossings();
        let crossings: Vec<usize> = clipper
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| {
                matches!(
                    n.kind,
                    Some(IntersectionType::OutIn | IntersectionType::InOut)
                )
            })
            .map(|(i, _)| i)
            .collect();
        trace!(crossings = crossings.len(), ?clip_type, "clipping polygon");

        if crossings.is_empty() {
            return clipper.combine_enveloped(polygon);
        }
        clipper.trace_rings(&crossings)
    }

    /// Classifies a polygon and clip shape whose boundaries do not cross.
    #[must_use]
    pub fn test_for_envelopment(polygon: &Polygon, clip: &C) -> Envelopment {
        if polygon.points().iter().all(|p| clip.contains(p)) {
            Envelopment::PolygonEnveloped
        } else if polygon.contains_point(&clip.interior_point()) {
            Envelopment::ClipEnveloped
        } else {
            Envelopment::None
        }
    }

    fn combine_enveloped(&self, polygon: Polygon) -> Vec<Polygon> {
        let envelopment = Self::test_for_envelopment(&polygon, self.clip);
        match (self.clip_type, envelopment) {
            (ClipType::Intersect, Envelopment::PolygonEnveloped) => vec![polygon],
            (ClipType::Intersect, Envelopment::ClipEnveloped) => vec![self.clip.to_polygon()],
            (ClipType::Intersect, Envelopment::None) => Vec::new(),
            (ClipType::Union, Envelopment::PolygonEnveloped) => vec![self.clip.to_polygon()],
            (ClipType::Union, Envelopment::ClipEnveloped) => vec![polygon],
            (ClipType::Union, Envelopment::None) => vec![polygon, self.clip.to_polygon()],
        }
    }

    /// Labels each boundary contact by testing the midpoints of the two
    /// polygon pieces around it. Points on the clip boundary count as
    /// inside.
    fn label_crossings(&mut self) {
        let n = self.nodes.len();
        for i in 0..n {
            if !self.nodes[i].on_boundary {
                continue;
            }
            let prev = self.nodes[(i + n - 1) % n].point;
            let next = self.nodes[(i + 1) % n].point;
            let here = self.nodes[i].point;
            let before = self.clip.contains(&nalgebra::center(&prev, &here));
            let after = self.clip.contains(&nalgebra::center(&here, &next));
            self.nodes[i].kind = Some(match (before, after) {
                (false, true) => IntersectionType::OutIn,
                (true, false) => IntersectionType::InOut,
                _ => IntersectionType::Tangent,
            });
        }
    }

    /// Traces output rings starting from every unvisited crossing that
    /// opens a kept piece of the polygon.
    fn trace_rings(&self, crossings: &[usize]) -> Vec<Polygon> {
        let m = crossings.len();
        let opening = match self.clip_type {
            ClipType::Intersect => IntersectionType::OutIn,
            ClipType::Union => IntersectionType::InOut,
        };
        let kind = |c: usize| self.nodes[crossings[c]].kind;
        let mut visited = vec![false; m];
        let mut rings = Vec::new();

        for start in 0..m {
            if visited[start] || kind(start) != Some(opening) {
                continue;
            }
            let mut ring = Polygon::default();
            let mut current = start;
            loop {
                visited[current] = true;
                let next = (current + 1) % m;
                // Follow the polygon from this crossing to the next one.
                let (from, to) = (crossings[current], crossings[next]);
                ring.add_point(self.nodes[from].point);
                let mut i = (from + 1) % self.nodes.len();
                while i != to {
                    ring.add_point(self.nodes[i].point);
                    i = (i + 1) % self.nodes.len();
                }
                ring.add_point(self.nodes[to].point);
                visited[next] = true;

                // Then along the clip boundary to the nearest opening crossing.
                let Some(resume) = self.next_along_clip(crossings, next, opening) else {
                    break;
                };
                let a = self.nodes[to].point;
                let b = self.nodes[crossings[resume]].point;
                for p in self.clip.points_between(&a, &b) {
                    ring.add_point(p);
                }
                if resume == start || visited[resume] {
                    break;
                }
                current = resume;
            }
            ring.close();
            if ring.len() >= 3 {
                rings.push(ring);
            }
        }
        rings
    }

    /// The crossing of type `kind` reached first when walking the clip
    /// boundary clockwise from crossing `from`.
    fn next_along_clip(
        &self,
        crossings: &[usize],
        from: usize,
        kind: IntersectionType,
    ) -> Option<usize> {
        let origin = self.clip.boundary_parameter(&self.nodes[crossings[from]].point);
        crossings
            .iter()
            .enumerate()
            .filter_map(|(c, &node)| {
                (c != from && self.nodes[node].kind == Some(kind)).then(|| {
                    let position = self.clip.boundary_parameter(&self.nodes[node].point);
                    (c, (position - origin).rem_euclid(1.0))
                })
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c)
    }
}

impl WeilerAthertonClipper<'_, ClipObject> {
    /// Checks `polygon` against the [`BoundaryShape`] and combines.
    ///
    /// An unbounded shape leaves the polygon unchanged.
    ///
    /// # Errors
    ///
    /// Returns a `ClipError` if the shape is not a valid convex clip operand.
    pub fn combine_shape(
        polygon: &Polygon,
        shape: &BoundaryShape,
        clip_type: ClipType,
    ) -> Result<Vec<Polygon>> {
        Ok(match shape.clip_object()? {
            Some(clip) => WeilerAthertonClipper::combine(polygon, &clip, clip_type),
            None => vec![polygon.clone()],
        })
    }
}

/// The polygon ring with every clip boundary hit inserted in order.
fn build_nodes<C: ClipShape>(polygon: &Polygon, clip: &C) -> Vec<Node> {
    let points = polygon.points();
    let n = points.len();
    let mut on_boundary = vec![false; n];
    let mut interior_hits: Vec<Vec<Point2>> = Vec::with_capacity(n);
    for i in 0..n {
        let (a, b) = (&points[i], &points[(i + 1) % n]);
        let mut inner = Vec::new();
        for (p, _) in clip.segment_intersections(a, b) {
            if points_equal(&p, a) {
                on_boundary[i] = true;
            } else if points_equal(&p, b) {
                on_boundary[(i + 1) % n] = true;
            } else {
                inner.push(p);
            }
        }
        interior_hits.push(inner);
    }

    let mut nodes = Vec::with_capacity(n * 2);
    for (i, hits) in interior_hits.into_iter().enumerate() {
        nodes.push(Node {
            point: points[i],
            on_boundary: on_boundary[i],
            kind: None,
        });
        nodes.extend(hits.into_iter().map(|point| Node {
            point,
            on_boundary: true,
            kind: None,
        }));
    }
    nodes
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Rect};
    use approx::assert_abs_diff_eq;

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        Rect::new(x, y, size, size).to_polygon()
    }

    #[test]
    fn overlapping_squares_intersect() {
        let clip = Rect::new(5.0, -5.0, 10.0, 10.0);
        let poly = square(0.0, 0.0, 10.0);
        let out = WeilerAthertonClipper::combine(&poly, &clip, ClipType::Intersect);
        assert_eq!(out.len(), 1);
        assert_abs_diff_eq!(out[0].area(), 25.0, epsilon = 1e-9);
        assert!(out[0].is_positive());
    }

    #[test]
    fn overlapping_squares_union() {
        let clip = Rect::new(5.0, -5.0, 10.0, 10.0);
        let poly = square(0.0, 0.0, 10.0);
        let out = WeilerAthertonClipper::combine(&poly, &clip, ClipType::Union);
        assert_eq!(out.len(), 1);
        assert_abs_diff_eq!(out[0].area(), 175.0, epsilon = 1e-9);
        assert_eq!(out[0].len(), 8);
    }

    #[test]
    fn enveloped_polygon_returned_unchanged() {
        let circle = Circle::new(Point2::new(0.0, 0.0), 100.0).unwrap();
        let poly = square(-5.0, -5.0, 10.0);
        let out = WeilerAthertonClipper::combine(&poly, &circle, ClipType::Intersect);
        assert_eq!(out, vec![poly.clone()]);
        let out = WeilerAthertonClipper::combine(&poly, &circle, ClipType::Union);
        assert_eq!(out, vec![circle.to_polygon()]);
    }

    #[test]
    fn enveloped_clip_returned() {
        let clip = Rect::new(4.0, 4.0, 2.0, 2.0);
        let poly = square(0.0, 0.0, 10.0);
        let out = WeilerAthertonClipper::combine(&poly, &clip, ClipType::Intersect);
        assert_eq!(out, vec![clip.to_polygon()]);
        assert_eq!(
            WeilerAthertonClipper::test_for_envelopment(&poly, &clip),
            Envelopment::ClipEnveloped
        );
    }

    #[test]
    fn disjoint_shapes() {
        let clip = Rect::new(50.0, 50.0, 10.0, 10.0);
        let poly = square(0.0, 0.0, 10.0);
        assert!(WeilerAthertonClipper::combine(&poly, &clip, ClipType::Intersect).is_empty());
        let out = WeilerAthertonClipper::combine(&poly, &clip, ClipType::Union);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn negative_winding_normalized() {
        let clip = Rect::new(5.0, -5.0, 10.0, 10.0);
        let mut poly = square(0.0, 0.0, 10.0);
        poly.reverse_orientation();
        let out = WeilerAthertonClipper::combine(&poly, &clip, ClipType::Intersect);
        assert_eq!(out.len(), 1);
        assert_abs_diff_eq!(out[0].area(), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn square_clipped_by_circle() {
        let circle = Circle::new(Point2::new(0.0, 0.0), 10.0).unwrap().with_density(64);
        let poly = square(-20.0, -20.0, 40.0);
        let out = WeilerAthertonClipper::combine(&poly, &circle, ClipType::Intersect);
        // The circle lies wholly inside: no crossings.
        assert_eq!(out, vec![circle.to_polygon()]);

        let poly = square(0.0, -20.0, 40.0);
        let out = WeilerAthertonClipper::combine(&poly, &circle, ClipType::Intersect);
        assert_eq!(out.len(), 1);
        let half = circle.to_polygon().area() / 2.0;
        assert_abs_diff_eq!(out[0].area(), half, epsilon = 1.0);
        for p in out[0].points() {
            assert!(p.x >= -1e-9 && p.coords.norm() <= 10.0 + 1e-9);
        }
    }

    #[test]
    fn concave_polygon_splits_into_pieces() {
        // A U shape whose arms both cross a horizontal band.
        let u = Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 8.0),
            Point2::new(8.0, 8.0),
            Point2::new(8.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ]);
        let band = Rect::new(-1.0, 2.0, 12.0, 4.0);
        let out = WeilerAthertonClipper::combine(&u, &band, ClipType::Intersect);
        assert_eq!(out.len(), 2);
        for ring in &out {
            assert_abs_diff_eq!(ring.area(), 8.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn unbounded_shape_is_identity() {
        let poly = square(0.0, 0.0, 10.0);
        let out = WeilerAthertonClipper::combine_shape(
            &poly,
            &BoundaryShape::Unbounded,
            ClipType::Intersect,
        )
        .unwrap();
        assert_eq!(out, vec![poly]);
    }
}
