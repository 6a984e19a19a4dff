use super::intersect_2d::closest_point_on_segment;
use super::orient_2d::orient2d;
use super::{Point2, TOLERANCE};

/// Computes the signed area of a closed ring (shoelace formula).
///
/// Positive when the ring winds clockwise in screen space (y down).
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Even-odd point-in-polygon test for a closed ring.
///
/// Points within [`TOLERANCE`]-scaled distance of the boundary count as
/// contained.
#[must_use]
pub fn point_in_polygon_2d(points: &[Point2], p: &Point2) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    if distance_to_boundary_2d(points, p) <= TOLERANCE.sqrt() {
        return true;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (&points[i], &points[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shortest distance from `p` to the boundary of a closed ring.
#[must_use]
pub fn distance_to_boundary_2d(points: &[Point2], p: &Point2) -> f64 {
    let n = points.len();
    let mut best = f64::INFINITY;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        let c = closest_point_on_segment(p, a, b);
        best = best.min((p - c).norm());
    }
    best
}

/// Returns `true` when the ring is convex (collinear runs allowed).
#[must_use]
pub fn is_convex_2d(points: &[Point2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0_f64;
    for i in 0..n {
        let a = &points[i];
        let b = &points[(i + 1) % n];
        let c = &points[(i + 2) % n];
        let det = orient2d(a, b, c);
        let scale = (b - a).norm() * (c - b).norm();
        if det.abs() <= TOLERANCE * scale.max(1.0) {
            continue;
        }
        if sign == 0.0 {
            sign = det.signum();
        } else if det.signum() != sign {
            return false;
        }
    }
    sign != 0.0
}
