use super::{Point2, Vector2, TOLERANCE};

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let cross = d1.x * d2.y - d1.y * d2.x;
    if cross.abs() < TOLERANCE * d1.norm() * d2.norm() {
        return None;
    }
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let t = (dx * d2.y - dy * d2.x) / cross;
    let u = (dx * d1.y - dy * d1.x) / cross;
    Some((t, u))
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
/// Parallel and collinear segments never intersect.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let (t, u) = line_line_intersect_2d(a0, &da, b0, &db)?;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        Some((point_at(a0, &da, t_clamped), t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Intersection of a ray `origin + t * dir` (`t >= 0`) with the segment `a -> b`.
///
/// Returns `(t, u)` with `u` the parameter along the segment.
#[must_use]
pub fn ray_segment_intersect_2d(
    origin: &Point2,
    dir: &Vector2,
    a: &Point2,
    b: &Point2,
) -> Option<(f64, f64)> {
    let (t, u) = line_line_intersect_2d(origin, dir, a, &(b - a))?;
    let eps = TOLERANCE;
    if t >= -eps && u >= -eps && u <= 1.0 + eps {
        Some((t.max(0.0), u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Linear interpolation: `origin + dir * t`.
#[must_use]
pub fn point_at(origin: &Point2, dir: &Vector2, t: f64) -> Point2 {
    origin + dir * t
}

/// Intersection of the segment `a -> b` with a full circle.
///
/// Returns `(point, t)` pairs sorted by `t` in `[0, 1]`. A tangent contact
/// yields a single entry.
#[must_use]
pub fn segment_circle_intersect_2d(
    a: &Point2,
    b: &Point2,
    center: &Point2,
    radius: f64,
) -> Vec<(Point2, f64)> {
    let mut results = Vec::new();
    if radius < TOLERANCE {
        return results;
    }

    let d = b - a;
    let seg_len_sq = d.norm_squared();
    if seg_len_sq < TOLERANCE * TOLERANCE {
        return results;
    }

    // Substitute the parametric segment into the circle equation:
    // |a + t*d - c|² = r²
    let f = a - center;
    let qa = seg_len_sq;
    let qb = 2.0 * f.dot(&d);
    let qc = f.norm_squared() - radius * radius;
    let discriminant = qb * qb - 4.0 * qa * qc;

    if discriminant < 0.0 {
        return results;
    }
    let disc_sqrt = discriminant.sqrt();

    let t_roots = if disc_sqrt < TOLERANCE * qa {
        // Tangent case: single root.
        vec![-qb / (2.0 * qa)]
    } else {
        vec![(-qb - disc_sqrt) / (2.0 * qa), (-qb + disc_sqrt) / (2.0 * qa)]
    };

    let eps = TOLERANCE;
    for t in t_roots {
        if t < -eps || t > 1.0 + eps {
            continue;
        }
        let t = t.clamp(0.0, 1.0);
        results.push((point_at(a, &d, t), t));
    }
    results
}

/// Closest point to `p` on the segment `a -> b`.
#[must_use]
pub fn closest_point_on_segment(p: &Point2, a: &Point2, b: &Point2) -> Point2 {
    let d = b - a;
    let len_sq = d.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return *a;
    }
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    point_at(a, &d, t)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn line_line_perpendicular() {
        let p1 = Point2::new(0.0, 0.0);
        let d1 = Vector2::new(1.0, 0.0);
        let p2 = Point2::new(0.5, -1.0);
        let d2 = Vector2::new(0.0, 1.0);
        let (t, u) = line_line_intersect_2d(&p1, &d1, &p2, &d2).unwrap();
        assert_abs_diff_eq!(t, 0.5, epsilon = TOLERANCE);
        assert_abs_diff_eq!(u, 1.0, epsilon = TOLERANCE);
    }

    #[test]
    fn line_line_parallel_returns_none() {
        let p1 = Point2::new(0.0, 0.0);
        let d1 = Vector2::new(1.0, 0.0);
        let p2 = Point2::new(0.0, 1.0);
        let d2 = Vector2::new(1.0, 0.0);
        assert!(line_line_intersect_2d(&p1, &d1, &p2, &d2).is_none());
    }

    #[test]
    fn segment_segment_crossing() {
        let (pt, t, u) = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(0.0, 2.0),
            &Point2::new(2.0, 0.0),
        )
        .unwrap();
        assert_abs_diff_eq!(pt.x, 1.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(pt.y, 1.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(t, 0.5, epsilon = TOLERANCE);
        assert_abs_diff_eq!(u, 0.5, epsilon = TOLERANCE);
    }

    #[test]
    fn segment_segment_touching_endpoint() {
        let (pt, t, u) = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(2.0, 5.0),
        )
        .unwrap();
        assert_abs_diff_eq!(pt.x, 2.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(t, 1.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(u, 0.0, epsilon = TOLERANCE);
    }

    #[test]
    fn segment_segment_no_crossing() {
        assert!(segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn ray_hits_segment_ahead_only() {
        let origin = Point2::new(0.0, 0.0);
        let a = Point2::new(5.0, -1.0);
        let b = Point2::new(5.0, 1.0);
        let (t, u) = ray_segment_intersect_2d(&origin, &Vector2::new(1.0, 0.0), &a, &b).unwrap();
        assert_abs_diff_eq!(t, 5.0, epsilon = TOLERANCE);
        assert_abs_diff_eq!(u, 0.5, epsilon = TOLERANCE);
        assert!(ray_segment_intersect_2d(&origin, &Vector2::new(-1.0, 0.0), &a, &b).is_none());
    }

    #[test]
    fn segment_circle_two_crossings() {
        let hits = segment_circle_intersect_2d(
            &Point2::new(-2.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(0.0, 0.0),
            1.0,
        );
        assert_eq!(hits.len(), 2);
        assert_abs_diff_eq!(hits[0].0.x, -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hits[1].0.x, 1.0, epsilon = 1e-9);
        assert!(hits[0].1 < hits[1].1);
    }

    #[test]
    fn segment_circle_inside_has_no_crossing() {
        let hits = segment_circle_intersect_2d(
            &Point2::new(-0.5, 0.0),
            &Point2::new(0.5, 0.0),
            &Point2::new(0.0, 0.0),
            1.0,
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn segment_circle_tangent() {
        let hits = segment_circle_intersect_2d(
            &Point2::new(-1.0, 1.0),
            &Point2::new(1.0, 1.0),
            &Point2::new(0.0, 0.0),
            1.0,
        );
        assert_eq!(hits.len(), 1, "hits={hits:?}");
        assert_abs_diff_eq!(hits[0].0.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(hits[0].0.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn closest_point_clamps_to_endpoints() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 0.0);
        let c = closest_point_on_segment(&Point2::new(5.0, 3.0), &a, &b);
        assert_abs_diff_eq!(c.x, 5.0);
        assert_abs_diff_eq!(c.y, 0.0);
        let c = closest_point_on_segment(&Point2::new(-4.0, 3.0), &a, &b);
        assert_abs_diff_eq!(c.x, 0.0);
    }
}
