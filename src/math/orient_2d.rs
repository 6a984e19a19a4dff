use super::{Point2, TOLERANCE};

/// Which side of a directed line a point lies on.
///
/// Sides are named for screen space (y down): `CounterClockwise` means the
/// point is visually counter-clockwise of the line direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    CounterClockwise,
    Clockwise,
    Collinear,
}

/// Orientation determinant of the triangle `(a, b, c)`.
///
/// Positive when `c` lies counter-clockwise of the directed line `a -> b`
/// in screen space, negative when clockwise, zero when collinear.
#[must_use]
pub fn orient2d(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (a.y - c.y) * (b.x - c.x) - (a.x - c.x) * (b.y - c.y)
}

/// Classifies `c` against the directed line `a -> b`.
///
/// The determinant is compared against a tolerance scaled by the lengths
/// involved, so the test is independent of the coordinate magnitude.
#[must_use]
pub fn orientation(a: &Point2, b: &Point2, c: &Point2) -> Orientation {
    let det = orient2d(a, b, c);
    let scale = (b - a).norm() * (c - a).norm();
    if det.abs() <= TOLERANCE * scale.max(1.0) {
        Orientation::Collinear
    } else if det > 0.0 {
        Orientation::CounterClockwise
    } else {
        Orientation::Clockwise
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_space_sign() {
        // Heading east, a point below the line (larger y) is clockwise on screen.
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert!(orient2d(&a, &b, &Point2::new(0.0, 1.0)) < 0.0);
        assert!(orient2d(&a, &b, &Point2::new(0.0, -1.0)) > 0.0);
        assert_eq!(orientation(&a, &b, &Point2::new(0.5, 1.0)), Orientation::Clockwise);
        assert_eq!(
            orientation(&a, &b, &Point2::new(0.5, -1.0)),
            Orientation::CounterClockwise
        );
    }

    #[test]
    fn collinear_and_endpoints() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(10.0, 10.0);
        assert_eq!(orientation(&a, &b, &Point2::new(5.0, 5.0)), Orientation::Collinear);
        assert_eq!(orientation(&a, &b, &Point2::new(20.0, 20.0)), Orientation::Collinear);
        assert_eq!(orientation(&a, &b, &a), Orientation::Collinear);
        assert_eq!(orientation(&a, &b, &b), Orientation::Collinear);
    }

    #[test]
    fn tolerance_scales_with_magnitude() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0e6, 0.0);
        assert_eq!(
            orientation(&a, &b, &Point2::new(5.0e5, 1.0e-6)),
            Orientation::Collinear
        );
        assert_eq!(orientation(&a, &b, &Point2::new(5.0e5, 1.0)), Orientation::Clockwise);
    }
}
