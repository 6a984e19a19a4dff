use crate::edge::{EdgeId, RestrictionLevel};
use crate::math::Point2;

/// What a collision test reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollisionMode {
    /// Whether anything blocks the ray.
    #[default]
    Any,
    /// The nearest blocking collision.
    Closest,
    /// Every crossing, blocking or not, nearest first.
    All,
}

/// A point where a ray crosses one or more edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub point: Point2,
    /// Fraction along the ray.
    pub t: f64,
    /// Edges meeting the ray at this point.
    pub edges: Vec<EdgeId>,
    /// Strongest restriction among `edges`.
    pub level: RestrictionLevel,
}

/// Result of a collision test, shaped by its [`CollisionMode`].
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionResult {
    Any(bool),
    Closest(Option<Collision>),
    All(Vec<Collision>),
}

impl CollisionResult {
    /// `true` when the ray is blocked before its far endpoint.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        match self {
            Self::Any(blocked) => *blocked,
            Self::Closest(c) => c.is_some(),
            Self::All(all) => first_blocking(all).is_some(),
        }
    }
}

/// The first collision that stops a ray: the second `Limited` crossing or
/// the first stronger one. Limited edges meeting at one point count once.
#[must_use]
pub fn first_blocking(collisions: &[Collision]) -> Option<&Collision> {
    let mut limited = 0;
    collisions.iter().find(|c| match c.level {
        RestrictionLevel::None => false,
        RestrictionLevel::Limited => {
            limited += 1;
            limited >= 2
        }
        RestrictionLevel::Proximity | RestrictionLevel::Full => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(t: f64, level: RestrictionLevel) -> Collision {
        Collision {
            point: Point2::new(t * 10.0, 0.0),
            t,
            edges: Vec::new(),
            level,
        }
    }

    #[test]
    fn second_limited_blocks() {
        let all = vec![
            at(0.2, RestrictionLevel::Limited),
            at(0.4, RestrictionLevel::Limited),
            at(0.6, RestrictionLevel::Full),
        ];
        assert_eq!(first_blocking(&all).map(|c| c.t), Some(0.4));
        assert!(CollisionResult::All(all).is_blocked());
    }

    #[test]
    fn single_limited_does_not_block() {
        let all = vec![at(0.5, RestrictionLevel::Limited)];
        assert!(first_blocking(&all).is_none());
        assert!(!CollisionResult::All(all).is_blocked());
        assert!(!CollisionResult::Closest(None).is_blocked());
    }
}
