//! Weighted control points and spline-type policies.

use serde::{Deserialize, Serialize};

use loft_math::Point3;

use super::{KnotType, DEFAULT_WEIGHT};

/// A weighted control point of a rational curve or surface.
///
/// Weights at or below zero are permitted by the data model but make the
/// rational denominator degenerate; evaluation then falls back to the
/// epsilon-substitution policy instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub position: Point3,
    pub weight: f64,
}

impl ControlPoint {
    pub fn new(position: Point3, weight: f64) -> Self {
        Self { position, weight }
    }

    /// A control point with `DEFAULT_WEIGHT`.
    pub fn unweighted(position: Point3) -> Self {
        Self {
            position,
            weight: DEFAULT_WEIGHT,
        }
    }
}

impl From<Point3> for ControlPoint {
    fn from(position: Point3) -> Self {
        Self::unweighted(position)
    }
}

/// How a curve (or one surface axis) treats its ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplineType {
    /// Open curve over a uniform knot vector; the ends float away from the
    /// first and last control points.
    Standard,
    /// Periodic: the first `order` control points are duplicated at the
    /// tail so the evaluation recursion wraps seamlessly.
    Loop,
    /// Open but clamped: an open-uniform knot vector makes the curve touch
    /// its first and last control points exactly.
    Clamped,
}

impl SplineType {
    /// Knot spacing policy implied by the spline type.
    pub fn knot_type(self) -> KnotType {
        match self {
            SplineType::Clamped => KnotType::OpenUniform,
            SplineType::Standard | SplineType::Loop => KnotType::Uniform,
        }
    }

    pub fn is_loop(self) -> bool {
        matches!(self, SplineType::Loop)
    }
}

/// Append copies of the first `order` points so a looping recursion can run
/// past the seam without modular index arithmetic in the hot path.
pub(crate) fn extend_for_loop(points: &mut Vec<ControlPoint>, order: usize) {
    debug_assert!(order <= points.len());
    for i in 0..order {
        let cp = points[i];
        points.push(cp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loft_math::DVec3;

    #[test]
    fn test_default_weight() {
        let cp = ControlPoint::unweighted(DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(cp.weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn test_knot_type_derivation() {
        assert_eq!(SplineType::Standard.knot_type(), KnotType::Uniform);
        assert_eq!(SplineType::Loop.knot_type(), KnotType::Uniform);
        assert_eq!(SplineType::Clamped.knot_type(), KnotType::OpenUniform);
    }

    #[test]
    fn test_loop_extension_duplicates_head() {
        let mut points: Vec<ControlPoint> = vec![
            DVec3::new(0.0, 0.0, 0.0).into(),
            DVec3::new(1.0, 0.0, 0.0).into(),
            DVec3::new(1.0, 1.0, 0.0).into(),
            DVec3::new(0.0, 1.0, 0.0).into(),
        ];
        extend_for_loop(&mut points, 2);
        assert_eq!(points.len(), 6);
        assert_eq!(points[4], points[0]);
        assert_eq!(points[5], points[1]);
    }
}
