//! Rational B-spline curve evaluation.

use serde::{Deserialize, Serialize};

use loft_core::{LoftError, Result, Validate};
use loft_math::{Aabb3, Point3, Vector3};

use super::Curve;
use crate::nurbs::control::extend_for_loop;
use crate::nurbs::{
    basis, basis_first_derivative, generate_knots, nudge_inside, ControlPoint, KnotType,
    SplineType, WEIGHT_EPSILON,
};

/// A rational B-spline curve with a looping/clamping policy.
///
/// Loop curves physically duplicate their first `order` control points at
/// the tail of the internal array so the evaluation recursion never has to
/// wrap indices; [`NurbsCurve::set_control_point`] keeps the duplicates in
/// sync. The knot vector is derived once at construction and regenerated
/// only if the control-point count changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NurbsCurve {
    order: usize,
    spline_type: SplineType,
    knot_type: KnotType,
    /// Control points, loop-extended for [`SplineType::Loop`].
    points: Vec<ControlPoint>,
    knots: Vec<f64>,
    domain: (f64, f64),
}

impl NurbsCurve {
    /// Build a curve from weighted control points.
    ///
    /// Fails fast on an empty control list or `count <= order`; nothing
    /// downstream can recover from either.
    pub fn new(
        control_points: Vec<ControlPoint>,
        order: usize,
        spline_type: SplineType,
    ) -> Result<Self> {
        if control_points.is_empty() {
            return Err(LoftError::EmptyControlNet("curve".into()));
        }
        if control_points.len() <= order {
            return Err(LoftError::NotEnoughControlPoints {
                order,
                count: control_points.len(),
            });
        }

        let mut points = control_points;
        if spline_type.is_loop() {
            extend_for_loop(&mut points, order);
        }
        let knot_type = spline_type.knot_type();
        let knots = generate_knots(order, points.len(), knot_type);
        let domain = (knots[order], knots[points.len()]);

        Ok(Self {
            order,
            spline_type,
            knot_type,
            points,
            knots,
            domain,
        })
    }

    /// Build from bare positions, assigning every point the default weight.
    pub fn from_positions(
        positions: impl IntoIterator<Item = Point3>,
        order: usize,
        spline_type: SplineType,
    ) -> Result<Self> {
        Self::new(
            positions.into_iter().map(ControlPoint::unweighted).collect(),
            order,
            spline_type,
        )
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn spline_type(&self) -> SplineType {
        self.spline_type
    }

    pub fn knot_type(&self) -> KnotType {
        self.knot_type
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// The internal control-point array, including loop duplicates.
    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// Number of logical control points (loop duplicates excluded).
    pub fn num_control_points(&self) -> usize {
        if self.spline_type.is_loop() {
            self.points.len() - self.order
        } else {
            self.points.len()
        }
    }

    pub fn control_point(&self, i: usize) -> ControlPoint {
        self.points[i]
    }

    /// Overwrite the control point at logical index `i`.
    ///
    /// For loop curves with `i < order`, the duplicated tail slot
    /// `len - order + i` is overwritten as well so the wrap invariant
    /// holds. Knots do not depend on control-point values, so nothing else
    /// is recomputed.
    pub fn set_control_point(&mut self, i: usize, cp: ControlPoint) {
        debug_assert!(
            i < self.num_control_points(),
            "control point index {} out of range",
            i
        );
        self.points[i] = cp;
        if self.spline_type.is_loop() && i < self.order {
            let tail = self.points.len() - self.order + i;
            self.points[tail] = cp;
        }
    }

    /// Evaluate at a normalized parameter, conventionally in `[0, 1]`.
    ///
    /// The parameter is remapped affinely onto the knot-space domain. The
    /// returned flag tells whether the remapped parameter fell inside the
    /// domain; out-of-domain parameters still produce a (possibly
    /// degenerate) point rather than an error.
    pub fn evaluate(&self, normalized_t: f64) -> (Point3, bool) {
        let (t_min, t_max) = self.domain;
        let t = t_min + (t_max - t_min) * normalized_t;
        let in_domain = t >= t_min && t <= t_max;
        (self.point_on(t), in_domain)
    }

    /// Tangent (first derivative) at a normalized parameter.
    pub fn tangent(&self, normalized_t: f64) -> Vector3 {
        let (t_min, t_max) = self.domain;
        self.tangent_on(t_min + (t_max - t_min) * normalized_t)
    }

    /// Bounding box of the logical control net. By the convex hull
    /// property this also bounds the curve itself, which makes it a
    /// conservative picking/culling volume.
    pub fn control_box(&self) -> Aabb3 {
        let logical = &self.points[..self.num_control_points()];
        logical[1..]
            .iter()
            .fold(Aabb3::from_point(logical[0].position), |acc, cp| {
                acc.grown_to(cp.position)
            })
    }

    /// Weighted basis sum at a knot-space parameter.
    fn point_on(&self, t: f64) -> Point3 {
        let t = nudge_inside(t, self.domain.1);
        let mut sum = Point3::ZERO;
        let mut w_sum = 0.0;
        for (i, cp) in self.points.iter().enumerate() {
            let bw = basis(i, self.order, t, &self.knots) * cp.weight;
            sum += bw * cp.position;
            w_sum += bw;
        }
        sum / if w_sum != 0.0 { w_sum } else { WEIGHT_EPSILON }
    }

    /// Rational first derivative at a knot-space parameter, via the
    /// quotient rule on the homogeneous sums.
    fn tangent_on(&self, t: f64) -> Vector3 {
        let t = nudge_inside(t, self.domain.1);
        let mut a = Point3::ZERO;
        let mut da = Point3::ZERO;
        let mut w = 0.0;
        let mut dw = 0.0;
        for (i, cp) in self.points.iter().enumerate() {
            let bw = basis(i, self.order, t, &self.knots) * cp.weight;
            let dbw = basis_first_derivative(i, self.order, t, &self.knots) * cp.weight;
            a += bw * cp.position;
            da += dbw * cp.position;
            w += bw;
            dw += dbw;
        }
        if w.abs() < WEIGHT_EPSILON {
            da
        } else {
            let c = a / w;
            (da - dw * c) / w
        }
    }
}

impl Curve for NurbsCurve {
    fn point_at(&self, t: f64) -> Point3 {
        self.point_on(t)
    }

    fn tangent_at(&self, t: f64) -> Vector3 {
        self.tangent_on(t)
    }

    fn domain(&self) -> (f64, f64) {
        self.domain
    }

    fn is_closed(&self) -> bool {
        self.spline_type.is_loop()
    }
}

impl Validate for NurbsCurve {
    fn validate(&self) -> Result<()> {
        if self.knots.len() != self.points.len() + self.order + 1 {
            return Err(LoftError::InvalidKnots(format!(
                "expected {} knots for {} control points of order {}, got {}",
                self.points.len() + self.order + 1,
                self.points.len(),
                self.order,
                self.knots.len()
            )));
        }
        if self.knots.windows(2).any(|w| w[1] < w[0]) {
            return Err(LoftError::InvalidKnots(
                "knot vector is not non-decreasing".into(),
            ));
        }
        if self.spline_type.is_loop() {
            let tail = self.points.len() - self.order;
            for i in 0..self.order {
                if self.points[tail + i] != self.points[i] {
                    return Err(LoftError::InvalidControlNet(format!(
                        "loop tail slot {} out of sync with head slot {}",
                        tail + i,
                        i
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use loft_math::DVec3;

    fn standard_cubic() -> NurbsCurve {
        NurbsCurve::new(
            vec![
                ControlPoint::new(DVec3::new(0.0, 0.0, 0.0), 1.0),
                ControlPoint::new(DVec3::new(1.0, 0.0, 0.0), 1.0),
                ControlPoint::new(DVec3::new(1.0, 1.0, 1.0), 1.0),
                ControlPoint::new(DVec3::new(2.0, 1.0, 1.0), 1.0),
            ],
            3,
            SplineType::Standard,
        )
        .unwrap()
    }

    #[test]
    fn test_standard_cubic_midpoint_in_domain() {
        let curve = standard_cubic();
        let (p, in_domain) = curve.evaluate(0.5);
        assert!(in_domain);
        assert!(p.is_finite(), "expected a finite point, got {:?}", p);
    }

    #[test]
    fn test_out_of_domain_is_flagged_not_fatal() {
        let curve = standard_cubic();
        let (p, in_domain) = curve.evaluate(-1.0);
        assert!(!in_domain);
        assert!(p.is_finite());

        let (_, in_domain) = curve.evaluate(2.0);
        assert!(!in_domain);
    }

    #[test]
    fn test_clamped_interpolates_ends() {
        let curve = NurbsCurve::from_positions(
            [
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 2.0, 0.0),
                DVec3::new(3.0, 2.0, 1.0),
                DVec3::new(4.0, 0.0, 1.0),
            ],
            2,
            SplineType::Clamped,
        )
        .unwrap();

        let (start, in_domain) = curve.evaluate(0.0);
        assert!(in_domain);
        assert_relative_eq!(start.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(start.y, 0.0, epsilon = 1e-9);

        let (end, in_domain) = curve.evaluate(1.0);
        assert!(in_domain);
        assert_relative_eq!(end.x, 4.0, epsilon = 1e-6);
        assert_relative_eq!(end.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(end.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_loop_duplicates_head_points() {
        let curve = NurbsCurve::from_positions(
            [
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(1.0, 1.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
            ],
            2,
            SplineType::Loop,
        )
        .unwrap();

        assert_eq!(curve.points().len(), 6);
        assert_eq!(curve.num_control_points(), 4);
        assert_eq!(curve.points()[4], curve.points()[0]);
        assert_eq!(curve.points()[5], curve.points()[1]);
        assert!(curve.is_closed());
    }

    #[test]
    fn test_loop_set_control_point_updates_tail() {
        let mut curve = NurbsCurve::from_positions(
            [
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(1.0, 1.0, 0.0),
                DVec3::new(0.0, 1.0, 0.0),
            ],
            2,
            SplineType::Loop,
        )
        .unwrap();

        let moved = ControlPoint::new(DVec3::new(-0.5, 0.25, 0.0), 2.0);
        curve.set_control_point(1, moved);
        assert_eq!(curve.points()[1], moved);
        assert_eq!(curve.points()[5], moved);
        curve.validate().unwrap();
    }

    #[test]
    fn test_loop_closes() {
        let curve = NurbsCurve::from_positions(
            [
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(2.0, 0.0, 0.0),
                DVec3::new(2.0, 2.0, 0.0),
                DVec3::new(0.0, 2.0, 0.0),
            ],
            2,
            SplineType::Loop,
        )
        .unwrap();

        let (start, _) = curve.evaluate(0.0);
        let (end, _) = curve.evaluate(1.0);
        assert_relative_eq!(start.x, end.x, epsilon = 1e-6);
        assert_relative_eq!(start.y, end.y, epsilon = 1e-6);
    }

    #[test]
    fn test_weight_pulls_curve_toward_point() {
        let target = DVec3::new(1.0, 2.0, 0.0);
        let positions = [
            DVec3::new(0.0, 0.0, 0.0),
            target,
            DVec3::new(3.0, 2.0, 0.0),
            DVec3::new(4.0, 0.0, 0.0),
        ];

        let mut last_distance = f64::INFINITY;
        for &w in &[1.0, 2.0, 5.0, 10.0, 50.0] {
            let mut curve =
                NurbsCurve::from_positions(positions, 2, SplineType::Clamped).unwrap();
            curve.set_control_point(1, ControlPoint::new(target, w));
            let (p, _) = curve.evaluate(0.35);
            let distance = p.distance(target);
            assert!(
                distance < last_distance,
                "weight {} should pull the curve closer: {} >= {}",
                w,
                distance,
                last_distance
            );
            last_distance = distance;
        }
    }

    #[test]
    fn test_tangent_points_along_line() {
        let curve = NurbsCurve::from_positions(
            [DVec3::new(0.0, 0.0, 0.0), DVec3::new(10.0, 0.0, 0.0)],
            1,
            SplineType::Clamped,
        )
        .unwrap();
        let d = curve.tangent(0.5);
        assert!(d.x > 0.0);
        assert_relative_eq!(d.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(d.z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_weights_degrade_without_panic() {
        let curve = NurbsCurve::new(
            vec![
                ControlPoint::new(DVec3::new(0.0, 0.0, 0.0), 0.0),
                ControlPoint::new(DVec3::new(1.0, 0.0, 0.0), 0.0),
                ControlPoint::new(DVec3::new(2.0, 0.0, 0.0), 0.0),
            ],
            2,
            SplineType::Clamped,
        )
        .unwrap();
        let (p, in_domain) = curve.evaluate(0.5);
        assert!(in_domain);
        assert!(p.is_finite());
    }

    #[test]
    fn test_construction_preconditions() {
        assert!(matches!(
            NurbsCurve::new(vec![], 3, SplineType::Standard),
            Err(LoftError::EmptyControlNet(_))
        ));
        assert!(matches!(
            NurbsCurve::from_positions([DVec3::ZERO, DVec3::X], 2, SplineType::Standard),
            Err(LoftError::NotEnoughControlPoints { order: 2, count: 2 })
        ));
    }

    #[test]
    fn test_control_box_bounds_samples() {
        let curve = standard_cubic();
        let bounds = curve.control_box().expand(1e-9);
        for i in 0..=20 {
            let (p, in_domain) = curve.evaluate(i as f64 / 20.0);
            if in_domain {
                assert!(bounds.contains_point(p), "sample {:?} outside {:?}", p, bounds);
            }
        }
    }
}
