//! Curve traits and implementations.

mod nurbs;

use loft_math::{Point3, Vector3};

pub use nurbs::NurbsCurve;

/// Trait for parametric curves in 3D space.
///
/// Parameters are in knot space; see [`Curve::domain`]. Evaluation is
/// `&self` and lock-free, so a shared curve may be sampled from many
/// threads as long as no mutation is in flight.
pub trait Curve: Send + Sync {
    /// Evaluate the curve at parameter `t`.
    fn point_at(&self, t: f64) -> Point3;

    /// Evaluate the tangent vector at parameter `t`.
    fn tangent_at(&self, t: f64) -> Vector3;

    /// Return the parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64);

    /// Whether the curve closes on itself.
    fn is_closed(&self) -> bool {
        false
    }
}
