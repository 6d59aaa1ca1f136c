//! NURBS core: knot vector generation, recursive basis functions, and
//! control-net building blocks shared by curves and surfaces.

pub mod basis;
pub mod control;
pub mod knot;

pub use basis::{basis, basis_first_derivative, basis_second_derivative};
pub use control::{ControlPoint, SplineType};
pub use knot::{generate_knots, KnotType};

/// Weight given to control points created without an explicit one.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Substitute denominator when a rational weight sum vanishes.
///
/// A degenerate weight sum is not an error; dividing by this constant
/// silently degrades to the unnormalized sum. Callers rely on the
/// in-domain flag, not an error signal.
pub const WEIGHT_EPSILON: f64 = 1e-9;

/// Offset applied to a parameter sitting exactly on the upper domain end.
///
/// The degree-0 basis is half-open, so no span is active at the final
/// domain knot itself; evaluating this far inside keeps clamped ends
/// interpolating their last control point.
pub(crate) const DOMAIN_END_EPSILON: f64 = 1e-12;

/// Pull `t` just inside the domain when it equals `upper`.
///
/// Parameters beyond the domain are left untouched; out-of-domain
/// evaluation stays raw and is reported through the in-domain flag.
pub(crate) fn nudge_inside(t: f64, upper: f64) -> f64 {
    if t == upper {
        t - DOMAIN_END_EPSILON
    } else {
        t
    }
}
