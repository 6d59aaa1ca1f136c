//! Knot vector generation.

use serde::{Deserialize, Serialize};

/// Knot spacing policy for one curve or surface axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KnotType {
    /// Evenly spaced knots across `[0, 1]`.
    Uniform,
    /// Clamped: the first and last `order + 1` knots repeat 0 and 1, so the
    /// curve interpolates its first and last control points.
    OpenUniform,
}

/// Generate the knot vector for `point_count` control points of the given
/// `order`, with `point_count + order + 1` entries.
///
/// The caller must ensure `point_count > order`; violating that yields a
/// vector with degenerate, overlapping spans rather than an error.
pub fn generate_knots(order: usize, point_count: usize, knot_type: KnotType) -> Vec<f64> {
    let knot_count = point_count + order + 1;
    let mut knots = Vec::with_capacity(knot_count);
    match knot_type {
        KnotType::Uniform => {
            let last = (knot_count - 1) as f64;
            for j in 0..knot_count {
                knots.push(j as f64 / last);
            }
        }
        KnotType::OpenUniform => {
            for j in 0..knot_count {
                if j <= order {
                    knots.push(0.0);
                } else if j >= knot_count - 1 - order {
                    knots.push(1.0);
                } else {
                    knots.push(j as f64 / (knot_count - order + 1) as f64);
                }
            }
        }
    }
    knots
}
