//! Recursive Cox–de Boor basis functions.
//!
//! All functions are pure over an explicit knot slice, so they can be
//! tested in isolation from any curve or surface object. Zero-denominator
//! terms contribute zero rather than erroring; recursion depth is bounded
//! by the degree, which stays small in practice.

/// Degree-`k` B-spline basis function `N_{j,k}` at parameter `t`.
///
/// The base case is the half-open indicator on `[knots[j], knots[j+1])`:
/// at `t == knots[j+1]` exactly, only the next basis function is active.
pub fn basis(j: usize, k: usize, t: f64, knots: &[f64]) -> f64 {
    if k == 0 {
        return if knots[j] <= t && t < knots[j + 1] {
            1.0
        } else {
            0.0
        };
    }
    let c1 = ratio(t - knots[j], knots[j + k] - knots[j]);
    let c2 = ratio(knots[j + k + 1] - t, knots[j + k + 1] - knots[j + 1]);
    c1 * basis(j, k - 1, t, knots) + c2 * basis(j + 1, k - 1, t, knots)
}

/// First derivative of `N_{j,k}` with respect to `t`.
pub fn basis_first_derivative(j: usize, k: usize, t: f64, knots: &[f64]) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let a = ratio(basis(j, k - 1, t, knots), knots[j + k] - knots[j]);
    let b = ratio(basis(j + 1, k - 1, t, knots), knots[j + k + 1] - knots[j + 1]);
    k as f64 * (a - b)
}

/// Second derivative of `N_{j,k}`: the derivative recurrence applied to
/// the first-derivative function, with the same zero-denominator policy.
pub fn basis_second_derivative(j: usize, k: usize, t: f64, knots: &[f64]) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let a = ratio(basis_first_derivative(j, k - 1, t, knots), knots[j + k] - knots[j]);
    let b = ratio(
        basis_first_derivative(j + 1, k - 1, t, knots),
        knots[j + k + 1] - knots[j + 1],
    );
    k as f64 * (a - b)
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}
