/// Tolerances for comparing evaluation results and parameters.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Linear tolerance for distance comparisons (in model units)
    pub linear: f64,
    /// Parameter-space tolerance for curve/surface parameters
    pub parametric: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-7;
    pub const DEFAULT_PARAMETRIC: f64 = 1e-9;

    pub fn new(linear: f64, parametric: f64) -> Self {
        Self { linear, parametric }
    }

    pub fn loose() -> Self {
        Self {
            linear: 1e-4,
            parametric: 1e-6,
        }
    }

    /// Check if two lengths are equal within linear tolerance
    pub fn linear_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.linear
    }

    /// Check if a length is zero within linear tolerance
    pub fn is_zero(self, v: f64) -> bool {
        v.abs() < self.linear
    }

    /// Check if two parameter values are equal within parametric tolerance
    pub fn parametric_eq(self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.parametric
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            linear: Self::DEFAULT_LINEAR,
            parametric: Self::DEFAULT_PARAMETRIC,
        }
    }
}
