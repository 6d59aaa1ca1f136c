use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoftError {
    #[error("Empty control net: {0}")]
    EmptyControlNet(String),

    #[error("Not enough control points for order {order}: got {count}, need at least order + 1")]
    NotEnoughControlPoints { order: usize, count: usize },

    #[error("Grid dimension mismatch: {len} control points for a {width}x{height} net")]
    GridDimensionMismatch {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("Invalid knot vector: {0}")]
    InvalidKnots(String),

    #[error("Invalid control net: {0}")]
    InvalidControlNet(String),
}

pub type Result<T> = std::result::Result<T, LoftError>;
