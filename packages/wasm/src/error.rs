//! Error types for the Euclidean graph.

use thiserror::Error;

use crate::graph::PointIndex;

/// Errors returned by point store, index and facade operations.
///
/// An unreachable goal is not an error: path queries report it through
/// `PathResult::failure` instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Connection or search radius is negative or NaN.
    #[error("radius must be a non-negative number, got {0}")]
    InvalidRadius(f64),

    /// Removal tolerance is negative or NaN.
    #[error("epsilon must be a non-negative number, got {0}")]
    InvalidEpsilon(f64),

    /// A k-nearest query asked for zero neighbors.
    #[error("k must be at least 1")]
    ZeroNeighbors,

    /// Vector component index outside {0, 1}.
    #[error("component index {0} is out of range for a 2D vector")]
    ComponentOutOfRange(usize),

    /// Interleaved coordinate array has an unpaired trailing value.
    #[error("interleaved coordinates must come in pairs, got {0} values")]
    OddCoordinateCount(usize),

    /// Point has a NaN or infinite coordinate.
    #[error("point coordinates must be finite, got ({x}, {y})")]
    NonFinitePoint {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },

    /// The structure holds no live points.
    #[error("the point set is empty")]
    Empty,

    /// Index is not a live point.
    #[error("{0} is not a live point")]
    PointNotFound(PointIndex),

    /// No stored point lies within the removal tolerance.
    #[error("no point within {epsilon} of ({x}, {y})")]
    NoPointNear {
        /// Query X coordinate.
        x: f64,
        /// Query Y coordinate.
        y: f64,
        /// Tolerance that was searched.
        epsilon: f64,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GraphError::InvalidRadius(-1.0).to_string(),
            "radius must be a non-negative number, got -1"
        );
        assert_eq!(
            GraphError::PointNotFound(PointIndex(7)).to_string(),
            "Point(7) is not a live point"
        );
        assert_eq!(GraphError::ZeroNeighbors.to_string(), "k must be at least 1");
    }
}
