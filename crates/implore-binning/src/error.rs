//! Error types for implore-binning
//!
//! Provides error handling for:
//! - Axis definition
//! - Spheroid (reference ellipsoid) parameters
//! - Sample ingestion (shape checks)
//! - Histogram parameters
//! - Configuration parsing

use thiserror::Error;

/// Main error type for binning operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BinningError {
    /// Axis definition errors
    #[error("Invalid axis: {0}")]
    Axis(#[from] AxisError),

    /// Per-node statistics errors
    #[error("Statistics error: {0}")]
    Stats(#[from] implore_stats::StatsError),

    /// Coordinate and value sequences of different lengths
    #[error("Shape mismatch: x has {x_len} values, y has {y_len}, z has {z_len}")]
    ShapeMismatch {
        x_len: usize,
        y_len: usize,
        z_len: usize,
    },

    /// Input array is not one-dimensional
    #[error("Array '{name}' must be one-dimensional, got {ndim} dimensions")]
    InvalidRank { name: String, ndim: usize },

    /// Reference ellipsoid parameters out of range
    #[error(
        "Invalid spheroid: semi-major axis {semi_major_axis} (must be finite and positive), \
         flattening {flattening} (must be in [0, 1))"
    )]
    InvalidSpheroid {
        semi_major_axis: f64,
        flattening: f64,
    },

    /// Unknown ingestion mode name
    #[error("Unknown ingestion mode: {0} (expected 'nearest' or 'linear')")]
    UnknownMode(String),

    /// Unknown statistic name
    #[error("Unknown statistic: {0}")]
    UnknownStatistic(String),

    /// Attempt to combine engines defined on different grids
    #[error("Unable to combine different grids")]
    GridMismatch,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors related to axis definition
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AxisError {
    /// No coordinate values
    #[error("axis must contain at least one value")]
    Empty,

    /// NaN or infinite coordinate
    #[error("axis value at index {index} is not finite")]
    NonFinite { index: usize },

    /// Values not strictly increasing
    #[error("axis values must be strictly increasing (index {index})")]
    NotIncreasing { index: usize },

    /// Bad regular axis parameters
    #[error("invalid regular axis: start={start}, stop={stop}, num={num}")]
    InvalidRange { start: f64, stop: f64, num: usize },
}

/// Result type alias for binning operations
pub type BinningResult<T> = Result<T, BinningError>;

/// Result type alias for axis operations
pub type AxisResult<T> = Result<T, AxisError>;

/// Validation utilities
pub mod validation {
    use super::*;

    /// Validate that x, y and z carry the same number of samples
    pub fn validate_same_length(x_len: usize, y_len: usize, z_len: usize) -> BinningResult<()> {
        if x_len != y_len || x_len != z_len {
            return Err(BinningError::ShapeMismatch {
                x_len,
                y_len,
                z_len,
            });
        }
        Ok(())
    }

    /// Validate that an input array is one-dimensional
    pub fn validate_rank(name: &str, ndim: usize) -> BinningResult<()> {
        if ndim != 1 {
            return Err(BinningError::InvalidRank {
                name: name.to_string(),
                ndim,
            });
        }
        Ok(())
    }
}
