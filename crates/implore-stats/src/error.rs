//! Error types for implore-stats

use thiserror::Error;

/// Errors raised by statistics primitives
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Quantile probability outside the open interval (0, 1)
    #[error("Quantile probability must be in (0, 1), got {0}")]
    InvalidProbability(f64),

    /// Attempt to merge estimators tracking different quantiles
    #[error("Cannot merge quantile estimators for p={left} and p={right}")]
    ProbabilityMismatch { left: f64, right: f64 },

    /// Quantile requested outside the closed interval [0, 1]
    #[error("Quantile must be in [0, 1], got {0}")]
    InvalidQuantile(f64),

    /// Streaming histogram with no bins
    #[error("Histogram needs at least one bin")]
    InvalidBinCount,
}

/// Result type alias for statistics operations
pub type StatsResult<T> = Result<T, StatsError>;
