//! implore-binning - 2D statistical binning of scattered samples
//!
//! This crate groups `(x, y, z)` samples onto the nodes of a fixed grid
//! and keeps streaming statistics for every node.
//!
//! # Key Components
//!
//! - **Axis**: Grid coordinates with nearest-node and bracketing lookups,
//!   including periodic longitude axes
//! - **Spheroid**: Reference ellipsoid (WGS-84 by default) for geographic grids
//! - **AreaWeighting**: Planar or ellipsoidal area shares of a sample
//!   across the corners of its cell
//! - **Binning2D**: The binning engine: push, clear, merge and per-node
//!   statistics (count, sum, min, max, mean, median, variance, skewness,
//!   kurtosis)
//! - **Histogram2D**: Nearest-node binning into bounded per-node
//!   histograms, for arbitrary quantiles
//! - **BinningConfig**: TOML/JSON grid descriptions
//!
//! # Ingestion Modes
//!
//! - **Nearest**: each value goes to the closest grid node; coordinates
//!   beyond the grid snap to the border
//! - **Linear**: each value is split across the four nodes of its cell,
//!   each node receiving `z * weight`; samples outside the grid are skipped
//!
//! # Features
//!
//! - `parallel`: multi-threaded ingestion with rayon

pub mod axis;
pub mod binning;
pub mod config;
pub mod error;
pub mod histogram;
pub mod spheroid;
pub mod types;
pub mod weighting;

pub use axis::*;
pub use binning::Binning2D;
pub use config::*;
pub use error::*;
pub use histogram::Histogram2D;
pub use spheroid::Spheroid;
pub use types::*;
pub use weighting::*;

// Statistics are re-exported so callers need a single dependency
pub use implore_stats::{Bin, P2Quantile, StreamingHistogram, StreamingStats};
