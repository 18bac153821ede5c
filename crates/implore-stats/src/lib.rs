//! implore-stats - Streaming statistics for scientific data
//!
//! This crate provides statistical primitives that absorb values one at a
//! time with constant memory:
//!
//! - **StreamingStats**: count, sum, extrema, mean, variance, skewness,
//!   kurtosis and an approximate median
//! - **P2Quantile**: P² streaming estimator for a single quantile
//! - **StreamingHistogram**: bounded, mergeable histogram answering any
//!   quantile
//!
//! # Design Philosophy
//!
//! Accumulators never store the samples they summarize, so one instance per
//! grid cell stays cheap regardless of how much data flows through it.
//! Every accumulator can be merged with another, which allows sharded
//! (per-thread) accumulation followed by a reduction.

pub mod accumulator;
pub mod error;
pub mod histogram;
pub mod quantile;

pub use accumulator::*;
pub use error::*;
pub use histogram::*;
pub use quantile::*;
