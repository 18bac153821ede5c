//! Bounded-memory streaming statistics
//!
//! [`StreamingStats`] absorbs one value at a time and can report:
//! - Count, sum, min, max
//! - Mean, variance, skewness, kurtosis (population moments)
//! - Approximate median (P² estimator)
//!
//! Central moments are updated incrementally (Welford / Terriberry) so
//! large sample counts do not suffer from the cancellation of the naive
//! sum-of-squares formulas. Two accumulators can be merged with the
//! pairwise update formulas of Chan et al. and Pébay.

use serde::Serialize;

use crate::quantile::P2Quantile;

/// Streaming summary statistics with O(1) memory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamingStats {
    count: u64,
    min: f64,
    max: f64,
    sum: f64,
    mean: f64,
    /// Sum of squared deviations from the mean
    m2: f64,
    /// Sum of cubed deviations from the mean
    m3: f64,
    /// Sum of fourth-power deviations from the mean
    m4: f64,
    median: P2Quantile,
}

impl StreamingStats {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self {
            count: 0,
            min: f64::NAN,
            max: f64::NAN,
            sum: 0.0,
            mean: 0.0,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
            median: P2Quantile::median(),
        }
    }

    /// Build an accumulator from a slice of values
    pub fn from_data(data: &[f64]) -> Self {
        let mut stats = Self::new();
        for &value in data {
            stats.accumulate(value);
        }
        stats
    }

    /// Absorb one value. Non-finite values (NaN, ±inf) are ignored.
    pub fn accumulate(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }

        let n1 = self.count as f64;
        self.count += 1;
        let n = self.count as f64;

        let delta = value - self.mean;
        let delta_n = delta / n;
        let delta_n2 = delta_n * delta_n;
        let term1 = delta * delta_n * n1;

        self.mean += delta_n;
        self.m4 += term1 * delta_n2 * (n * n - 3.0 * n + 3.0) + 6.0 * delta_n2 * self.m2
            - 4.0 * delta_n * self.m3;
        self.m3 += term1 * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2;
        self.m2 += term1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum += value;
        self.median.push(value);
    }

    /// Reset to the empty state
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Whether no value has been absorbed yet
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of values absorbed
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of values (0 when empty)
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Smallest value, NaN when empty
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest value, NaN when empty
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Arithmetic mean, NaN when empty
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.mean
    }

    /// Population variance, NaN when empty
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.m2 / self.count as f64
    }

    /// Population skewness, NaN when empty or when the variance is zero
    pub fn skewness(&self) -> f64 {
        if self.count == 0 || self.m2 == 0.0 {
            return f64::NAN;
        }
        (self.count as f64).sqrt() * self.m3 / self.m2.powf(1.5)
    }

    /// Excess kurtosis (normal = 0), NaN when empty or when the variance is zero
    pub fn kurtosis(&self) -> f64 {
        if self.count == 0 || self.m2 == 0.0 {
            return f64::NAN;
        }
        self.count as f64 * self.m4 / (self.m2 * self.m2) - 3.0
    }

    /// Approximate median, NaN when empty
    pub fn median(&self) -> f64 {
        self.median.estimate()
    }

    /// Combine the statistics of `other` into this accumulator.
    ///
    /// Count, sum, extrema and moments combine exactly (up to rounding);
    /// the median is approximate, see [`P2Quantile::merge`].
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let na = self.count as f64;
        let nb = other.count as f64;
        let n = na + nb;
        let delta = other.mean - self.mean;
        let delta2 = delta * delta;

        let m2 = self.m2 + other.m2 + delta2 * na * nb / n;
        let m3 = self.m3
            + other.m3
            + delta2 * delta * na * nb * (na - nb) / (n * n)
            + 3.0 * delta * (na * other.m2 - nb * self.m2) / n;
        let m4 = self.m4
            + other.m4
            + delta2 * delta2 * na * nb * (na * na - na * nb + nb * nb) / (n * n * n)
            + 6.0 * delta2 * (na * na * other.m2 + nb * nb * self.m2) / (n * n)
            + 4.0 * delta * (na * other.m3 - nb * self.m3) / n;

        self.mean += delta * nb / n;
        self.m2 = m2;
        self.m3 = m3;
        self.m4 = m4;
        self.count += other.count;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        // Both medians track p = 0.5
        self.median.merge_unchecked(&other.median);
    }
}

impl Default for StreamingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<f64> for StreamingStats {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.accumulate(value);
        }
    }
}
