//! P² streaming quantile estimator
//!
//! Tracks a single quantile with five markers whose heights are adjusted
//! with piecewise-parabolic interpolation as samples arrive (Jain &
//! Chlamtac, 1985). Memory is constant and the estimate is deterministic
//! for a given insertion order.
//!
//! Until five samples have been seen the raw values are kept in the marker
//! slots and the quantile is computed exactly from them.

use serde::Serialize;

use crate::error::{StatsError, StatsResult};

const MARKERS: usize = 5;

/// Streaming estimator of the `p`-quantile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct P2Quantile {
    /// Target probability in (0, 1)
    p: f64,
    /// Number of samples absorbed
    count: u64,
    /// Marker heights (raw samples while `count < 5`)
    heights: [f64; MARKERS],
    /// Actual marker positions (1-based ranks)
    positions: [f64; MARKERS],
    /// Desired marker positions
    desired: [f64; MARKERS],
    /// Desired position increments per sample
    increments: [f64; MARKERS],
}

impl P2Quantile {
    /// Create an estimator for the `p`-quantile
    pub fn new(p: f64) -> StatsResult<Self> {
        if !(p > 0.0 && p < 1.0) {
            return Err(StatsError::InvalidProbability(p));
        }
        Ok(Self::with_probability(p))
    }

    /// Create a median estimator
    pub fn median() -> Self {
        Self::with_probability(0.5)
    }

    fn with_probability(p: f64) -> Self {
        Self {
            p,
            count: 0,
            heights: [0.0; MARKERS],
            positions: [1.0, 2.0, 3.0, 4.0, 5.0],
            desired: [1.0, 1.0 + 2.0 * p, 1.0 + 4.0 * p, 3.0 + 2.0 * p, 5.0],
            increments: [0.0, p / 2.0, p, (1.0 + p) / 2.0, 1.0],
        }
    }

    /// Target probability
    pub fn probability(&self) -> f64 {
        self.p
    }

    /// Number of samples absorbed
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Reset to the empty state, keeping the target probability
    pub fn clear(&mut self) {
        *self = Self::with_probability(self.p);
    }

    /// Absorb one sample. Non-finite samples are ignored.
    pub fn push(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }

        if self.count < MARKERS as u64 {
            self.heights[self.count as usize] = value;
            self.count += 1;
            if self.count == MARKERS as u64 {
                self.heights.sort_by(f64::total_cmp);
            }
            return;
        }
        self.count += 1;

        let h = &mut self.heights;
        let k = if value < h[0] {
            h[0] = value;
            0
        } else if value < h[1] {
            0
        } else if value < h[2] {
            1
        } else if value < h[3] {
            2
        } else if value <= h[4] {
            3
        } else {
            h[4] = value;
            3
        };

        for position in &mut self.positions[k + 1..] {
            *position += 1.0;
        }
        for (desired, increment) in self.desired.iter_mut().zip(self.increments) {
            *desired += increment;
        }

        for i in 1..MARKERS - 1 {
            self.adjust(i);
        }
    }

    fn adjust(&mut self, i: usize) {
        let d = self.desired[i] - self.positions[i];
        let room_up = self.positions[i + 1] - self.positions[i] > 1.0;
        let room_down = self.positions[i - 1] - self.positions[i] < -1.0;
        if !((d >= 1.0 && room_up) || (d <= -1.0 && room_down)) {
            return;
        }

        let step = d.signum();
        let candidate = self.parabolic(i, step);
        self.heights[i] = if self.heights[i - 1] < candidate && candidate < self.heights[i + 1] {
            candidate
        } else {
            self.linear(i, step)
        };
        self.positions[i] += step;
    }

    fn parabolic(&self, i: usize, d: f64) -> f64 {
        let (q, n) = (&self.heights, &self.positions);
        q[i] + d / (n[i + 1] - n[i - 1])
            * ((n[i] - n[i - 1] + d) * (q[i + 1] - q[i]) / (n[i + 1] - n[i])
                + (n[i + 1] - n[i] - d) * (q[i] - q[i - 1]) / (n[i] - n[i - 1]))
    }

    fn linear(&self, i: usize, d: f64) -> f64 {
        let j = if d > 0.0 { i + 1 } else { i - 1 };
        let (q, n) = (&self.heights, &self.positions);
        q[i] + d * (q[j] - q[i]) / (n[j] - n[i])
    }

    /// Current estimate, NaN when empty
    pub fn estimate(&self) -> f64 {
        match self.count {
            0 => f64::NAN,
            n if n < MARKERS as u64 => {
                let mut buffered = self.heights[..n as usize].to_vec();
                buffered.sort_by(f64::total_cmp);
                interpolate_sorted(&buffered, self.p)
            }
            _ => self.heights[2],
        }
    }

    /// Combine another estimator tracking the same probability into this one.
    ///
    /// Exact while either side still buffers raw samples; otherwise the
    /// marker heights are blended by sample count, which is an
    /// approximation of the estimate a single stream would produce.
    pub fn merge(&mut self, other: &Self) -> StatsResult<()> {
        if self.p != other.p {
            return Err(StatsError::ProbabilityMismatch {
                left: self.p,
                right: other.p,
            });
        }
        self.merge_unchecked(other);
        Ok(())
    }

    /// Merge assuming both estimators track the same probability
    pub(crate) fn merge_unchecked(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if other.count < MARKERS as u64 {
            for &value in &other.heights[..other.count as usize] {
                self.push(value);
            }
            return;
        }
        if self.count < MARKERS as u64 {
            let buffered = self.heights;
            let count = self.count as usize;
            *self = other.clone();
            for &value in &buffered[..count] {
                self.push(value);
            }
            return;
        }

        let (na, nb) = (self.count as f64, other.count as f64);
        let total = na + nb;
        let mut heights = [0.0; MARKERS];
        for (i, height) in heights.iter_mut().enumerate() {
            *height = (self.heights[i] * na + other.heights[i] * nb) / total;
        }
        heights[0] = self.heights[0].min(other.heights[0]);
        heights[MARKERS - 1] = self.heights[MARKERS - 1].max(other.heights[MARKERS - 1]);
        heights.sort_by(f64::total_cmp);

        self.count += other.count;
        let n = self.count as f64;
        let fractions = [0.0, self.p / 2.0, self.p, (1.0 + self.p) / 2.0, 1.0];
        for i in 0..MARKERS {
            self.desired[i] = 1.0 + (n - 1.0) * fractions[i];
            self.positions[i] = self.desired[i].round();
        }
        self.positions[0] = 1.0;
        self.positions[MARKERS - 1] = n;
        for i in 1..MARKERS - 1 {
            let lower = self.positions[i - 1] + 1.0;
            let upper = n - (MARKERS - 1 - i) as f64;
            self.positions[i] = self.positions[i].clamp(lower, upper);
        }
        self.heights = heights;
    }
}

impl Default for P2Quantile {
    fn default() -> Self {
        Self::median()
    }
}

/// Linear-interpolated quantile of an ascending, non-empty slice
fn interpolate_sorted(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
