//! Bounded streaming histogram (Ben-Haim & Tom-Tov, 2010)
//!
//! Values are kept as weighted bins sorted by value. Once the number of
//! bins exceeds the configured maximum, the two closest neighbours are
//! fused into their weighted centroid. Histograms built on separate
//! shards can be merged the same way.
//!
//! Alongside the bins, count, extrema, mean and variance are tracked
//! exactly; [`StreamingHistogram::quantile`] interpolates between bin
//! centroids for any `q` in `[0, 1]`.

use serde::Serialize;

use crate::error::{StatsError, StatsResult};

/// Weighted centroid of a histogram
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    /// Centroid value
    pub value: f64,
    /// Number of samples summarized by the bin
    pub weight: f64,
}

impl Bin {
    /// Placeholder used to pad histograms of unequal length
    pub fn empty() -> Self {
        Self {
            value: f64::NAN,
            weight: 0.0,
        }
    }
}

/// Streaming histogram with at most `max_bins` bins
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamingHistogram {
    max_bins: usize,
    bins: Vec<Bin>,
    count: u64,
    min: f64,
    max: f64,
    mean: f64,
    m2: f64,
}

impl StreamingHistogram {
    /// Default maximum number of bins
    pub const DEFAULT_BIN_COUNT: usize = 100;

    /// Create an empty histogram keeping at most `max_bins` bins
    pub fn new(max_bins: usize) -> StatsResult<Self> {
        if max_bins == 0 {
            return Err(StatsError::InvalidBinCount);
        }
        Ok(Self::with_bins(max_bins))
    }

    fn with_bins(max_bins: usize) -> Self {
        Self {
            max_bins,
            bins: Vec::new(),
            count: 0,
            min: f64::NAN,
            max: f64::NAN,
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Maximum number of bins
    pub fn max_bins(&self) -> usize {
        self.max_bins
    }

    /// Current bins, ascending by value
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Number of bins in use
    pub fn size(&self) -> usize {
        self.bins.len()
    }

    /// Whether no value has been absorbed yet
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Reset to the empty state, keeping the bin limit
    pub fn clear(&mut self) {
        *self = Self::with_bins(self.max_bins);
    }

    /// Absorb one value. Non-finite values are ignored.
    pub fn push(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }

        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        if self.count == 1 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }

        let index = self.bins.partition_point(|bin| bin.value < value);
        if self.bins.get(index).is_some_and(|bin| bin.value == value) {
            self.bins[index].weight += 1.0;
        } else {
            self.bins.insert(index, Bin { value, weight: 1.0 });
        }
        self.compress();
    }

    /// Combine the content of `other` into this histogram
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            let max_bins = self.max_bins;
            *self = other.clone();
            self.max_bins = max_bins;
            self.compress();
            return;
        }

        let (na, nb) = (self.count as f64, other.count as f64);
        let n = na + nb;
        let delta = other.mean - self.mean;
        self.m2 += other.m2 + delta * delta * na * nb / n;
        self.mean += delta * nb / n;
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);

        let mut bins: Vec<Bin> = Vec::with_capacity(self.bins.len() + other.bins.len());
        let (mut lhs, mut rhs) = (self.bins.iter().peekable(), other.bins.iter().peekable());
        loop {
            let take_left = match (lhs.peek(), rhs.peek()) {
                (Some(a), Some(b)) => a.value <= b.value,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_left { lhs.next() } else { rhs.next() };
            if let Some(&bin) = next {
                match bins.last_mut() {
                    Some(last) if last.value == bin.value => last.weight += bin.weight,
                    _ => bins.push(bin),
                }
            }
        }
        self.bins = bins;
        self.compress();
    }

    /// Fuse the closest neighbouring bins until the bin limit is honoured
    fn compress(&mut self) {
        while self.bins.len() > self.max_bins {
            let Some(i) = (0..self.bins.len() - 1).min_by(|&a, &b| {
                let gap_a = self.bins[a + 1].value - self.bins[a].value;
                let gap_b = self.bins[b + 1].value - self.bins[b].value;
                gap_a.total_cmp(&gap_b)
            }) else {
                return;
            };
            let right = self.bins.remove(i + 1);
            let left = &mut self.bins[i];
            let weight = left.weight + right.weight;
            left.value = (left.value * left.weight + right.value * right.weight) / weight;
            left.weight = weight;
        }
    }

    /// Number of values absorbed
    pub fn count(&self) -> u64 {
        self.count
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

    /// Estimate of the `q`-quantile, NaN when empty.
    ///
    /// Each bin is placed at the middle of the cumulative weight it
    /// covers, the minimum at rank 0 and the maximum at the total count;
    /// the quantile is interpolated linearly between those anchors. The
    /// estimate is exact for the extrema and always lies in `[min, max]`.
    pub fn quantile(&self, q: f64) -> StatsResult<f64> {
        if !(0.0..=1.0).contains(&q) {
            return Err(StatsError::InvalidQuantile(q));
        }
        if self.count == 0 {
            return Ok(f64::NAN);
        }

        let total: f64 = self.bins.iter().map(|bin| bin.weight).sum();
        let target = q * total;
        let (mut rank, mut value) = (0.0, self.min);
        let mut cumulative = 0.0;
        let anchors = self
            .bins
            .iter()
            .map(|bin| {
                let center = cumulative + bin.weight / 2.0;
                cumulative += bin.weight;
                (center, bin.value)
            })
            .chain(std::iter::once((total, self.max)));

        for (next_rank, next_value) in anchors {
            if target <= next_rank {
                let span = next_rank - rank;
                if span <= 0.0 {
                    return Ok(next_value);
                }
                let fraction = (target - rank) / span;
                return Ok((value + (next_value - value) * fraction).clamp(self.min, self.max));
            }
            rank = next_rank;
            value = next_value;
        }
        Ok(self.max)
    }
}

impl Default for StreamingHistogram {
    fn default() -> Self {
        Self::with_bins(Self::DEFAULT_BIN_COUNT)
    }
}
