//! Core types for implore-binning

use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use implore_stats::StreamingStats;
use serde::{Deserialize, Serialize};

use crate::error::BinningError;

/// How a sample is attributed to grid cells
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushMode {
    /// The whole value goes to the nearest grid node
    #[default]
    Nearest,
    /// The value is split across the four nodes surrounding the sample,
    /// weighted by area
    Linear,
}

impl PushMode {
    /// Name used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            PushMode::Nearest => "nearest",
            PushMode::Linear => "linear",
        }
    }
}

impl fmt::Display for PushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PushMode {
    type Err = BinningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" | "simple" => Ok(PushMode::Nearest),
            "linear" => Ok(PushMode::Linear),
            _ => Err(BinningError::UnknownMode(s.to_string())),
        }
    }
}

/// Per-cell statistic that can be read out of a binning grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Count,
    Min,
    Max,
    Mean,
    Median,
    Variance,
    Kurtosis,
    Skewness,
    Sum,
}

impl Statistic {
    /// All statistics, in declaration order
    pub const ALL: [Statistic; 9] = [
        Statistic::Count,
        Statistic::Min,
        Statistic::Max,
        Statistic::Mean,
        Statistic::Median,
        Statistic::Variance,
        Statistic::Kurtosis,
        Statistic::Skewness,
        Statistic::Sum,
    ];

    /// Statistic name
    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Count => "count",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::Variance => "variance",
            Statistic::Kurtosis => "kurtosis",
            Statistic::Skewness => "skewness",
            Statistic::Sum => "sum",
        }
    }

    /// Evaluate this statistic on one cell accumulator
    pub fn evaluate(&self, stats: &StreamingStats) -> f64 {
        match self {
            Statistic::Count => stats.count() as f64,
            Statistic::Min => stats.min(),
            Statistic::Max => stats.max(),
            Statistic::Mean => stats.mean(),
            Statistic::Median => stats.median(),
            Statistic::Variance => stats.variance(),
            Statistic::Kurtosis => stats.kurtosis(),
            Statistic::Skewness => stats.skewness(),
            Statistic::Sum => stats.sum(),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Statistic {
    type Err = BinningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Statistic::ALL
            .into_iter()
            .find(|stat| stat.name() == name)
            .ok_or_else(|| BinningError::UnknownStatistic(s.to_string()))
    }
}

/// Outcome of one ingestion call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PushSummary {
    /// Samples applied to the grid
    pub accumulated: usize,
    /// Samples skipped because their value is NaN or infinite
    pub skipped_non_finite: usize,
    /// Samples skipped because they fall outside the grid
    pub out_of_domain: usize,
}

impl PushSummary {
    /// Number of samples examined
    pub fn total(&self) -> usize {
        self.accumulated + self.skipped_non_finite + self.out_of_domain
    }
}

impl Add for PushSummary {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            accumulated: self.accumulated + rhs.accumulated,
            skipped_non_finite: self.skipped_non_finite + rhs.skipped_non_finite,
            out_of_domain: self.out_of_domain + rhs.out_of_domain,
        }
    }
}

impl AddAssign for PushSummary {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_mode_parse() {
        assert_eq!("nearest".parse::<PushMode>().unwrap(), PushMode::Nearest);
        assert_eq!("Linear".parse::<PushMode>().unwrap(), PushMode::Linear);
        assert_eq!("simple".parse::<PushMode>().unwrap(), PushMode::Nearest);
        assert_eq!(
            "bicubic".parse::<PushMode>(),
            Err(BinningError::UnknownMode("bicubic".to_string()))
        );
    }

    #[test]
    fn test_push_mode_serde() {
        let json = serde_json::to_string(&PushMode::Linear).unwrap();
        assert_eq!(json, "\"linear\"");
        assert!(serde_json::from_str::<PushMode>("\"cubic\"").is_err());
    }

    #[test]
    fn test_statistic_names_round_trip() {
        for stat in Statistic::ALL {
            assert_eq!(stat.name().parse::<Statistic>().unwrap(), stat);
        }
        assert!("mode".parse::<Statistic>().is_err());
    }

    #[test]
    fn test_statistic_evaluate_empty() {
        let empty = StreamingStats::new();
        for stat in Statistic::ALL {
            let value = stat.evaluate(&empty);
            match stat {
                Statistic::Count | Statistic::Sum => assert_eq!(value, 0.0),
                _ => assert!(value.is_nan(), "{stat} should be NaN"),
            }
        }
    }

    #[test]
    fn test_push_summary_add() {
        let a = PushSummary {
            accumulated: 3,
            skipped_non_finite: 1,
            out_of_domain: 0,
        };
        let mut b = PushSummary {
            accumulated: 2,
            skipped_non_finite: 0,
            out_of_domain: 4,
        };
        b += a;
        assert_eq!(b.accumulated, 5);
        assert_eq!(b.total(), 10);
    }
}
