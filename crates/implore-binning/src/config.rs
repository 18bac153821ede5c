//! Configuration for implore-binning
//!
//! Describes a binning grid (both axes and an optional geodetic system)
//! in TOML or JSON:
//!
//! ```toml
//! mode = "linear"
//!
//! [x]
//! angular = true
//! regular = { start = -180.0, stop = 179.0, num = 360 }
//!
//! [y]
//! regular = { start = -90.0, stop = 90.0, num = 181 }
//!
//! [spheroid]
//! semi_major_axis = 6378137.0
//! flattening = 0.0033528106647474805
//! ```

use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::binning::Binning2D;
use crate::error::{BinningError, BinningResult};
use crate::spheroid::Spheroid;
use crate::types::PushMode;

/// Grid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinningConfig {
    /// Ingestion mode used by callers driving the grid from this file
    #[serde(default)]
    pub mode: PushMode,
    /// X axis (longitudes when a spheroid is set)
    pub x: AxisConfig,
    /// Y axis (latitudes when a spheroid is set)
    pub y: AxisConfig,
    /// Geodetic system; absent for Cartesian grids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spheroid: Option<SpheroidConfig>,
}

/// Axis configuration: explicit values or a regular range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    /// Explicit coordinate values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f64>,
    /// Whether coordinates are longitudes in degrees
    #[serde(default)]
    pub angular: bool,
    /// Evenly spaced coordinates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular: Option<RegularAxisConfig>,
}

/// `num` evenly spaced values from `start` to `stop` inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegularAxisConfig {
    pub start: f64,
    pub stop: f64,
    pub num: usize,
}

/// Reference ellipsoid parameters, WGS-84 by default
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpheroidConfig {
    /// Semi-major axis in meters
    #[serde(default = "default_semi_major_axis")]
    pub semi_major_axis: f64,
    /// Flattening
    #[serde(default = "default_flattening")]
    pub flattening: f64,
}

fn default_semi_major_axis() -> f64 {
    Spheroid::WGS84_SEMI_MAJOR_AXIS
}

fn default_flattening() -> f64 {
    Spheroid::WGS84_FLATTENING
}

impl Default for SpheroidConfig {
    fn default() -> Self {
        Self {
            semi_major_axis: default_semi_major_axis(),
            flattening: default_flattening(),
        }
    }
}

impl SpheroidConfig {
    /// Build the spheroid
    pub fn build(&self) -> BinningResult<Spheroid> {
        Spheroid::new(self.semi_major_axis, self.flattening)
    }
}

impl AxisConfig {
    /// Axis from explicit values
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values,
            ..Default::default()
        }
    }

    /// Axis from a regular range
    pub fn regular(start: f64, stop: f64, num: usize) -> Self {
        Self {
            regular: Some(RegularAxisConfig { start, stop, num }),
            ..Default::default()
        }
    }

    /// Mark the axis as longitudes
    pub fn with_angular(mut self) -> Self {
        self.angular = true;
        self
    }

    /// Build the axis
    pub fn build(&self) -> BinningResult<Axis> {
        let axis = match (&self.regular, self.values.is_empty()) {
            (Some(_), false) => {
                return Err(BinningError::InvalidConfig(
                    "axis sets both 'values' and 'regular'".to_string(),
                ))
            }
            (None, true) => {
                return Err(BinningError::InvalidConfig(
                    "axis needs either 'values' or 'regular'".to_string(),
                ))
            }
            (Some(r), true) if self.angular => Axis::regular_angular(r.start, r.stop, r.num)?,
            (Some(r), true) => Axis::regular(r.start, r.stop, r.num)?,
            (None, false) if self.angular => Axis::angular(self.values.clone())?,
            (None, false) => Axis::new(self.values.clone())?,
        };
        Ok(axis)
    }
}

impl BinningConfig {
    /// Cartesian grid configuration
    pub fn new(x: AxisConfig, y: AxisConfig) -> Self {
        Self {
            mode: PushMode::default(),
            x,
            y,
            spheroid: None,
        }
    }

    /// Set the ingestion mode
    pub fn with_mode(mut self, mode: PushMode) -> Self {
        self.mode = mode;
        self
    }

    /// Use a geodetic system (geographic grid)
    pub fn with_spheroid(mut self, spheroid: SpheroidConfig) -> Self {
        self.spheroid = Some(spheroid);
        self
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> BinningResult<Self> {
        toml::from_str(toml_str).map_err(|e| BinningError::InvalidConfig(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> BinningResult<String> {
        toml::to_string_pretty(self).map_err(|e| BinningError::InvalidConfig(e.to_string()))
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> BinningResult<Self> {
        serde_json::from_str(json_str).map_err(|e| BinningError::InvalidConfig(e.to_string()))
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> BinningResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| BinningError::InvalidConfig(e.to_string()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> BinningResult<()> {
        self.x.build()?;
        self.y.build()?;
        if let Some(spheroid) = &self.spheroid {
            spheroid.build()?;
            if self.y.angular {
                return Err(BinningError::InvalidConfig(
                    "latitude axis cannot be angular".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl Binning2D<Axis> {
    /// Create an empty grid from its configuration
    pub fn from_config(config: &BinningConfig) -> BinningResult<Self> {
        config.validate()?;
        let x = config.x.build()?;
        let y = config.y.build()?;
        let spheroid = config.spheroid.as_ref().map(|s| s.build()).transpose()?;
        tracing::debug!(
            "Created {}x{} {} binning grid",
            x.values().len(),
            y.values().len(),
            if spheroid.is_some() { "geographic" } else { "Cartesian" }
        );
        Ok(Self::new(x, y, spheroid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLOBAL_GRID: &str = r#"
mode = "linear"

[x]
angular = true
regular = { start = -180.0, stop = 179.0, num = 360 }

[y]
regular = { start = -90.0, stop = 90.0, num = 181 }

[spheroid]
"#;

    #[test]
    fn test_from_toml() {
        let config = BinningConfig::from_toml(GLOBAL_GRID).unwrap();
        assert!(config.x.angular);
        assert_eq!(config.mode, PushMode::Linear);
        assert_eq!(config.spheroid, Some(SpheroidConfig::default()));

        let binning = Binning2D::from_config(&config).unwrap();
        assert_eq!(binning.shape(), (360, 181));
        assert!(binning.x().is_circle());
        assert_eq!(binning.spheroid(), Some(&Spheroid::wgs84()));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = BinningConfig::new(
            AxisConfig::from_values(vec![0.0, 1.0, 2.0]),
            AxisConfig::regular(0.0, 10.0, 11),
        );
        assert_eq!(config.mode, PushMode::Nearest);
        let toml = config.to_toml().unwrap();
        assert_eq!(BinningConfig::from_toml(&toml).unwrap(), config);
    }

    #[test]
    fn test_json_serialization() {
        let config = BinningConfig::new(
            AxisConfig::regular(0.0, 359.0, 360).with_angular(),
            AxisConfig::regular(-80.0, 80.0, 161),
        )
        .with_spheroid(SpheroidConfig::default())
        .with_mode(PushMode::Linear);
        let json = config.to_json().unwrap();
        assert!(json.contains("\"linear\""));
        let parsed = BinningConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_spheroid_rejected() {
        let config = BinningConfig::new(
            AxisConfig::regular(0.0, 1.0, 2),
            AxisConfig::regular(0.0, 1.0, 2),
        )
        .with_spheroid(SpheroidConfig {
            semi_major_axis: -1.0,
            flattening: 0.0,
        });
        assert!(matches!(
            Binning2D::from_config(&config),
            Err(BinningError::InvalidSpheroid { .. })
        ));
    }

    #[test]
    fn test_axis_needs_exactly_one_definition() {
        assert!(AxisConfig::default().build().is_err());
        let both = AxisConfig {
            values: vec![0.0, 1.0],
            angular: false,
            regular: Some(RegularAxisConfig {
                start: 0.0,
                stop: 1.0,
                num: 2,
            }),
        };
        assert!(matches!(both.build(), Err(BinningError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_axis_values() {
        let config = BinningConfig::new(
            AxisConfig::from_values(vec![0.0, 0.0]),
            AxisConfig::regular(0.0, 1.0, 2),
        );
        assert!(matches!(config.validate(), Err(BinningError::Axis(_))));
    }

    #[test]
    fn test_angular_latitude_rejected() {
        let config = BinningConfig::new(
            AxisConfig::regular(0.0, 10.0, 11),
            AxisConfig::regular(0.0, 10.0, 11).with_angular(),
        )
        .with_spheroid(SpheroidConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            BinningConfig::from_toml("[x]\nvalues = \"oops\""),
            Err(BinningError::InvalidConfig(_))
        ));
    }
}
