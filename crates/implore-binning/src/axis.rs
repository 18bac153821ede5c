//! Grid axes for statistical binning
//!
//! An axis is an ordered sequence of coordinate values, one per grid node.
//! It resolves a scalar coordinate either to the nearest node
//! ([`GridAxis::find_index`]) or to the pair of nodes bracketing it
//! ([`GridAxis::find_indexes`]).
//!
//! Angular axes (longitudes, in degrees) are periodic: coordinates are
//! wrapped into the axis period before lookup, and an axis whose regular
//! spacing closes the full circle brackets values between its last and
//! first node as the pair `(n - 1, 0)`.

use serde::Serialize;

use crate::error::{AxisError, AxisResult};

/// Period of angular axes, in degrees
pub const CIRCLE_DEGREES: f64 = 360.0;

/// Relative tolerance used to decide whether an angular axis closes the circle
const CIRCLE_TOLERANCE: f64 = 1e-9;

/// Re-wrap `value` into `[reference, reference + period)`
pub fn normalize_angle(value: f64, reference: f64, period: f64) -> f64 {
    let wrapped = (value - reference).rem_euclid(period);
    // rem_euclid may round up to exactly `period` for tiny negative inputs
    if wrapped >= period {
        reference
    } else {
        wrapped + reference
    }
}

/// Index resolution consumed by the binning engine
pub trait GridAxis {
    /// Number of grid nodes
    fn size(&self) -> usize;

    /// Coordinate of the node at `index`
    fn coordinate_value(&self, index: usize) -> f64;

    /// Index of the node nearest to `value`.
    ///
    /// Out-of-range values snap to the first or last node when `clamp` is
    /// set and resolve to `None` otherwise. NaN never resolves, nor does an
    /// infinite angle.
    fn find_index(&self, value: f64, clamp: bool) -> Option<usize>;

    /// Indexes `(i0, i1)` of the two nodes delimiting the cell containing
    /// `value`, or `None` outside the axis domain.
    fn find_indexes(&self, value: f64) -> Option<(usize, usize)>;

    /// Whether coordinates are periodic angles in degrees
    fn is_angle(&self) -> bool;
}

/// Axis defined by strictly increasing coordinate values
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Axis {
    values: Vec<f64>,
    is_angle: bool,
    is_circle: bool,
}

impl Axis {
    /// Create a Cartesian axis from strictly increasing values
    pub fn new(values: Vec<f64>) -> AxisResult<Self> {
        validate_values(&values)?;
        Ok(Self {
            values,
            is_angle: false,
            is_circle: false,
        })
    }

    /// Create a longitude axis in degrees.
    ///
    /// Values are wrapped into `[first, first + 360)`, so a sequence that
    /// crosses the antimeridian (e.g. `[170, 180, -170]`) is accepted. A
    /// last value one full turn after the first (e.g. `[-180, ..., 180]`)
    /// is kept as a distinct closing node at `first + 360`.
    pub fn angular(values: Vec<f64>) -> AxisResult<Self> {
        let first = *values.first().ok_or(AxisError::Empty)?;
        if !first.is_finite() {
            return Err(AxisError::NonFinite { index: 0 });
        }
        let last = values.len() - 1;
        let values: Vec<f64> = values
            .into_iter()
            .enumerate()
            .map(|(index, v)| {
                if !v.is_finite() {
                    return v;
                }
                let wrapped = normalize_angle(v, first, CIRCLE_DEGREES);
                let closes_turn = index == last
                    && index > 0
                    && (wrapped - first).abs() <= CIRCLE_TOLERANCE * CIRCLE_DEGREES;
                if closes_turn {
                    first + CIRCLE_DEGREES
                } else {
                    wrapped
                }
            })
            .collect();
        validate_values(&values)?;

        let n = values.len();
        let span = values[n - 1] - values[0];
        let is_circle = n > 1 && {
            let step = span / (n - 1) as f64;
            (span + step - CIRCLE_DEGREES).abs() <= CIRCLE_TOLERANCE * CIRCLE_DEGREES
        };

        Ok(Self {
            values,
            is_angle: true,
            is_circle,
        })
    }

    /// Create a Cartesian axis of `num` evenly spaced values from `start`
    /// to `stop` inclusive
    pub fn regular(start: f64, stop: f64, num: usize) -> AxisResult<Self> {
        Self::new(linspace(start, stop, num)?)
    }

    /// Create a longitude axis of `num` evenly spaced values from `start`
    /// to `stop` inclusive
    pub fn regular_angular(start: f64, stop: f64, num: usize) -> AxisResult<Self> {
        Self::angular(linspace(start, stop, num)?)
    }

    /// Coordinate values of the axis nodes
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// First coordinate
    pub fn min_value(&self) -> f64 {
        self.values[0]
    }

    /// Last coordinate
    pub fn max_value(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Whether the angular axis wraps around the full circle
    pub fn is_circle(&self) -> bool {
        self.is_circle
    }

    /// Map a coordinate into the axis reference period (identity for
    /// Cartesian axes)
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_angle {
            normalize_angle(value, self.values[0], CIRCLE_DEGREES)
        } else {
            value
        }
    }

    /// Nearest of the last and first node for a value in the wrap gap
    fn nearest_across_wrap(&self, value: f64) -> usize {
        let after_last = value - self.max_value();
        let before_first = self.min_value() + CIRCLE_DEGREES - value;
        if after_last <= before_first {
            self.values.len() - 1
        } else {
            0
        }
    }
}

impl GridAxis for Axis {
    fn size(&self) -> usize {
        self.values.len()
    }

    fn coordinate_value(&self, index: usize) -> f64 {
        self.values[index]
    }

    fn find_index(&self, value: f64, clamp: bool) -> Option<usize> {
        // Infinite longitudes normalize to NaN
        let value = self.normalize(value);
        if value.is_nan() {
            return None;
        }
        let n = self.values.len();

        if value < self.min_value() {
            return clamp.then_some(0);
        }
        if value > self.max_value() {
            if self.is_circle {
                return Some(self.nearest_across_wrap(value));
            }
            if !clamp {
                return None;
            }
            return Some(if self.is_angle {
                self.nearest_across_wrap(value)
            } else {
                n - 1
            });
        }

        let upper = self.values.partition_point(|&v| v <= value);
        if upper >= n {
            return Some(n - 1);
        }
        let lower = upper - 1;
        if value - self.values[lower] <= self.values[upper] - value {
            Some(lower)
        } else {
            Some(upper)
        }
    }

    fn find_indexes(&self, value: f64) -> Option<(usize, usize)> {
        let n = self.values.len();
        let value = self.normalize(value);
        if value.is_nan() || n < 2 {
            return None;
        }

        if value < self.min_value() {
            return None;
        }
        if value > self.max_value() {
            return self.is_circle.then_some((n - 1, 0));
        }

        let upper = self.values.partition_point(|&v| v <= value);
        if upper >= n {
            Some((n - 2, n - 1))
        } else {
            Some((upper - 1, upper))
        }
    }

    fn is_angle(&self) -> bool {
        self.is_angle
    }
}

fn validate_values(values: &[f64]) -> AxisResult<()> {
    if values.is_empty() {
        return Err(AxisError::Empty);
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(AxisError::NonFinite { index });
    }
    if let Some(index) = values.windows(2).position(|w| w[1] <= w[0]) {
        return Err(AxisError::NotIncreasing { index: index + 1 });
    }
    Ok(())
}

fn linspace(start: f64, stop: f64, num: usize) -> AxisResult<Vec<f64>> {
    let invalid = AxisError::InvalidRange { start, stop, num };
    if num == 0 || !start.is_finite() || !stop.is_finite() {
        return Err(invalid);
    }
    if num == 1 {
        return Ok(vec![start]);
    }
    if stop <= start {
        return Err(invalid);
    }
    let step = (stop - start) / (num - 1) as f64;
    Ok((0..num)
        .map(|i| if i == num - 1 { stop } else { start + i as f64 * step })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(-0.5, 0.0, 360.0), 359.5);
        assert_eq!(normalize_angle(370.0, 0.0, 360.0), 10.0);
        assert_eq!(normalize_angle(10.0, -180.0, 360.0), 10.0);
        assert_eq!(normalize_angle(190.0, -180.0, 360.0), -170.0);
        assert_eq!(normalize_angle(0.0, 359.0, 360.0), 360.0);
    }

    #[test]
    fn test_axis_validation() {
        assert_eq!(Axis::new(vec![]), Err(AxisError::Empty));
        assert_eq!(
            Axis::new(vec![0.0, f64::NAN]),
            Err(AxisError::NonFinite { index: 1 })
        );
        assert_eq!(
            Axis::new(vec![0.0, 2.0, 1.0]),
            Err(AxisError::NotIncreasing { index: 2 })
        );
        assert!(Axis::regular(1.0, 0.0, 5).is_err());
        assert!(Axis::regular(0.0, 1.0, 0).is_err());
    }

    #[test]
    fn test_regular_axis() {
        let axis = Axis::regular(0.0, 2.0, 5).unwrap();
        assert_eq!(axis.values(), &[0.0, 0.5, 1.0, 1.5, 2.0]);
        assert_eq!(axis.size(), 5);
        assert!(!axis.is_angle());
    }

    #[test]
    fn test_find_index_nearest() {
        let axis = Axis::new(vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(axis.find_index(0.4, false), Some(0));
        assert_eq!(axis.find_index(0.6, false), Some(1));
        assert_eq!(axis.find_index(2.0, false), Some(2));
        assert_eq!(axis.find_index(f64::NAN, true), None);
    }

    #[test]
    fn test_find_index_clamp() {
        let axis = Axis::new(vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(axis.find_index(-5.0, false), None);
        assert_eq!(axis.find_index(-5.0, true), Some(0));
        assert_eq!(axis.find_index(7.0, false), None);
        assert_eq!(axis.find_index(7.0, true), Some(2));
    }

    #[test]
    fn test_find_indexes() {
        let axis = Axis::new(vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(axis.find_indexes(0.5), Some((0, 1)));
        assert_eq!(axis.find_indexes(0.0), Some((0, 1)));
        assert_eq!(axis.find_indexes(1.0), Some((1, 2)));
        assert_eq!(axis.find_indexes(2.0), Some((1, 2)));
        assert_eq!(axis.find_indexes(-0.1), None);
        assert_eq!(axis.find_indexes(2.1), None);
    }

    #[test]
    fn test_single_node_axis() {
        let axis = Axis::new(vec![3.0]).unwrap();
        assert_eq!(axis.find_index(100.0, true), Some(0));
        assert_eq!(axis.find_indexes(3.0), None);
    }

    #[test]
    fn test_angular_circle() {
        let axis = Axis::regular_angular(0.0, 359.0, 360).unwrap();
        assert!(axis.is_angle());
        assert!(axis.is_circle());
        assert_eq!(axis.find_indexes(359.9), Some((359, 0)));
        assert_eq!(axis.find_indexes(-0.1), Some((359, 0)));
        assert_eq!(axis.find_indexes(720.5), Some((0, 1)));
        assert_eq!(axis.find_index(-0.4, false), Some(0));
        assert_eq!(axis.find_index(-0.6, false), Some(359));
    }

    #[test]
    fn test_angular_crossing_antimeridian() {
        let axis = Axis::angular(vec![170.0, 180.0, -170.0]).unwrap();
        assert_eq!(axis.values(), &[170.0, 180.0, 190.0]);
        assert!(!axis.is_circle());
        assert_eq!(axis.find_indexes(-175.0), Some((1, 2)));
        assert_eq!(axis.find_indexes(0.0), None);
    }

    #[test]
    fn test_angular_regional_clamp_uses_circular_distance() {
        let axis = Axis::angular(vec![10.0, 15.0, 20.0]).unwrap();
        // 5° is closer to the first node than to the last one
        assert_eq!(axis.find_index(5.0, true), Some(0));
        assert_eq!(axis.find_index(25.0, true), Some(2));
        assert_eq!(axis.find_index(25.0, false), None);
    }

    #[test]
    fn test_angular_rejects_more_than_one_period() {
        assert!(matches!(
            Axis::angular(vec![0.0, 180.0, 360.0, 370.0]),
            Err(AxisError::NotIncreasing { index: 2 })
        ));
        // Only the last node may close the turn
        assert!(Axis::angular(vec![0.0, 360.0, 370.0]).is_err());
    }

    #[test]
    fn test_angular_closing_node() {
        let axis = Axis::regular_angular(-180.0, 180.0, 361).unwrap();
        assert_eq!(axis.size(), 361);
        assert_eq!(axis.min_value(), -180.0);
        assert_eq!(axis.max_value(), 180.0);
        assert!(axis.is_angle());
        assert!(!axis.is_circle());

        assert_eq!(axis.find_indexes(179.5), Some((359, 360)));
        assert_eq!(axis.find_indexes(-179.5), Some((0, 1)));
        assert_eq!(axis.find_indexes(180.0), Some((0, 1)));
        assert_eq!(axis.find_indexes(540.25), Some((0, 1)));
        assert_eq!(axis.find_index(179.9, false), Some(360));
        assert_eq!(axis.find_index(-179.9, false), Some(0));

        let axis = Axis::regular_angular(0.0, 360.0, 361).unwrap();
        assert_eq!(axis.max_value(), 360.0);
        assert_eq!(axis.find_indexes(-0.5), Some((359, 360)));
        assert_eq!(axis.find_index(359.8, false), Some(360));
    }

    #[test]
    fn test_infinite_coordinates() {
        let axis = Axis::new(vec![0.0, 1.0, 2.0]).unwrap();
        assert_eq!(axis.find_index(f64::INFINITY, true), Some(2));
        assert_eq!(axis.find_index(f64::NEG_INFINITY, true), Some(0));
        assert_eq!(axis.find_indexes(f64::INFINITY), None);

        let angular = Axis::regular_angular(0.0, 359.0, 360).unwrap();
        assert_eq!(angular.find_index(f64::INFINITY, true), None);
        assert_eq!(angular.find_indexes(f64::NEG_INFINITY), None);
    }
}
