//! Reference ellipsoid of revolution
//!
//! [`Spheroid`] is an immutable value holding the semi-major axis and the
//! flattening of a geodetic system; the derived constants used by the
//! geographic area computations are evaluated once at construction.

use serde::Serialize;

use crate::error::{BinningError, BinningResult};

/// Ellipsoid of revolution (semi-major axis in meters, flattening)
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Spheroid {
    semi_major_axis: f64,
    flattening: f64,
    semi_minor_axis: f64,
    first_eccentricity_squared: f64,
    eccentricity: f64,
}

impl Spheroid {
    /// WGS-84 semi-major axis, in meters
    pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

    /// WGS-84 flattening
    pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

    /// Create a spheroid from its semi-major axis and flattening
    pub fn new(semi_major_axis: f64, flattening: f64) -> BinningResult<Self> {
        let valid_axis = semi_major_axis.is_finite() && semi_major_axis > 0.0;
        let valid_flattening = (0.0..1.0).contains(&flattening);
        if !valid_axis || !valid_flattening {
            return Err(BinningError::InvalidSpheroid {
                semi_major_axis,
                flattening,
            });
        }

        let first_eccentricity_squared = flattening * (2.0 - flattening);
        Ok(Self {
            semi_major_axis,
            flattening,
            semi_minor_axis: semi_major_axis * (1.0 - flattening),
            first_eccentricity_squared,
            eccentricity: first_eccentricity_squared.sqrt(),
        })
    }

    /// World Geodetic System 1984
    pub fn wgs84() -> Self {
        Self {
            semi_major_axis: Self::WGS84_SEMI_MAJOR_AXIS,
            flattening: Self::WGS84_FLATTENING,
            semi_minor_axis: Self::WGS84_SEMI_MAJOR_AXIS * (1.0 - Self::WGS84_FLATTENING),
            first_eccentricity_squared: Self::WGS84_FLATTENING * (2.0 - Self::WGS84_FLATTENING),
            eccentricity: (Self::WGS84_FLATTENING * (2.0 - Self::WGS84_FLATTENING)).sqrt(),
        }
    }

    /// Semi-major axis (equatorial radius)
    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    /// Semi-minor axis (polar radius)
    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_minor_axis
    }

    /// Flattening
    pub fn flattening(&self) -> f64 {
        self.flattening
    }

    /// First eccentricity squared
    pub fn first_eccentricity_squared(&self) -> f64 {
        self.first_eccentricity_squared
    }

    /// Mean radius `(2a + b) / 3`
    pub fn mean_radius(&self) -> f64 {
        (2.0 * self.semi_major_axis + self.semi_minor_axis) / 3.0
    }

    /// Radius of the sphere having the same surface area
    pub fn authalic_radius(&self) -> f64 {
        let a2 = self.semi_major_axis * self.semi_major_axis;
        if self.eccentricity == 0.0 {
            return self.semi_major_axis;
        }
        let e = self.eccentricity;
        (0.5 * a2 * (1.0 + (1.0 - e * e) / e * e.atanh())).sqrt()
    }

    /// Authalic latitude function `q(φ)` (sphere limit `2·sinφ`)
    fn authalic_q(&self, latitude: f64) -> f64 {
        let sin_phi = latitude.to_radians().sin();
        let e = self.eccentricity;
        if e == 0.0 {
            return 2.0 * sin_phi;
        }
        sin_phi / (1.0 - self.first_eccentricity_squared * sin_phi * sin_phi)
            + (e * sin_phi).atanh() / e
    }

    /// Surface area of the quadrangle bounded by two meridians and two
    /// parallels (degrees), in squared units of the semi-major axis
    pub fn quadrangle_area(&self, lon0: f64, lat0: f64, lon1: f64, lat1: f64) -> f64 {
        let lat0 = lat0.clamp(-90.0, 90.0);
        let lat1 = lat1.clamp(-90.0, 90.0);
        let delta_lambda = (lon1 - lon0).abs().to_radians();
        let b2 = self.semi_minor_axis * self.semi_minor_axis;
        0.5 * delta_lambda * b2 * (self.authalic_q(lat1) - self.authalic_q(lat0)).abs()
    }
}

impl Default for Spheroid {
    fn default() -> Self {
        Self::wgs84()
    }
}
