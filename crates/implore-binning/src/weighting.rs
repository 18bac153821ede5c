//! Area weighting of a sample across the corners of its grid cell
//!
//! A point `P` inside the cell `[x0, x1] × [y0, y1]` cuts it into four
//! sub-rectangles. Each corner receives the area of the sub-rectangle
//! diagonally opposite to it, divided by the total cell area, so the
//! closer `P` lies to a corner the larger that corner's share.
//!
//! Areas are either flat coordinate areas ([`AreaWeighting::Cartesian`])
//! or true surface areas on a reference ellipsoid
//! ([`AreaWeighting::Geographic`]), with `x` as longitude and `y` as
//! latitude, in degrees.

use serde::Serialize;

use crate::spheroid::Spheroid;

/// A 2D point in grid coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Shares of a sample attributed to the four corners of its cell
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CornerWeights {
    /// Corner `(x0, y0)`
    pub w00: f64,
    /// Corner `(x0, y1)`
    pub w01: f64,
    /// Corner `(x1, y0)`
    pub w10: f64,
    /// Corner `(x1, y1)`
    pub w11: f64,
}

impl CornerWeights {
    /// Whole contribution to the `(x0, y0)` corner
    pub fn lower_corner() -> Self {
        Self {
            w00: 1.0,
            w01: 0.0,
            w10: 0.0,
            w11: 0.0,
        }
    }

    /// Sum of the four weights
    pub fn total(&self) -> f64 {
        self.w00 + self.w01 + self.w10 + self.w11
    }

    /// Weights in `[w00, w01, w10, w11]` order
    pub fn to_array(&self) -> [f64; 4] {
        [self.w00, self.w01, self.w10, self.w11]
    }
}

/// Area model used to split a sample across cell corners
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub enum AreaWeighting {
    /// Flat coordinate areas
    #[default]
    Cartesian,
    /// Surface areas on the given ellipsoid (longitude/latitude in degrees)
    Geographic(Spheroid),
}

impl AreaWeighting {
    /// Weighting matching an optional geodetic system: geographic when one
    /// is given, Cartesian otherwise
    pub fn for_spheroid(spheroid: Option<Spheroid>) -> Self {
        match spheroid {
            Some(spheroid) => Self::Geographic(spheroid),
            None => Self::Cartesian,
        }
    }

    /// Area of the axis-aligned box spanned by two opposite corners
    pub fn area(&self, a: Point, b: Point) -> f64 {
        match self {
            Self::Cartesian => ((b.x - a.x) * (b.y - a.y)).abs(),
            Self::Geographic(spheroid) => spheroid.quadrangle_area(a.x, a.y, b.x, b.y),
        }
    }

    /// Split a sample at `p` across the corners of the cell `[lower, upper]`.
    ///
    /// `p` must lie within the cell and, for angular axes, be expressed in
    /// the same period as the corners. A cell of zero area gives the whole
    /// weight to the lower corner.
    pub fn weights(&self, p: Point, lower: Point, upper: Point) -> CornerWeights {
        let lower_left = self.area(lower, p);
        let upper_left = self.area(Point::new(lower.x, p.y), Point::new(p.x, upper.y));
        let lower_right = self.area(Point::new(p.x, lower.y), Point::new(upper.x, p.y));
        let upper_right = self.area(p, upper);

        let total = lower_left + upper_left + lower_right + upper_right;
        if !(total > 0.0 && total.is_finite()) {
            tracing::trace!("Degenerate cell {:?} - {:?}, no area to split", lower, upper);
            return CornerWeights::lower_corner();
        }

        CornerWeights {
            w00: upper_right / total,
            w01: lower_right / total,
            w10: upper_left / total,
            w11: lower_left / total,
        }
    }
}
