//! 2D statistical binning
//!
//! [`Binning2D`] groups scattered `(x, y, z)` samples into the nodes of a
//! fixed grid and keeps one [`StreamingStats`] per node. Samples are
//! attributed either wholly to their nearest node ([`PushMode::Nearest`])
//! or split across the four nodes of their cell by area
//! ([`PushMode::Linear`]).
//!
//! In linear mode each corner accumulates `z * weight`: the per-node
//! statistics describe the distribution of weighted contributions, not a
//! weighted summary of the raw values.
//!
//! Ingestion takes `&mut self`, so concurrent writers on one engine are
//! ruled out at compile time. With the `parallel` feature,
//! [`Binning2D::push_parallel`] shards the input across worker threads,
//! each filling a private grid that is merged into the engine afterwards.

use ndarray::{Array2, ArrayView1, ArrayViewD, Ix1, Zip};

use implore_stats::StreamingStats;

use crate::axis::{normalize_angle, Axis, GridAxis, CIRCLE_DEGREES};
use crate::error::{validation, BinningError, BinningResult};
use crate::spheroid::Spheroid;
use crate::types::{PushMode, PushSummary, Statistic};
use crate::weighting::{AreaWeighting, Point};

/// Grid nodes receiving one sample
enum Placement {
    /// Outside the grid
    Outside,
    /// Whole value to one node
    Single((usize, usize)),
    /// Weighted shares to the four corners of a cell
    Split([((usize, usize), f64); 4]),
}

/// Resolves samples to grid nodes. Borrows only the immutable parts of the
/// engine so it can be shared by worker threads.
struct Resolver<'a, A> {
    x: &'a A,
    y: &'a A,
    weighting: &'a AreaWeighting,
}

impl<A: GridAxis> Resolver<'_, A> {
    fn place(&self, x: f64, y: f64, mode: PushMode) -> Placement {
        match mode {
            PushMode::Nearest => self.nearest(x, y),
            PushMode::Linear => self.linear(x, y),
        }
    }

    fn nearest(&self, x: f64, y: f64) -> Placement {
        match (self.x.find_index(x, true), self.y.find_index(y, true)) {
            (Some(ix), Some(iy)) => Placement::Single((ix, iy)),
            _ => Placement::Outside,
        }
    }

    fn linear(&self, x: f64, y: f64) -> Placement {
        let (Some((ix0, ix1)), Some((iy0, iy1))) = (self.x.find_indexes(x), self.y.find_indexes(y))
        else {
            return Placement::Outside;
        };

        let x0 = self.x.coordinate_value(ix0);
        let (x, x1) = if self.x.is_angle() {
            (
                normalize_angle(x, x0, CIRCLE_DEGREES),
                normalize_angle(self.x.coordinate_value(ix1), x0, CIRCLE_DEGREES),
            )
        } else {
            (x, self.x.coordinate_value(ix1))
        };

        let weights = self.weighting.weights(
            Point::new(x, y),
            Point::new(x0, self.y.coordinate_value(iy0)),
            Point::new(x1, self.y.coordinate_value(iy1)),
        );

        Placement::Split([
            ((ix0, iy0), weights.w00),
            ((ix0, iy1), weights.w01),
            ((ix1, iy0), weights.w10),
            ((ix1, iy1), weights.w11),
        ])
    }

    /// Feed a batch of samples into `cells`
    fn ingest<X, Y, Z>(
        &self,
        cells: &mut Array2<StreamingStats>,
        x: X,
        y: Y,
        z: Z,
        mode: PushMode,
    ) -> PushSummary
    where
        X: IntoIterator<Item = f64>,
        Y: IntoIterator<Item = f64>,
        Z: IntoIterator<Item = f64>,
    {
        let mut summary = PushSummary::default();
        for ((x, y), value) in x.into_iter().zip(y).zip(z) {
            if !value.is_finite() {
                summary.skipped_non_finite += 1;
                continue;
            }
            match self.place(x, y, mode) {
                Placement::Outside => summary.out_of_domain += 1,
                Placement::Single(index) => {
                    cells[index].accumulate(value);
                    summary.accumulated += 1;
                }
                Placement::Split(shares) => {
                    for (index, weight) in shares {
                        cells[index].accumulate(value * weight);
                    }
                    summary.accumulated += 1;
                }
            }
        }
        summary
    }
}

/// Group scattered values into the nodes of a 2D grid
#[derive(Debug, Clone)]
pub struct Binning2D<A = Axis> {
    x: A,
    y: A,
    spheroid: Option<Spheroid>,
    weighting: AreaWeighting,
    cells: Array2<StreamingStats>,
}

impl<A: GridAxis> Binning2D<A> {
    /// Create an empty grid over the `x` and `y` axes.
    ///
    /// Without a spheroid the coordinates are Cartesian. With one, `x` and
    /// `y` are longitudes and latitudes in degrees and linear mode weights
    /// by surface area on that ellipsoid.
    pub fn new(x: A, y: A, spheroid: Option<Spheroid>) -> Self {
        let cells = Array2::from_elem((x.size(), y.size()), StreamingStats::new());
        Self {
            weighting: AreaWeighting::for_spheroid(spheroid),
            x,
            y,
            spheroid,
            cells,
        }
    }

    /// X axis of the grid
    pub fn x(&self) -> &A {
        &self.x
    }

    /// Y axis of the grid
    pub fn y(&self) -> &A {
        &self.y
    }

    /// Geodetic system, if the grid is geographic
    pub fn spheroid(&self) -> Option<&Spheroid> {
        self.spheroid.as_ref()
    }

    /// Area model used by linear mode
    pub fn weighting(&self) -> &AreaWeighting {
        &self.weighting
    }

    /// Grid shape `(x.size(), y.size())`
    pub fn shape(&self) -> (usize, usize) {
        self.cells.dim()
    }

    /// Accumulator of the node `(ix, iy)`
    pub fn cell(&self, ix: usize, iy: usize) -> Option<&StreamingStats> {
        self.cells.get((ix, iy))
    }

    fn ingest<X, Y, Z>(&mut self, x: X, y: Y, z: Z, mode: PushMode) -> PushSummary
    where
        X: IntoIterator<Item = f64>,
        Y: IntoIterator<Item = f64>,
        Z: IntoIterator<Item = f64>,
    {
        let resolver = Resolver {
            x: &self.x,
            y: &self.y,
            weighting: &self.weighting,
        };
        let summary = resolver.ingest(&mut self.cells, x, y, z, mode);
        log_summary(&summary, mode);
        summary
    }

    /// Insert samples `z` located at `(x, y)`.
    ///
    /// The three slices must have the same length; otherwise nothing is
    /// inserted. Non-finite values and samples outside the grid are skipped.
    pub fn push(
        &mut self,
        x: &[f64],
        y: &[f64],
        z: &[f64],
        mode: PushMode,
    ) -> BinningResult<PushSummary> {
        validation::validate_same_length(x.len(), y.len(), z.len())?;
        Ok(self.ingest(
            x.iter().copied(),
            y.iter().copied(),
            z.iter().copied(),
            mode,
        ))
    }

    /// Insert samples from dynamically shaped arrays, which must all be
    /// one-dimensional and of equal length
    pub fn push_arrays(
        &mut self,
        x: ArrayViewD<'_, f64>,
        y: ArrayViewD<'_, f64>,
        z: ArrayViewD<'_, f64>,
        mode: PushMode,
    ) -> BinningResult<PushSummary> {
        let x = into_1d("x", x)?;
        let y = into_1d("y", y)?;
        let z = into_1d("z", z)?;
        validation::validate_same_length(x.len(), y.len(), z.len())?;
        Ok(self.ingest(
            x.iter().copied(),
            y.iter().copied(),
            z.iter().copied(),
            mode,
        ))
    }

    /// Reset every node to the empty state. The grid shape is unchanged.
    pub fn clear(&mut self) {
        self.cells.fill(StreamingStats::new());
    }

    /// Evaluate one statistic on every node, shaped `[x.size(), y.size()]`
    pub fn statistic(&self, statistic: Statistic) -> Array2<f64> {
        self.cells.map(|cell| statistic.evaluate(cell))
    }

    /// Number of values accumulated in each node
    pub fn count(&self) -> Array2<f64> {
        self.statistic(Statistic::Count)
    }

    /// Minimum of values in each node
    pub fn min(&self) -> Array2<f64> {
        self.statistic(Statistic::Min)
    }

    /// Maximum of values in each node
    pub fn max(&self) -> Array2<f64> {
        self.statistic(Statistic::Max)
    }

    /// Mean of values in each node
    pub fn mean(&self) -> Array2<f64> {
        self.statistic(Statistic::Mean)
    }

    /// Approximate median of values in each node
    pub fn median(&self) -> Array2<f64> {
        self.statistic(Statistic::Median)
    }

    /// Population variance of values in each node
    pub fn variance(&self) -> Array2<f64> {
        self.statistic(Statistic::Variance)
    }

    /// Excess kurtosis of values in each node
    pub fn kurtosis(&self) -> Array2<f64> {
        self.statistic(Statistic::Kurtosis)
    }

    /// Skewness of values in each node
    pub fn skewness(&self) -> Array2<f64> {
        self.statistic(Statistic::Skewness)
    }

    /// Sum of values in each node
    pub fn sum(&self) -> Array2<f64> {
        self.statistic(Statistic::Sum)
    }
}

impl<A: GridAxis + PartialEq> Binning2D<A> {
    /// Aggregate the statistics of another engine defined on the same grid.
    ///
    /// Counts, sums, extrema and moments combine exactly; medians are
    /// approximate once both sides hold five or more values.
    pub fn merge(&mut self, other: &Self) -> BinningResult<()> {
        if self.x != other.x || self.y != other.y || self.spheroid != other.spheroid {
            return Err(BinningError::GridMismatch);
        }
        merge_cells(&mut self.cells, &other.cells);
        Ok(())
    }
}

#[cfg(feature = "parallel")]
impl<A: GridAxis + Sync> Binning2D<A> {
    /// Insert samples using all rayon worker threads.
    ///
    /// The input is cut into chunks, each binned into a private grid; the
    /// partial grids are then merged into this engine. Results match
    /// [`Binning2D::push`] except for the median, which is approximate
    /// across chunk boundaries.
    pub fn push_parallel(
        &mut self,
        x: &[f64],
        y: &[f64],
        z: &[f64],
        mode: PushMode,
    ) -> BinningResult<PushSummary> {
        use rayon::prelude::*;

        /// Minimum number of samples per worker chunk
        const MIN_CHUNK: usize = 4096;

        validation::validate_same_length(x.len(), y.len(), z.len())?;
        let shape = self.cells.dim();
        let chunk = (x.len() / rayon::current_num_threads()).max(MIN_CHUNK);
        let resolver = Resolver {
            x: &self.x,
            y: &self.y,
            weighting: &self.weighting,
        };

        let empty = || {
            (
                Array2::from_elem(shape, StreamingStats::new()),
                PushSummary::default(),
            )
        };
        let (partial, summary) = x
            .par_chunks(chunk)
            .zip(y.par_chunks(chunk))
            .zip(z.par_chunks(chunk))
            .map(|((xs, ys), zs)| {
                let mut cells = Array2::from_elem(shape, StreamingStats::new());
                let summary = resolver.ingest(
                    &mut cells,
                    xs.iter().copied(),
                    ys.iter().copied(),
                    zs.iter().copied(),
                    mode,
                );
                (cells, summary)
            })
            .reduce(empty, |(mut cells, summary), (other_cells, other_summary)| {
                merge_cells(&mut cells, &other_cells);
                (cells, summary + other_summary)
            });

        merge_cells(&mut self.cells, &partial);
        log_summary(&summary, mode);
        Ok(summary)
    }
}

pub(crate) fn into_1d<'a>(name: &str, array: ArrayViewD<'a, f64>) -> BinningResult<ArrayView1<'a, f64>> {
    validation::validate_rank(name, array.ndim())?;
    array
        .into_dimensionality::<Ix1>()
        .map_err(|_| BinningError::InvalidRank {
            name: name.to_string(),
            ndim: 1,
        })
}

fn merge_cells(target: &mut Array2<StreamingStats>, source: &Array2<StreamingStats>) {
    Zip::from(target)
        .and(source)
        .for_each(|lhs, rhs| lhs.merge(rhs));
}

pub(crate) fn log_summary(summary: &PushSummary, mode: PushMode) {
    tracing::debug!(
        "Pushed {} samples in {} mode: {} accumulated, {} non-finite, {} outside grid",
        summary.total(),
        mode,
        summary.accumulated,
        summary.skipped_non_finite,
        summary.out_of_domain
    );
}
