//! Per-node value distributions on a 2D grid
//!
//! [`Histogram2D`] bins samples to their nearest grid node like
//! [`Binning2D`](crate::Binning2D) in nearest mode, but keeps a bounded
//! [`StreamingHistogram`] per node instead of moments. This answers any
//! quantile, not only the median.

use ndarray::{Array2, Array3, ArrayViewD, Zip};

use implore_stats::{Bin, StatsError, StreamingHistogram};

use crate::axis::{Axis, GridAxis};
use crate::binning::{into_1d, log_summary};
use crate::error::{validation, BinningError, BinningResult};
use crate::types::{PushMode, PushSummary};

/// Group scattered values into per-node histograms of a 2D grid
#[derive(Debug, Clone)]
pub struct Histogram2D<A = Axis> {
    x: A,
    y: A,
    cells: Array2<StreamingHistogram>,
}

impl<A: GridAxis> Histogram2D<A> {
    /// Create an empty grid whose nodes keep at most `bin_count` bins
    /// (100 when `None`)
    pub fn new(x: A, y: A, bin_count: Option<usize>) -> BinningResult<Self> {
        let empty = StreamingHistogram::new(
            bin_count.unwrap_or(StreamingHistogram::DEFAULT_BIN_COUNT),
        )?;
        let cells = Array2::from_elem((x.size(), y.size()), empty);
        Ok(Self { x, y, cells })
    }

    /// X axis of the grid
    pub fn x(&self) -> &A {
        &self.x
    }

    /// Y axis of the grid
    pub fn y(&self) -> &A {
        &self.y
    }

    /// Grid shape `(x.size(), y.size())`
    pub fn shape(&self) -> (usize, usize) {
        self.cells.dim()
    }

    /// Histogram of the node `(ix, iy)`
    pub fn cell(&self, ix: usize, iy: usize) -> Option<&StreamingHistogram> {
        self.cells.get((ix, iy))
    }

    fn ingest<X, Y, Z>(&mut self, x: X, y: Y, z: Z) -> PushSummary
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
            match (self.x.find_index(x, true), self.y.find_index(y, true)) {
                (Some(ix), Some(iy)) => {
                    self.cells[(ix, iy)].push(value);
                    summary.accumulated += 1;
                }
                _ => summary.out_of_domain += 1,
            }
        }
        log_summary(&summary, PushMode::Nearest);
        summary
    }

    /// Insert samples `z` at the grid node nearest to `(x, y)`.
    ///
    /// Coordinates beyond the grid snap to its border. Non-finite values
    /// are skipped. Nothing is inserted when the lengths differ.
    pub fn push(&mut self, x: &[f64], y: &[f64], z: &[f64]) -> BinningResult<PushSummary> {
        validation::validate_same_length(x.len(), y.len(), z.len())?;
        Ok(self.ingest(x.iter().copied(), y.iter().copied(), z.iter().copied()))
    }

    /// Insert samples from dynamically shaped one-dimensional arrays
    pub fn push_arrays(
        &mut self,
        x: ArrayViewD<'_, f64>,
        y: ArrayViewD<'_, f64>,
        z: ArrayViewD<'_, f64>,
    ) -> BinningResult<PushSummary> {
        let x = into_1d("x", x)?;
        let y = into_1d("y", y)?;
        let z = into_1d("z", z)?;
        validation::validate_same_length(x.len(), y.len(), z.len())?;
        Ok(self.ingest(x.iter().copied(), y.iter().copied(), z.iter().copied()))
    }

    /// Empty every node, keeping the grid and the bin limit
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(StreamingHistogram::clear);
    }

    /// Number of values in each node
    pub fn count(&self) -> Array2<f64> {
        self.cells.map(|cell| cell.count() as f64)
    }

    /// Minimum of values in each node
    pub fn min(&self) -> Array2<f64> {
        self.cells.map(StreamingHistogram::min)
    }

    /// Maximum of values in each node
    pub fn max(&self) -> Array2<f64> {
        self.cells.map(StreamingHistogram::max)
    }

    /// Mean of values in each node
    pub fn mean(&self) -> Array2<f64> {
        self.cells.map(StreamingHistogram::mean)
    }

    /// Population variance of values in each node
    pub fn variance(&self) -> Array2<f64> {
        self.cells.map(StreamingHistogram::variance)
    }

    /// Estimated `q`-quantile of each node, NaN for empty nodes
    pub fn quantile(&self, q: f64) -> BinningResult<Array2<f64>> {
        if !(0.0..=1.0).contains(&q) {
            return Err(StatsError::InvalidQuantile(q).into());
        }
        Ok(self.cells.map(|cell| cell.quantile(q).unwrap_or(f64::NAN)))
    }

    /// Median estimate of each node
    pub fn median(&self) -> Array2<f64> {
        self.cells.map(|cell| cell.quantile(0.5).unwrap_or(f64::NAN))
    }

    /// Bins of every node, shaped `[x.size(), y.size(), n]` where `n` is
    /// the largest bin count of any node. Shorter nodes are padded with
    /// [`Bin::empty`].
    pub fn histograms(&self) -> Array3<Bin> {
        let (nx, ny) = self.cells.dim();
        let depth = self.cells.iter().map(StreamingHistogram::size).max().unwrap_or(0);
        let mut bins = Array3::from_elem((nx, ny, depth), Bin::empty());
        for ((ix, iy), cell) in self.cells.indexed_iter() {
            for (iz, bin) in cell.bins().iter().enumerate() {
                bins[(ix, iy, iz)] = *bin;
            }
        }
        bins
    }
}

impl<A: GridAxis + PartialEq> Histogram2D<A> {
    /// Fuse the histograms of another grid defined on the same axes
    pub fn merge(&mut self, other: &Self) -> BinningResult<()> {
        if self.x != other.x || self.y != other.y {
            return Err(BinningError::GridMismatch);
        }
        Zip::from(&mut self.cells)
            .and(&other.cells)
            .for_each(|lhs, rhs| lhs.merge(rhs));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    fn unit_grid(bin_count: Option<usize>) -> Histogram2D {
        Histogram2D::new(
            Axis::new(vec![0.0, 1.0, 2.0]).unwrap(),
            Axis::new(vec![0.0, 1.0]).unwrap(),
            bin_count,
        )
        .unwrap()
    }

    #[test]
    fn test_new_is_empty() {
        let hist = unit_grid(None);
        assert_eq!(hist.shape(), (3, 2));
        assert!(hist.count().iter().all(|&c| c == 0.0));
        assert!(hist.quantile(0.5).unwrap().iter().all(|q| q.is_nan()));
        assert_eq!(hist.cell(0, 0).unwrap().max_bins(), 100);
        assert_eq!(hist.histograms().dim(), (3, 2, 0));
    }

    #[test]
    fn test_zero_bin_count_rejected() {
        let result = Histogram2D::new(
            Axis::new(vec![0.0, 1.0]).unwrap(),
            Axis::new(vec![0.0, 1.0]).unwrap(),
            Some(0),
        );
        assert!(matches!(
            result,
            Err(BinningError::Stats(StatsError::InvalidBinCount))
        ));
    }

    #[test]
    fn test_quantiles_per_node() {
        let mut hist = unit_grid(None);
        let x = [0.1, 0.1, 0.1, 0.1, 0.1, 1.9];
        let y = [0.0, 0.2, 0.1, 0.3, 0.0, 0.9];
        let z = [5.0, 1.0, 3.0, 2.0, 4.0, 7.0];
        let summary = hist.push(&x, &y, &z).unwrap();
        assert_eq!(summary.accumulated, 6);

        let q0 = hist.quantile(0.0).unwrap();
        let median = hist.median();
        let q1 = hist.quantile(1.0).unwrap();
        assert_eq!(q0[[0, 0]], 1.0);
        assert_eq!(median[[0, 0]], 3.0);
        assert_eq!(q1[[0, 0]], 5.0);
        assert_eq!(median[[2, 1]], 7.0);
        assert!(median[[1, 0]].is_nan());
        assert_eq!(hist.mean()[[0, 0]], 3.0);
        assert_eq!(hist.variance()[[0, 0]], 2.0);
        assert_eq!(hist.min()[[0, 0]], 1.0);
        assert_eq!(hist.max()[[2, 1]], 7.0);
    }

    #[test]
    fn test_invalid_quantile() {
        let hist = unit_grid(None);
        assert_eq!(
            hist.quantile(-0.1),
            Err(BinningError::Stats(StatsError::InvalidQuantile(-0.1)))
        );
    }

    #[test]
    fn test_skips_non_finite_and_clamps() {
        let mut hist = unit_grid(None);
        let summary = hist
            .push(&[-5.0, 0.0, 9.0], &[0.0, 0.0, 9.0], &[1.0, f64::INFINITY, f64::NAN])
            .unwrap();
        assert_eq!(summary.accumulated, 1);
        assert_eq!(summary.skipped_non_finite, 2);
        assert_eq!(hist.count()[[0, 0]], 1.0);
    }

    #[test]
    fn test_histograms_padding() {
        let mut hist = unit_grid(Some(4));
        hist.push(&[0.0; 6], &[0.0; 6], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();
        hist.push(&[2.0], &[1.0], &[8.0]).unwrap();

        let bins = hist.histograms();
        assert_eq!(bins.dim(), (3, 2, 4));
        let weight: f64 = (0..4).map(|iz| bins[(0, 0, iz)].weight).sum();
        assert_eq!(weight, 6.0);
        assert_eq!(bins[(2, 1, 0)], Bin { value: 8.0, weight: 1.0 });
        assert_eq!(bins[(2, 1, 1)].weight, 0.0);
        assert!(bins[(1, 1, 0)].value.is_nan());
    }

    #[test]
    fn test_merge() {
        let mut a = unit_grid(None);
        let mut b = unit_grid(None);
        a.push(&[0.0, 0.0], &[0.0, 0.0], &[1.0, 2.0]).unwrap();
        b.push(&[0.0, 1.0], &[0.0, 1.0], &[3.0, 9.0]).unwrap();
        a.merge(&b).unwrap();

        assert_eq!(a.count()[[0, 0]], 3.0);
        assert_eq!(a.median()[[0, 0]], 2.0);
        assert_eq!(a.count()[[1, 1]], 1.0);
    }

    #[test]
    fn test_merge_different_grids() {
        let mut a = unit_grid(None);
        let b = Histogram2D::new(
            Axis::new(vec![0.0, 1.0]).unwrap(),
            Axis::new(vec![0.0, 1.0]).unwrap(),
            None,
        )
        .unwrap();
        assert_eq!(a.merge(&b).unwrap_err(), BinningError::GridMismatch);
    }

    #[test]
    fn test_push_arrays_and_clear() {
        let mut hist = unit_grid(Some(8));
        let xs = arr1(&[0.0, 1.0]).into_dyn();
        let ys = arr1(&[0.0, 1.0]).into_dyn();
        let zs = arr1(&[1.0, 2.0]).into_dyn();
        hist.push_arrays(xs.view(), ys.view(), zs.view()).unwrap();
        assert_eq!(hist.count().sum(), 2.0);

        hist.clear();
        assert_eq!(hist.count().sum(), 0.0);
        assert_eq!(hist.cell(0, 0).unwrap().max_bins(), 8);
    }
}
