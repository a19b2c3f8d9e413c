//! Row-parallel execution shim.
//!
//! With the `parallel` feature, raster rows are computed on rayon's thread
//! pool. Without it (the default) the same iterator chain runs sequentially,
//! so the pipeline stays single-threaded and each cell is still computed
//! by the same closure in either mode.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential stand-in for `rayon::prelude::IntoParallelIterator`.
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;

/// Fill a `rows x cols` buffer row by row. Every cell starts as NaN
/// (no-data); `fill_row` writes the cells it can compute.
pub(crate) fn fill_rows<F>(rows: usize, cols: usize, fill_row: F) -> Vec<f64>
where
    F: Fn(usize, &mut [f64]) + Sync + Send,
{
    (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            fill_row(row, &mut row_data);
            row_data
        })
        .collect()
}
