//! Raster algebra
//!
//! Binary operations between two rasters on the same grid. No-data in
//! either input produces no-data in the output.

use fluvrem_core::raster::Raster;
use fluvrem_core::{Error, Result};

use crate::maybe_rayon::fill_rows;

/// Binary raster operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterOp {
    Subtract,
    Divide,
}

impl RasterOp {
    #[inline]
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            RasterOp::Subtract => a - b,
            // Zero divisor is no-data, not infinity
            RasterOp::Divide if b == 0.0 => f64::NAN,
            RasterOp::Divide => a / b,
        }
    }
}

/// Apply a binary operation between two rasters element-wise.
///
/// Both rasters must have the same dimensions. The output takes the grid
/// of `a` and uses NaN as no-data.
pub fn raster_math(a: &Raster<f64>, b: &Raster<f64>, op: RasterOp) -> Result<Raster<f64>> {
    if a.shape() != b.shape() {
        return Err(Error::SizeMismatch {
            er: a.rows(),
            ec: a.cols(),
            ar: b.rows(),
            ac: b.cols(),
        });
    }

    let (rows, cols) = a.shape();
    let (da, db) = (a.data(), b.data());

    let data = fill_rows(rows, cols, |row, out| {
        for (col, cell) in out.iter_mut().enumerate() {
            let va = da[(row, col)];
            let vb = db[(row, col)];
            if a.is_nodata(va) || b.is_nodata(vb) {
                continue;
            }
            *cell = op.apply(va, vb);
        }
    });

    let mut output = Raster::from_vec(data, rows, cols)?;
    output.set_transform(*a.transform());
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

/// `a - b` cell by cell
pub fn subtract(a: &Raster<f64>, b: &Raster<f64>) -> Result<Raster<f64>> {
    raster_math(a, b, RasterOp::Subtract)
}

/// `a / b` cell by cell; a zero divisor gives no-data
pub fn divide(a: &Raster<f64>, b: &Raster<f64>) -> Result<Raster<f64>> {
    raster_math(a, b, RasterOp::Divide)
}
