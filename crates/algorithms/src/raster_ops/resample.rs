//! Bilinear resampling onto a template grid

use fluvrem_core::raster::Raster;
use fluvrem_core::Result;
use tracing::debug;

use crate::maybe_rayon::fill_rows;

/// Resample `source` onto exactly the grid of `template` (same shape and
/// geotransform).
///
/// Each output cell centre is interpolated bilinearly between the four
/// surrounding source cell centres. Locations outside the source, or with
/// a no-data cell among the four, are no-data.
pub fn resample_to(source: &Raster<f64>, template: &Raster<f64>) -> Result<Raster<f64>> {
    let (rows, cols) = template.shape();
    let transform = *template.transform();
    debug!(
        from = %source.grid_description(),
        to = %template.grid_description(),
        "bilinear resample"
    );

    let data = fill_rows(rows, cols, |row, out| {
        for (col, cell) in out.iter_mut().enumerate() {
            let (x, y) = transform.pixel_to_geo(col, row);
            if let Some(v) = source.sample_bilinear(x, y) {
                *cell = v;
            }
        }
    });

    let mut output = Raster::from_vec(data, rows, cols)?;
    output.set_transform(transform);
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}
