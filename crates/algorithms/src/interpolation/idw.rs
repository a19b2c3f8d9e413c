//! Inverse Distance Weighting (IDW) interpolation
//!
//! Estimates values at unknown locations as a weighted average of the
//! sample points within a fixed search radius, where weights are inversely
//! proportional to distance raised to a power.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

use fluvrem_core::raster::{GeoTransform, Raster};
use fluvrem_core::{Error, Result};

use super::{KdTree, SamplePoint};
use crate::maybe_rayon::fill_rows;

/// Parameters for IDW interpolation
#[derive(Debug, Clone)]
pub struct IdwParams {
    /// Power parameter (default: 2.0).
    pub power: f64,
    /// Fixed search radius. Cells with no sample within it are no-data.
    pub radius: f64,
    /// A sample closer than this to a cell centre is used directly
    /// (avoids the singularity at distance zero).
    pub snap_distance: f64,
    /// Output raster rows
    pub rows: usize,
    /// Output raster columns
    pub cols: usize,
    /// Output raster geotransform
    pub transform: GeoTransform,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            power: 2.0,
            radius: 100.0,
            snap_distance: 1e-10,
            rows: 100,
            cols: 100,
            transform: GeoTransform::default(),
        }
    }
}

impl IdwParams {
    /// Parameters producing output on the grid of `template`
    pub fn on_grid_of(template: &Raster<f64>, radius: f64) -> Self {
        Self {
            radius,
            rows: template.rows(),
            cols: template.cols(),
            transform: *template.transform(),
            ..Default::default()
        }
    }
}

/// Perform fixed-radius IDW interpolation from scattered points to a grid.
///
/// For each output cell centre (x, y):
///
/// ```text
/// z(x,y) = Σ(wi * zi) / Σ(wi)    over samples with d(x,y, xi,yi) <= radius
/// where wi = 1 / d^p
/// ```
///
/// Cells with no sample within the radius are NaN.
pub fn idw(points: &[SamplePoint], params: IdwParams) -> Result<Raster<f64>> {
    if points.is_empty() {
        return Err(Error::Algorithm("No sample points provided".into()));
    }
    if !(params.radius > 0.0 && params.radius.is_finite()) {
        return Err(Error::invalid_parameter("radius", params.radius, "must be positive and finite"));
    }
    if !(params.power > 0.0 && params.power.is_finite()) {
        return Err(Error::invalid_parameter("power", params.power, "must be positive and finite"));
    }

    let tree = KdTree::build(points);
    let IdwParams { power, radius, snap_distance, rows, cols, transform } = params;
    let snap_sq = snap_distance * snap_distance;

    let data = fill_rows(rows, cols, |row, out| {
        for (col, cell) in out.iter_mut().enumerate() {
            let (cx, cy) = transform.pixel_to_geo(col, row);

            let mut sum_w = 0.0;
            let mut sum_wz = 0.0;
            let mut snapped: Option<f64> = None;

            tree.for_each_within_radius(cx, cy, radius, |pt, dsq| {
                if snapped.is_some() {
                    return;
                }
                if dsq < snap_sq {
                    snapped = Some(pt.value);
                    return;
                }
                let w = 1.0 / dsq.sqrt().powf(power);
                sum_w += w;
                sum_wz += w * pt.value;
            });

            if let Some(v) = snapped {
                *cell = v;
            } else if sum_w > 0.0 {
                *cell = sum_wz / sum_w;
            }
        }
    });

    let mut output = Raster::from_vec(data, rows, cols)?;
    output.set_transform(transform);
    output.set_nodata(Some(f64::NAN));

    Ok(output)
}
