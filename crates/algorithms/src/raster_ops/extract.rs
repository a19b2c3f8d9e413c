//! Raster values at point features

use fluvrem_core::raster::Raster;
use fluvrem_core::vector::{FeatureCollection, ELEVATION_FIELD};
use geo::Geometry;
use serde::{Deserialize, Serialize};

/// How a raster is read at a point location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleMethod {
    /// Value of the cell containing the point
    #[default]
    Nearest,
    /// Bilinear interpolation between the surrounding cell centres
    Bilinear,
}

impl SampleMethod {
    /// Read `raster` at (x, y); NaN outside the raster or on no-data
    pub fn sample(self, raster: &Raster<f64>, x: f64, y: f64) -> f64 {
        match self {
            SampleMethod::Nearest => raster.sample_nearest(x, y),
            SampleMethod::Bilinear => raster.sample_bilinear(x, y),
        }
        .unwrap_or(f64::NAN)
    }
}

/// Copy `points`, adding the raster value at each point as the
/// [`ELEVATION_FIELD`] attribute.
///
/// Points outside the raster, on no-data cells, or without point geometry
/// get a null value.
pub fn extract_values(
    raster: &Raster<f64>,
    points: &FeatureCollection,
    method: SampleMethod,
) -> FeatureCollection {
    points
        .iter()
        .map(|f| {
            let value = match &f.geometry {
                Some(Geometry::Point(p)) => method.sample(raster, p.x(), p.y()),
                _ => f64::NAN,
            };
            f.clone().with_property(ELEVATION_FIELD, value)
        })
        .collect()
}
