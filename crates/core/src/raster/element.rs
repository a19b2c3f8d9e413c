//! Cell value trait for elevation rasters

use num_traits::{Float, NumCast};
use std::fmt::Debug;

/// Trait for floating-point types that can be stored in a raster cell.
///
/// Elevation, density and trend rasters are all continuous surfaces, so
/// only `f32` and `f64` implement it. No-data is always representable as
/// NaN; an explicit sentinel (e.g. `-9999`) is honoured as well.
pub trait RasterElement: Float + Debug + Send + Sync + 'static {
    /// Canonical no-data value (NaN)
    fn default_nodata() -> Self {
        Self::nan()
    }

    /// Check if this value represents no-data under the given sentinel
    fn is_nodata(&self, nodata: Option<Self>) -> bool {
        if self.is_nan() {
            return true;
        }
        match nodata {
            Some(nd) if !nd.is_nan() => (*self - nd).abs() <= Self::epsilon() * (Self::one() + nd.abs()),
            _ => false,
        }
    }

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

impl RasterElement for f32 {}
impl RasterElement for f64 {}
