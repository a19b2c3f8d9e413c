//! REM compositor: DEM minus trend

use fluvrem_core::raster::Raster;
use fluvrem_core::{Error, RasterArtifact, Result};
use tracing::info;

use super::RemPipeline;
use crate::raster_ops::subtract;

/// `dem - trend` after checking both rasters share a grid.
///
/// # Errors
/// `Alignment` if the trend differs from the DEM in shape, cell size or origin.
pub fn relative_elevation(dem: &Raster<f64>, trend: &Raster<f64>) -> Result<Raster<f64>> {
    if !trend.is_aligned_with(dem) {
        return Err(Error::Alignment {
            expected: dem.grid_description(),
            found: trend.grid_description(),
        });
    }
    subtract(dem, trend)
}

impl RemPipeline<'_> {
    /// Subtract the trend from the DEM and persist the REM
    pub fn composite(&self, dem: &Raster<f64>, trend: &RasterArtifact) -> Result<RasterArtifact> {
        let name = self.names().rem();
        info!(trend = %trend.name, "compositing REM");

        let rem = relative_elevation(dem, &trend.raster)
            .and_then(|r| self.workspace().save_raster(&name, r))
            .map_err(|e| e.in_stage("raster minus", name))?;

        let stats = rem.raster.statistics();
        info!(
            artifact = %rem.name,
            valid_cells = stats.valid_count,
            min = ?stats.min,
            max = ?stats.max,
            "REM written"
        );
        Ok(rem)
    }
}
