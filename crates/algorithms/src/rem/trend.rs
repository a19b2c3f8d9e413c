//! Trend estimators: sparse channel samples to a continuous trend surface
//! on the DEM grid

use fluvrem_core::raster::Raster;
use fluvrem_core::vector::{Feature, FeatureCollection};
use fluvrem_core::{Error, RasterArtifact, Result, Workspace};
use geo::{LineString, Polygon};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ArtifactNames, SampleSet};
use crate::interpolation::{
    idw, kernel_density, tin_from_breaklines, tin_to_raster, Breakline, IdwParams,
    KernelDensityGrid, KernelShape, SamplePoint, Tin, TinSampling,
};
use crate::raster_ops::{divide, resample_to};
use crate::vector::line_parts;

/// Turns elevation-tagged samples into a trend raster on the DEM grid
pub trait TrendEstimator {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Fewest usable samples the estimator accepts
    fn min_samples(&self) -> usize {
        1
    }

    /// Estimate the trend surface, persisting it (and any intermediates)
    /// in `ws`. The returned raster is aligned with `dem`.
    fn estimate(
        &self,
        samples: &SampleSet,
        dem: &Raster<f64>,
        ws: &Workspace,
        names: &ArtifactNames,
    ) -> Result<RasterArtifact>;
}

/// Usable samples, or `InsufficientSamples` if there are too few
fn usable_samples(estimator: &dyn TrendEstimator, samples: &SampleSet) -> Result<Vec<SamplePoint>> {
    let points = samples.sample_points();
    if points.len() < estimator.min_samples() {
        return Err(Error::InsufficientSamples {
            estimator: estimator.name(),
            required: estimator.min_samples(),
            found: points.len(),
        });
    }
    Ok(points)
}

fn save(ws: &Workspace, stage: &'static str, name: String, raster: Result<Raster<f64>>) -> Result<RasterArtifact> {
    raster
        .and_then(|r| ws.save_raster(&name, r))
        .map_err(|e| e.in_stage(stage, name))
}

// Kernel density

/// Kernel-density detrending parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelDensityParams {
    /// Spacing of sample points along the channel (map units)
    pub point_distance: f64,
    /// Kernel radius (map units)
    pub search_radius: f64,
    /// Density raster cell size; `None` uses the DEM cell size
    pub cell_size: Option<f64>,
    pub shape: KernelShape,
}

impl Default for KernelDensityParams {
    fn default() -> Self {
        Self {
            point_distance: 50.0,
            search_radius: 100.0,
            cell_size: None,
            shape: KernelShape::Square,
        }
    }
}

/// Trend as the ratio of elevation-weighted to unweighted kernel density:
/// a kernel-weighted mean of nearby sample elevations.
#[derive(Debug, Clone)]
pub struct KernelDensityTrend {
    params: KernelDensityParams,
}

impl KernelDensityTrend {
    pub fn new(params: KernelDensityParams) -> Self {
        Self { params }
    }

    /// Density grid: the DEM grid, or a grid of the requested cell size
    /// snapped to the DEM origin
    fn grid(&self, dem: &Raster<f64>) -> Result<(KernelDensityGrid, bool)> {
        let radius = self.params.search_radius;
        let shape = self.params.shape;
        match self.params.cell_size {
            None => Ok((KernelDensityGrid::on_grid_of(dem, radius, shape), true)),
            Some(c) if !(c > 0.0 && c.is_finite()) => {
                Err(Error::invalid_parameter("cell_size", c, "must be positive and finite"))
            }
            Some(c)
                if (c - dem.cell_size_x()).abs() <= 1e-9 * c
                    && (c - dem.cell_size_y()).abs() <= 1e-9 * c =>
            {
                Ok((KernelDensityGrid::on_grid_of(dem, radius, shape), true))
            }
            Some(c) => {
                let (transform, rows, cols) = dem.transform().snapped_grid(dem.bounds(), c, c);
                Ok((
                    KernelDensityGrid {
                        radius,
                        shape,
                        rows,
                        cols,
                        transform,
                    },
                    false,
                ))
            }
        }
    }
}

impl TrendEstimator for KernelDensityTrend {
    fn name(&self) -> &'static str {
        "kernel density"
    }

    fn estimate(
        &self,
        samples: &SampleSet,
        dem: &Raster<f64>,
        ws: &Workspace,
        names: &ArtifactNames,
    ) -> Result<RasterArtifact> {
        let points = usable_samples(self, samples)?;
        let (grid, on_dem_grid) = self
            .grid(dem)
            .map_err(|e| e.in_stage("kernel density", names.point_kernel()))?;
        debug!(
            rows = grid.rows,
            cols = grid.cols,
            radius = grid.radius,
            shape = ?grid.shape,
            "kernel density grid"
        );

        let density = save(ws, "kernel density", names.point_kernel(), kernel_density(&points, false, &grid))?;
        let weighted = save(ws, "kernel density", names.stream_kernel(), kernel_density(&points, true, &grid))?;

        let ratio = divide(&weighted.raster, &density.raster);
        let trend = if on_dem_grid {
            ratio
        } else {
            ratio.and_then(|r| resample_to(&r, dem))
        };
        save(ws, "divide", names.kernel_trend(), trend)
    }
}

// IDW

/// IDW detrending parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdwTrendParams {
    /// Spacing of sample points along the channel (map units)
    pub point_distance: f64,
    /// Fixed search radius (map units)
    pub search_radius: f64,
    /// Distance exponent
    pub power: f64,
}

impl Default for IdwTrendParams {
    fn default() -> Self {
        Self {
            point_distance: 50.0,
            search_radius: 100.0,
            power: 2.0,
        }
    }
}

/// Trend by inverse distance weighting within a fixed radius
#[derive(Debug, Clone)]
pub struct IdwTrend {
    params: IdwTrendParams,
}

impl IdwTrend {
    pub fn new(params: IdwTrendParams) -> Self {
        Self { params }
    }
}

impl TrendEstimator for IdwTrend {
    fn name(&self) -> &'static str {
        "IDW"
    }

    fn estimate(
        &self,
        samples: &SampleSet,
        dem: &Raster<f64>,
        ws: &Workspace,
        names: &ArtifactNames,
    ) -> Result<RasterArtifact> {
        let points = usable_samples(self, samples)?;
        let params = IdwParams {
            power: self.params.power,
            ..IdwParams::on_grid_of(dem, self.params.search_radius)
        };
        debug!(radius = params.radius, power = params.power, "IDW");
        save(ws, "IDW", names.idw_trend(), idw(&points, params))
    }
}

// Cross-section TIN

/// Cross-section detrending parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossSectionParams {
    /// Resolution of the TIN raster before resampling to the DEM grid
    pub sampling: TinSampling,
}

/// Trend from a TIN whose hard breaklines are the cross-sections, each held
/// at the elevation where it crosses the channel
#[derive(Debug, Clone)]
pub struct CrossSectionTrend {
    params: CrossSectionParams,
}

impl CrossSectionTrend {
    pub fn new(params: CrossSectionParams) -> Self {
        Self { params }
    }
}

/// Level breaklines from cross-sections with a valid elevation
fn breaklines(lines: &FeatureCollection) -> Vec<Breakline> {
    let mut skipped = 0;
    let mut out = Vec::new();
    for f in lines.iter() {
        let z = f.elevation();
        match &f.geometry {
            Some(g) if z.is_finite() => out.extend(
                line_parts(g)
                    .into_iter()
                    .map(|ls| Breakline::level(ls.coords().map(|c| (c.x, c.y)), z)),
            ),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "cross-sections without elevation left out of the TIN");
    }
    out
}

/// Triangles as polygons carrying their vertex elevations
fn tin_features(tin: &Tin) -> FeatureCollection {
    tin.triangles()
        .iter()
        .map(|t| {
            let [a, b, c] = tin.corners(t);
            let ring = LineString::from(vec![(a.x, a.y), (b.x, b.y), (c.x, c.y), (a.x, a.y)]);
            Feature::new(Polygon::new(ring, vec![]))
                .with_property("z0", a.value)
                .with_property("z1", b.value)
                .with_property("z2", c.value)
        })
        .collect()
}

impl TrendEstimator for CrossSectionTrend {
    fn name(&self) -> &'static str {
        "cross-section TIN"
    }

    fn estimate(
        &self,
        samples: &SampleSet,
        dem: &Raster<f64>,
        ws: &Workspace,
        names: &ArtifactNames,
    ) -> Result<RasterArtifact> {
        usable_samples(self, samples)?;
        let SampleSet::CrossSections { lines, .. } = samples else {
            return Err(Error::Algorithm(
                "cross-section TIN needs cross-section samples".into(),
            ));
        };

        let tin = tin_from_breaklines(&breaklines(&lines.features), &[])
            .map_err(|e| e.in_stage("create TIN", names.tin()))?;
        if !tin.is_conforming() {
            warn!(artifact = %names.tin(), "TIN does not follow every cross-section");
        }
        ws.save_features(&names.tin(), tin_features(&tin))
            .map_err(|e| e.in_stage("create TIN", names.tin()))?;

        let raster = save(
            ws,
            "TIN to raster",
            names.tin_raster(),
            tin_to_raster(&tin, self.params.sampling),
        )?;
        save(
            ws,
            "resample",
            names.tin_resampled(),
            resample_to(&raster.raster, dem),
        )
    }
}
