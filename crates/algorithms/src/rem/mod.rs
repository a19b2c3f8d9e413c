//! Relative elevation models
//!
//! A REM is the DEM minus a smooth trend surface approximating the river's
//! water surface. Every detrending strategy runs the same pipeline:
//!
//! 1. [`RemPipeline::extract_channel`]: select the river by name and dissolve it
//! 2. [`RemPipeline::sample_along_channel`] or
//!    [`RemPipeline::sample_cross_sections`]: elevation-tagged samples
//! 3. [`RemPipeline::estimate_trend`]: one of the [`TrendEstimator`]s
//! 4. [`RemPipeline::composite`]: `REM = DEM - trend`
//!
//! Each stage persists its output in the [`Workspace`] and returns the
//! artifact handle the next stage consumes.
//!
//! # Example
//!
//! ```ignore
//! use fluvrem_algorithms::rem::{kernel_density_rem, KernelDensityParams, RemConfig};
//! use fluvrem_core::io::{read_geojson, read_geotiff};
//! use fluvrem_core::{Workspace, WorkspaceOptions};
//!
//! let dem = read_geotiff("dem.tif")?;
//! let flowlines = read_geojson("flowlines.geojson")?;
//! let ws = Workspace::open("out", WorkspaceOptions::default())?;
//! let params = KernelDensityParams { point_distance: 50.0, search_radius: 100.0, ..Default::default() };
//! let out = kernel_density_rem(&dem, &flowlines, "Elwha River", &params, &ws, &RemConfig::default())?;
//! println!("REM written to {}", out.rem.path.display());
//! ```

mod channel;
mod compositor;
mod sampler;
mod trend;

pub use channel::ChannelQuery;
pub use compositor::relative_elevation;
pub use sampler::{SampleSet, CROSS_SECTION_ID};
pub use trend::{
    CrossSectionParams, CrossSectionTrend, IdwTrend, IdwTrendParams, KernelDensityParams,
    KernelDensityTrend, TrendEstimator,
};

use fluvrem_core::raster::Raster;
use fluvrem_core::vector::FeatureCollection;
use fluvrem_core::{RasterArtifact, Result, Workspace};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::raster_ops::SampleMethod;

/// River name with all whitespace removed, used as the artifact prefix
pub fn sanitize_name(river: &str) -> String {
    river.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Deterministic artifact names for one river
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    base: String,
}

impl ArtifactNames {
    pub fn new(river: &str) -> Self {
        Self {
            base: sanitize_name(river),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn with(&self, suffix: &str) -> String {
        format!("{}_{}", self.base, suffix)
    }

    /// Raw channel selection
    pub fn selection(&self) -> String {
        self.base.clone()
    }

    pub fn dissolved(&self) -> String {
        self.with("diss")
    }

    /// Points along the centerline
    pub fn points(&self) -> String {
        self.with("points")
    }

    /// Centerline / cross-section intersections (multipoints)
    pub fn intersections(&self) -> String {
        self.with("int")
    }

    /// Intersection centroids
    pub fn intersection_points(&self) -> String {
        self.with("intpt")
    }

    /// Elevation-tagged samples
    pub fn elevations(&self) -> String {
        self.with("elev")
    }

    /// Cross-sections annotated with their sample elevation
    pub fn cross_section_elevations(&self) -> String {
        self.with("xs_elev")
    }

    pub fn point_kernel(&self) -> String {
        self.with("PntKernel")
    }

    pub fn stream_kernel(&self) -> String {
        self.with("StreamKernel")
    }

    pub fn kernel_trend(&self) -> String {
        self.with("DetDEM")
    }

    pub fn idw_trend(&self) -> String {
        self.with("IDW_detrend")
    }

    pub fn tin(&self) -> String {
        self.with("TIN")
    }

    pub fn tin_raster(&self) -> String {
        self.with("detrended")
    }

    pub fn tin_resampled(&self) -> String {
        self.with("detrend_res")
    }

    pub fn rem(&self) -> String {
        self.with("RelElevModel")
    }
}

/// Settings shared by all detrending strategies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemConfig {
    /// Attribute holding the river name (default: `GNIS_Name`)
    pub name_field: String,
    /// How the DEM is read at sample points (default: nearest cell)
    pub sampling: SampleMethod,
}

impl Default for RemConfig {
    fn default() -> Self {
        Self {
            name_field: ChannelQuery::DEFAULT_FIELD.to_string(),
            sampling: SampleMethod::default(),
        }
    }
}

/// Result of a full REM run
#[derive(Debug, Clone)]
pub struct RemOutput {
    /// The relative elevation model (`<name>_RelElevModel`)
    pub rem: RasterArtifact,
    /// The trend surface on the DEM grid
    pub trend: RasterArtifact,
    /// Number of sample points produced by the sampler
    pub samples: usize,
}

/// Detrending strategy and its parameters
#[derive(Debug, Clone)]
pub enum Detrend<'a> {
    KernelDensity(KernelDensityParams),
    Idw(IdwTrendParams),
    CrossSection {
        cross_sections: &'a FeatureCollection,
        params: CrossSectionParams,
    },
}

/// The pipeline skeleton shared by all strategies, bound to one river and
/// one output workspace
#[derive(Debug)]
pub struct RemPipeline<'a> {
    workspace: &'a Workspace,
    query: ChannelQuery,
    names: ArtifactNames,
    sampling: SampleMethod,
}

impl<'a> RemPipeline<'a> {
    pub fn new(workspace: &'a Workspace, river: &str, config: &RemConfig) -> Self {
        Self {
            workspace,
            query: ChannelQuery::new(config.name_field.clone(), river),
            names: ArtifactNames::new(river),
            sampling: config.sampling,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        self.workspace
    }

    pub fn names(&self) -> &ArtifactNames {
        &self.names
    }

    pub fn query(&self) -> &ChannelQuery {
        &self.query
    }

    pub fn sampling(&self) -> SampleMethod {
        self.sampling
    }

    /// Run a trend estimator over the samples
    pub fn estimate_trend(
        &self,
        estimator: &dyn TrendEstimator,
        samples: &SampleSet,
        dem: &Raster<f64>,
    ) -> Result<RasterArtifact> {
        info!(estimator = estimator.name(), "estimating trend surface");
        let trend = estimator.estimate(samples, dem, self.workspace, &self.names)?;
        info!(
            artifact = %trend.name,
            valid_cells = trend.raster.statistics().valid_count,
            "trend surface ready"
        );
        Ok(trend)
    }
}

/// Run the full pipeline with the given detrending strategy
pub fn run(
    dem: &Raster<f64>,
    channels: &FeatureCollection,
    river: &str,
    detrend: Detrend<'_>,
    workspace: &Workspace,
    config: &RemConfig,
) -> Result<RemOutput> {
    let pipeline = RemPipeline::new(workspace, river, config);
    let channel = pipeline.extract_channel(channels)?;

    let (samples, estimator): (SampleSet, Box<dyn TrendEstimator>) = match detrend {
        Detrend::KernelDensity(params) => (
            pipeline.sample_along_channel(&channel, dem, params.point_distance)?,
            Box::new(KernelDensityTrend::new(params)),
        ),
        Detrend::Idw(params) => (
            pipeline.sample_along_channel(&channel, dem, params.point_distance)?,
            Box::new(IdwTrend::new(params)),
        ),
        Detrend::CrossSection {
            cross_sections,
            params,
        } => (
            pipeline.sample_cross_sections(&channel, cross_sections, dem)?,
            Box::new(CrossSectionTrend::new(params)),
        ),
    };

    let trend = pipeline.estimate_trend(estimator.as_ref(), &samples, dem)?;
    let rem = pipeline.composite(dem, &trend)?;

    Ok(RemOutput {
        rem,
        trend,
        samples: samples.len(),
    })
}

/// REM detrended by the ratio of elevation-weighted to plain kernel density
/// of points sampled along the channel
pub fn kernel_density_rem(
    dem: &Raster<f64>,
    channels: &FeatureCollection,
    river: &str,
    params: &KernelDensityParams,
    workspace: &Workspace,
    config: &RemConfig,
) -> Result<RemOutput> {
    run(
        dem,
        channels,
        river,
        Detrend::KernelDensity(params.clone()),
        workspace,
        config,
    )
}

/// REM detrended by inverse distance weighting of points sampled along the
/// channel
pub fn idw_rem(
    dem: &Raster<f64>,
    channels: &FeatureCollection,
    river: &str,
    params: &IdwTrendParams,
    workspace: &Workspace,
    config: &RemConfig,
) -> Result<RemOutput> {
    run(dem, channels, river, Detrend::Idw(params.clone()), workspace, config)
}

/// REM detrended by a TIN built on cross-sections, each held at the DEM
/// elevation where it crosses the channel
pub fn cross_section_rem(
    dem: &Raster<f64>,
    channels: &FeatureCollection,
    river: &str,
    cross_sections: &FeatureCollection,
    params: &CrossSectionParams,
    workspace: &Workspace,
    config: &RemConfig,
) -> Result<RemOutput> {
    run(
        dem,
        channels,
        river,
        Detrend::CrossSection {
            cross_sections,
            params: params.clone(),
        },
        workspace,
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name_strips_all_whitespace() {
        assert_eq!(sanitize_name("Elwha River"), "ElwhaRiver");
        assert_eq!(sanitize_name(" North\tFork  Skokomish\n"), "NorthForkSkokomish");
        assert_eq!(sanitize_name("Hoh"), "Hoh");
    }

    #[test]
    fn test_artifact_names() {
        let names = ArtifactNames::new("Elwha River");
        assert_eq!(names.selection(), "ElwhaRiver");
        assert_eq!(names.dissolved(), "ElwhaRiver_diss");
        assert_eq!(names.elevations(), "ElwhaRiver_elev");
        assert_eq!(names.point_kernel(), "ElwhaRiver_PntKernel");
        assert_eq!(names.idw_trend(), "ElwhaRiver_IDW_detrend");
        assert_eq!(names.tin_resampled(), "ElwhaRiver_detrend_res");
        assert_eq!(names.rem(), "ElwhaRiver_RelElevModel");
    }

    #[test]
    fn test_config_from_json() {
        let config: RemConfig = serde_json::from_str(r#"{"sampling": "bilinear"}"#).unwrap();
        assert_eq!(config.name_field, "GNIS_Name");
        assert_eq!(config.sampling, SampleMethod::Bilinear);
    }
}
