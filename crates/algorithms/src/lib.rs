//! # fluvrem algorithms
//!
//! Geoprocessing operations and the relative elevation model pipeline.
//!
//! ## Modules
//!
//! - **interpolation**: IDW, kernel density, conforming Delaunay TIN
//! - **raster_ops**: raster algebra, bilinear resampling, value extraction
//! - **vector**: line dissolve, points along lines, line intersections
//! - **rem**: channel extraction, sampling, trend estimation, REM compositing

pub mod interpolation;
mod maybe_rayon;
pub mod raster_ops;
pub mod rem;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::interpolation::{
        idw, kernel_density, tin_from_breaklines, tin_to_raster, Breakline, IdwParams,
        KernelDensityGrid, KernelShape, SamplePoint, Tin, TinSampling,
    };
    pub use crate::raster_ops::{divide, extract_values, resample_to, subtract, SampleMethod};
    pub use crate::rem::{
        cross_section_rem, idw_rem, kernel_density_rem, run, ChannelQuery, CrossSectionParams,
        CrossSectionTrend, Detrend, IdwTrend, IdwTrendParams, KernelDensityParams,
        KernelDensityTrend, RemConfig, RemOutput, RemPipeline, SampleSet, TrendEstimator,
    };
    pub use crate::vector::{dissolve_lines, line_intersections, points_along_lines};
    pub use fluvrem_core::prelude::*;
}
