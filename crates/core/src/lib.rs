//! # fluvrem core
//!
//! Core types and I/O for building relative elevation models.
//!
//! This crate provides:
//! - `Raster<T>`: georeferenced single-band grid with no-data handling
//! - `GeoTransform`: affine transform, grid alignment and snapping
//! - `Feature` / `FeatureCollection`: attributed vector geometries
//! - `Workspace`: output directory and the artifact handles stages exchange
//! - GeoTIFF and GeoJSON I/O

pub mod error;
pub mod io;
pub mod raster;
pub mod vector;
pub mod workspace;

pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use vector::{AttributeValue, Feature, FeatureCollection, ELEVATION_FIELD};
pub use workspace::{FeatureArtifact, RasterArtifact, Workspace, WorkspaceOptions};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::vector::{AttributeValue, Feature, FeatureCollection, ELEVATION_FIELD};
    pub use crate::workspace::{RasterArtifact, FeatureArtifact, Workspace, WorkspaceOptions};
}
