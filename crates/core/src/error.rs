//! Error types for fluvrem

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fluvrem operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(String),

    #[error("TIFF error: {0}")]
    Tiff(String),

    #[error("no feature with {field} = '{value}'")]
    NotFound { field: String, value: String },

    #[error("{estimator} needs at least {required} sample point(s), got {found}")]
    InsufficientSamples {
        estimator: &'static str,
        required: usize,
        found: usize,
    },

    #[error("trend surface is not aligned with the DEM: expected {expected}, got {found}")]
    Alignment { expected: String, found: String },

    #[error("{stage} failed while producing '{artifact}': {source}")]
    Engine {
        stage: &'static str,
        artifact: String,
        #[source]
        source: Box<Error>,
    },

    #[error("artifact already exists: {}", .0.display())]
    ArtifactExists(PathBuf),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Attach pipeline stage context to an error coming out of a
    /// geoprocessing call.
    ///
    /// Domain errors (`NotFound`, `InsufficientSamples`, `Alignment`) and
    /// errors that already carry stage context pass through unchanged.
    pub fn in_stage(self, stage: &'static str, artifact: impl Into<String>) -> Self {
        match self {
            Error::NotFound { .. }
            | Error::InsufficientSamples { .. }
            | Error::Alignment { .. }
            | Error::Engine { .. } => self,
            other => Error::Engine {
                stage,
                artifact: artifact.into(),
                source: Box::new(other),
            },
        }
    }

    /// Build an `InvalidParameter` error.
    pub fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<tiff::TiffError> for Error {
    fn from(e: tiff::TiffError) -> Self {
        Error::Tiff(e.to_string())
    }
}

impl From<geojson::Error> for Error {
    fn from(e: geojson::Error) -> Self {
        Error::GeoJson(e.to_string())
    }
}

/// Result type alias for fluvrem operations
pub type Result<T> = std::result::Result<T, Error>;
