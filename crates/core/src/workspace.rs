//! Output workspace and the artifact handles passed between pipeline stages
//!
//! Every stage persists what it produces before the next stage consumes
//! it. Stages hand each other the returned artifact (path plus in-memory
//! data) instead of re-reading an implicit "current workspace".

use crate::error::{Error, Result};
use crate::io::{read_geojson, read_geotiff, write_geojson, write_geotiff};
use crate::raster::Raster;
use crate::vector::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const RASTER_EXT: &str = "tif";
const FEATURE_EXT: &str = "geojson";

/// Workspace behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceOptions {
    /// Replace artifacts left by a previous run (default: true).
    /// When false an existing artifact is an [`Error::ArtifactExists`].
    pub overwrite: bool,
}

impl Default for WorkspaceOptions {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

/// A persisted raster artifact
#[derive(Debug, Clone)]
pub struct RasterArtifact {
    pub name: String,
    pub path: PathBuf,
    pub raster: Raster<f64>,
}

/// A persisted feature artifact
#[derive(Debug, Clone)]
pub struct FeatureArtifact {
    pub name: String,
    pub path: PathBuf,
    pub features: FeatureCollection,
}

/// Directory into which all artifacts of a run are written
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    options: WorkspaceOptions,
}

impl Workspace {
    /// Open a workspace, creating the directory (and parents) if absent
    pub fn open(root: impl Into<PathBuf>, options: WorkspaceOptions) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            debug!(path = %root.display(), "creating workspace");
            fs::create_dir_all(&root)?;
        }
        Ok(Self { root, options })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> WorkspaceOptions {
        self.options
    }

    /// Path of the raster artifact `name`
    pub fn raster_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{RASTER_EXT}"))
    }

    /// Path of the feature artifact `name`
    pub fn feature_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{FEATURE_EXT}"))
    }

    /// Persist a raster and return its handle
    pub fn save_raster(&self, name: &str, raster: Raster<f64>) -> Result<RasterArtifact> {
        let path = self.raster_path(name);
        self.publish(&path, |tmp| write_geotiff(&raster, tmp))?;
        debug!(artifact = name, rows = raster.rows(), cols = raster.cols(), "raster saved");
        Ok(RasterArtifact {
            name: name.to_string(),
            path,
            raster,
        })
    }

    /// Persist a feature collection and return its handle
    pub fn save_features(&self, name: &str, features: FeatureCollection) -> Result<FeatureArtifact> {
        let path = self.feature_path(name);
        self.publish(&path, |tmp| write_geojson(&features, tmp))?;
        debug!(artifact = name, features = features.len(), "features saved");
        Ok(FeatureArtifact {
            name: name.to_string(),
            path,
            features,
        })
    }

    /// Load a previously saved raster artifact
    pub fn load_raster(&self, name: &str) -> Result<Raster<f64>> {
        read_geotiff(self.raster_path(name))
    }

    /// Load a previously saved feature artifact
    pub fn load_features(&self, name: &str) -> Result<FeatureCollection> {
        read_geojson(self.feature_path(name))
    }

    /// Write to a temporary sibling, then rename into place so readers
    /// never observe a partially written artifact.
    fn publish<F>(&self, path: &Path, write: F) -> Result<()>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        if path.exists() && !self.options.overwrite {
            return Err(Error::ArtifactExists(path.to_path_buf()));
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".partial");
        let tmp = PathBuf::from(tmp);

        if let Err(e) = write(&tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
