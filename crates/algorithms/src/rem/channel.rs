//! Channel extraction: select the named river and dissolve it

use fluvrem_core::vector::{Feature, FeatureCollection};
use fluvrem_core::{Error, FeatureArtifact, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::RemPipeline;
use crate::vector::dissolve_lines;

/// Exact-match selection of channel features by a name attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelQuery {
    pub field: String,
    pub value: String,
}

impl ChannelQuery {
    pub const DEFAULT_FIELD: &'static str = "GNIS_Name";

    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Query on the default name field
    pub fn by_name(value: impl Into<String>) -> Self {
        Self::new(Self::DEFAULT_FIELD, value)
    }

    /// Features whose `field` equals `value` exactly.
    ///
    /// # Errors
    /// `NotFound` when nothing matches.
    pub fn select(&self, channels: &FeatureCollection) -> Result<FeatureCollection> {
        let selected = channels.select_eq(&self.field, &self.value);
        if selected.is_empty() {
            return Err(Error::NotFound {
                field: self.field.clone(),
                value: self.value.clone(),
            });
        }
        Ok(selected)
    }
}

impl RemPipeline<'_> {
    /// Select the river's features, persist the selection, and dissolve
    /// them into one multi-part centerline feature.
    pub fn extract_channel(&self, channels: &FeatureCollection) -> Result<FeatureArtifact> {
        let names = self.names();
        let query = self.query();
        info!(field = %query.field, river = %query.value, "extracting channel");

        let selected = query.select(channels)?;
        let selection = self
            .workspace()
            .save_features(&names.selection(), selected)
            .map_err(|e| e.in_stage("channel selection", names.selection()))?;

        let centerline = dissolve_lines(&selection.features);
        let parts = centerline.0.len();
        let dissolved: FeatureCollection = std::iter::once(
            Feature::new(centerline).with_property(query.field.as_str(), query.value.as_str()),
        )
        .collect();

        let artifact = self
            .workspace()
            .save_features(&names.dissolved(), dissolved)
            .map_err(|e| e.in_stage("dissolve", names.dissolved()))?;

        info!(
            features = selection.features.len(),
            parts,
            artifact = %artifact.name,
            "channel extracted"
        );
        Ok(artifact)
    }
}
