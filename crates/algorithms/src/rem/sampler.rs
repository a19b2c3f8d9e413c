//! Elevation-tagged samples along or across the channel

use fluvrem_core::raster::Raster;
use fluvrem_core::vector::{AttributeValue, Feature, FeatureCollection, ELEVATION_FIELD};
use fluvrem_core::{FeatureArtifact, Result};
use geo::{Geometry, MultiLineString};
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::RemPipeline;
use crate::interpolation::SamplePoint;
use crate::raster_ops::extract_values;
use crate::vector::{intersection_centroid, line_intersections, line_parts, points_along_lines};

/// Attribute linking intersection points back to their cross-section
/// (index of the cross-section in the input collection)
pub const CROSS_SECTION_ID: &str = "XS_ID";

/// Samples handed to a trend estimator
#[derive(Debug, Clone)]
pub enum SampleSet {
    /// Points along the centerline
    Points(FeatureArtifact),
    /// One point per intersecting cross-section, and the cross-sections
    /// annotated with that point's elevation
    CrossSections {
        points: FeatureArtifact,
        lines: FeatureArtifact,
    },
}

impl SampleSet {
    /// The elevation-tagged sample points
    pub fn points(&self) -> &FeatureArtifact {
        match self {
            SampleSet::Points(points) | SampleSet::CrossSections { points, .. } => points,
        }
    }

    /// Number of sample points, including any without a valid elevation
    pub fn len(&self) -> usize {
        self.points().features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample points with a valid elevation; the rest are dropped with a
    /// warning.
    pub fn sample_points(&self) -> Vec<SamplePoint> {
        let artifact = self.points();
        let points: Vec<SamplePoint> = artifact
            .features
            .iter()
            .filter_map(|f| match &f.geometry {
                Some(Geometry::Point(p)) => Some(SamplePoint::new(p.x(), p.y(), f.elevation())),
                _ => None,
            })
            .filter(|p| p.value.is_finite())
            .collect();

        let dropped = artifact.features.len() - points.len();
        if dropped > 0 {
            warn!(
                artifact = %artifact.name,
                dropped,
                "samples without DEM elevation ignored"
            );
        }
        points
    }
}

/// All line parts of a feature collection as one multi-line
fn centerline(channel: &FeatureArtifact) -> MultiLineString<f64> {
    MultiLineString::new(
        channel
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .flat_map(line_parts)
            .collect(),
    )
}

impl RemPipeline<'_> {
    /// Points every `point_distance` map units along the centerline, tagged
    /// with the DEM elevation.
    pub fn sample_along_channel(
        &self,
        channel: &FeatureArtifact,
        dem: &Raster<f64>,
        point_distance: f64,
    ) -> Result<SampleSet> {
        let names = self.names();
        let ws = self.workspace();
        info!(point_distance, "sampling along channel");

        let points = points_along_lines(&centerline(channel), point_distance)
            .and_then(|fc| ws.save_features(&names.points(), fc))
            .map_err(|e| e.in_stage("points along lines", names.points()))?;

        let tagged = extract_values(dem, &points.features, self.sampling());
        let elev = ws
            .save_features(&names.elevations(), tagged)
            .map_err(|e| e.in_stage("extract values", names.elevations()))?;

        info!(samples = elev.features.len(), artifact = %elev.name, "channel sampled");
        Ok(SampleSet::Points(elev))
    }

    /// One point per cross-section that crosses the centerline (the
    /// centroid of its intersections), tagged with the DEM elevation. The
    /// elevation is joined back onto the cross-sections.
    pub fn sample_cross_sections(
        &self,
        channel: &FeatureArtifact,
        cross_sections: &FeatureCollection,
        dem: &Raster<f64>,
    ) -> Result<SampleSet> {
        let names = self.names();
        let ws = self.workspace();
        info!(cross_sections = cross_sections.len(), "intersecting cross-sections");

        let center = centerline(channel);
        let mut intersections = FeatureCollection::new();
        for (id, xs) in cross_sections.iter().enumerate() {
            let Some(geom) = &xs.geometry else { continue };
            let hits = line_intersections(&MultiLineString::new(line_parts(geom)), &center);
            if hits.0.is_empty() {
                continue;
            }
            let mut feature = Feature::new(hits);
            feature.properties = xs.properties.clone();
            feature.set_property(CROSS_SECTION_ID, id as i64);
            intersections.push(feature);
        }
        let int = ws
            .save_features(&names.intersections(), intersections)
            .map_err(|e| e.in_stage("intersect", names.intersections()))?;

        let centroids: FeatureCollection = int
            .features
            .iter()
            .filter_map(|f| match &f.geometry {
                Some(Geometry::MultiPoint(mp)) => intersection_centroid(mp).map(|c| {
                    let mut point = f.clone();
                    point.geometry = Some(c.into());
                    point
                }),
                _ => None,
            })
            .collect();
        let intpt = ws
            .save_features(&names.intersection_points(), centroids)
            .map_err(|e| e.in_stage("feature to point", names.intersection_points()))?;

        let tagged = extract_values(dem, &intpt.features, self.sampling());
        let elev = ws
            .save_features(&names.elevations(), tagged)
            .map_err(|e| e.in_stage("extract values", names.elevations()))?;

        let lines = ws
            .save_features(
                &names.cross_section_elevations(),
                join_elevations(cross_sections, &elev.features),
            )
            .map_err(|e| e.in_stage("join field", names.cross_section_elevations()))?;

        info!(
            crossing = elev.features.len(),
            of = cross_sections.len(),
            artifact = %elev.name,
            "cross-sections sampled"
        );
        Ok(SampleSet::CrossSections { points: elev, lines })
    }
}

/// Copy of `cross_sections` with each line's sample elevation as
/// [`ELEVATION_FIELD`] (null where the line does not cross the channel)
fn join_elevations(cross_sections: &FeatureCollection, samples: &FeatureCollection) -> FeatureCollection {
    let by_id: BTreeMap<i64, f64> = samples
        .iter()
        .filter_map(|f| match f.get_property(CROSS_SECTION_ID) {
            Some(AttributeValue::Int(id)) => Some((*id, f.elevation())),
            _ => None,
        })
        .collect();

    cross_sections
        .iter()
        .enumerate()
        .map(|(id, xs)| {
            let z = by_id.get(&(id as i64)).copied().unwrap_or(f64::NAN);
            xs.clone()
                .with_property(CROSS_SECTION_ID, id as i64)
                .with_property(ELEVATION_FIELD, z)
        })
        .collect()
}
