//! GeoJSON reading/writing for feature collections
//!
//! Geometry encoding is delegated to the `geojson` crate and its
//! `geo-types` conversions. Z coordinates are ignored on read.

use crate::error::{Error, Result};
use crate::vector::{AttributeValue, Feature, FeatureCollection};
use geo_types::Geometry;
use geojson::feature::Id;
use geojson::{GeoJson, JsonObject, JsonValue};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Read a GeoJSON FeatureCollection from a file
pub fn read_geojson<P: AsRef<Path>>(path: P) -> Result<FeatureCollection> {
    let file = File::open(path.as_ref())?;
    from_geojson(GeoJson::from_reader(BufReader::new(file))?)
}

/// Parse a GeoJSON FeatureCollection from a string
pub fn parse_geojson(text: &str) -> Result<FeatureCollection> {
    from_geojson(text.parse::<GeoJson>()?)
}

/// Write a feature collection as a GeoJSON FeatureCollection
pub fn write_geojson<P: AsRef<Path>>(features: &FeatureCollection, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &to_geojson(features))?;
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    Ok(())
}

fn from_geojson(geojson: GeoJson) -> Result<FeatureCollection> {
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) => return Err(unsupported("Feature")),
        GeoJson::Geometry(_) => return Err(unsupported("Geometry")),
    };

    collection
        .features
        .into_iter()
        .map(|f| {
            let properties = f
                .properties
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k, attribute_from_json(v)))
                .collect::<BTreeMap<_, _>>();
            let id = f.id.map(|id| match id {
                Id::String(s) => s,
                Id::Number(n) => n.to_string(),
            });
            let geometry = f.geometry.map(Geometry::<f64>::try_from).transpose()?;
            Ok(Feature {
                geometry,
                properties,
                id,
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(|features| FeatureCollection { features })
}

fn unsupported(kind: &str) -> Error {
    Error::UnsupportedDataType(format!("expected a GeoJSON FeatureCollection, got a {kind}"))
}

fn to_geojson(features: &FeatureCollection) -> geojson::FeatureCollection {
    geojson::FeatureCollection {
        bbox: None,
        foreign_members: None,
        features: features
            .iter()
            .map(|f| geojson::Feature {
                bbox: None,
                geometry: f
                    .geometry
                    .as_ref()
                    .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
                id: f.id.clone().map(Id::String),
                properties: Some(
                    f.properties
                        .iter()
                        .map(|(k, v)| (k.clone(), attribute_to_json(v)))
                        .collect::<JsonObject>(),
                ),
                foreign_members: None,
            })
            .collect(),
    }
}

fn attribute_from_json(value: JsonValue) -> AttributeValue {
    match value {
        JsonValue::Null => AttributeValue::Null,
        JsonValue::Bool(b) => AttributeValue::Bool(b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Int(i),
            None => n.as_f64().map_or(AttributeValue::Null, AttributeValue::Float),
        },
        JsonValue::String(s) => AttributeValue::String(s),
        other => AttributeValue::String(other.to_string()),
    }
}

fn attribute_to_json(value: &AttributeValue) -> JsonValue {
    match value {
        AttributeValue::Null => JsonValue::Null,
        AttributeValue::Bool(b) => JsonValue::Bool(*b),
        AttributeValue::Int(i) => JsonValue::from(*i),
        AttributeValue::Float(f) => {
            serde_json::Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number)
        }
        AttributeValue::String(s) => JsonValue::String(s.clone()),
    }
}
