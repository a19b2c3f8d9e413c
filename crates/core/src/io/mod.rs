//! I/O for rasters (GeoTIFF) and vector features (GeoJSON)

mod geojson;
mod geotiff;

pub use geojson::{parse_geojson, read_geojson, write_geojson};
pub use geotiff::{read_geotiff, write_geotiff};
