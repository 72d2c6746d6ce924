use crate::error::Result;
use crate::models::{MapMarker, MarkerMap};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Exports a marker map as a GeoJSON FeatureCollection of points.
pub struct GeoJsonWriter;

impl GeoJsonWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn feature_collection(&self, map: &MarkerMap) -> Value {
        let features: Vec<Value> = map.markers.iter().map(marker_feature).collect();

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }

    pub fn write(&self, map: &MarkerMap, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut out, &self.feature_collection(map))?;
        out.flush()?;

        info!(features = map.markers.len(), path = %path.display(), "wrote geojson");
        Ok(())
    }
}

impl Default for GeoJsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

// GeoJSON positions are [longitude, latitude]
fn marker_feature(marker: &MapMarker) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [marker.longitude, marker.latitude],
        },
        "properties": {
            "station": marker.station,
            "mean_pm25": marker.mean_pm25,
            "mean_pm10": marker.mean_pm10,
            "combined_score": marker.combined_score,
            "severity": marker.severity.to_string(),
            "color": marker.color,
            "popup": marker.popup,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationSummary;
    use tempfile::NamedTempFile;

    fn map() -> MarkerMap {
        let summaries = vec![
            StationSummary::new("Dongsi".to_string(), 100.0, 100.0, (39.929, 116.417), 175.0),
            StationSummary::new("Huairou".to_string(), 60.0, 70.0, (40.328, 116.628), 175.0),
        ];
        MarkerMap::new((39.9, 116.4), 10, &summaries, Vec::new())
    }

    #[test]
    fn test_feature_collection_shape() {
        let collection = GeoJsonWriter::new().feature_collection(&map());

        assert_eq!(collection["type"], "FeatureCollection");
        let features = collection["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);

        let dongsi = &features[0];
        assert_eq!(dongsi["geometry"]["coordinates"][0], 116.417);
        assert_eq!(dongsi["geometry"]["coordinates"][1], 39.929);
        assert_eq!(dongsi["properties"]["color"], "red");
        assert_eq!(dongsi["properties"]["combined_score"], 200.0);
        assert_eq!(features[1]["properties"]["color"], "green");
    }

    #[test]
    fn test_empty_map_writes_empty_collection() -> Result<()> {
        let empty = MarkerMap::new((39.9, 116.4), 10, &[], Vec::new());
        let temp_file = NamedTempFile::new()?;

        GeoJsonWriter::new().write(&empty, temp_file.path())?;

        let parsed: Value = serde_json::from_reader(File::open(temp_file.path())?)?;
        assert_eq!(parsed["features"].as_array().map(Vec::len), Some(0));

        Ok(())
    }
}
