use serde::{Deserialize, Serialize};

use crate::models::{Severity, SkippedStation, StationSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub station: String,
    pub latitude: f64,
    pub longitude: f64,
    pub mean_pm25: f64,
    pub mean_pm10: f64,
    pub combined_score: f64,
    pub severity: Severity,
    pub color: String,
    pub popup: String,
}

impl MapMarker {
    pub fn from_summary(summary: &StationSummary) -> Self {
        Self {
            station: summary.station.clone(),
            latitude: summary.latitude,
            longitude: summary.longitude,
            mean_pm25: summary.mean_pm25,
            mean_pm10: summary.mean_pm10,
            combined_score: summary.combined_score,
            severity: summary.severity,
            color: summary.severity.marker_color().to_string(),
            popup: format!(
                "Station: {}<br>PM2.5: {:.2} µg/m³<br>PM10: {:.2} µg/m³",
                summary.station, summary.mean_pm25, summary.mean_pm10
            ),
        }
    }
}

/// Station marker map, built once per session from unfiltered data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerMap {
    pub center: (f64, f64),
    pub zoom: u8,
    pub markers: Vec<MapMarker>,
    pub skipped: Vec<SkippedStation>,
}

impl MarkerMap {
    pub fn new(
        center: (f64, f64),
        zoom: u8,
        summaries: &[StationSummary],
        skipped: Vec<SkippedStation>,
    ) -> Self {
        Self {
            center,
            zoom,
            markers: summaries.iter().map(MapMarker::from_summary).collect(),
            skipped,
        }
    }

    pub fn marker(&self, station: &str) -> Option<&MapMarker> {
        self.markers.iter().find(|m| m.station == station)
    }

    pub fn high_severity_count(&self) -> usize {
        self.markers
            .iter()
            .filter(|m| m.severity == Severity::High)
            .count()
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "Station map centred on {:.4}°N, {:.4}°E (zoom {})\n\
            Markers: {} ({} high, {} normal)",
            self.center.0,
            self.center.1,
            self.zoom,
            self.markers.len(),
            self.high_severity_count(),
            self.markers.len() - self.high_severity_count()
        );

        for marker in &self.markers {
            out.push_str(&format!(
                "\n  - {:<14} {:>8.2} [{}]",
                marker.station, marker.combined_score, marker.color
            ));
        }

        if !self.skipped.is_empty() {
            out.push_str(&format!("\nSkipped stations: {}", self.skipped.len()));
            for skipped in &self.skipped {
                out.push_str(&format!("\n  - {}: {}", skipped.station, skipped.reason));
            }
        }

        out
    }
}
