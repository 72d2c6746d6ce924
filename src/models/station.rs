use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::constants::{MARKER_COLOR_HIGH, MARKER_COLOR_NORMAL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,
    High,
}

impl Severity {
    /// `High` strictly above the threshold
    pub fn classify(combined_score: f64, threshold: f64) -> Self {
        if combined_score > threshold {
            Severity::High
        } else {
            Severity::Normal
        }
    }

    pub fn marker_color(&self) -> &'static str {
        match self {
            Severity::High => MARKER_COLOR_HIGH,
            Severity::Normal => MARKER_COLOR_NORMAL,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Normal => write!(f, "normal"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Per-station aggregate joined with its map location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationSummary {
    #[validate(length(min = 1))]
    pub station: String,

    pub mean_pm25: f64,
    pub mean_pm10: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,

    pub combined_score: f64,
    pub severity: Severity,

    /// Location is implausibly far from the map center
    pub coordinates_suspect: bool,
}

impl StationSummary {
    pub fn new(
        station: String,
        mean_pm25: f64,
        mean_pm10: f64,
        (latitude, longitude): (f64, f64),
        threshold: f64,
    ) -> Self {
        let combined_score = mean_pm25 + mean_pm10;

        Self {
            station,
            mean_pm25,
            mean_pm10,
            latitude,
            longitude,
            combined_score,
            severity: Severity::classify(combined_score, threshold),
            coordinates_suspect: false,
        }
    }

    pub fn with_coordinates_suspect(mut self, suspect: bool) -> Self {
        self.coordinates_suspect = suspect;
        self
    }

    pub fn is_high(&self) -> bool {
        self.severity == Severity::High
    }
}

/// Why a station got no map marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingCoordinates,
    InvalidCoordinates,
    MissingMeans,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingCoordinates => write!(f, "no entry in the coordinate table"),
            SkipReason::InvalidCoordinates => write!(f, "coordinates outside the valid range"),
            SkipReason::MissingMeans => write!(f, "no PM2.5/PM10 observations"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedStation {
    pub station: String,
    pub reason: SkipReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_threshold_is_strict() {
        assert_eq!(Severity::classify(175.0, 175.0), Severity::Normal);
        assert_eq!(Severity::classify(175.01, 175.0), Severity::High);
        assert_eq!(Severity::classify(20.0, 175.0), Severity::Normal);
    }

    #[test]
    fn test_marker_colors() {
        assert_eq!(Severity::High.marker_color(), "red");
        assert_eq!(Severity::Normal.marker_color(), "green");
    }

    #[test]
    fn test_summary_combined_score() {
        let summary = StationSummary::new(
            "Dongsi".to_string(),
            85.25,
            110.5,
            (39.933688, 116.434355),
            175.0,
        );

        assert_eq!(summary.combined_score, 85.25 + 110.5);
        assert!(summary.is_high());
        assert!(summary.validate().is_ok());
    }

    #[test]
    fn test_summary_invalid_coordinates() {
        let summary = StationSummary::new("Nowhere".to_string(), 1.0, 1.0, (95.0, 0.0), 175.0);
        assert!(summary.validate().is_err());
    }
}
