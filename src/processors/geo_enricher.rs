use crate::models::{SkipReason, SkippedStation, StationMean, StationSummary};
use crate::utils::constants::{
    DEFAULT_MAP_CENTER_LAT, DEFAULT_MAP_CENTER_LON, DEFAULT_SEVERITY_THRESHOLD,
    DEFAULT_SUSPECT_DISTANCE_KM,
};
use crate::utils::coordinates::{is_suspect, lookup_coordinates, validate_coordinates};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Located station summaries plus every station that could not be placed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoEnrichment {
    pub summaries: Vec<StationSummary>,
    pub skipped: Vec<SkippedStation>,
}

impl GeoEnrichment {
    pub fn summary(&self, station: &str) -> Option<&StationSummary> {
        self.summaries.iter().find(|s| s.station == station)
    }
}

/// Joins per-station means with the coordinate table and scores severity.
pub struct GeoEnricher {
    severity_threshold: f64,
    reference: (f64, f64),
    suspect_distance_km: f64,
    lookup: fn(&str) -> Option<(f64, f64)>,
}

impl GeoEnricher {
    pub fn new() -> Self {
        Self {
            severity_threshold: DEFAULT_SEVERITY_THRESHOLD,
            reference: (DEFAULT_MAP_CENTER_LAT, DEFAULT_MAP_CENTER_LON),
            suspect_distance_km: DEFAULT_SUSPECT_DISTANCE_KM,
            lookup: lookup_coordinates,
        }
    }

    pub fn with_severity_threshold(mut self, threshold: f64) -> Self {
        self.severity_threshold = threshold;
        self
    }

    pub fn with_reference(mut self, reference: (f64, f64), suspect_distance_km: f64) -> Self {
        self.reference = reference;
        self.suspect_distance_km = suspect_distance_km;
        self
    }

    /// Replace the coordinate lookup (the built-in table by default)
    pub fn with_lookup(mut self, lookup: fn(&str) -> Option<(f64, f64)>) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn enrich(&self, means: &[StationMean]) -> GeoEnrichment {
        let mut enrichment = GeoEnrichment::default();

        for mean in means {
            let (Some(pm25), Some(pm10)) = (mean.pm25, mean.pm10) else {
                warn!(station = %mean.station, "station has no pollutant means, no map marker");
                enrichment.skipped.push(SkippedStation {
                    station: mean.station.clone(),
                    reason: SkipReason::MissingMeans,
                });
                continue;
            };

            let Some(location) = (self.lookup)(&mean.station) else {
                warn!(station = %mean.station, "station missing from coordinate table, no map marker");
                enrichment.skipped.push(SkippedStation {
                    station: mean.station.clone(),
                    reason: SkipReason::MissingCoordinates,
                });
                continue;
            };

            if let Err(e) = validate_coordinates(location.0, location.1) {
                warn!(station = %mean.station, error = %e, "station coordinates rejected, no map marker");
                enrichment.skipped.push(SkippedStation {
                    station: mean.station.clone(),
                    reason: SkipReason::InvalidCoordinates,
                });
                continue;
            }

            let suspect = is_suspect(
                location.0,
                location.1,
                self.reference,
                self.suspect_distance_km,
            );
            if suspect {
                warn!(
                    station = %mean.station,
                    latitude = location.0,
                    longitude = location.1,
                    "station coordinates are far from the map center"
                );
            }

            enrichment.summaries.push(
                StationSummary::new(
                    mean.station.clone(),
                    pm25,
                    pm10,
                    location,
                    self.severity_threshold,
                )
                .with_coordinates_suspect(suspect),
            );
        }

        enrichment
    }
}

impl Default for GeoEnricher {
    fn default() -> Self {
        Self::new()
    }
}
