use crate::error::{ProcessingError, Result};

/// Fixed location of a monitoring station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationCoordinate {
    pub station: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// Station coordinate table for the twelve monitoring sites.
///
/// Values are sample data. Several entries (Aotizhongxin, Changping, Guanyuan,
/// Wanliu) point at other cities entirely; `is_suspect` flags them against the
/// map center rather than correcting them here.
pub static STATION_COORDINATES: &[StationCoordinate] = &[
    StationCoordinate { station: "Aotizhongxin", latitude: 41.731242, longitude: 123.456778 },
    StationCoordinate { station: "Changping", latitude: 22.983278, longitude: 114.005929 },
    StationCoordinate { station: "Dingling", latitude: 40.289682, longitude: 116.239599 },
    StationCoordinate { station: "Dongsi", latitude: 39.933688, longitude: 116.434355 },
    StationCoordinate { station: "Gucheng", latitude: 39.90745, longitude: 116.190337 },
    StationCoordinate { station: "Guanyuan", latitude: 32.4526, longitude: 105.8179 },
    StationCoordinate { station: "Huairou", latitude: 40.27716, longitude: 116.698821 },
    StationCoordinate { station: "Nongzhanguan", latitude: 39.933747, longitude: 116.461806 },
    StationCoordinate { station: "Shunyi", latitude: 40.129994, longitude: 116.657023 },
    StationCoordinate { station: "Tiantan", latitude: 39.8825, longitude: 116.4208 },
    StationCoordinate { station: "Wanshouxigong", latitude: 39.8801, longitude: 116.3732 },
    StationCoordinate { station: "Wanliu", latitude: 31.274028, longitude: 121.582914 },
];

/// Look up the `(latitude, longitude)` of a station. Unknown stations yield `None`.
pub fn lookup_coordinates(station: &str) -> Option<(f64, f64)> {
    STATION_COORDINATES
        .iter()
        .find(|c| c.station == station)
        .map(|c| (c.latitude, c.longitude))
}

/// Reject coordinates outside the WGS84 range
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ProcessingError::InvalidCoordinate(format!(
            "Latitude {} is outside [-90, 90]",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ProcessingError::InvalidCoordinate(format!(
            "Longitude {} is outside [-180, 180]",
            longitude
        )));
    }

    Ok(())
}

/// True when a location lies farther than `max_distance_km` from the reference point
pub fn is_suspect(
    latitude: f64,
    longitude: f64,
    reference: (f64, f64),
    max_distance_km: f64,
) -> bool {
    haversine_distance(latitude, longitude, reference.0, reference.1) > max_distance_km
}

/// Calculate the distance between two points using the Haversine formula
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::{
        DEFAULT_MAP_CENTER_LAT, DEFAULT_MAP_CENTER_LON, DEFAULT_SUSPECT_DISTANCE_KM,
    };
    use std::collections::HashSet;

    const CENTER: (f64, f64) = (DEFAULT_MAP_CENTER_LAT, DEFAULT_MAP_CENTER_LON);

    #[test]
    fn test_table_has_twelve_distinct_stations() {
        let names: HashSet<&str> = STATION_COORDINATES.iter().map(|c| c.station).collect();
        assert_eq!(names.len(), 12);
        assert_eq!(STATION_COORDINATES.len(), 12);
    }

    #[test]
    fn test_table_coordinates_are_valid() {
        for entry in STATION_COORDINATES {
            assert!(
                validate_coordinates(entry.latitude, entry.longitude).is_ok(),
                "{} has out-of-range coordinates",
                entry.station
            );
        }
    }

    #[test]
    fn test_lookup_coordinates() {
        assert_eq!(lookup_coordinates("Tiantan"), Some((39.8825, 116.4208)));
        assert_eq!(lookup_coordinates("Atlantis"), None);
        // Identifiers are case sensitive
        assert_eq!(lookup_coordinates("tiantan"), None);
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(39.9, 116.4).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, -181.0).is_err());
    }

    #[test]
    fn test_suspect_entries() {
        let suspect: Vec<&str> = STATION_COORDINATES
            .iter()
            .filter(|c| is_suspect(c.latitude, c.longitude, CENTER, DEFAULT_SUSPECT_DISTANCE_KM))
            .map(|c| c.station)
            .collect();

        assert_eq!(suspect, vec!["Aotizhongxin", "Changping", "Guanyuan", "Wanliu"]);
    }

    #[test]
    fn test_haversine_distance() {
        // Tiantan to Dongsi, a few kilometres apart in central Beijing
        let distance = haversine_distance(39.8825, 116.4208, 39.933688, 116.434355);
        assert!((distance - 5.8).abs() < 1.0);

        assert_eq!(haversine_distance(39.9, 116.4, 39.9, 116.4), 0.0);
    }
}
