//! Runtime settings.
//!
//! Layered as built-in defaults, then an optional settings file, then
//! `AQ_DASHBOARD_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::Result;
use crate::utils::constants::{
    CONFIG_ENV_PREFIX, DEFAULT_HISTOGRAM_BINS, DEFAULT_MAP_CENTER_LAT, DEFAULT_MAP_CENTER_LON,
    DEFAULT_MAP_ZOOM, DEFAULT_SEVERITY_THRESHOLD, DEFAULT_SUSPECT_DISTANCE_KM,
};

/// Which rows the per-station rankings are computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingScope {
    /// The whole record store, ignoring the active filter
    Full,
    /// The filtered working subset
    Filtered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DashboardConfig {
    /// Combined PM2.5 + PM10 score above which a station is flagged high
    #[validate(range(min = 0.0))]
    pub severity_threshold: f64,

    #[validate(range(min = 1, max = 1000))]
    pub histogram_bins: usize,

    pub ranking_scope: RankingScope,

    #[validate(range(min = -90.0, max = 90.0))]
    pub map_center_lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub map_center_lon: f64,

    #[validate(range(min = 1, max = 18))]
    pub map_zoom: u8,

    #[validate(range(min = 0.0))]
    pub suspect_distance_km: f64,
}

impl DashboardConfig {
    /// Load settings, applying an optional file and environment overrides on top
    /// of the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder()
            .set_default("severity_threshold", DEFAULT_SEVERITY_THRESHOLD)?
            .set_default("histogram_bins", DEFAULT_HISTOGRAM_BINS as i64)?
            .set_default("ranking_scope", "full")?
            .set_default("map_center_lat", DEFAULT_MAP_CENTER_LAT)?
            .set_default("map_center_lon", DEFAULT_MAP_CENTER_LON)?
            .set_default("map_zoom", DEFAULT_MAP_ZOOM as i64)?
            .set_default("suspect_distance_km", DEFAULT_SUSPECT_DISTANCE_KM)?;

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }

        let settings = builder
            .add_source(::config::Environment::with_prefix(CONFIG_ENV_PREFIX).try_parsing(true))
            .build()?;

        let loaded: DashboardConfig = settings.try_deserialize()?;
        loaded.validate()?;

        tracing::debug!(?loaded, "configuration loaded");
        Ok(loaded)
    }

    pub fn with_severity_threshold(mut self, threshold: f64) -> Self {
        self.severity_threshold = threshold;
        self
    }

    pub fn with_ranking_scope(mut self, scope: RankingScope) -> Self {
        self.ranking_scope = scope;
        self
    }

    pub fn with_histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = bins;
        self
    }

    pub fn map_center(&self) -> (f64, f64) {
        (self.map_center_lat, self.map_center_lon)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            severity_threshold: DEFAULT_SEVERITY_THRESHOLD,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            ranking_scope: RankingScope::Full,
            map_center_lat: DEFAULT_MAP_CENTER_LAT,
            map_center_lon: DEFAULT_MAP_CENTER_LON,
            map_zoom: DEFAULT_MAP_ZOOM,
            suspect_distance_km: DEFAULT_SUSPECT_DISTANCE_KM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::Builder;

    // Loading reads the process environment; tests that load must not overlap
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_is_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.severity_threshold, 175.0);
        assert_eq!(config.histogram_bins, 50);
        assert_eq!(config.ranking_scope, RankingScope::Full);
        assert_eq!(config.map_center(), (39.9, 116.4));
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "severity_threshold = 150.0")?;
        writeln!(file, "ranking_scope = \"filtered\"")?;
        writeln!(file, "histogram_bins = 20")?;

        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = DashboardConfig::load(Some(file.path()))?;

        assert_eq!(config.severity_threshold, 150.0);
        assert_eq!(config.ranking_scope, RankingScope::Filtered);
        assert_eq!(config.histogram_bins, 20);
        assert_eq!(config.map_zoom, 10);

        Ok(())
    }

    #[test]
    fn test_load_rejects_invalid_values() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "histogram_bins = 0")?;

        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        assert!(DashboardConfig::load(Some(file.path())).is_err());

        Ok(())
    }

    #[test]
    fn test_environment_overrides_file() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "severity_threshold = 200.0")?;
        writeln!(file, "ranking_scope = \"full\"")?;
        writeln!(file, "map_zoom = 12")?;

        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("AQ_DASHBOARD_SEVERITY_THRESHOLD", "150");
        std::env::set_var("AQ_DASHBOARD_RANKING_SCOPE", "filtered");

        let loaded = DashboardConfig::load(Some(file.path()));

        std::env::remove_var("AQ_DASHBOARD_SEVERITY_THRESHOLD");
        std::env::remove_var("AQ_DASHBOARD_RANKING_SCOPE");

        let config = loaded?;
        assert_eq!(config.severity_threshold, 150.0);
        assert_eq!(config.ranking_scope, RankingScope::Filtered);
        // Untouched keys keep the file value
        assert_eq!(config.map_zoom, 12);

        Ok(())
    }

    #[test]
    fn test_builder_overrides() {
        let config = DashboardConfig::default()
            .with_severity_threshold(100.0)
            .with_ranking_scope(RankingScope::Filtered)
            .with_histogram_bins(10);

        assert_eq!(config.severity_threshold, 100.0);
        assert_eq!(config.ranking_scope, RankingScope::Filtered);
        assert_eq!(config.histogram_bins, 10);
    }
}
