//! One interactive session over a loaded record store.
//!
//! Every `refresh` recomputes the filtered tables from scratch. The marker map
//! is the exception: it is built from unfiltered data on first request and
//! then reused for the rest of the session, whatever the filter says.

use crate::config::{DashboardConfig, RankingScope};
use crate::models::{
    CorrelationMatrix, DailyMean, Histogram, HourlyMean, MarkerMap, Measurement,
    MeasurementField, MonthlyStationMean, PollutionOverview, RecordStore, StationRankings,
};
use crate::processors::{Aggregator, DateRange, GeoEnricher, MeasurementFilter};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::sync::Arc;
use tracing::{debug, info};

/// Every table the dashboard renders for one filter selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub filter: MeasurementFilter,
    pub filtered_rows: usize,
    pub overview: Option<PollutionOverview>,
    pub daily_means: Vec<DailyMean>,
    pub monthly_station_means: Vec<MonthlyStationMean>,
    pub hourly_means: Vec<HourlyMean>,
    pub correlation: Option<CorrelationMatrix>,
    pub pm25_distribution: Option<Histogram>,
    pub pm10_distribution: Option<Histogram>,
    pub ranking_scope: RankingScope,
    pub rankings: StationRankings,
}

impl DashboardView {
    pub fn has_data(&self) -> bool {
        self.filtered_rows > 0
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();

        if self.has_data() {
            out.push_str(&format!(
                "Stations: {}\nDate Range: {} to {}\nRows: {}\n",
                self.filter.stations.iter().cloned().collect::<Vec<_>>().join(", "),
                self.filter.range.start,
                self.filter.range.end,
                self.filtered_rows
            ));

            if let Some(overview) = &self.overview {
                out.push_str(&format!(
                    "\nAverage PM2.5: {}\nAverage PM10: {}\n(over {} days)\n",
                    format_concentration(overview.avg_pm25),
                    format_concentration(overview.avg_pm10),
                    overview.days
                ));
            }

            out.push_str("\nHourly Pattern:\n");
            for hour in &self.hourly_means {
                out.push_str(&format!(
                    "  {:02}:00  PM2.5 {:>14}  PM10 {:>14}\n",
                    hour.hour,
                    format_concentration(hour.pm25),
                    format_concentration(hour.pm10)
                ));
            }

            out.push_str("\nDistributions:\n");
            for histogram in [&self.pm25_distribution, &self.pm10_distribution]
                .into_iter()
                .flatten()
            {
                out.push_str(&format_distribution(histogram));
            }
        } else {
            out.push_str("No data for the selected stations and date range\n");
        }

        // Full-scope rankings come from the whole store, so they survive an
        // empty selection
        if !self.rankings.is_empty()
            && (self.has_data() || self.ranking_scope == RankingScope::Full)
        {
            out.push_str(&self.format_rankings());
        }

        if let Some(correlation) = &self.correlation {
            out.push_str("\nCorrelation:\n");
            out.push_str(&correlation.render());
        }

        out
    }

    fn format_rankings(&self) -> String {
        let scope = match self.ranking_scope {
            RankingScope::Full => "full dataset",
            RankingScope::Filtered => "filtered data",
        };

        let mut out = format!("\nStations by mean PM2.5 ({}):\n", scope);
        for (i, station) in self.rankings.by_pm25.iter().enumerate() {
            out.push_str(&format!(
                "  {:>2}. {:<14} {}\n",
                i + 1,
                station.station,
                format_concentration(station.pm25)
            ));
        }
        out.push_str(&format!("\nStations by mean PM10 ({}):\n", scope));
        for (i, station) in self.rankings.by_pm10.iter().enumerate() {
            out.push_str(&format!(
                "  {:>2}. {:<14} {}\n",
                i + 1,
                station.station,
                format_concentration(station.pm10)
            ));
        }

        out
    }
}

fn format_distribution(histogram: &Histogram) -> String {
    let field = histogram.field;
    match histogram.mode_bin() {
        Some(mode) => format!(
            "  {:<6} {} values, most common {:.1} to {:.1} {}\n",
            field.display_name(),
            histogram.total(),
            mode.lower,
            mode.upper,
            field.units()
        ),
        None => format!("  {:<6} no values\n", field.display_name()),
    }
}

fn format_concentration(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2} µg/m³", v),
        None => "-".to_string(),
    }
}

pub struct DashboardSession {
    store: Arc<RecordStore>,
    config: DashboardConfig,
    aggregator: Aggregator,
    map: OnceCell<MarkerMap>,
}

impl DashboardSession {
    pub fn new(store: Arc<RecordStore>, config: DashboardConfig) -> Self {
        let aggregator = Aggregator::with_histogram_bins(config.histogram_bins);

        Self {
            store,
            config,
            aggregator,
            map: OnceCell::new(),
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// All stations and the full span of the data, or `None` when no row has
    /// a timestamp
    pub fn default_controls(&self) -> Option<MeasurementFilter> {
        let (start, end) = self.store.datetime_span()?;

        Some(MeasurementFilter::new(
            self.store.stations(),
            DateRange::from_dates(start.date(), end.date()),
        ))
    }

    /// Rows matching the filter
    pub fn filtered<'a>(&'a self, filter: &MeasurementFilter) -> Vec<&'a Measurement> {
        filter.apply(&self.store)
    }

    /// Recompute every chart table for a filter selection
    pub fn refresh(&self, filter: &MeasurementFilter) -> DashboardView {
        let subset = self.filtered(filter);
        let rows = || subset.iter().copied();

        let daily_means = self.aggregator.daily_means(rows());
        let overview = self.aggregator.overview(&daily_means);

        let station_means = match self.config.ranking_scope {
            RankingScope::Full => self.aggregator.station_means(self.store.iter()),
            RankingScope::Filtered => self.aggregator.station_means(rows()),
        };

        let view = DashboardView {
            filter: filter.clone(),
            filtered_rows: subset.len(),
            overview,
            daily_means,
            monthly_station_means: self.aggregator.monthly_station_means(rows()),
            hourly_means: self.aggregator.hourly_means(rows()),
            correlation: self.aggregator.correlation_matrix(rows()),
            pm25_distribution: self.aggregator.histogram(rows(), MeasurementField::Pm25),
            pm10_distribution: self.aggregator.histogram(rows(), MeasurementField::Pm10),
            ranking_scope: self.config.ranking_scope,
            rankings: self.aggregator.station_rankings(&station_means),
        };

        debug!(
            rows = view.filtered_rows,
            days = view.daily_means.len(),
            hours = view.hourly_means.len(),
            "dashboard view recomputed"
        );

        view
    }

    /// The session's marker map, built from unfiltered data on first use
    pub fn marker_map(&self) -> &MarkerMap {
        self.map.get_or_init(|| {
            let means = self.aggregator.station_means(self.store.iter());
            let enrichment = GeoEnricher::new()
                .with_severity_threshold(self.config.severity_threshold)
                .with_reference(self.config.map_center(), self.config.suspect_distance_km)
                .enrich(&means);

            let map = MarkerMap::new(
                self.config.map_center(),
                self.config.map_zoom,
                &enrichment.summaries,
                enrichment.skipped,
            );

            info!(
                markers = map.markers.len(),
                skipped = map.skipped.len(),
                "marker map built"
            );
            map
        })
    }

    pub fn is_map_built(&self) -> bool {
        self.map.get().is_some()
    }
}
