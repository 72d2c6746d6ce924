pub mod aggregates;
pub mod marker_map;
pub mod measurement;
pub mod record_store;
pub mod station;

pub use aggregates::{
    CorrelationMatrix, DailyMean, Histogram, HistogramBin, HourlyMean, MonthlyStationMean,
    PollutionOverview, StationMean, StationRankings,
};
pub use marker_map::{MapMarker, MarkerMap};
pub use measurement::{Measurement, MeasurementBuilder, MeasurementField};
pub use record_store::RecordStore;
pub use station::{Severity, SkipReason, SkippedStation, StationSummary};
