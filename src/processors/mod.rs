pub mod aggregator;
pub mod filter;
pub mod geo_enricher;

pub use aggregator::Aggregator;
pub use filter::{DateRange, MeasurementFilter};
pub use geo_enricher::{GeoEnricher, GeoEnrichment};
