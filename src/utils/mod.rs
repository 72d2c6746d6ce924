pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use coordinates::{lookup_coordinates, StationCoordinate, STATION_COORDINATES};
pub use filename::{generate_default_geojson_filename, generate_default_parquet_filename};
pub use progress::ProgressReporter;
