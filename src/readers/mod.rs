pub mod concurrent_reader;
pub mod measurement_reader;

pub use concurrent_reader::ConcurrentReader;
pub use measurement_reader::{parse_datetime, MeasurementReader};
