pub mod geojson_writer;
pub mod json_writer;
pub mod parquet_writer;

pub use geojson_writer::GeoJsonWriter;
pub use json_writer::JsonWriter;
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
