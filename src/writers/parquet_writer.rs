use crate::error::{ProcessingError, Result};
use crate::models::{Measurement, MeasurementField};
use crate::utils::constants::{
    COLUMN_DATETIME, COLUMN_STATION, COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE,
    COMPRESSION_SNAPPY, COMPRESSION_ZSTD, DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Writes measurement subsets to Parquet.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    /// Write measurements, one record batch per row group. Nothing is written
    /// for an empty slice.
    pub fn write_measurements(&self, records: &[&Measurement], path: &Path) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let schema = self.create_schema();
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        for chunk in records.chunks(self.row_group_size) {
            let batch = self.measurements_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }

        writer.close()?;

        info!(rows = records.len(), path = %path.display(), "wrote parquet file");
        Ok(())
    }

    /// Arrow schema: station, datetime, then the six numeric fields
    fn create_schema(&self) -> Arc<Schema> {
        let mut fields = vec![
            Field::new(COLUMN_STATION, DataType::Utf8, false),
            Field::new(
                COLUMN_DATETIME,
                DataType::Timestamp(TimeUnit::Millisecond, None),
                true,
            ),
        ];
        fields.extend(
            MeasurementField::ALL
                .iter()
                .map(|f| Field::new(f.column_name(), DataType::Float64, true)),
        );

        Arc::new(Schema::new(fields))
    }

    fn measurements_to_batch(
        &self,
        records: &[&Measurement],
        schema: Arc<Schema>,
    ) -> Result<RecordBatch> {
        let stations: Vec<&str> = records.iter().map(|r| r.station.as_str()).collect();
        let datetimes: Vec<Option<i64>> = records
            .iter()
            .map(|r| r.datetime.map(|dt| dt.and_utc().timestamp_millis()))
            .collect();

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(stations)),
            Arc::new(TimestampMillisecondArray::from(datetimes)),
        ];
        for field in MeasurementField::ALL {
            let values: Vec<Option<f64>> = records.iter().map(|r| r.value(field)).collect();
            columns.push(Arc::new(Float64Array::from(values)));
        }

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let file_metadata = metadata.file_metadata();
        let row_groups = metadata.num_row_groups();
        let total_rows = file_metadata.num_rows();
        let file_size = std::fs::metadata(path)?.len();

        let row_group_sizes = (0..row_groups)
            .map(|i| metadata.row_group(i).num_rows())
            .collect();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            row_group_sizes,
            file_size,
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub row_group_sizes: Vec<i64>,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        let avg_rows = if self.row_groups > 0 {
            self.total_rows as f64 / self.row_groups as f64
        } else {
            0.0
        };

        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}\n\
            - Avg rows per group: {:.0}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0, // Convert to MB
            self.compression,
            avg_rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    fn sample(count: u32) -> Vec<Measurement> {
        (0..count)
            .map(|i| {
                let dt = NaiveDate::from_ymd_opt(2014, 2, 1)
                    .unwrap()
                    .and_hms_opt(i % 24, 0, 0)
                    .unwrap();
                Measurement::builder("Dongsi", dt)
                    .pm25(i as f64)
                    .pm10(2.0 * i as f64)
                    .build()
            })
            .collect()
    }

    #[test]
    fn test_write_empty_records() {
        let writer = ParquetWriter::new();
        let temp_file = NamedTempFile::new().unwrap();

        let result = writer.write_measurements(&[], temp_file.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_write_and_inspect() -> Result<()> {
        let records = sample(25);
        let refs: Vec<&Measurement> = records.iter().collect();
        let temp_file = NamedTempFile::new()?;

        let writer = ParquetWriter::new().with_row_group_size(10);
        writer.write_measurements(&refs, temp_file.path())?;

        let info = writer.get_file_info(temp_file.path())?;
        assert_eq!(info.total_rows, 25);
        assert_eq!(info.row_groups, 3);
        assert!(info.summary().contains("Total rows: 25"));

        Ok(())
    }

    #[test]
    fn test_write_rows_with_missing_values() -> Result<()> {
        let records = vec![Measurement::new("Tiantan", None)];
        let refs: Vec<&Measurement> = records.iter().collect();
        let temp_file = NamedTempFile::new()?;

        let writer = ParquetWriter::new();
        writer.write_measurements(&refs, temp_file.path())?;

        assert_eq!(writer.get_file_info(temp_file.path())?.total_rows, 1);

        Ok(())
    }

    #[test]
    fn test_different_compressions() -> Result<()> {
        let records = sample(3);
        let refs: Vec<&Measurement> = records.iter().collect();

        for compression in ["snappy", "gzip", "lz4", "zstd", "none"] {
            let writer = ParquetWriter::new().with_compression(compression)?;
            let temp_file = NamedTempFile::new()?;

            let result = writer.write_measurements(&refs, temp_file.path());
            assert!(result.is_ok(), "Failed with compression: {}", compression);
        }

        assert!(ParquetWriter::new().with_compression("brotli-ish").is_err());

        Ok(())
    }
}
