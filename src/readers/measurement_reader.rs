use crate::error::{ProcessingError, Result};
use crate::models::{Measurement, MeasurementField};
use crate::utils::constants::{
    COLUMN_DATETIME, COLUMN_STATION, DATETIME_FORMATS, DATE_FORMAT, DEFAULT_BUFFER_SIZE,
    MISSING_VALUE_MARKERS, REQUIRED_COLUMNS,
};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Reads delimited measurement files with a header row.
pub struct MeasurementReader {
    delimiter: u8,
}

impl MeasurementReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Read every row of a file. Unparseable timestamps are kept as `None`;
    /// any other malformed content fails the whole file.
    pub fn read_measurements(&self, path: &Path) -> Result<Vec<Measurement>> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        self.read_from(reader, &path.display().to_string())
    }

    /// Read rows from any source; `source` names it in errors and logs
    pub fn read_from<R: Read>(&self, reader: R, source: &str) -> Result<Vec<Measurement>> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let layout = ColumnLayout::from_headers(&headers, source)?;

        let mut measurements = Vec::new();
        let mut missing_datetimes = 0usize;

        for result in csv_reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let measurement = layout.parse_record(&record, source, line)?;
            if !measurement.has_datetime() {
                missing_datetimes += 1;
            }
            measurements.push(measurement);
        }

        if missing_datetimes > 0 {
            warn!(
                source,
                rows = missing_datetimes,
                "rows with unparseable datetime will be excluded from date filtering"
            );
        }
        debug!(source, rows = measurements.len(), "read measurement file");

        Ok(measurements)
    }
}

impl Default for MeasurementReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Column positions resolved from the header row
struct ColumnLayout {
    station: usize,
    datetime: usize,
    fields: [usize; 6],
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord, source: &str) -> Result<Self> {
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| !headers.iter().any(|h| h == *name))
            .collect();
        if !missing.is_empty() {
            return Err(ProcessingError::MissingData(format!(
                "columns {} not found in {}",
                missing.join(", "),
                source
            )));
        }

        let position = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                ProcessingError::MissingData(format!(
                    "column '{}' not found in {}",
                    name, source
                ))
            })
        };

        let station = position(COLUMN_STATION)?;
        let datetime = position(COLUMN_DATETIME)?;
        let mut fields = [0usize; 6];
        for field in MeasurementField::ALL {
            fields[field.index()] = position(field.column_name())?;
        }

        Ok(Self {
            station,
            datetime,
            fields,
        })
    }

    fn parse_record(&self, record: &StringRecord, source: &str, line: u64) -> Result<Measurement> {
        let station = record.get(self.station).unwrap_or_default();
        if station.is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "{}:{}: empty station identifier",
                source, line
            )));
        }

        let datetime = record.get(self.datetime).and_then(parse_datetime);
        let mut measurement = Measurement::new(station, datetime);

        for field in MeasurementField::ALL {
            let cell = record.get(self.fields[field.index()]).unwrap_or_default();
            let value = parse_numeric(cell).ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "{}:{}: invalid {} value '{}'",
                    source, line, field, cell
                ))
            })?;
            measurement.set_value(field, value);
        }

        Ok(measurement)
    }
}

/// Parse a timestamp in any of the accepted layouts. A bare date means midnight.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// `Some(None)` for a missing-value marker, `None` when the cell is not a number
fn parse_numeric(cell: &str) -> Option<Option<f64>> {
    if MISSING_VALUE_MARKERS.contains(&cell) {
        return Some(None);
    }

    cell.parse::<f64>()
        .ok()
        .map(|v| if v.is_nan() { None } else { Some(v) })
}
