use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    COLUMN_DEWP, COLUMN_PM10, COLUMN_PM25, COLUMN_RAIN, COLUMN_TEMP, COLUMN_WSPM,
};

/// One hourly observation from a monitoring station.
///
/// Numeric fields are `None` where the source cell was empty or marked missing.
/// `datetime` is `None` when the source timestamp could not be parsed; such rows
/// stay in the store but never pass a date-range filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub station: String,
    pub datetime: Option<NaiveDateTime>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub temp: Option<f64>,
    pub dewp: Option<f64>,
    pub wspm: Option<f64>,
    pub rain: Option<f64>,
}

impl Measurement {
    pub fn new(station: impl Into<String>, datetime: Option<NaiveDateTime>) -> Self {
        Self {
            station: station.into(),
            datetime,
            pm25: None,
            pm10: None,
            temp: None,
            dewp: None,
            wspm: None,
            rain: None,
        }
    }

    pub fn builder(station: impl Into<String>, datetime: NaiveDateTime) -> MeasurementBuilder {
        MeasurementBuilder {
            record: Self::new(station, Some(datetime)),
        }
    }

    pub fn value(&self, field: MeasurementField) -> Option<f64> {
        let value = match field {
            MeasurementField::Pm25 => self.pm25,
            MeasurementField::Pm10 => self.pm10,
            MeasurementField::Temp => self.temp,
            MeasurementField::Dewp => self.dewp,
            MeasurementField::Wspm => self.wspm,
            MeasurementField::Rain => self.rain,
        };
        // NaN never counts as an observation
        value.filter(|v| !v.is_nan())
    }

    pub fn set_value(&mut self, field: MeasurementField, value: Option<f64>) {
        let slot = match field {
            MeasurementField::Pm25 => &mut self.pm25,
            MeasurementField::Pm10 => &mut self.pm10,
            MeasurementField::Temp => &mut self.temp,
            MeasurementField::Dewp => &mut self.dewp,
            MeasurementField::Wspm => &mut self.wspm,
            MeasurementField::Rain => &mut self.rain,
        };
        *slot = value;
    }

    pub fn has_datetime(&self) -> bool {
        self.datetime.is_some()
    }
}

pub struct MeasurementBuilder {
    record: Measurement,
}

impl MeasurementBuilder {
    pub fn pm25(mut self, value: f64) -> Self {
        self.record.pm25 = Some(value);
        self
    }

    pub fn pm10(mut self, value: f64) -> Self {
        self.record.pm10 = Some(value);
        self
    }

    pub fn temp(mut self, value: f64) -> Self {
        self.record.temp = Some(value);
        self
    }

    pub fn dewp(mut self, value: f64) -> Self {
        self.record.dewp = Some(value);
        self
    }

    pub fn wspm(mut self, value: f64) -> Self {
        self.record.wspm = Some(value);
        self
    }

    pub fn rain(mut self, value: f64) -> Self {
        self.record.rain = Some(value);
        self
    }

    pub fn build(self) -> Measurement {
        self.record
    }
}

/// The six numeric fields of a measurement, in correlation-matrix order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MeasurementField {
    Pm25,
    Pm10,
    Temp,
    Dewp,
    Wspm,
    Rain,
}

impl MeasurementField {
    pub const ALL: [MeasurementField; 6] = [
        MeasurementField::Pm25,
        MeasurementField::Pm10,
        MeasurementField::Temp,
        MeasurementField::Dewp,
        MeasurementField::Wspm,
        MeasurementField::Rain,
    ];

    pub fn column_name(&self) -> &'static str {
        match self {
            MeasurementField::Pm25 => COLUMN_PM25,
            MeasurementField::Pm10 => COLUMN_PM10,
            MeasurementField::Temp => COLUMN_TEMP,
            MeasurementField::Dewp => COLUMN_DEWP,
            MeasurementField::Wspm => COLUMN_WSPM,
            MeasurementField::Rain => COLUMN_RAIN,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MeasurementField::Pm25 => "PM2.5",
            MeasurementField::Pm10 => "PM10",
            MeasurementField::Temp => "Temperature",
            MeasurementField::Dewp => "Dew Point",
            MeasurementField::Wspm => "Wind Speed",
            MeasurementField::Rain => "Rainfall",
        }
    }

    pub fn units(&self) -> &'static str {
        match self {
            MeasurementField::Pm25 | MeasurementField::Pm10 => "µg/m³",
            MeasurementField::Temp | MeasurementField::Dewp => "°C",
            MeasurementField::Wspm => "m/s",
            MeasurementField::Rain => "mm",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            MeasurementField::Pm25 => 0,
            MeasurementField::Pm10 => 1,
            MeasurementField::Temp => 2,
            MeasurementField::Dewp => 3,
            MeasurementField::Wspm => 4,
            MeasurementField::Rain => 5,
        }
    }
}

impl std::fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2013, 3, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_builder_sets_fields() {
        let m = Measurement::builder("Dongsi", timestamp())
            .pm25(12.0)
            .pm10(30.5)
            .temp(-1.2)
            .rain(0.0)
            .build();

        assert_eq!(m.station, "Dongsi");
        assert_eq!(m.value(MeasurementField::Pm25), Some(12.0));
        assert_eq!(m.value(MeasurementField::Pm10), Some(30.5));
        assert_eq!(m.value(MeasurementField::Temp), Some(-1.2));
        assert_eq!(m.value(MeasurementField::Dewp), None);
        assert_eq!(m.value(MeasurementField::Rain), Some(0.0));
        assert!(m.has_datetime());
    }

    #[test]
    fn test_nan_reads_as_absent() {
        let mut m = Measurement::new("Dongsi", None);
        m.set_value(MeasurementField::Wspm, Some(f64::NAN));
        assert_eq!(m.value(MeasurementField::Wspm), None);
        assert!(!m.has_datetime());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(MeasurementField::Pm25.to_string(), "PM2.5");
        assert_eq!(MeasurementField::Wspm.column_name(), "WSPM");
        assert_eq!(MeasurementField::Wspm.display_name(), "Wind Speed");
        assert_eq!(MeasurementField::Dewp.units(), "°C");
    }

    #[test]
    fn test_field_index_matches_order() {
        for (i, field) in MeasurementField::ALL.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }
}
