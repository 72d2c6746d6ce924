use crate::models::{MeasurementField, RecordStore};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCoverage {
    pub field: MeasurementField,
    pub present: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FieldCoverage {
    pub fn present_percentage(&self, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (self.present as f64 / total as f64) * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub total_records: usize,
    pub stations: Vec<String>,
    pub datetime_span: Option<(NaiveDateTime, NaiveDateTime)>,
    pub missing_datetimes: usize,
    pub field_coverage: Vec<FieldCoverage>,
}

pub struct DatasetAnalyzer;

impl DatasetAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, store: &RecordStore) -> DatasetOverview {
        let mut coverage: Vec<FieldCoverage> = MeasurementField::ALL
            .iter()
            .map(|&field| FieldCoverage {
                field,
                present: 0,
                min: None,
                max: None,
            })
            .collect();

        for record in store {
            for entry in coverage.iter_mut() {
                if let Some(v) = record.value(entry.field) {
                    entry.present += 1;
                    entry.min = Some(entry.min.map_or(v, |m| m.min(v)));
                    entry.max = Some(entry.max.map_or(v, |m| m.max(v)));
                }
            }
        }

        DatasetOverview {
            total_records: store.len(),
            stations: store.stations(),
            datetime_span: store.datetime_span(),
            missing_datetimes: store.missing_datetime_count(),
            field_coverage: coverage,
        }
    }
}

impl Default for DatasetAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetOverview {
    pub fn summary(&self) -> String {
        let span = match self.datetime_span {
            Some((start, end)) => format!(
                "{} to {} ({} days)",
                start,
                end,
                end.signed_duration_since(start).num_days() + 1
            ),
            None => "No valid timestamps".to_string(),
        };

        let mut out = format!(
            "Records: {} total\n\
            Stations: {} ({})\n\
            Date Range: {}\n\
            Unparseable timestamps: {}\n\
            \nField Coverage:",
            self.total_records,
            self.stations.len(),
            self.stations.join(", "),
            span,
            self.missing_datetimes
        );

        for entry in &self.field_coverage {
            let range = match (entry.min, entry.max) {
                (Some(min), Some(max)) => {
                    format!("{:.1} to {:.1} {}", min, max, entry.field.units())
                }
                _ => "No valid measurements".to_string(),
            };
            out.push_str(&format!(
                "\n- {:<6} {:>5.1}% present, {}",
                entry.field.column_name(),
                entry.present_percentage(self.total_records),
                range
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Measurement;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2013, 3, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_analyze_store() {
        let mut missing = Measurement::new("Tiantan", None);
        missing.pm25 = Some(300.0);

        let store = RecordStore::new(vec![
            Measurement::builder("Dongsi", at(1)).pm25(10.0).temp(-3.0).build(),
            Measurement::builder("Dongsi", at(4)).pm25(50.0).build(),
            missing,
        ]);

        let overview = DatasetAnalyzer::new().analyze(&store);

        assert_eq!(overview.total_records, 3);
        assert_eq!(overview.stations, vec!["Dongsi", "Tiantan"]);
        assert_eq!(overview.datetime_span, Some((at(1), at(4))));
        assert_eq!(overview.missing_datetimes, 1);

        let pm25 = &overview.field_coverage[MeasurementField::Pm25.index()];
        assert_eq!(pm25.present, 3);
        assert_eq!(pm25.min, Some(10.0));
        assert_eq!(pm25.max, Some(300.0));
        assert!((pm25.present_percentage(3) - 100.0).abs() < f64::EPSILON);

        let rain = &overview.field_coverage[MeasurementField::Rain.index()];
        assert_eq!(rain.present, 0);

        let summary = overview.summary();
        assert!(summary.contains("Stations: 2"));
        assert!(summary.contains("(4 days)"));
        assert!(summary.contains("No valid measurements"));
    }

    #[test]
    fn test_analyze_empty_store() {
        let overview = DatasetAnalyzer::new().analyze(&RecordStore::default());

        assert_eq!(overview.total_records, 0);
        assert!(overview.summary().contains("No valid timestamps"));
        assert_eq!(overview.field_coverage[0].present_percentage(0), 0.0);
    }
}
