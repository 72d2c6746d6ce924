use chrono::NaiveDateTime;
use std::collections::HashSet;

use crate::models::Measurement;

/// Every loaded measurement, held in memory for the whole session.
///
/// Built once from the input files and never mutated afterwards; filters and
/// aggregations only borrow from it.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    measurements: Vec<Measurement>,
}

impl RecordStore {
    pub fn new(measurements: Vec<Measurement>) -> Self {
        Self { measurements }
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.measurements.iter()
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Distinct station identifiers in first-seen order
    pub fn stations(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.measurements
            .iter()
            .filter(|m| seen.insert(m.station.as_str()))
            .map(|m| m.station.clone())
            .collect()
    }

    /// Earliest and latest timestamp among rows that have one
    pub fn datetime_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut datetimes = self.measurements.iter().filter_map(|m| m.datetime);
        let first = datetimes.next()?;

        Some(datetimes.fold((first, first), |(min, max), dt| (min.min(dt), max.max(dt))))
    }

    pub fn missing_datetime_count(&self) -> usize {
        self.measurements.iter().filter(|m| !m.has_datetime()).count()
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.measurements.iter()
    }
}
