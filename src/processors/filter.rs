use crate::models::{Measurement, RecordStore};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Inclusive timestamp range. A range with `start > end` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Whole calendar days: `start` at midnight through the last instant of `end`
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        let end_of_day = end
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap_or_else(|| end.and_time(NaiveTime::MIN));

        Self {
            start: start.and_time(NaiveTime::MIN),
            end: end_of_day,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains(&self, datetime: NaiveDateTime) -> bool {
        self.is_valid() && self.start <= datetime && datetime <= self.end
    }
}

/// Station selection plus date range, as chosen in the dashboard controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementFilter {
    pub stations: BTreeSet<String>,
    pub range: DateRange,
}

impl MeasurementFilter {
    pub fn new<I, S>(stations: I, range: DateRange) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stations: stations.into_iter().map(Into::into).collect(),
            range,
        }
    }

    /// Station is selected and the timestamp lies in range. Rows without a
    /// timestamp never match.
    pub fn matches(&self, measurement: &Measurement) -> bool {
        self.stations.contains(&measurement.station)
            && measurement
                .datetime
                .is_some_and(|dt| self.range.contains(dt))
    }

    /// Borrow the matching rows from the store, preserving store order
    pub fn apply<'a>(&self, store: &'a RecordStore) -> Vec<&'a Measurement> {
        if self.stations.is_empty() || !self.range.is_valid() {
            debug!(
                stations = self.stations.len(),
                valid_range = self.range.is_valid(),
                "filter selects nothing"
            );
            return Vec::new();
        }

        let subset: Vec<&Measurement> = store.iter().filter(|m| self.matches(m)).collect();

        debug!(
            selected = subset.len(),
            total = store.len(),
            start = %self.range.start,
            end = %self.range.end,
            "filter applied"
        );

        subset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2015, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 6, day).unwrap()
    }

    fn sample_store() -> RecordStore {
        RecordStore::new(vec![
            Measurement::new("Dongsi", Some(at(1, 0))),
            Measurement::new("Dongsi", Some(at(2, 12))),
            Measurement::new("Dongsi", Some(at(3, 23))),
            Measurement::new("Tiantan", Some(at(2, 6))),
            Measurement::new("Wanliu", Some(at(2, 6))),
            Measurement::new("Dongsi", None),
        ])
    }

    #[test]
    fn test_from_dates_covers_whole_end_day() {
        let range = DateRange::from_dates(date(1), date(2));

        assert!(range.contains(at(1, 0)));
        assert!(range.contains(at(2, 23)));
        assert!(!range.contains(at(3, 0)));
    }

    #[test]
    fn test_inverted_range_contains_nothing() {
        let range = DateRange::new(at(3, 0), at(1, 0));
        assert!(!range.is_valid());
        assert!(!range.contains(at(2, 0)));
    }

    #[test]
    fn test_filter_by_station_and_range() {
        let store = sample_store();
        let filter = MeasurementFilter::new(
            ["Dongsi", "Tiantan"],
            DateRange::from_dates(date(2), date(3)),
        );

        let subset = filter.apply(&store);

        assert_eq!(subset.len(), 3);
        for m in &subset {
            assert!(filter.stations.contains(&m.station));
            let dt = m.datetime.unwrap();
            assert!(dt >= filter.range.start && dt <= filter.range.end);
        }
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let store = sample_store();
        let filter = MeasurementFilter::new(["Dongsi"], DateRange::new(at(1, 0), at(3, 23)));

        assert_eq!(filter.apply(&store).len(), 3);
    }

    #[test]
    fn test_empty_selection_yields_nothing() {
        let store = sample_store();
        let filter = MeasurementFilter::new(Vec::<String>::new(), DateRange::from_dates(date(1), date(30)));

        assert!(filter.apply(&store).is_empty());
    }

    #[test]
    fn test_start_after_end_yields_nothing() {
        let store = sample_store();
        let filter = MeasurementFilter::new(
            ["Dongsi", "Tiantan", "Wanliu"],
            DateRange::from_dates(date(3), date(1)),
        );

        assert!(filter.apply(&store).is_empty());
    }

    #[test]
    fn test_rows_without_datetime_are_excluded() {
        let store = sample_store();
        let filter = MeasurementFilter::new(
            ["Dongsi"],
            DateRange::new(NaiveDateTime::MIN, NaiveDateTime::MAX),
        );

        let subset = filter.apply(&store);
        assert_eq!(subset.len(), 3);
        assert!(subset.iter().all(|m| m.datetime.is_some()));
    }
}
