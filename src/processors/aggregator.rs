use crate::models::{
    CorrelationMatrix, DailyMean, Histogram, HistogramBin, HourlyMean, Measurement,
    MeasurementField, MonthlyStationMean, PollutionOverview, StationMean, StationRankings,
};
use crate::utils::constants::DEFAULT_HISTOGRAM_BINS;
use chrono::{Datelike, NaiveDate, Timelike};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Running arithmetic mean that ignores absent values
#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// PM2.5 and PM10 means for one group, plus the number of rows in it
#[derive(Debug, Clone, Copy, Default)]
struct PollutantAccumulator {
    pm25: MeanAccumulator,
    pm10: MeanAccumulator,
    rows: usize,
}

impl PollutantAccumulator {
    fn push(&mut self, measurement: &Measurement) {
        self.pm25.push(measurement.value(MeasurementField::Pm25));
        self.pm10.push(measurement.value(MeasurementField::Pm10));
        self.rows += 1;
    }
}

/// Derives the summary tables every chart consumes.
///
/// Each method is a pure function of the rows handed to it. Groups only exist
/// when at least one row falls in them, so an empty input gives empty output.
pub struct Aggregator {
    histogram_bins: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }

    pub fn with_histogram_bins(histogram_bins: usize) -> Self {
        Self {
            histogram_bins: histogram_bins.max(1),
        }
    }

    /// Mean PM2.5/PM10 per calendar day, oldest first
    pub fn daily_means<'a, I>(&self, rows: I) -> Vec<DailyMean>
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        let mut groups: BTreeMap<NaiveDate, PollutantAccumulator> = BTreeMap::new();
        for m in rows {
            if let Some(dt) = m.datetime {
                groups.entry(dt.date()).or_default().push(m);
            }
        }

        groups
            .into_iter()
            .map(|(date, acc)| DailyMean {
                date,
                pm25: acc.pm25.mean(),
                pm10: acc.pm10.mean(),
                count: acc.rows,
            })
            .collect()
    }

    /// Mean PM2.5/PM10 per (month, station), ordered by month then station
    pub fn monthly_station_means<'a, I>(&self, rows: I) -> Vec<MonthlyStationMean>
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        let mut groups: BTreeMap<(u32, &'a str), PollutantAccumulator> = BTreeMap::new();
        for m in rows {
            if let Some(dt) = m.datetime {
                groups
                    .entry((dt.month(), m.station.as_str()))
                    .or_default()
                    .push(m);
            }
        }

        groups
            .into_iter()
            .map(|((month, station), acc)| MonthlyStationMean {
                month,
                station: station.to_string(),
                pm25: acc.pm25.mean(),
                pm10: acc.pm10.mean(),
                count: acc.rows,
            })
            .collect()
    }

    /// Mean PM2.5/PM10 per hour of day across all stations and days
    pub fn hourly_means<'a, I>(&self, rows: I) -> Vec<HourlyMean>
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        let mut groups = [PollutantAccumulator::default(); 24];
        for m in rows {
            if let Some(dt) = m.datetime {
                groups[dt.hour() as usize].push(m);
            }
        }

        groups
            .iter()
            .zip(0u32..)
            .filter(|(acc, _)| acc.rows > 0)
            .map(|(acc, hour)| HourlyMean {
                hour,
                pm25: acc.pm25.mean(),
                pm10: acc.pm10.mean(),
                count: acc.rows,
            })
            .collect()
    }

    /// Overall mean PM2.5/PM10 per station, ordered by station identifier
    pub fn station_means<'a, I>(&self, rows: I) -> Vec<StationMean>
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        let mut groups: BTreeMap<&'a str, PollutantAccumulator> = BTreeMap::new();
        for m in rows {
            groups.entry(m.station.as_str()).or_default().push(m);
        }

        groups
            .into_iter()
            .map(|(station, acc)| StationMean {
                station: station.to_string(),
                pm25: acc.pm25.mean(),
                pm10: acc.pm10.mean(),
                count: acc.rows,
            })
            .collect()
    }

    /// Stations sorted by descending mean, separately for PM2.5 and PM10
    pub fn station_rankings(&self, means: &[StationMean]) -> StationRankings {
        let mut by_pm25 = means.to_vec();
        by_pm25.sort_by(|a, b| descending(a.pm25, b.pm25).then_with(|| a.station.cmp(&b.station)));

        let mut by_pm10 = means.to_vec();
        by_pm10.sort_by(|a, b| descending(a.pm10, b.pm10).then_with(|| a.station.cmp(&b.station)));

        StationRankings { by_pm25, by_pm10 }
    }

    /// Pairwise Pearson correlation of the six numeric fields, or `None` for
    /// an empty input
    pub fn correlation_matrix<'a, I>(&self, rows: I) -> Option<CorrelationMatrix>
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        let rows: Vec<&Measurement> = rows.into_iter().collect();
        if rows.is_empty() {
            return None;
        }

        let mut values = [[None; 6]; 6];
        for a in MeasurementField::ALL {
            for b in MeasurementField::ALL {
                if b.index() < a.index() {
                    continue;
                }

                let r = if a == b {
                    // Exactly one wherever the field varies at all
                    pearson(&rows, a, a).map(|_| 1.0)
                } else {
                    pearson(&rows, a, b)
                };

                values[a.index()][b.index()] = r;
                values[b.index()][a.index()] = r;
            }
        }

        Some(CorrelationMatrix {
            fields: MeasurementField::ALL,
            values,
        })
    }

    /// Equal-width distribution of one field's present values
    pub fn histogram<'a, I>(&self, rows: I, field: MeasurementField) -> Option<Histogram>
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        let values: Vec<f64> = rows.into_iter().filter_map(|m| m.value(field)).collect();
        let first = *values.first()?;

        let (min, max) = values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let (lower, upper) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };

        let bin_count = self.histogram_bins;
        let width = (upper - lower) / bin_count as f64;

        // Span overflowed, or too large for the 0.5 widening to register
        if !width.is_finite() || width == 0.0 {
            return Some(Histogram {
                field,
                bins: vec![HistogramBin {
                    lower: min,
                    upper: max,
                    count: values.len(),
                }],
            });
        }

        let mut counts = vec![0usize; bin_count];
        for v in values {
            // Last bin is closed on the right
            let index = (((v - lower) / width) as usize).min(bin_count - 1);
            counts[index] += 1;
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: lower + i as f64 * width,
                upper: if i + 1 == bin_count {
                    upper
                } else {
                    lower + (i + 1) as f64 * width
                },
                count,
            })
            .collect();

        Some(Histogram { field, bins })
    }

    /// Average of the daily means; `None` when there are no days
    pub fn overview(&self, daily: &[DailyMean]) -> Option<PollutionOverview> {
        if daily.is_empty() {
            return None;
        }

        let mut pm25 = MeanAccumulator::default();
        let mut pm10 = MeanAccumulator::default();
        for day in daily {
            pm25.push(day.pm25);
            pm10.push(day.pm10);
        }

        Some(PollutionOverview {
            avg_pm25: pm25.mean(),
            avg_pm10: pm10.mean(),
            days: daily.len(),
        })
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Larger values first; absent values last
fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Pearson coefficient over rows where both fields are present
fn pearson(rows: &[&Measurement], a: MeasurementField, b: MeasurementField) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|m| Some((m.value(a)?, m.value(b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }

    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}
