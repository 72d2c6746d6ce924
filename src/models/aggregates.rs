use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::MeasurementField;

/// Mean pollutant levels for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMean {
    pub date: NaiveDate,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub count: usize,
}

/// Mean pollutant levels for one station within one calendar month (1-12),
/// pooled across years
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStationMean {
    pub month: u32,
    pub station: String,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub count: usize,
}

/// Mean pollutant levels for one hour of the day (0-23), pooled across
/// stations and days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyMean {
    pub hour: u32,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub count: usize,
}

/// Overall mean pollutant levels for one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationMean {
    pub station: String,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub count: usize,
}

/// Stations ordered from most to least polluted, once per pollutant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationRankings {
    pub by_pm25: Vec<StationMean>,
    pub by_pm10: Vec<StationMean>,
}

impl StationRankings {
    pub fn is_empty(&self) -> bool {
        self.by_pm25.is_empty() && self.by_pm10.is_empty()
    }
}

/// Pearson correlation between each pair of numeric fields.
///
/// `values[i][j]` is indexed by `MeasurementField::index`. A cell is `None`
/// when the pair had fewer than two joint observations or no variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub fields: [MeasurementField; 6],
    pub values: [[Option<f64>; 6]; 6],
}

impl CorrelationMatrix {
    pub fn get(&self, a: MeasurementField, b: MeasurementField) -> Option<f64> {
        self.values[a.index()][b.index()]
    }

    pub fn is_symmetric(&self) -> bool {
        (0..6).all(|i| (0..6).all(|j| self.values[i][j] == self.values[j][i]))
    }

    pub fn render(&self) -> String {
        let mut out = format!("{:>8}", "");
        for field in &self.fields {
            out.push_str(&format!("{:>8}", field.column_name()));
        }
        out.push('\n');

        for row in &self.fields {
            out.push_str(&format!("{:>8}", row.column_name()));
            for col in &self.fields {
                match self.get(*row, *col) {
                    Some(r) => out.push_str(&format!("{:>8.2}", r)),
                    None => out.push_str(&format!("{:>8}", "-")),
                }
            }
            out.push('\n');
        }

        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width value distribution of one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub field: MeasurementField,
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Bin with the most observations; the first one wins ties
    pub fn mode_bin(&self) -> Option<&HistogramBin> {
        self.bins
            .iter()
            .reduce(|best, bin| if bin.count > best.count { bin } else { best })
    }
}

/// Headline figures: the average of the daily means
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutionOverview {
    pub avg_pm25: Option<f64>,
    pub avg_pm10: Option<f64>,
    pub days: usize,
}
