/// Shared data types for the climate API.
///
/// Record types mirror the `measurement` and `station` tables column for
/// column. Dates stay ISO-8601 strings throughout: the store compares them
/// lexicographically, which matches calendar order for `YYYY-MM-DD`.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::dates::format_iso_date;

// ---------------------------------------------------------------------------
// Table names
// ---------------------------------------------------------------------------

pub const MEASUREMENT_TABLE: &str = "measurement";
pub const STATION_TABLE: &str = "station";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One dated weather reading for one station.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Station id, e.g. `USC00519397`.
    pub station: String,
    /// Observation date as `YYYY-MM-DD`.
    pub date: String,
    /// Precipitation in inches. Missing readings are `None`.
    pub prcp: Option<f64>,
    /// Temperature observation in degrees Fahrenheit.
    pub tobs: f64,
}

impl Measurement {
    pub fn new(station: &str, date: &str, prcp: Option<f64>, tobs: f64) -> Self {
        Self {
            station: station.to_string(),
            date: date.to_string(),
            prcp,
            tobs,
        }
    }
}

/// A weather-recording site. Only `station` is read by the API; the other
/// fields mirror the remaining columns of the station table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Station {
    pub station: String,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

impl Station {
    pub fn new(station: &str) -> Self {
        Self {
            station: station.to_string(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Query inputs / outputs
// ---------------------------------------------------------------------------

/// Validated inclusive date range. `end == None` is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn from_start(start: NaiveDate) -> Self {
        Self { start, end: None }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end: Some(end) }
    }

    pub fn start_key(&self) -> String {
        format_iso_date(self.start)
    }

    pub fn end_key(&self) -> Option<String> {
        self.end.map(format_iso_date)
    }

    /// Whether a stored date string falls inside the range.
    pub fn contains(&self, date: &str) -> bool {
        let start = self.start_key();
        if date < start.as_str() {
            return false;
        }
        match self.end_key() {
            Some(end) => date <= end.as_str(),
            None => true,
        }
    }
}

/// MIN / AVG / MAX of `tobs` over a date range.
///
/// Serialises as `[min, avg, max]`; all three are `null` when no row matched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TemperatureStats {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

impl TemperatureStats {
    /// Aggregate a set of observations the way SQL MIN/AVG/MAX would.
    pub fn from_observations(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        Self {
            min: Some(min),
            avg: Some(avg),
            max: Some(max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.avg.is_none() && self.max.is_none()
    }
}

impl Serialize for TemperatureStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.min, self.avg, self.max].serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_stats_serialize_as_flat_array() {
        let stats = TemperatureStats::from_observations(&[77.0, 76.0]);
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json, serde_json::json!([76.0, 76.5, 77.0]));
    }

    #[test]
    fn test_empty_stats_serialize_as_nulls() {
        let stats = TemperatureStats::from_observations(&[]);
        assert!(stats.is_empty());
        assert_eq!(serde_json::to_string(&stats).unwrap(), "[null,null,null]");
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = DateRange::between(date("2016-08-23"), date("2017-08-23"));
        assert!(range.contains("2016-08-23"));
        assert!(range.contains("2017-08-23"));
        assert!(!range.contains("2016-08-22"));
        assert!(!range.contains("2017-08-24"));
    }

    #[test]
    fn test_open_range_has_no_upper_bound() {
        let range = DateRange::from_start(date("2017-01-01"));
        assert!(range.contains("2099-12-31"));
        assert!(!range.contains("2016-12-31"));
    }
}
