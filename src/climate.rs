/// Query composition for the climate endpoints.
///
/// Each function works on a single open reader and recomputes whatever it
/// needs (latest date, trailing window, most active station) from scratch.
/// Nothing is cached between requests.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::dates::{format_iso_date, one_year_before, parse_iso_date};
use crate::model::{DateRange, TemperatureStats};
use crate::store::{ClimateReader, StoreError};

/// The trailing 12-month window anchored on the latest measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailingWindow {
    pub most_recent: NaiveDate,
    pub start: NaiveDate,
}

impl TrailingWindow {
    pub fn anchored_at(most_recent: NaiveDate) -> Self {
        Self {
            most_recent,
            start: one_year_before(most_recent),
        }
    }

    pub fn start_key(&self) -> String {
        format_iso_date(self.start)
    }
}

/// Window ending at the latest stored date. `None` on an empty table.
pub fn trailing_window(reader: &mut dyn ClimateReader) -> Result<Option<TrailingWindow>, StoreError> {
    let Some(latest) = reader.latest_date()? else {
        return Ok(None);
    };
    let most_recent = parse_iso_date(latest.trim()).map_err(|_| StoreError::MalformedDate(latest.clone()))?;
    Ok(Some(TrailingWindow::anchored_at(most_recent)))
}

/// Date -> precipitation for the trailing window.
///
/// Rows arrive ordered by date, so when several stations report on the same
/// day the last one read wins.
pub fn precipitation_last_year(
    reader: &mut dyn ClimateReader,
) -> Result<BTreeMap<String, Option<f64>>, StoreError> {
    let Some(window) = trailing_window(reader)? else {
        return Ok(BTreeMap::new());
    };

    let mut by_date = BTreeMap::new();
    for (date, prcp) in reader.precipitation_since(&window.start_key())? {
        by_date.insert(date, prcp);
    }
    Ok(by_date)
}

pub fn station_list(reader: &mut dyn ClimateReader) -> Result<Vec<String>, StoreError> {
    reader.station_ids()
}

/// Temperature observations of the most active station over the trailing window.
pub fn most_active_station_tobs(reader: &mut dyn ClimateReader) -> Result<Vec<f64>, StoreError> {
    let Some(station) = reader.most_active_station()? else {
        return Ok(Vec::new());
    };
    let Some(window) = trailing_window(reader)? else {
        return Ok(Vec::new());
    };

    log::debug!("most active station {} since {}", station, window.start_key());
    reader.station_tobs_since(&station, &window.start_key())
}

pub fn temperature_summary(
    reader: &mut dyn ClimateReader,
    range: &DateRange,
) -> Result<TemperatureStats, StoreError> {
    reader.temperature_stats(range)
}
