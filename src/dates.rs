/// Strict ISO-8601 date handling for path parameters and window math.
///
/// Only the zero-padded `YYYY-MM-DD` form is accepted. chrono's `%Y-%m-%d`
/// on its own also takes `2017-8-3` and signed years, so the shape is
/// checked byte by byte before the calendar check.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Fixed trailing window length. Not calendar aware.
pub const TRAILING_WINDOW_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateFormatError {
    #[error("'{0}' is not in YYYY-MM-DD form")]
    Shape(String),
    #[error("'{0}' is not a calendar date")]
    Calendar(String),
}

/// Parse an exactly `YYYY-MM-DD` string into a date.
pub fn parse_iso_date(input: &str) -> Result<NaiveDate, DateFormatError> {
    if !has_iso_shape(input) {
        return Err(DateFormatError::Shape(input.to_string()));
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| DateFormatError::Calendar(input.to_string()))
}

fn has_iso_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Canonical zero-padded string form, comparable against stored dates.
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `date` minus exactly 365 days.
pub fn one_year_before(date: NaiveDate) -> NaiveDate {
    date - Duration::days(TRAILING_WINDOW_DAYS)
}
