/// Data-store access for measurement and station records.
///
/// A `ClimateStore` is built once at startup and shared by every request
/// worker. Each request calls `open_reader` and gets its own scoped read
/// handle; dropping the handle releases it, so early returns and `?` paths
/// never leak a connection.
///
/// Backends:
/// - `pg`       — one read-only connection per reader
/// - `memory`   — in-process tables, used by tests

use thiserror::Error;

use crate::model::{DateRange, TemperatureStats};

pub mod memory;
pub mod pg;

pub use self::memory::MemoryStore;
pub use self::pg::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database query failed: {0}")]
    Database(#[from] postgres::Error),
    #[error("stored date '{0}' is not in YYYY-MM-DD form")]
    MalformedDate(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Factory for per-request read handles.
pub trait ClimateStore: Send + Sync {
    /// Acquire a read handle. Released when the returned box is dropped.
    fn open_reader(&self) -> Result<Box<dyn ClimateReader + '_>, StoreError>;

    /// Short description for startup logging (never includes credentials).
    fn describe(&self) -> String;
}

/// Primitive read queries. Dates are `YYYY-MM-DD` strings compared
/// lexicographically.
pub trait ClimateReader {
    /// Greatest `date` in the measurement table, `None` when it is empty.
    fn latest_date(&mut self) -> Result<Option<String>, StoreError>;

    /// `(date, prcp)` for every row with `date >= since`, ordered by date
    /// then station id.
    fn precipitation_since(&mut self, since: &str)
        -> Result<Vec<(String, Option<f64>)>, StoreError>;

    /// Distinct station ids from the station table, ascending.
    fn station_ids(&mut self) -> Result<Vec<String>, StoreError>;

    /// Station with the most measurement rows. Ties go to the lowest id.
    fn most_active_station(&mut self) -> Result<Option<String>, StoreError>;

    /// `tobs` for one station with `date >= since`, ordered by date.
    fn station_tobs_since(&mut self, station: &str, since: &str) -> Result<Vec<f64>, StoreError>;

    /// MIN / AVG / MAX of `tobs` over the range.
    fn temperature_stats(&mut self, range: &DateRange) -> Result<TemperatureStats, StoreError>;
}
