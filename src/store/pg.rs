/// PostgreSQL-backed `ClimateStore`.
///
/// Expected tables (pre-populated, never written by the service):
///
/// ```sql
/// measurement (station TEXT, date TEXT, prcp DOUBLE PRECISION NULL, tobs DOUBLE PRECISION)
/// station     (station TEXT, name TEXT, latitude .., longitude .., elevation ..)
/// ```
///
/// `date` holds `YYYY-MM-DD` text; every filter is a plain string comparison.
/// Numeric columns are cast to float8 in the queries so NUMERIC or REAL
/// columns read the same way. Columns are decoded with `try_get`, so a
/// type mismatch surfaces as `StoreError::Database`.

use postgres::{Client, Config, NoTls};

use super::{ClimateReader, ClimateStore, StoreError};
use crate::model::{DateRange, TemperatureStats};

pub struct PostgresStore {
    config: Config,
}

impl PostgresStore {
    /// Wrap an already validated connection config. See `db::connect_and_verify`.
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ClimateStore for PostgresStore {
    fn open_reader(&self) -> Result<Box<dyn ClimateReader + '_>, StoreError> {
        let mut client = self.config.connect(NoTls)?;
        client.batch_execute("SET SESSION CHARACTERISTICS AS TRANSACTION READ ONLY")?;
        Ok(Box::new(PostgresReader { client }))
    }

    fn describe(&self) -> String {
        format!(
            "postgres store (hosts {:?}, database {})",
            self.config.get_hosts(),
            self.config.get_dbname().unwrap_or("<default>")
        )
    }
}

/// One connection, closed when the reader is dropped.
struct PostgresReader {
    client: Client,
}

impl ClimateReader for PostgresReader {
    fn latest_date(&mut self) -> Result<Option<String>, StoreError> {
        let row = self.client.query_opt(
            "SELECT date FROM measurement
             WHERE date IS NOT NULL
             ORDER BY date DESC
             LIMIT 1",
            &[],
        )?;
        Ok(row.map(|r| r.try_get(0)).transpose()?)
    }

    fn precipitation_since(
        &mut self,
        since: &str,
    ) -> Result<Vec<(String, Option<f64>)>, StoreError> {
        let rows = self.client.query(
            "SELECT date, prcp::float8 FROM measurement
             WHERE date >= $1
             ORDER BY date, station",
            &[&since],
        )?;
        let pairs = rows
            .iter()
            .map(|r| -> Result<(String, Option<f64>), postgres::Error> {
                Ok((r.try_get(0)?, r.try_get(1)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pairs)
    }

    fn station_ids(&mut self) -> Result<Vec<String>, StoreError> {
        let rows = self.client.query(
            "SELECT DISTINCT station FROM station
             WHERE station IS NOT NULL
             ORDER BY station",
            &[],
        )?;
        Ok(rows.iter().map(|r| r.try_get(0)).collect::<Result<_, _>>()?)
    }

    fn most_active_station(&mut self) -> Result<Option<String>, StoreError> {
        let row = self.client.query_opt(
            "SELECT station, COUNT(*) AS n FROM measurement
             WHERE station IS NOT NULL
             GROUP BY station
             ORDER BY n DESC, station ASC
             LIMIT 1",
            &[],
        )?;
        Ok(row.map(|r| r.try_get(0)).transpose()?)
    }

    fn station_tobs_since(&mut self, station: &str, since: &str) -> Result<Vec<f64>, StoreError> {
        let rows = self.client.query(
            "SELECT tobs::float8 FROM measurement
             WHERE station = $1 AND date >= $2 AND tobs IS NOT NULL
             ORDER BY date",
            &[&station, &since],
        )?;
        Ok(rows.iter().map(|r| r.try_get(0)).collect::<Result<_, _>>()?)
    }

    fn temperature_stats(&mut self, range: &DateRange) -> Result<TemperatureStats, StoreError> {
        let start = range.start_key();
        let end = range.end_key();
        let row = self.client.query_one(
            "SELECT MIN(tobs)::float8, AVG(tobs)::float8, MAX(tobs)::float8
             FROM measurement
             WHERE date >= $1 AND ($2::text IS NULL OR date <= $2::text)",
            &[&start, &end],
        )?;
        Ok(TemperatureStats {
            min: row.try_get(0)?,
            avg: row.try_get(1)?,
            max: row.try_get(2)?,
        })
    }
}
