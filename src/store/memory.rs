/// In-process `ClimateStore` with the same semantics as the Postgres backend.
///
/// Readers are counted on open and on drop so callers can check that every
/// request released its handle. `set_offline` makes `open_reader` fail the
/// way an unreachable database does.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{ClimateReader, ClimateStore, StoreError};
use crate::model::{DateRange, Measurement, Station, TemperatureStats};

#[derive(Debug, Default)]
pub struct MemoryStore {
    measurements: Vec<Measurement>,
    stations: Vec<Station>,
    readers_opened: AtomicUsize,
    readers_released: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new(stations: Vec<Station>, measurements: Vec<Measurement>) -> Self {
        Self {
            measurements,
            stations,
            ..Default::default()
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn readers_opened(&self) -> usize {
        self.readers_opened.load(Ordering::SeqCst)
    }

    pub fn readers_released(&self) -> usize {
        self.readers_released.load(Ordering::SeqCst)
    }

    /// Readers currently held open.
    pub fn readers_outstanding(&self) -> usize {
        self.readers_opened().saturating_sub(self.readers_released())
    }

    /// Measurement rows sorted by (date, station), the order every ordered
    /// query in the Postgres backend uses.
    fn ordered_measurements(&self) -> Vec<&Measurement> {
        let mut rows: Vec<&Measurement> = self.measurements.iter().collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.station.cmp(&b.station)));
        rows
    }
}

impl ClimateStore for MemoryStore {
    fn open_reader(&self) -> Result<Box<dyn ClimateReader + '_>, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        self.readers_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryReader { store: self }))
    }

    fn describe(&self) -> String {
        format!(
            "in-memory store ({} stations, {} measurements)",
            self.stations.len(),
            self.measurements.len()
        )
    }
}

struct MemoryReader<'a> {
    store: &'a MemoryStore,
}

impl Drop for MemoryReader<'_> {
    fn drop(&mut self) {
        self.store.readers_released.fetch_add(1, Ordering::SeqCst);
    }
}

impl ClimateReader for MemoryReader<'_> {
    fn latest_date(&mut self) -> Result<Option<String>, StoreError> {
        Ok(self.store.measurements.iter().map(|m| m.date.clone()).max())
    }

    fn precipitation_since(
        &mut self,
        since: &str,
    ) -> Result<Vec<(String, Option<f64>)>, StoreError> {
        Ok(self
            .store
            .ordered_measurements()
            .into_iter()
            .filter(|m| m.date.as_str() >= since)
            .map(|m| (m.date.clone(), m.prcp))
            .collect())
    }

    fn station_ids(&mut self) -> Result<Vec<String>, StoreError> {
        let distinct: BTreeSet<&str> = self.store.stations.iter().map(|s| s.station.as_str()).collect();
        Ok(distinct.into_iter().map(str::to_string).collect())
    }

    fn most_active_station(&mut self) -> Result<Option<String>, StoreError> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for m in &self.store.measurements {
            *counts.entry(m.station.as_str()).or_default() += 1;
        }

        // Highest count first, then lowest station id
        Ok(counts
            .into_iter()
            .min_by(|(a_id, a_n), (b_id, b_n)| b_n.cmp(a_n).then_with(|| a_id.cmp(b_id)))
            .map(|(id, _)| id.to_string()))
    }

    fn station_tobs_since(&mut self, station: &str, since: &str) -> Result<Vec<f64>, StoreError> {
        Ok(self
            .store
            .ordered_measurements()
            .into_iter()
            .filter(|m| m.station == station && m.date.as_str() >= since)
            .map(|m| m.tobs)
            .collect())
    }

    fn temperature_stats(&mut self, range: &DateRange) -> Result<TemperatureStats, StoreError> {
        let values: Vec<f64> = self
            .store
            .measurements
            .iter()
            .filter(|m| range.contains(&m.date))
            .map(|m| m.tobs)
            .collect();
        Ok(TemperatureStats::from_observations(&values))
    }
}
