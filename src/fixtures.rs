/// Test fixtures: a small slice of Hawaii station data, cfg(test) gated.
///
/// Shape of the sample:
///   - latest date 2017-08-23, so the trailing window starts 2016-08-23
///   - USC00519281 has the most rows (4); one of them (2016-08-22) falls
///     just outside the window
///   - three stations report on 2017-08-23; USC00519397 sorts last
///   - USC00518838 is in the station table but has no measurements
///   - one missing precipitation reading (2017-08-21)

use crate::model::{Measurement, Station};
use crate::store::MemoryStore;

#[cfg(test)]
pub(crate) fn sample_stations() -> Vec<Station> {
    ["USC00519397", "USC00513117", "USC00519281", "USC00516128", "USC00518838"]
        .into_iter()
        .map(Station::new)
        .collect()
}

#[cfg(test)]
pub(crate) fn sample_measurements() -> Vec<Measurement> {
    vec![
        Measurement::new("USC00513117", "2015-01-01", Some(0.5), 60.0),
        Measurement::new("USC00519281", "2016-08-22", Some(0.3), 70.0),
        Measurement::new("USC00519281", "2016-08-23", Some(0.15), 77.0),
        Measurement::new("USC00519281", "2017-01-15", Some(0.0), 65.0),
        Measurement::new("USC00519281", "2017-08-18", Some(0.06), 79.0),
        Measurement::new("USC00516128", "2017-08-21", None, 74.0),
        Measurement::new("USC00519397", "2017-08-22", Some(0.0), 82.0),
        Measurement::new("USC00519397", "2017-08-23", Some(0.08), 81.0),
        Measurement::new("USC00513117", "2017-08-23", Some(0.0), 80.0),
        Measurement::new("USC00516128", "2017-08-23", Some(0.45), 76.0),
    ]
}

#[cfg(test)]
pub(crate) fn sample_store() -> MemoryStore {
    MemoryStore::new(sample_stations(), sample_measurements())
}

/// The two-row example: 2016-08-23..2017-08-23 aggregates to [76, 76.5, 77].
#[cfg(test)]
pub(crate) fn two_row_store() -> MemoryStore {
    MemoryStore::new(
        vec![Station::new("USC00519397")],
        vec![
            Measurement::new("USC00519397", "2016-08-23", Some(0.0), 77.0),
            Measurement::new("USC00519397", "2017-08-23", Some(0.05), 76.0),
        ],
    )
}
