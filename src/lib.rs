//! surfsup_service: read-only climate API for Hawaii weather stations.
//!
//! # Module structure
//!
//! ```text
//! surfsup_service
//! ├── model     — record types (Measurement, Station, DateRange, TemperatureStats)
//! ├── dates     — strict YYYY-MM-DD parsing and the 365-day window offset
//! ├── config    — service configuration loader (surfsup.toml + environment)
//! ├── db        — PostgreSQL URL validation and table checks
//! ├── store
//! │   ├── pg     — PostgreSQL backend, one read-only connection per reader
//! │   └── memory — in-process backend used by the tests
//! ├── climate   — query composition (trailing window, most active station, ...)
//! ├── endpoint  — HTTP routing, handlers and the tiny_http server
//! └── fixtures (test only) — sample station and measurement rows
//! ```

/// Public modules
pub mod climate;
pub mod config;
pub mod dates;
pub mod db;
pub mod endpoint;
pub mod model;
pub mod store;

#[cfg(test)]
mod fixtures;
