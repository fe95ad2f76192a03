//! Climate Database Check
//!
//! Connects with the same settings as the server, verifies the measurement
//! and station tables, and prints what the API would anchor on:
//! 1. Row counts per table
//! 2. Latest measurement date and the trailing 12-month window
//! 3. Most active station
//!
//! Usage:
//!   cargo run --bin verify_db
//!
//! Environment:
//!   DATABASE_URL - PostgreSQL connection string (from .env)

use std::path::Path;

use surfsup_service::climate;
use surfsup_service::config::{self, DEFAULT_CONFIG_PATH};
use surfsup_service::db;
use surfsup_service::dates::format_iso_date;
use surfsup_service::store::{ClimateReader, ClimateStore, PostgresStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("🔎 Climate Database Check");
    println!("=========================\n");

    let config = config::load_config(Path::new(DEFAULT_CONFIG_PATH), false)?;

    println!("📊 Connecting to database...");
    let url = db::resolve_database_url(config.database.url.as_deref())?;
    let pg_config = db::connect_and_verify(&url).unwrap_or_else(|e| {
        eprintln!("\n{}\n", e);
        std::process::exit(1);
    });
    println!("✓ Tables verified\n");

    let mut client = db::connect_with_validation(&pg_config)?;
    let measurements: i64 = client.query_one("SELECT COUNT(*) FROM measurement", &[])?.try_get(0)?;
    let stations: i64 = client.query_one("SELECT COUNT(*) FROM station", &[])?.try_get(0)?;
    println!("   measurement rows: {}", measurements);
    println!("   station rows:     {}\n", stations);

    let store = PostgresStore::new(pg_config);
    let mut reader = store.open_reader()?;

    match climate::trailing_window(reader.as_mut())? {
        Some(window) => {
            println!("   Latest date:      {}", format_iso_date(window.most_recent));
            println!(
                "   Trailing window:  {} .. {}",
                format_iso_date(window.start),
                format_iso_date(window.most_recent)
            );
        }
        None => println!("   ⚠ measurement table is empty"),
    }

    match reader.most_active_station()? {
        Some(station) => println!("   Most active:      {}", station),
        None => println!("   Most active:      -"),
    }

    let ids = climate::station_list(reader.as_mut())?;
    println!("   Distinct stations: {}\n", ids.len());

    println!("✓ Done");
    Ok(())
}
