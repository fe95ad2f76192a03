//! Surfs Up Climate API - Main Server
//!
//! Serves read-only precipitation and temperature statistics for the
//! Hawaii weather stations stored in PostgreSQL:
//! 1. Loads configuration (surfsup.toml, environment, command line)
//! 2. Verifies the measurement and station tables are readable
//! 3. Serves the HTTP API until the process is stopped
//!
//! Usage:
//!   cargo run --release                              # Serve on 127.0.0.1:5000
//!   cargo run --release -- --port 8080               # Serve on another port
//!   cargo run --release -- --config prod.toml --host 0.0.0.0
//!
//! Environment:
//!   DATABASE_URL  - PostgreSQL connection string
//!   SURFSUP_HOST, SURFSUP_PORT, SURFSUP_WORKERS - listener overrides
//!   (all of these may also come from .env)
//!   RUST_LOG      - log filter (default: info)

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use surfsup_service::config::{self, DEFAULT_CONFIG_PATH};
use surfsup_service::db;
use surfsup_service::endpoint::EndpointServer;
use surfsup_service::store::{ClimateStore, PostgresStore};

/// Command-line overrides
#[derive(Debug, Default)]
struct Args {
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    workers: Option<usize>,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} [--config PATH] [--host HOST] [--port PORT] [--workers N]",
        program
    )
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        if flag == "--help" || flag == "-h" {
            return Err(usage(&args[0]));
        }

        let value = args
            .get(i + 1)
            .ok_or_else(|| format!("Error: {} requires a value", flag))?;

        match flag {
            "--config" => parsed.config_path = Some(PathBuf::from(value)),
            "--host" => parsed.host = Some(value.clone()),
            "--port" => {
                parsed.port = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Error: invalid port '{}'", value))?,
                )
            }
            "--workers" => {
                parsed.workers = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Error: invalid worker count '{}'", value))?,
                )
            }
            _ => return Err(format!("Unknown argument: {}\n{}", flag, usage(&args[0]))),
        }
        i += 2;
    }

    Ok(parsed)
}

fn main() {
    // .env may carry RUST_LOG as well as the overrides
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🌺 Surfs Up Climate API");
    println!("=======================\n");

    let args: Vec<String> = env::args().collect();
    let args = parse_args(&args).unwrap_or_else(|msg| {
        eprintln!("{}", msg);
        std::process::exit(1);
    });

    // Load configuration
    let explicit = args.config_path.is_some();
    let config_path = args
        .config_path
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = config::load_config(&config_path, explicit).unwrap_or_else(|e| {
        eprintln!("\n❌ Configuration error: {}\n", e);
        std::process::exit(1);
    });

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(workers) = args.workers {
        config.server.workers = workers;
    }

    // Connect and verify the climate tables
    println!("📊 Connecting to database...");
    let pg_config = db::resolve_database_url(config.database.url.as_deref())
        .and_then(|url| db::connect_and_verify(&url))
        .unwrap_or_else(|e| {
            eprintln!("\n❌ {}\n", e);
            std::process::exit(1);
        });
    let store: Arc<dyn ClimateStore> = Arc::new(PostgresStore::new(pg_config));
    println!("✓ Connected: {}\n", store.describe());

    // Serve
    let server = EndpointServer::bind(&config.server.host, config.server.port, config.server.workers)
        .unwrap_or_else(|e| {
            eprintln!("\n❌ {}\n", e);
            std::process::exit(1);
        });

    println!(
        "🚀 Serving on http://{}:{} - press Ctrl+C to stop\n",
        config.server.host, config.server.port
    );
    server.serve(store);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("surfsup_service")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args_defaults() {
        let args = parse_args(&argv(&[])).unwrap();
        assert!(args.config_path.is_none());
        assert!(args.port.is_none());
    }

    #[test]
    fn test_parse_args_all_flags() {
        let args = parse_args(&argv(&[
            "--config", "prod.toml", "--host", "0.0.0.0", "--port", "8080", "--workers", "2",
        ]))
        .unwrap();
        assert_eq!(args.config_path, Some(PathBuf::from("prod.toml")));
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.workers, Some(2));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&argv(&["--port"])).is_err());
        assert!(parse_args(&argv(&["--port", "http"])).is_err());
        assert!(parse_args(&argv(&["--verbose", "1"])).is_err());
        assert!(parse_args(&argv(&["--help"])).unwrap_err().starts_with("Usage"));
    }
}
