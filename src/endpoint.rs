/// HTTP endpoint for the climate API
///
/// Read-only REST API over the measurement and station tables.
///
/// Endpoints:
/// - GET /                          - Route listing (HTML)
/// - GET /health                    - Service health check
/// - GET /api/v1.0/precipitation    - Last 12 months of precipitation
/// - GET /api/v1.0/stations         - Station ids
/// - GET /api/v1.0/tobs             - Last 12 months of tobs, most active station
/// - GET /api/v1.0/{start}          - [TMIN, TAVG, TMAX] from start
/// - GET /api/v1.0/{start}/{end}    - [TMIN, TAVG, TMAX] for start..=end

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use threadpool::ThreadPool;

use crate::climate;
use crate::dates::parse_iso_date;
use crate::model::DateRange;
use crate::store::{ClimateStore, StoreError};

pub const API_PREFIX: &str = "/api/v1.0";

pub const INVALID_START_MESSAGE: &str = "Invalid start date format. Use YYYY-MM-DD.";
pub const INVALID_RANGE_MESSAGE: &str = "Invalid date format. Use YYYY-MM-DD.";

const AVAILABLE_ENDPOINTS: &[&str] = &[
    "/",
    "/health",
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
    "/api/v1.0/{start}",
    "/api/v1.0/{start}/{end}",
];

const HOME_PAGE: &str = "Available Routes:<br/>\
/api/v1.0/precipitation - Last 12 months of precipitation data<br/>\
/api/v1.0/stations - List of weather stations<br/>\
/api/v1.0/tobs - Temperature Observations for the most active station<br/>\
/api/v1.0/&lt;start&gt; - TMIN, TAVG, TMAX from start date<br/>\
/api/v1.0/&lt;start&gt;/&lt;end&gt; - TMIN, TAVG, TMAX for date range";

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Health,
    Precipitation,
    Stations,
    Tobs,
    StartStats { start: String },
    RangeStats { start: String, end: String },
    NotFound,
}

impl Route {
    /// Map a request URL to a route. The query string is ignored and path
    /// segments are percent-decoded before matching; named routes win over
    /// `{start}`.
    pub fn parse(url: &str) -> Route {
        let path = url.split(['?', '#']).next().unwrap_or_default();

        match path {
            "/" => return Route::Home,
            "/health" => return Route::Health,
            _ => {}
        }

        let Some(rest) = path.strip_prefix(API_PREFIX).and_then(|r| r.strip_prefix('/')) else {
            return Route::NotFound;
        };

        let segments: Vec<String> = rest.split('/').map(decode_segment).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Route::NotFound;
        }

        match segments.as_slice() {
            [name] if name == "precipitation" => Route::Precipitation,
            [name] if name == "stations" => Route::Stations,
            [name] if name == "tobs" => Route::Tobs,
            [start] => Route::StartStats { start: start.clone() },
            [start, end] => Route::RangeStats {
                start: start.clone(),
                end: end.clone(),
            },
            _ => Route::NotFound,
        }
    }
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Transport-independent response produced by `handle_request`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.to_string(),
        }
    }

    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(e) => {
                log::error!("Failed to serialize response: {}", e);
                ApiError::Internal(e.to_string()).into_response()
            }
        }
    }

    /// Parse the body back into JSON. Used by tests and tooling.
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}

/// Failures a handler can surface to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidDate(&'static str),
    #[error("no route for {0}")]
    NotFound(String),
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::InvalidDate(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::Store(_) | ApiError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> ApiResponse {
        let status = self.status();
        let body = match &self {
            ApiError::InvalidDate(message) => json!({ "error": message }),
            ApiError::NotFound(_) => json!({
                "error": "Not found",
                "available_endpoints": AVAILABLE_ENDPOINTS,
            }),
            ApiError::MethodNotAllowed(method) => json!({
                "error": format!("Method {} not allowed", method),
            }),
            ApiError::Store(_) | ApiError::Internal(_) => {
                log::error!("Request failed: {}", self);
                json!({ "error": "Internal server error" })
            }
        };

        let body = serde_json::to_string_pretty(&body)
            .unwrap_or_else(|_| r#"{"error": "Internal server error"}"#.to_string());
        ApiResponse {
            status,
            content_type: "application/json",
            body,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Route and answer a single request. HEAD is answered like GET with the
/// body left empty.
pub fn handle_request(store: &dyn ClimateStore, method: &str, url: &str) -> ApiResponse {
    let head = method.eq_ignore_ascii_case("HEAD");
    if !head && !method.eq_ignore_ascii_case("GET") {
        return ApiError::MethodNotAllowed(method.to_string()).into_response();
    }

    let result = match Route::parse(url) {
        Route::Home => Ok(ApiResponse::html(HOME_PAGE)),
        Route::Health => Ok(handle_health(store)),
        Route::Precipitation => handle_precipitation(store),
        Route::Stations => handle_stations(store),
        Route::Tobs => handle_tobs(store),
        Route::StartStats { start } => handle_start_stats(store, &start),
        Route::RangeStats { start, end } => handle_range_stats(store, &start, &end),
        Route::NotFound => Err(ApiError::NotFound(url.to_string())),
    };

    let mut response = result.unwrap_or_else(ApiError::into_response);
    if head {
        response.body.clear();
    }
    response
}

fn handle_health(store: &dyn ClimateStore) -> ApiResponse {
    match store.open_reader() {
        Ok(_reader) => ApiResponse::json(
            200,
            &json!({
                "status": "ok",
                "service": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            }),
        ),
        Err(e) => {
            log::warn!("Health check could not reach store: {}", e);
            ApiResponse::json(503, &json!({ "status": "unavailable" }))
        }
    }
}

fn handle_precipitation(store: &dyn ClimateStore) -> Result<ApiResponse, ApiError> {
    let mut reader = store.open_reader()?;
    let by_date = climate::precipitation_last_year(reader.as_mut())?;
    Ok(ApiResponse::json(200, &by_date))
}

fn handle_stations(store: &dyn ClimateStore) -> Result<ApiResponse, ApiError> {
    let mut reader = store.open_reader()?;
    let stations = climate::station_list(reader.as_mut())?;
    Ok(ApiResponse::json(200, &stations))
}

fn handle_tobs(store: &dyn ClimateStore) -> Result<ApiResponse, ApiError> {
    let mut reader = store.open_reader()?;
    let tobs = climate::most_active_station_tobs(reader.as_mut())?;
    Ok(ApiResponse::json(200, &tobs))
}

fn handle_start_stats(store: &dyn ClimateStore, start: &str) -> Result<ApiResponse, ApiError> {
    let start = parse_iso_date(start.trim()).map_err(|_| ApiError::InvalidDate(INVALID_START_MESSAGE))?;

    let mut reader = store.open_reader()?;
    let stats = climate::temperature_summary(reader.as_mut(), &DateRange::from_start(start))?;
    Ok(ApiResponse::json(200, &stats))
}

fn handle_range_stats(store: &dyn ClimateStore, start: &str, end: &str) -> Result<ApiResponse, ApiError> {
    let (start, end) = match (parse_iso_date(start.trim()), parse_iso_date(end.trim())) {
        (Ok(start), Ok(end)) => (start, end),
        _ => return Err(ApiError::InvalidDate(INVALID_RANGE_MESSAGE)),
    };

    let mut reader = store.open_reader()?;
    let stats = climate::temperature_summary(reader.as_mut(), &DateRange::between(start, end))?;
    Ok(ApiResponse::json(200, &stats))
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to start HTTP server on {addr}: {message}")]
    Bind { addr: String, message: String },
    #[error("worker pool needs at least one thread")]
    NoWorkers,
}

/// A bound listener plus the worker pool that answers its requests.
pub struct EndpointServer {
    server: tiny_http::Server,
    workers: usize,
}

impl EndpointServer {
    /// Bind the listener. Port 0 picks an ephemeral port; see `local_addr`.
    pub fn bind(host: &str, port: u16, workers: usize) -> Result<Self, ServerError> {
        if workers == 0 {
            return Err(ServerError::NoWorkers);
        }

        let addr = format!("{}:{}", host, port);
        let server = tiny_http::Server::http(&addr).map_err(|e| ServerError::Bind {
            addr: addr.clone(),
            message: e.to_string(),
        })?;

        Ok(Self { server, workers })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve until `shutdown` is called. Each request runs on a pool worker
    /// with its own store reader.
    pub fn serve(&self, store: Arc<dyn ClimateStore>) {
        let pool = ThreadPool::with_name("surfsup-http".to_string(), self.workers);

        if let Some(addr) = self.local_addr() {
            log::info!("HTTP endpoint listening on http://{} ({} workers)", addr, self.workers);
        }

        for request in self.server.incoming_requests() {
            let store = Arc::clone(&store);
            pool.execute(move || respond(store.as_ref(), request));
        }

        pool.join();
        log::info!("HTTP endpoint stopped");
    }

    /// Unblock `serve`; in-flight requests finish first.
    pub fn shutdown(&self) {
        self.server.unblock();
    }
}

fn respond(store: &dyn ClimateStore, request: tiny_http::Request) {
    let started = Instant::now();
    let method = request.method().to_string();
    let url = request.url().to_string();

    let response = handle_request(store, &method, &url);
    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        url,
        response.status,
        started.elapsed().as_millis()
    );

    if let Err(e) = request.respond(into_http_response(response)) {
        log::warn!("Failed to send response: {}", e);
    }
}

/// Create HTTP response with the body and content type set
fn into_http_response(response: ApiResponse) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let mut http = tiny_http::Response::from_data(response.body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(response.status));

    if let Ok(header) = tiny_http::Header::from_bytes(&b"Content-Type"[..], response.content_type.as_bytes()) {
        http.add_header(header);
    }
    http
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
