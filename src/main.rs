use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use carpool_match::config::{LoggingSettings, Settings};
use carpool_match::core::RideMatcher;
use carpool_match::routes::{self, rides::{AppState, MatchLimits}};
use carpool_match::services::{RideSnapshotCache, RideStoreClient, RideStoreConfig};
use std::sync::Arc;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_tracing(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();

    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();
    init_tracing(&logging);

    info!("Starting carpool matching service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    info!("Configuration loaded successfully");

    let store = RideStoreClient::new(RideStoreConfig {
        endpoint: settings.ride_store.endpoint.clone(),
        api_key: settings.ride_store.api_key.clone(),
        project_id: settings.ride_store.project_id.clone(),
        database_id: settings.ride_store.database_id.clone(),
        rides_collection: settings.ride_store.rides_collection.clone(),
        timeout_secs: settings.ride_store.timeout_secs.unwrap_or(30),
    })
    .map_err(|e| {
        error!("Failed to build ride store client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    info!("Ride store client initialized");

    let snapshot_ttl = settings.cache.snapshot_ttl_secs.unwrap_or(15);
    let snapshots = RideSnapshotCache::new(snapshot_ttl);

    info!("Snapshot cache initialized (TTL: {}s)", snapshot_ttl);

    let rules = settings.scoring_rules().map_err(|e| {
        error!("Invalid scoring rules: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;
    info!("Matcher initialized with rules: {:?}", rules);
    let matcher = RideMatcher::new(rules);

    let defaults = MatchLimits::default();
    let limits = MatchLimits {
        default_limit: settings.matching.default_limit.unwrap_or(defaults.default_limit),
        max_limit: settings.matching.max_limit.unwrap_or(defaults.max_limit),
    };

    let app_state = AppState {
        store: Arc::new(store),
        snapshots: Arc::new(snapshots),
        matcher,
        limits,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
