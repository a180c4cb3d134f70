use actix_web::{web, HttpResponse, Responder};
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;
use crate::core::{MatchError, MatchOptions, MatchOutcome, RideMatcher};
use crate::models::{
    ErrorResponse, HealthResponse, LiveMatchRequest, MatchRidesRequest, MatchRidesResponse,
    RideRequest,
};
use crate::services::{RideSnapshotCache, RideStoreClient};

/// Result-count limits applied to match requests
#[derive(Debug, Clone, Copy)]
pub struct MatchLimits {
    pub default_limit: u16,
    pub max_limit: u16,
}

impl MatchLimits {
    fn resolve(&self, requested: Option<u16>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit) as usize
    }
}

impl Default for MatchLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RideStoreClient>,
    pub snapshots: Arc<RideSnapshotCache>,
    pub matcher: RideMatcher,
    pub limits: MatchLimits,
}

/// Configure all ride-matching routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/rides/match", web::post().to(match_rides))
        .route("/rides/match/live", web::post().to(match_live_rides));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Rank a caller-supplied ride list
///
/// POST /api/v1/rides/match
///
/// Request body:
/// ```json
/// {
///   "request": { "desiredTime": "09:00 AM", "approximateDistance": 7.0, "destination": "Campus" },
///   "rides": [{ "time": "09:05 AM", "distance": 7.2, "totalSeats": 4, "filledSeats": 1 }],
///   "limit": 20
/// }
/// ```
async fn match_rides(
    state: web::Data<AppState>,
    req: web::Json<MatchRidesRequest>,
) -> HttpResponse {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match request: {:?}", errors);
        return validation_failed(errors);
    }

    let limit = state.limits.resolve(req.limit);
    run_match(&state.matcher, &req.request, &req.rides, limit)
}

/// Rank the store's active rides
///
/// POST /api/v1/rides/match/live
///
/// Request body:
/// ```json
/// {
///   "request": { "desiredTime": "09:00 AM", "approximateDistance": 7.0 },
///   "limit": 20
/// }
/// ```
async fn match_live_rides(
    state: web::Data<AppState>,
    req: web::Json<LiveMatchRequest>,
) -> HttpResponse {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for live match request: {:?}", errors);
        return validation_failed(errors);
    }

    let rides = match state.snapshots.active_rides(&state.store).await {
        Ok(rides) => rides,
        Err(e) => {
            tracing::error!("Failed to load active rides: {}", e);
            return HttpResponse::BadGateway().json(ErrorResponse {
                error: "Failed to load active rides".to_string(),
                message: e.to_string(),
                status_code: 502,
            });
        }
    };

    let limit = state.limits.resolve(req.limit);
    run_match(&state.matcher, &req.request, &rides, limit)
}

fn run_match(
    matcher: &RideMatcher,
    request: &RideRequest,
    rides: &[Value],
    limit: usize,
) -> HttpResponse {
    let request_id = uuid::Uuid::new_v4().to_string();
    let options = MatchOptions::for_date(chrono::Local::now().date_naive()).with_limit(limit);

    let span = tracing::info_span!("match_rides", request_id = %request_id);
    let _guard = span.enter();

    match matcher.match_documents(request, rides, &options) {
        Ok(outcome) => {
            tracing::info!(
                "Returning {} rides (from {} candidates, {} rejected)",
                outcome.rides.len(),
                outcome.total_candidates,
                outcome.rejected.len()
            );
            HttpResponse::Ok().json(to_response(request_id, outcome))
        }
        Err(e) => {
            tracing::info!("Rejected ride request: {}", e);
            HttpResponse::UnprocessableEntity().json(ErrorResponse {
                error: error_kind(&e).to_string(),
                message: e.to_string(),
                status_code: 422,
            })
        }
    }
}

fn to_response(request_id: String, outcome: MatchOutcome) -> MatchRidesResponse {
    MatchRidesResponse {
        request_id,
        status: outcome.status(),
        total_candidates: outcome.total_candidates,
        rides: outcome.rides,
        rejected: outcome.rejected,
    }
}

fn error_kind(error: &MatchError) -> &'static str {
    match error {
        MatchError::InvalidTime(_) => "Invalid desired time",
        MatchError::InvalidDistance(_) => "Invalid approximate distance",
    }
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}
