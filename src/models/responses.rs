use serde::{Deserialize, Serialize};
use crate::models::domain::{RejectedRide, ScoredRide};

/// Why a match call returned what it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// At least one ride matched
    Matched,
    /// Nothing matched and every candidate was well-formed
    Empty,
    /// Nothing matched and some candidates were rejected as malformed
    Degraded,
}

/// Response for the match endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRidesResponse {
    pub request_id: String,
    pub status: MatchStatus,
    pub rides: Vec<ScoredRide>,
    pub rejected: Vec<RejectedRide>,
    pub total_candidates: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
