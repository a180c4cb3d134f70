use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;
use crate::models::domain::RideRequest;

/// Request to rank a caller-supplied list of rides
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRidesRequest {
    #[validate(nested)]
    pub request: RideRequest,
    /// Ride documents, read one at a time so a malformed ride is rejected on its own
    #[serde(default)]
    pub rides: Vec<Value>,
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to rank the store's currently active rides
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LiveMatchRequest {
    #[validate(nested)]
    pub request: RideRequest,
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<u16>,
}
