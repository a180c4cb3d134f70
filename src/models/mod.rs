// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    document_id, CandidateRide, RejectedRide, RideFieldError, RideRequest, ScoreBreakdown,
    ScoredRide, ScoringRules, ScoringRulesError, TimeBucket,
};
pub use requests::{LiveMatchRequest, MatchRidesRequest};
pub use responses::{ErrorResponse, HealthResponse, MatchRidesResponse, MatchStatus};
