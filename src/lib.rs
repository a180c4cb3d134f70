//! Carpool Match - ride matching and scoring for a campus carpooling app
//!
//! This library ranks drivers' ride offerings against a rider's request by
//! departure-time proximity, route proximity and open seats.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{match_rides, ClockTime, MatchError, MatchOptions, MatchOutcome, RideMatcher};
pub use models::{CandidateRide, RideRequest, ScoredRide, ScoreBreakdown, ScoringRules};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let rides = match_rides(&RideRequest::new("09:00 AM", 7.0), &[], date).unwrap();
        assert!(rides.is_empty());
    }
}
