use crate::models::CandidateRide;

/// Seat-availability gate, applied before a ride is scored
#[inline]
pub fn has_open_seats(ride: &CandidateRide) -> bool {
    ride.seats_available() > 0
}

/// Score gate, applied after scoring; a score equal to the floor is dropped
///
/// The floor never goes below zero, so a zero or negative score is always
/// dropped whatever `min_score` is configured to.
#[inline]
pub fn passes_score_threshold(match_score: f64, min_score: f64) -> bool {
    match_score > min_score.max(0.0)
}
