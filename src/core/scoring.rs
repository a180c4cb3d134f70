use chrono::NaiveDate;
use crate::models::{CandidateRide, ScoreBreakdown, ScoringRules};
use crate::core::time::{minutes_between, ClockTime};

/// Score a ride against a rider's parsed request
///
/// Scoring formula (default rules):
/// score = (
///     time_score +                 # 30 / 20 / 10 / 0 for <=10 / <=20 / <=30 / >30 min
///     distance_score * 5 +         # max(0, 10 - |distance difference|)
///     seats_available * 5
/// )
pub fn calculate_match_score(
    desired_time: ClockTime,
    approximate_distance: f64,
    departure_time: ClockTime,
    ride: &CandidateRide,
    rules: &ScoringRules,
    reference_date: NaiveDate,
) -> ScoreBreakdown {
    let time_diff_minutes = minutes_between(desired_time, departure_time, reference_date);

    ScoreBreakdown {
        time_diff_minutes,
        time_score: time_score(time_diff_minutes, rules),
        route_score: route_score(approximate_distance, ride.distance(), rules),
        seat_score: seat_score(ride.seats_available(), rules),
    }
}

/// Step function over the minute difference; first matching bucket wins
#[inline]
pub fn time_score(diff_minutes: i64, rules: &ScoringRules) -> f64 {
    rules
        .time_buckets
        .iter()
        .find(|bucket| diff_minutes <= bucket.within_minutes)
        .map_or(0.0, |bucket| bucket.points)
}

/// Linear decay from `max_distance_score` at zero difference, floored at 0
#[inline]
pub fn distance_score(requested: f64, offered: f64, rules: &ScoringRules) -> f64 {
    (rules.max_distance_score - (requested - offered).abs()).max(0.0)
}

#[inline]
pub fn route_score(requested: f64, offered: f64, rules: &ScoringRules) -> f64 {
    distance_score(requested, offered, rules) * rules.route_multiplier
}

#[inline]
pub fn seat_score(seats_available: i64, rules: &ScoringRules) -> f64 {
    seats_available as f64 * rules.seat_multiplier
}
