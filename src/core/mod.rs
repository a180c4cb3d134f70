// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod scoring;
pub mod time;

pub use filters::{has_open_seats, passes_score_threshold};
pub use matcher::{match_rides, MatchError, MatchOptions, MatchOutcome, RideMatcher};
pub use scoring::{calculate_match_score, distance_score, route_score, seat_score, time_score};
pub use time::{estimate_arrival, minutes_between, ClockTime, TimeParseError};
