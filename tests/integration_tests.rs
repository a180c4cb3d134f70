// Integration tests for Carpool Match

use carpool_match::core::{match_rides, MatchOptions, RideMatcher};
use carpool_match::models::{CandidateRide, MatchStatus, RideRequest};
use chrono::NaiveDate;
use serde_json::json;

const EPSILON: f64 = 1e-9;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
}

fn request() -> RideRequest {
    RideRequest {
        desired_time: "09:00 AM".to_string(),
        approximate_distance: 7.0,
        destination: "Main Campus".to_string(),
    }
}

fn ride(id: &str, time: &str, distance: f64, total_seats: u32, filled_seats: u32) -> CandidateRide {
    CandidateRide::new(time, distance, total_seats, filled_seats).with_field("id", id)
}

fn only(rides: &[carpool_match::ScoredRide]) -> &carpool_match::ScoredRide {
    assert_eq!(rides.len(), 1, "expected a single ride, got {}", rides.len());
    &rides[0]
}

#[test]
fn test_empty_candidates_return_empty() {
    let rides = match_rides(&request(), &[], day()).unwrap();
    assert!(rides.is_empty());
}

#[test]
fn test_full_ride_never_returned() {
    // Perfect time and distance, but no seats left
    let candidates = vec![ride("full", "09:00 AM", 7.0, 4, 4)];

    let rides = match_rides(&request(), &candidates, day()).unwrap();

    assert!(rides.is_empty());
}

#[test]
fn test_time_buckets() {
    for (time, expected) in [("09:05 AM", 30.0), ("09:15 AM", 20.0), ("09:25 AM", 10.0), ("09:40 AM", 0.0)] {
        let candidates = vec![ride("r", time, 7.0, 2, 1)];
        let rides = match_rides(&request(), &candidates, day()).unwrap();

        assert_eq!(only(&rides).breakdown.time_score, expected, "time {}", time);
    }
}

#[test]
fn test_distance_scoring() {
    for (distance, expected) in [(7.2, 49.0), (0.0, 15.0), (20.0, 0.0)] {
        let candidates = vec![ride("r", "09:00 AM", distance, 2, 1)];
        let rides = match_rides(&request(), &candidates, day()).unwrap();

        let route_score = only(&rides).breakdown.route_score;
        assert!((route_score - expected).abs() < EPSILON, "distance {}: got {}", distance, route_score);
    }
}

#[test]
fn test_ranking_order() {
    // A: 2 seats, 5 min, 0.2 km off -> 30 + 49 + 10 = 89
    // B: 1 seat, 15 min, 7 km off   -> 20 + 15 + 5  = 40
    let candidates = vec![
        ride("B", "09:15 AM", 0.0, 2, 1),
        ride("A", "09:05 AM", 7.2, 3, 1),
    ];

    let rides = match_rides(&request(), &candidates, day()).unwrap();

    assert_eq!(rides.len(), 2);
    assert_eq!(rides[0].ride.id(), Some(&json!("A")));
    assert_eq!(rides[1].ride.id(), Some(&json!("B")));
    assert!((rides[0].match_score - 89.0).abs() < EPSILON);
    assert!((rides[1].match_score - 40.0).abs() < EPSILON);
}

#[test]
fn test_more_seats_rank_higher() {
    let candidates = vec![
        ride("one", "09:10 AM", 6.0, 4, 3),
        ride("three", "09:10 AM", 6.0, 4, 1),
    ];

    let rides = match_rides(&request(), &candidates, day()).unwrap();

    assert_eq!(rides[0].ride.id(), Some(&json!("three")));
    assert_eq!(rides[0].breakdown.seat_score, 15.0);
    assert_eq!(rides[1].breakdown.seat_score, 5.0);
    assert!((rides[0].match_score - rides[1].match_score - 10.0).abs() < EPSILON);
}

#[test]
fn test_commute_feed_end_to_end() {
    let feed = json!([
        { "id": 1, "driver": "Rahul Sharma", "vehicle": "Maruti Swift", "time": "09:05 AM",
          "distance": 7.2, "filledSeats": 1, "totalSeats": 3, "price": 45, "verified": true, "duration": 45 },
        { "id": 2, "driver": "Ananya Iyer", "vehicle": "Honda City", "time": "09:15 AM",
          "distance": 9.0, "filledSeats": 0, "totalSeats": 1, "price": 25, "verified": true, "duration": 35 },
        { "id": 3, "driver": "Vikram Patel", "vehicle": "Hyundai Creta", "time": "09:40 AM",
          "distance": 0.0, "filledSeats": 1, "totalSeats": 4, "price": 60, "verified": true, "duration": 55 },
        { "id": 4, "driver": "Sneha Kapoor", "vehicle": "Tata Nexon", "time": "08:50 AM",
          "distance": 5.5, "filledSeats": 2, "totalSeats": 4, "price": 35, "verified": true, "duration": 50 },
        { "id": 5, "driver": "Karan Mehta", "vehicle": "Kia Seltos", "time": "09:00 AM",
          "distance": 7.0, "filledSeats": 4, "totalSeats": 4, "price": 40 }
    ]);
    let candidates: Vec<CandidateRide> = serde_json::from_value(feed).unwrap();

    let outcome = RideMatcher::default()
        .match_rides(&request(), &candidates, &MatchOptions::for_date(day()))
        .unwrap();

    // 1: 30 + 49 + 10 = 89
    // 4: 30 + 42.5 + 10 = 82.5
    // 2: 20 + 40 + 5 = 65
    // 3: 0 + 15 + 15 = 30
    let ids: Vec<_> = outcome.rides.iter().filter_map(|r| r.ride.id().cloned()).collect();
    assert_eq!(ids, vec![json!(1), json!(4), json!(2), json!(3)]);
    assert_eq!(outcome.total_candidates, 5);
    assert_eq!(outcome.status(), MatchStatus::Matched);

    let top = serde_json::to_value(&outcome.rides[0]).unwrap();
    assert_eq!(top["driver"], "Rahul Sharma");
    assert_eq!(top["vehicle"], "Maruti Swift");
    assert_eq!(top["time"], "09:05 AM");
    assert_eq!(top["filledSeats"], 1);
    assert!(top.get("seatsAvailable").is_none());
    assert_eq!(top["estimatedArrival"], "9:50 AM");
    assert_eq!(top["scoreBreakdown"]["timeScore"], 30.0);
    assert!((top["matchScore"].as_f64().unwrap() - 89.0).abs() < EPSILON);
}

#[test]
fn test_input_is_not_modified() {
    let candidates = vec![
        ride("a", "09:05 AM", 7.2, 3, 1),
        ride("b", "10:05 AM", 1.0, 2, 2),
    ];
    let before = candidates.clone();

    let _ = match_rides(&request(), &candidates, day()).unwrap();

    assert_eq!(candidates, before);
}

#[test]
fn test_reference_date_does_not_change_scores() {
    let candidates = vec![ride("a", "09:25 AM", 4.0, 3, 1)];

    let monday = match_rides(&request(), &candidates, day()).unwrap();
    let leap_day = match_rides(&request(), &candidates, NaiveDate::from_ymd_opt(2028, 2, 29).unwrap()).unwrap();

    assert_eq!(monday, leap_day);
}

#[test]
fn test_submitted_documents_come_back_as_sent() {
    let feed = vec![
        json!({ "id": "aliased", "departureTime": "9:05 AM", "distance": 7.2,
                "totalSeats": 4, "filledSeats": 1, "seatsAvailable": 1, "driver": "Rahul Sharma" }),
        json!({ "id": "sparse", "time": "9:10 AM", "distance": 6.0, "seatsAvailable": 2 }),
        json!({ "id": "broken", "time": 905, "distance": 7.0, "totalSeats": 2 }),
    ];

    let outcome = RideMatcher::default()
        .match_documents(&request(), &feed, &MatchOptions::for_date(day()))
        .unwrap();

    assert_eq!(outcome.rides.len(), 2);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].id, Some(json!("broken")));

    for scored in &outcome.rides {
        let original = feed
            .iter()
            .find(|doc| Some(&doc["id"]) == scored.ride.id())
            .unwrap();
        let mut written = serde_json::to_value(scored).unwrap();
        let written = written.as_object_mut().unwrap();
        written.remove("matchScore");
        written.remove("scoreBreakdown");
        written.remove("estimatedArrival");

        assert_eq!(&serde_json::Value::Object(written.clone()), original);
    }
}
