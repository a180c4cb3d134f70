// Criterion benchmarks for Carpool Match

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use carpool_match::core::{time::ClockTime, MatchOptions, RideMatcher};
use carpool_match::models::{CandidateRide, RideRequest};
use chrono::NaiveDate;

fn create_candidate(id: usize) -> CandidateRide {
    let minute = id % 60;
    let hour = 8 + (id / 60) % 3;
    CandidateRide::new(
        format!("{}:{:02} AM", hour, minute),
        (id % 25) as f64 * 0.5,
        4,
        (id % 5) as u32,
    )
    .with_field("id", id)
    .with_field("driver", format!("Driver {}", id))
}

fn bench_parse_time(c: &mut Criterion) {
    c.bench_function("parse_clock_time", |b| {
        b.iter(|| ClockTime::parse(black_box("09:05 AM")));
    });
}

fn bench_matching(c: &mut Criterion) {
    let matcher = RideMatcher::default();
    let request = RideRequest::new("09:00 AM", 7.0);
    let options = MatchOptions::for_date(NaiveDate::from_ymd_opt(2024, 9, 2).unwrap());

    let mut group = c.benchmark_group("matching");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let candidates: Vec<CandidateRide> = (0..*candidate_count).map(create_candidate).collect();

        group.bench_with_input(
            BenchmarkId::new("match_rides", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| {
                    matcher.match_rides(
                        black_box(&request),
                        black_box(&candidates),
                        black_box(&options),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_parse_time, bench_matching);

criterion_main!(benches);
