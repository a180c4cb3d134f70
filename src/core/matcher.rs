use chrono::NaiveDate;
use serde_json::Value;
use std::borrow::Borrow;
use thiserror::Error;
use crate::models::{
    document_id, CandidateRide, MatchStatus, RejectedRide, RideRequest, ScoredRide,
    ScoringRules,
};
use crate::core::{
    filters::{has_open_seats, passes_score_threshold},
    scoring::calculate_match_score,
    time::{estimate_arrival, ClockTime, TimeParseError},
};

/// Errors raised for data the matcher cannot score
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("{0}")]
    InvalidTime(#[from] TimeParseError),

    #[error("distance must be a finite number, got {0}")]
    InvalidDistance(f64),
}

/// Per-call matching options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Day that bare clock times are placed on before comparing
    pub reference_date: NaiveDate,
    /// Maximum number of rides returned, applied after sorting
    pub limit: Option<usize>,
}

impl MatchOptions {
    pub fn for_date(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Result of the matching process
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub rides: Vec<ScoredRide>,
    pub rejected: Vec<RejectedRide>,
    pub total_candidates: usize,
}

impl MatchOutcome {
    pub fn status(&self) -> MatchStatus {
        if !self.rides.is_empty() {
            MatchStatus::Matched
        } else if !self.rejected.is_empty() {
            MatchStatus::Degraded
        } else {
            MatchStatus::Empty
        }
    }
}

/// Ranks candidate rides against a rider's request
///
/// # Pipeline Stages
/// 1. Seat-availability filter
/// 2. Time, route and seat scoring
/// 3. Score filter
/// 4. Stable descending sort (equal scores keep input order)
#[derive(Debug, Clone, Default)]
pub struct RideMatcher {
    rules: ScoringRules,
}

impl RideMatcher {
    pub fn new(rules: ScoringRules) -> Self {
        Self {
            rules: rules.normalized(),
        }
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Score, filter and rank `candidates` for `request`
    ///
    /// A request whose time or distance is malformed fails the whole call.
    /// A malformed candidate is skipped and reported in
    /// [`MatchOutcome::rejected`] so the rest can still be ranked. The
    /// inputs are never modified.
    pub fn match_rides(
        &self,
        request: &RideRequest,
        candidates: &[CandidateRide],
        options: &MatchOptions,
    ) -> Result<MatchOutcome, MatchError> {
        self.rank(request, candidates.iter().map(Ok::<_, RejectedRide>), options)
    }

    /// Same as [`RideMatcher::match_rides`], over raw ride documents
    ///
    /// A document missing a scoring field, or holding one of the wrong type,
    /// is rejected on its own like any other malformed candidate.
    pub fn match_documents(
        &self,
        request: &RideRequest,
        documents: &[Value],
        options: &MatchOptions,
    ) -> Result<MatchOutcome, MatchError> {
        let candidates = documents.iter().enumerate().map(|(index, document)| {
            CandidateRide::from_document(document).map_err(|e| RejectedRide {
                index,
                id: document.as_object().and_then(document_id).cloned(),
                reason: e.to_string(),
            })
        });

        self.rank(request, candidates, options)
    }

    fn rank<R, I>(
        &self,
        request: &RideRequest,
        candidates: I,
        options: &MatchOptions,
    ) -> Result<MatchOutcome, MatchError>
    where
        R: Borrow<CandidateRide>,
        I: ExactSizeIterator<Item = Result<R, RejectedRide>>,
    {
        let desired_time = ClockTime::parse(&request.desired_time)?;
        let approximate_distance = finite_distance(request.approximate_distance)?;

        let total_candidates = candidates.len();
        let mut rejected = Vec::new();

        let mut rides: Vec<ScoredRide> = candidates
            .enumerate()
            .filter_map(|(index, candidate)| {
                let candidate = match candidate {
                    Ok(candidate) => candidate,
                    Err(rejection) => {
                        tracing::warn!(
                            index,
                            id = ?rejection.id,
                            "Skipping unreadable ride: {}",
                            rejection.reason
                        );
                        rejected.push(rejection);
                        return None;
                    }
                };
                let ride: &CandidateRide = candidate.borrow();

                // Stage 1: Seat availability
                if !has_open_seats(ride) {
                    return None;
                }

                // Stage 2: Scoring
                match self.score_ride(desired_time, approximate_distance, ride, options.reference_date) {
                    Ok(scored) => Some(scored),
                    Err(e) => {
                        tracing::warn!(index, id = ?ride.id(), "Skipping malformed ride: {}", e);
                        rejected.push(RejectedRide {
                            index,
                            id: ride.id().cloned(),
                            reason: e.to_string(),
                        });
                        None
                    }
                }
            })
            // Stage 3: Score threshold
            .filter(|scored| passes_score_threshold(scored.match_score, self.rules.min_score))
            .collect();

        // Stage 4: Rank. sort_by is stable, so ties keep input order.
        rides.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));

        if let Some(limit) = options.limit {
            rides.truncate(limit);
        }

        tracing::debug!(
            "Matched {} rides from {} candidates ({} rejected)",
            rides.len(),
            total_candidates,
            rejected.len()
        );

        Ok(MatchOutcome {
            rides,
            rejected,
            total_candidates,
        })
    }

    fn score_ride(
        &self,
        desired_time: ClockTime,
        approximate_distance: f64,
        ride: &CandidateRide,
        reference_date: NaiveDate,
    ) -> Result<ScoredRide, MatchError> {
        let departure_time = ClockTime::parse(ride.departure_time())?;
        finite_distance(ride.distance())?;

        let breakdown = calculate_match_score(
            desired_time,
            approximate_distance,
            departure_time,
            ride,
            &self.rules,
            reference_date,
        );

        Ok(ScoredRide {
            ride: ride.clone(),
            match_score: breakdown.total(),
            estimated_arrival: ride
                .duration_minutes()
                .map(|minutes| estimate_arrival(departure_time, minutes).to_string()),
            breakdown,
        })
    }
}

fn finite_distance(distance: f64) -> Result<f64, MatchError> {
    if distance.is_finite() {
        Ok(distance)
    } else {
        Err(MatchError::InvalidDistance(distance))
    }
}

/// Rank rides with the default scoring rules
///
/// Malformed candidates are skipped; use [`RideMatcher::match_rides`] to see
/// which ones.
pub fn match_rides(
    request: &RideRequest,
    candidates: &[CandidateRide],
    reference_date: NaiveDate,
) -> Result<Vec<ScoredRide>, MatchError> {
    RideMatcher::default()
        .match_rides(request, candidates, &MatchOptions::for_date(reference_date))
        .map(|outcome| outcome.rides)
}
