use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;
use validator::Validate;

/// A rider's query: when they want to leave and roughly how far their route runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RideRequest {
    #[validate(length(min = 1))]
    #[serde(rename = "desiredTime", alias = "time")]
    pub desired_time: String,
    #[validate(range(min = 0.0))]
    #[serde(rename = "approximateDistance", alias = "distance")]
    pub approximate_distance: f64,
    #[serde(default)]
    pub destination: String,
}

impl RideRequest {
    pub fn new(desired_time: impl Into<String>, approximate_distance: f64) -> Self {
        Self {
            desired_time: desired_time.into(),
            approximate_distance,
            destination: String::new(),
        }
    }
}

/// A ride field the matcher needs was missing or had the wrong shape
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RideFieldError {
    #[error("ride must be a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    Missing(&'static str),

    #[error("field `{field}` must be {expected}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
    },
}

/// A driver's ride offering
///
/// The document is kept exactly as it was received; the values the matcher
/// scores on are read out of it once, when the ride is built. Serializing a
/// ride writes the original document back with no keys renamed, added or
/// recomputed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct CandidateRide {
    departure_time: String,
    distance: f64,
    total_seats: Option<i64>,
    filled_seats: Option<i64>,
    seats_available: Option<i64>,
    duration_minutes: Option<u32>,
    fields: Map<String, Value>,
}

impl CandidateRide {
    pub fn new(
        departure_time: impl Into<String>,
        distance: f64,
        total_seats: u32,
        filled_seats: u32,
    ) -> Self {
        let departure_time = departure_time.into();
        let mut fields = Map::new();
        fields.insert("time".to_string(), Value::from(departure_time.clone()));
        fields.insert("distance".to_string(), Value::from(distance));
        fields.insert("totalSeats".to_string(), Value::from(total_seats));
        fields.insert("filledSeats".to_string(), Value::from(filled_seats));

        Self {
            departure_time,
            distance,
            total_seats: Some(i64::from(total_seats)),
            filled_seats: Some(i64::from(filled_seats)),
            seats_available: None,
            duration_minutes: None,
            fields,
        }
    }

    /// Build a ride from one stored or submitted document
    pub fn from_document(document: &Value) -> Result<Self, RideFieldError> {
        match document {
            Value::Object(fields) => Self::try_from(fields.clone()),
            _ => Err(RideFieldError::NotAnObject),
        }
    }

    /// Attach an opaque pass-through field (driver, vehicle, price, id, ...)
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self.fields.insert("duration".to_string(), Value::from(minutes));
        self
    }

    pub fn with_seats_available(mut self, seats: i64) -> Self {
        self.seats_available = Some(seats);
        self.fields.insert("seatsAvailable".to_string(), Value::from(seats));
        self
    }

    pub fn departure_time(&self) -> &str {
        &self.departure_time
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn total_seats(&self) -> Option<i64> {
        self.total_seats
    }

    pub fn filled_seats(&self) -> Option<i64> {
        self.filled_seats
    }

    pub fn duration_minutes(&self) -> Option<u32> {
        self.duration_minutes
    }

    /// Remaining passenger capacity
    ///
    /// An explicit `seatsAvailable` wins; otherwise `totalSeats - filledSeats`
    /// with absent counts read as zero. Both counts are non-negative, so the
    /// difference cannot overflow.
    pub fn seats_available(&self) -> i64 {
        self.seats_available.unwrap_or_else(|| {
            self.total_seats.unwrap_or(0) - self.filled_seats.unwrap_or(0)
        })
    }

    /// The document as received
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The ride's `id` (or store `$id`) if the source supplied one
    pub fn id(&self) -> Option<&Value> {
        document_id(&self.fields)
    }
}

impl TryFrom<Map<String, Value>> for CandidateRide {
    type Error = RideFieldError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let (time_key, time) = ["time", "departureTime"]
            .into_iter()
            .find_map(|key| present(&fields, key).map(|value| (key, value)))
            .ok_or(RideFieldError::Missing("time"))?;
        let departure_time = time
            .as_str()
            .ok_or(RideFieldError::Invalid {
                field: time_key,
                expected: "a time string",
            })?
            .to_string();

        let distance = present(&fields, "distance")
            .ok_or(RideFieldError::Missing("distance"))?
            .as_f64()
            .ok_or(RideFieldError::Invalid {
                field: "distance",
                expected: "a number",
            })?;

        let duration_minutes = present(&fields, "duration")
            .map(|value| {
                value
                    .as_u64()
                    .and_then(|minutes| u32::try_from(minutes).ok())
                    .ok_or(RideFieldError::Invalid {
                        field: "duration",
                        expected: "a whole number of minutes",
                    })
            })
            .transpose()?;

        Ok(Self {
            departure_time,
            distance,
            total_seats: seat_count(&fields, "totalSeats")?,
            filled_seats: seat_count(&fields, "filledSeats")?,
            seats_available: whole_number(&fields, "seatsAvailable")?,
            duration_minutes,
            fields,
        })
    }
}

impl TryFrom<Value> for CandidateRide {
    type Error = RideFieldError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Self::try_from(fields),
            _ => Err(RideFieldError::NotAnObject),
        }
    }
}

impl Serialize for CandidateRide {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// `id`, falling back to the store's `$id`
pub fn document_id(fields: &Map<String, Value>) -> Option<&Value> {
    fields.get("id").or_else(|| fields.get("$id"))
}

// null is treated as absent
fn present<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|value| !value.is_null())
}

fn whole_number(
    fields: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<i64>, RideFieldError> {
    present(fields, key)
        .map(|value| {
            value.as_i64().ok_or(RideFieldError::Invalid {
                field: key,
                expected: "a whole number",
            })
        })
        .transpose()
}

fn seat_count(
    fields: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<i64>, RideFieldError> {
    match whole_number(fields, key) {
        Ok(Some(count)) if count < 0 => Err(RideFieldError::Invalid {
            field: key,
            expected: "a non-negative whole number",
        }),
        Err(_) => Err(RideFieldError::Invalid {
            field: key,
            expected: "a non-negative whole number",
        }),
        other => other,
    }
}

/// Per-component contribution to a ride's match score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub time_diff_minutes: i64,
    pub time_score: f64,
    pub route_score: f64,
    pub seat_score: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.time_score + self.route_score + self.seat_score
    }
}

/// A candidate ride that survived filtering, with its score attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRide {
    #[serde(flatten)]
    pub ride: CandidateRide,
    #[serde(rename = "matchScore")]
    pub match_score: f64,
    #[serde(rename = "estimatedArrival", skip_serializing_if = "Option::is_none")]
    pub estimated_arrival: Option<String>,
    #[serde(rename = "scoreBreakdown")]
    pub breakdown: ScoreBreakdown,
}

/// A candidate skipped because its own data could not be scored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRide {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub reason: String,
}

/// One step of the time-proximity score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBucket {
    pub within_minutes: i64,
    pub points: f64,
}

/// Scoring constants
///
/// `time_buckets` are checked in ascending `within_minutes` order; a
/// difference beyond the last bucket scores zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub time_buckets: Vec<TimeBucket>,
    pub max_distance_score: f64,
    pub route_multiplier: f64,
    pub seat_multiplier: f64,
    pub min_score: f64,
}

/// A scoring constant that would let a component go negative
#[derive(Debug, Clone, PartialEq, Error)]
#[error("scoring value `{name}` must be a non-negative finite number, got {value}")]
pub struct ScoringRulesError {
    pub name: &'static str,
    pub value: f64,
}

impl ScoringRules {
    /// Sort buckets so lookups can stop at the first hit
    pub fn normalized(mut self) -> Self {
        self.time_buckets
            .sort_by_key(|bucket| bucket.within_minutes);
        self
    }

    /// Check that every component stays non-negative
    pub fn validate(&self) -> Result<(), ScoringRulesError> {
        let constants = [
            ("max_distance_score", self.max_distance_score),
            ("route_multiplier", self.route_multiplier),
            ("seat_multiplier", self.seat_multiplier),
            ("min_score", self.min_score),
        ];
        let buckets = self.time_buckets.iter().flat_map(|bucket| {
            [
                ("time_buckets.within_minutes", bucket.within_minutes as f64),
                ("time_buckets.points", bucket.points),
            ]
        });

        match constants
            .into_iter()
            .chain(buckets)
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            Some((name, value)) => Err(ScoringRulesError { name, value }),
            None => Ok(()),
        }
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            time_buckets: vec![
                TimeBucket { within_minutes: 10, points: 30.0 },
                TimeBucket { within_minutes: 20, points: 20.0 },
                TimeBucket { within_minutes: 30, points: 10.0 },
            ],
            max_distance_score: 10.0,
            route_multiplier: 5.0,
            seat_multiplier: 5.0,
            min_score: 0.0,
        }
    }
}
