//! 12-hour clock handling for ride times.
//!
//! Rides and requests carry bare "H:MM AM/PM" strings with no date. They are
//! placed on an explicitly supplied reference day before being compared, so
//! nothing in here reads the system clock.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// Error returned when a time-of-day string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time-of-day {input:?}: {reason}")]
pub struct TimeParseError {
    input: String,
    reason: &'static str,
}

impl TimeParseError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }
}

/// A wall-clock time of day parsed from 12-hour notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Parse `H:MM AM/PM` or `HH:MM AM/PM`
    ///
    /// The designator is case-insensitive and may follow the minutes with or
    /// without whitespace. Hour "12" maps to 0 before the PM adjustment, so
    /// "12:15 AM" is 00:15 and "12:15 PM" is 12:15.
    ///
    /// ```
    /// use carpool_match::core::time::ClockTime;
    ///
    /// assert_eq!(ClockTime::parse("9:05 am").unwrap().to_string(), "9:05 AM");
    /// assert_eq!(ClockTime::parse("12:30 PM").unwrap().to_string(), "12:30 PM");
    /// assert!(ClockTime::parse("13:00 PM").is_err());
    /// assert!(ClockTime::parse("09:00").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, TimeParseError> {
        let s = input.trim();

        let (hour_part, rest) = s
            .split_once(':')
            .ok_or_else(|| TimeParseError::new(input, "expected H:MM AM/PM"))?;

        if hour_part.is_empty()
            || hour_part.len() > 2
            || !hour_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(TimeParseError::new(input, "hour must be one or two digits"));
        }

        let minute_part = rest
            .get(..2)
            .filter(|m| m.bytes().all(|b| b.is_ascii_digit()))
            .ok_or_else(|| TimeParseError::new(input, "minutes must be two digits"))?;

        let is_pm = match rest[2..].trim_start().to_ascii_uppercase().as_str() {
            "AM" => false,
            "PM" => true,
            _ => return Err(TimeParseError::new(input, "expected AM or PM designator")),
        };

        let hour: u32 = hour_part
            .parse()
            .map_err(|_| TimeParseError::new(input, "hour must be one or two digits"))?;
        let minute: u32 = minute_part
            .parse()
            .map_err(|_| TimeParseError::new(input, "minutes must be two digits"))?;

        if hour > 12 {
            return Err(TimeParseError::new(input, "hour out of range for a 12-hour clock"));
        }

        let mut hour = if hour == 12 { 0 } else { hour };
        if is_pm {
            hour += 12;
        }

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| TimeParseError::new(input, "minutes out of range"))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Place this time on the given day
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.0)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Advance by a number of minutes, wrapping past midnight
    pub fn add_minutes(self, minutes: u32) -> Self {
        Self(self.0 + Duration::minutes(i64::from(minutes)))
    }
}

impl FromStr for ClockTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (is_pm, hour) = self.0.hour12();
        let designator = if is_pm { "PM" } else { "AM" };
        write!(f, "{}:{:02} {}", hour, self.0.minute(), designator)
    }
}

/// Absolute difference in whole minutes between two times on the same day
///
/// Both times land on `date`, so 11:55 PM and 12:05 AM are 1430 minutes
/// apart rather than 10.
#[inline]
pub fn minutes_between(a: ClockTime, b: ClockTime, date: NaiveDate) -> i64 {
    (a.on(date) - b.on(date)).num_minutes().abs()
}

/// Arrival time for a ride leaving at `departure` and taking `duration_minutes`
pub fn estimate_arrival(departure: ClockTime, duration_minutes: u32) -> ClockTime {
    departure.add_minutes(duration_minutes)
}
