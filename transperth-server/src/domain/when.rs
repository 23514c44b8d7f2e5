//! When a route is travelled.
//!
//! Routes store a *relative* date (`today`, `tomorrow`) or a fixed one,
//! and an optional time. Both are resolved against the current local
//! time on every refresh, so a route configured for "today, now" keeps
//! tracking the next departures.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::DomainError;

/// Date format used by the planner.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time format used by the planner.
pub const TIME_FORMAT: &str = "%H:%M";

/// The configured travel date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TravelDate {
    #[default]
    Today,
    Tomorrow,
    On(NaiveDate),
}

impl TravelDate {
    /// Resolve against the current local date.
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            TravelDate::Today => today,
            TravelDate::Tomorrow => today.checked_add_days(Days::new(1)).unwrap_or(today),
            TravelDate::On(date) => date,
        }
    }
}

impl FromStr for TravelDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "today" => Ok(TravelDate::Today),
            "tomorrow" => Ok(TravelDate::Tomorrow),
            other => NaiveDate::parse_from_str(other, DATE_FORMAT)
                .map(TravelDate::On)
                .map_err(|_| DomainError::InvalidDate(s.to_string())),
        }
    }
}

impl fmt::Display for TravelDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelDate::Today => f.write_str("today"),
            TravelDate::Tomorrow => f.write_str("tomorrow"),
            TravelDate::On(date) => write!(f, "{}", date.format(DATE_FORMAT)),
        }
    }
}

impl Serialize for TravelDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse an `HH:MM` travel time. Blank means "now".
///
/// # Examples
///
/// ```
/// use transperth_server::domain::parse_travel_time;
///
/// assert!(parse_travel_time("07:30").unwrap().is_some());
/// assert!(parse_travel_time("").unwrap().is_none());
/// assert!(parse_travel_time("7.30am").is_err());
/// ```
pub fn parse_travel_time(s: &str) -> Result<Option<NaiveTime>, DomainError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .map(Some)
        .map_err(|_| DomainError::InvalidTime(s.to_string()))
}

/// A fully resolved query date and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TravelWhen {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

impl TravelWhen {
    /// Resolve a configured date and optional time against `now`.
    pub fn resolve(date: TravelDate, time: Option<NaiveTime>, now: NaiveDateTime) -> Self {
        Self {
            date: date.resolve(now.date()),
            time: time.unwrap_or_else(|| now.time()),
        }
    }

    /// Date as the planner expects it (`YYYY-MM-DD`).
    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Time as the planner expects it (`HH:MM`).
    pub fn time_string(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }
}
