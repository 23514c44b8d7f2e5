//! Journey preference choices.
//!
//! Each choice has a config spelling (snake_case, as stored in the route
//! config) and, where it differs, a planner spelling used on the wire.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::DomainError;

/// Default maximum walking distance in metres.
pub const DEFAULT_MAX_WALKING_DISTANCE: u32 = 2000;

/// How the journey time is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartureOption {
    #[default]
    LeaveAfter,
    ArriveBy,
    EarliestTrip,
    LastTrip,
}

impl DepartureOption {
    pub const ALL: [DepartureOption; 4] = [
        DepartureOption::LeaveAfter,
        DepartureOption::ArriveBy,
        DepartureOption::EarliestTrip,
        DepartureOption::LastTrip,
    ];

    /// Config spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            DepartureOption::LeaveAfter => "leave_after",
            DepartureOption::ArriveBy => "arrive_by",
            DepartureOption::EarliestTrip => "earliest_trip",
            DepartureOption::LastTrip => "last_trip",
        }
    }

    /// Spelling used in journey-planner URLs.
    pub fn url_value(self) -> &'static str {
        match self {
            DepartureOption::LeaveAfter => "LeaveAfter",
            DepartureOption::ArriveBy => "ArriveBy",
            DepartureOption::EarliestTrip => "EarliestTrip",
            DepartureOption::LastTrip => "LastTrip",
        }
    }
}

impl FromStr for DepartureOption {
    type Err = DomainError;

    /// Accepts both the config and the URL spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        DepartureOption::ALL
            .into_iter()
            .find(|opt| opt.as_str() == s || opt.url_value() == s)
            .ok_or_else(|| DomainError::InvalidChoice {
                field: "departure option",
                value: s.to_string(),
                expected: "leave_after, arrive_by, earliest_trip, last_trip",
            })
    }
}

impl fmt::Display for DepartureOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A public transport mode the planner may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Bus,
    Train,
    Ferry,
    SchoolBus,
}

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Bus,
        TransportMode::Train,
        TransportMode::Ferry,
        TransportMode::SchoolBus,
    ];

    /// Config spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Bus => "bus",
            TransportMode::Train => "train",
            TransportMode::Ferry => "ferry",
            TransportMode::SchoolBus => "school_bus",
        }
    }

    /// Query parameter name in journey-planner URLs.
    pub fn url_flag(self) -> &'static str {
        match self {
            TransportMode::SchoolBus => "schoolbus",
            other => other.as_str(),
        }
    }
}

impl FromStr for TransportMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TransportMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| DomainError::InvalidChoice {
                field: "transport mode",
                value: s.to_string(),
                expected: "bus, train, ferry, school_bus",
            })
    }
}

/// The set of transport modes a route may use.
///
/// Never empty: an empty selection means bus and train.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TransportModes(Vec<TransportMode>);

impl TransportModes {
    /// Build a mode set, sorted and deduplicated.
    ///
    /// # Examples
    ///
    /// ```
    /// use transperth_server::domain::{TransportMode, TransportModes};
    ///
    /// let modes = TransportModes::new([]);
    /// assert!(modes.contains(TransportMode::Bus));
    /// assert!(modes.contains(TransportMode::Train));
    /// assert!(!modes.contains(TransportMode::Ferry));
    /// ```
    pub fn new(modes: impl IntoIterator<Item = TransportMode>) -> Self {
        let mut modes: Vec<_> = modes.into_iter().collect();
        modes.sort();
        modes.dedup();
        if modes.is_empty() {
            return Self::default();
        }
        Self(modes)
    }

    pub fn contains(&self, mode: TransportMode) -> bool {
        self.0.contains(&mode)
    }

    pub fn iter(&self) -> impl Iterator<Item = TransportMode> + '_ {
        self.0.iter().copied()
    }
}

impl Default for TransportModes {
    fn default() -> Self {
        Self(vec![TransportMode::Bus, TransportMode::Train])
    }
}

/// Walking pace assumed by the planner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl WalkSpeed {
    pub fn as_str(self) -> &'static str {
        match self {
            WalkSpeed::Slow => "slow",
            WalkSpeed::Normal => "normal",
            WalkSpeed::Fast => "fast",
        }
    }

    /// Spelling expected by the planner API.
    pub fn api_value(self) -> &'static str {
        match self {
            WalkSpeed::Slow => "SLOW",
            WalkSpeed::Normal => "NORMAL",
            WalkSpeed::Fast => "FAST",
        }
    }
}

impl FromStr for WalkSpeed {
    type Err = DomainError;

    /// Case-insensitive, since planner URLs use `Normal`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(WalkSpeed::Slow),
            "normal" => Ok(WalkSpeed::Normal),
            "fast" => Ok(WalkSpeed::Fast),
            _ => Err(DomainError::InvalidChoice {
                field: "walk speed",
                value: s.to_string(),
                expected: "slow, normal, fast",
            }),
        }
    }
}

/// Maximum walking distance in metres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WalkingDistance(u32);

impl WalkingDistance {
    pub fn metres(self) -> u32 {
        self.0
    }
}

impl Default for WalkingDistance {
    fn default() -> Self {
        Self(DEFAULT_MAX_WALKING_DISTANCE)
    }
}

impl From<u32> for WalkingDistance {
    fn from(metres: u32) -> Self {
        Self(metres)
    }
}

impl FromStr for WalkingDistance {
    type Err = DomainError;

    /// Parses `"2000"` or `"2000m"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use transperth_server::domain::WalkingDistance;
    ///
    /// let d: WalkingDistance = "1500M".parse().unwrap();
    /// assert_eq!(d.metres(), 1500);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_end_matches(['m', 'M']).trim();
        digits
            .parse()
            .map(WalkingDistance)
            .map_err(|_| DomainError::InvalidDistance(s.to_string()))
    }
}
