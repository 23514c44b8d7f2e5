//! Journey options returned by the planner.

use super::{Leg, TravelWhen};

/// Maximum number of journey options kept per route.
pub const MAX_JOURNEY_OPTIONS: usize = 5;

/// One candidate itinerary.
///
/// Times are display strings exactly as the planner renders them
/// (e.g. `"7:42am"`, `"69 mins"`); they are shown to users, never
/// compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyOption {
    /// 1-based position in the planner's result list
    pub index: usize,
    pub leave_time: String,
    pub arrive_time: String,
    pub travel_time: String,

    /// Legs in the order travelled
    pub legs: Vec<Leg>,
}

impl JourneyOption {
    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// Number of vehicle boardings, not counting walks.
    pub fn boardings(&self) -> usize {
        self.legs.iter().filter(|leg| !leg.is_walk()).count()
    }

    /// Sensor state text: `"<leave> → <arrive>"`.
    pub fn summary(&self) -> String {
        format!("{} → {}", self.leave_time, self.arrive_time)
    }
}

/// The result of one planner query for a route.
///
/// # Invariants
///
/// - At most [`MAX_JOURNEY_OPTIONS`] options
/// - Options keep the planner's order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyData {
    options: Vec<JourneyOption>,
    pub from_location: String,
    pub to_location: String,

    /// Query date, `YYYY-MM-DD`
    pub date: String,

    /// Query time, `HH:MM`
    pub time: String,
}

impl JourneyData {
    /// Build journey data, dropping options beyond the cap.
    pub fn new(
        mut options: Vec<JourneyOption>,
        from_location: impl Into<String>,
        to_location: impl Into<String>,
        when: &TravelWhen,
    ) -> Self {
        options.truncate(MAX_JOURNEY_OPTIONS);
        Self {
            options,
            from_location: from_location.into(),
            to_location: to_location.into(),
            date: when.date_string(),
            time: when.time_string(),
        }
    }

    pub fn options(&self) -> &[JourneyOption] {
        &self.options
    }

    /// Look up an option by its 1-based sensor index.
    pub fn option(&self, index: usize) -> Option<&JourneyOption> {
        index.checked_sub(1).and_then(|i| self.options.get(i))
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
