//! Conversion from planner DTOs to domain types.

use tracing::{debug, warn};

use crate::domain::{JourneyOption, Leg, LegKind};

use super::error::TransperthError;
use super::types::{JourneyDto, PlanJourneyResponse, TripDto};

/// The `result` value of a successful planner response.
const RESULT_SUCCESS: &str = "success";

/// Title prefixes dropped from leg descriptions.
const TITLE_NOISE: [&str; 3] = ["Catch ", "Walk to ", "Walk "];

/// Parse a raw `PlanJourney` response body into journey options.
///
/// Fails if the body is not JSON or the planner did not report success.
/// Individual malformed journeys are skipped.
pub fn parse_plan_response(body: &str) -> Result<Vec<JourneyOption>, TransperthError> {
    let response: PlanJourneyResponse =
        serde_json::from_str(body).map_err(|e| TransperthError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

    match response.result.as_deref() {
        Some(RESULT_SUCCESS) => {}
        other => {
            return Err(TransperthError::Rejected {
                result: other.unwrap_or("missing").to_string(),
            });
        }
    }

    Ok(convert_journeys(response.data.as_deref().unwrap_or(&[])))
}

/// Convert the `data` array, skipping entries that fail to deserialize.
pub fn convert_journeys(journeys: &[serde_json::Value]) -> Vec<JourneyOption> {
    let mut options = Vec::with_capacity(journeys.len());

    for (position, raw) in journeys.iter().enumerate() {
        match serde_json::from_value::<JourneyDto>(raw.clone()) {
            Ok(dto) => options.push(convert_journey(&dto, position + 1)),
            Err(e) => warn!(position = position + 1, error = %e, "skipping malformed journey"),
        }
    }

    debug!(count = options.len(), "converted journey options");
    options
}

/// Convert one journey. `fallback_index` is used when `JnyNumber` is
/// missing or not a positive integer.
pub fn convert_journey(dto: &JourneyDto, fallback_index: usize) -> JourneyOption {
    let index = dto
        .jny_number
        .as_deref()
        .and_then(|n| n.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(fallback_index);

    let legs = dto
        .jny_trip_details
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(convert_trip)
        .collect();

    JourneyOption {
        index,
        leave_time: dto.jny_display_depart_time.clone().unwrap_or_default(),
        arrive_time: dto.jny_display_arrive_time.clone().unwrap_or_default(),
        travel_time: dto.jny_duration.clone().unwrap_or_default(),
        legs,
    }
}

/// Convert one trip into a leg.
pub fn convert_trip(trip: &TripDto) -> Leg {
    let vehicle = trip.trip_vehicle.as_deref().unwrap_or("");
    let title = trip.display_trip_title.as_deref().unwrap_or("");

    Leg::new(
        classify_trip(vehicle, title),
        describe_trip(trip),
        trip.route_code.clone(),
    )
}

/// Decide the leg kind from the vehicle name, falling back to the title.
///
/// Each kind is checked in turn against both the vehicle and the title,
/// so an explicit vehicle wins only against kinds checked after it.
/// CAT services only show up in titles. Anything unrecognised is a walk.
pub fn classify_trip(vehicle: &str, title: &str) -> LegKind {
    let vehicle = vehicle.trim().to_lowercase();
    let title = title.to_lowercase();

    for (name, kind) in [
        ("walk", LegKind::Walk),
        ("bus", LegKind::Bus),
        ("train", LegKind::Train),
        ("ferry", LegKind::Ferry),
    ] {
        if vehicle == name || title.contains(name) {
            return kind;
        }
    }

    if title.contains("cat") {
        return LegKind::Cat;
    }

    LegKind::Walk
}

/// Build the leg description: route code, cleaned title, `(duration)`.
fn describe_trip(trip: &TripDto) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(3);

    if let Some(code) = trip.route_code.as_deref().filter(|c| !c.trim().is_empty()) {
        parts.push(code.trim().to_string());
    }

    if let Some(title) = trip.display_trip_title.as_deref() {
        let cleaned = TITLE_NOISE
            .iter()
            .fold(title.to_string(), |acc, noise| acc.replace(noise, ""));
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            parts.push(cleaned.to_string());
        }
    }

    if let Some(duration) = trip
        .display_trip_duration
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        parts.push(format!("({})", duration.trim()));
    }

    if parts.is_empty() {
        return trip
            .display_trip_title
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| trip.trip_vehicle.as_deref().map(str::to_lowercase))
            .unwrap_or_default();
    }

    parts.join(" ")
}
