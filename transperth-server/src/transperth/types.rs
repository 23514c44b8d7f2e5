//! Journey planner wire types.
//!
//! These map directly to the `PlanJourney` JSON endpoint. The endpoint is
//! undocumented, so response fields are all optional and display values
//! are accepted as either strings or numbers.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{RouteConfig, TransportMode, TravelWhen};

/// Note codes the planner web page asks for.
const RETURN_NOTE_CODES: &str = "DV,LM,CM,JC,TC,BG,FG,LK";

/// Request body for `PlanJourney`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlanJourneyRequest {
    pub from_location_name: String,
    pub from_location_type: String,
    pub from_location_position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_location_locality: Option<String>,
    pub to_location_name: String,
    pub to_location_type: String,
    pub to_location_position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_location_locality: Option<String>,
    pub journey_date: String,
    pub journey_time: String,
    pub transport_bus: bool,
    pub transport_train: bool,
    pub transport_ferry: bool,
    pub transport_school_bus: bool,
    pub walk_speed: String,
    pub max_connections: String,
    pub max_walking_distance: String,
    pub return_notes: bool,
    pub return_note_codes: String,
    pub max_journeys: String,
}

impl PlanJourneyRequest {
    /// Build the request for a route at a resolved time.
    pub fn new(route: &RouteConfig, when: &TravelWhen) -> Self {
        Self {
            from_location_name: route.from.name.clone(),
            from_location_type: route.from.kind.clone(),
            from_location_position: route.from.position.to_string(),
            from_location_locality: route.from.locality.clone(),
            to_location_name: route.to.name.clone(),
            to_location_type: route.to.kind.clone(),
            to_location_position: route.to.position.to_string(),
            to_location_locality: route.to.locality.clone(),
            journey_date: when.date_string(),
            journey_time: when.time_string(),
            transport_bus: route.transport.contains(TransportMode::Bus),
            transport_train: route.transport.contains(TransportMode::Train),
            transport_ferry: route.transport.contains(TransportMode::Ferry),
            transport_school_bus: route.transport.contains(TransportMode::SchoolBus),
            walk_speed: route.walk_speed.api_value().to_string(),
            max_connections: route
                .max_connections
                .map_or_else(|| "-1".to_string(), |n| n.to_string()),
            max_walking_distance: route.max_walking_distance.metres().to_string(),
            return_notes: true,
            return_note_codes: RETURN_NOTE_CODES.to_string(),
            max_journeys: crate::domain::MAX_JOURNEY_OPTIONS.to_string(),
        }
    }
}

/// Response envelope from `PlanJourney`.
///
/// Journeys are kept as raw JSON so one malformed entry can be skipped
/// without losing the rest.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanJourneyResponse {
    pub result: Option<String>,

    #[serde(default)]
    pub data: Option<Vec<serde_json::Value>>,
}

/// One journey in the `data` array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JourneyDto {
    #[serde(default, deserialize_with = "display_value")]
    pub jny_display_depart_time: Option<String>,

    #[serde(default, deserialize_with = "display_value")]
    pub jny_display_arrive_time: Option<String>,

    /// e.g. `"69 mins"`
    #[serde(default, deserialize_with = "display_value")]
    pub jny_duration: Option<String>,

    /// 1-based journey number
    #[serde(default, deserialize_with = "display_value")]
    pub jny_number: Option<String>,

    #[serde(default)]
    pub jny_trip_details: Option<Vec<TripDto>>,
}

/// One leg in `JnyTripDetails`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TripDto {
    /// `Walk`, `Bus`, `Train`, `Ferry`
    #[serde(default, deserialize_with = "display_value")]
    pub trip_vehicle: Option<String>,

    #[serde(default, deserialize_with = "display_value")]
    pub route_code: Option<String>,

    /// e.g. `"Catch 950 Bus to Morley"`, `"Walk 501m"`
    #[serde(default, deserialize_with = "display_value")]
    pub display_trip_title: Option<String>,

    #[serde(default, deserialize_with = "display_value")]
    pub display_trip_duration: Option<String>,
}

/// Accept a string, number, boolean, or null as an optional display string.
fn display_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde_json::Value;

    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a display value, found {other}"
            )));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Location, TransportModes};
    use chrono::{NaiveDate, NaiveTime};

    fn route() -> RouteConfig {
        let from = Location::new(
            "1 Hay St",
            None,
            "-31.9546,115.8588",
            Some("Perth"),
        )
        .unwrap();
        let to = Location::new("Curtin University", Some("stops"), "-32.0062,115.8944", None)
            .unwrap();
        RouteConfig::new("Uni", from, to)
    }

    fn when() -> TravelWhen {
        TravelWhen {
            date: NaiveDate::from_ymd_opt(2026, 2, 16).unwrap(),
            time: NaiveTime::from_hms_opt(7, 45, 0).unwrap(),
        }
    }

    #[test]
    fn request_field_names_and_defaults() {
        let json = serde_json::to_value(PlanJourneyRequest::new(&route(), &when())).unwrap();

        assert_eq!(json["FromLocationName"], "1 Hay St");
        assert_eq!(json["FromLocationType"], "psma_addresses");
        assert_eq!(json["FromLocationPosition"], "-31.9546,115.8588");
        assert_eq!(json["FromLocationLocality"], "Perth");
        assert!(json.get("ToLocationLocality").is_none());
        assert_eq!(json["ToLocationType"], "stops");
        assert_eq!(json["JourneyDate"], "2026-02-16");
        assert_eq!(json["JourneyTime"], "07:45");
        assert_eq!(json["TransportBus"], true);
        assert_eq!(json["TransportTrain"], true);
        assert_eq!(json["TransportFerry"], false);
        assert_eq!(json["TransportSchoolBus"], false);
        assert_eq!(json["WalkSpeed"], "NORMAL");
        assert_eq!(json["MaxConnections"], "-1");
        assert_eq!(json["MaxWalkingDistance"], "2000");
        assert_eq!(json["ReturnNotes"], true);
        assert_eq!(json["ReturnNoteCodes"], "DV,LM,CM,JC,TC,BG,FG,LK");
        assert_eq!(json["MaxJourneys"], "5");
    }

    #[test]
    fn request_uses_route_preferences() {
        let mut route = route();
        route.transport = TransportModes::new([TransportMode::Ferry]);
        route.max_connections = Some(1);
        route.max_walking_distance = 800.into();

        let req = PlanJourneyRequest::new(&route, &when());
        assert!(!req.transport_bus);
        assert!(!req.transport_train);
        assert!(req.transport_ferry);
        assert_eq!(req.max_connections, "1");
        assert_eq!(req.max_walking_distance, "800");
    }

    #[test]
    fn journey_dto_accepts_loose_values() {
        let dto: JourneyDto = serde_json::from_value(serde_json::json!({
            "JnyDisplayDepartTime": "7:42am",
            "JnyDisplayArriveTime": null,
            "JnyDuration": 69,
            "JnyNumber": 2,
        }))
        .unwrap();

        assert_eq!(dto.jny_display_depart_time.as_deref(), Some("7:42am"));
        assert_eq!(dto.jny_display_arrive_time, None);
        assert_eq!(dto.jny_duration.as_deref(), Some("69"));
        assert_eq!(dto.jny_number.as_deref(), Some("2"));
        assert!(dto.jny_trip_details.is_none());
    }

    #[test]
    fn journey_dto_rejects_nested_objects_in_display_fields() {
        let result: Result<JourneyDto, _> = serde_json::from_value(serde_json::json!({
            "JnyDisplayDepartTime": { "h": 7 },
        }));
        assert!(result.is_err());
    }
}
