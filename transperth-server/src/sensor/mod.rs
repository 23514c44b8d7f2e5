//! Sensor projection of journey data.
//!
//! Every route publishes exactly [`MAX_JOURNEY_OPTIONS`] sensors, one
//! per option slot. A slot without an option (or a route whose last
//! refresh failed) is published as unavailable rather than dropped, so
//! entity ids stay stable across refreshes.

use serde::Serialize;

use crate::domain::{JourneyData, Leg, MAX_JOURNEY_OPTIONS, RouteConfig};

/// Prefix shared by every entity id.
const ENTITY_PREFIX: &str = "sensor.transperth";

/// Icon shown for every journey sensor.
pub const SENSOR_ICON: &str = "mdi:bus";

/// Entity id for an option slot: `sensor.transperth_<slug>_option_<n>`.
///
/// # Examples
///
/// ```
/// use transperth_server::sensor::entity_id;
///
/// assert_eq!(entity_id("home_to_work", 2), "sensor.transperth_home_to_work_option_2");
/// ```
pub fn entity_id(route_slug: &str, index: usize) -> String {
    format!("{ENTITY_PREFIX}_{route_slug}_option_{index}")
}

/// Published state of one sensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub entity_id: String,
    pub unique_id: String,
    pub friendly_name: String,
    pub icon: &'static str,

    /// `"<leave> → <arrive>"`, or `None` when unavailable
    pub state: Option<String>,

    pub attributes: SensorAttributes,
    pub device: DeviceInfo,
}

impl SensorState {
    pub fn is_available(&self) -> bool {
        self.state.is_some()
    }
}

/// Sensor attributes. Journey fields are present only while the option
/// exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorAttributes {
    pub route_name: String,
    pub option_index: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrive_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legs: Option<Vec<Leg>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leg_count: Option<usize>,
}

/// The device grouping a route's sensors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifier: String,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
}

impl DeviceInfo {
    fn for_route(route: &RouteConfig) -> Self {
        Self {
            identifier: format!("transperth_{}", route.slug()),
            name: format!("Transperth Journey Planner - {}", route.name),
            manufacturer: "Transperth",
            model: "Journey Planner",
        }
    }
}

/// Build one sensor for option slot `index` (1-based).
pub fn sensor_for_option(
    route: &RouteConfig,
    data: Option<&JourneyData>,
    index: usize,
) -> SensorState {
    let slug = route.slug();
    let option = data.and_then(|d| d.option(index));

    let mut attributes = SensorAttributes {
        route_name: route.name.clone(),
        option_index: index,
        leave_time: None,
        arrive_time: None,
        travel_time: None,
        from_location: None,
        to_location: None,
        date: None,
        time: None,
        legs: None,
        leg_count: None,
    };

    if let (Some(data), Some(option)) = (data, option) {
        attributes.leave_time = Some(option.leave_time.clone());
        attributes.arrive_time = Some(option.arrive_time.clone());
        attributes.travel_time = Some(option.travel_time.clone());
        attributes.from_location = Some(data.from_location.clone());
        attributes.to_location = Some(data.to_location.clone());
        attributes.date = Some(data.date.clone());
        attributes.time = Some(data.time.clone());
        attributes.legs = Some(option.legs.clone());
        attributes.leg_count = Some(option.leg_count());
    }

    SensorState {
        entity_id: entity_id(&slug, index),
        unique_id: format!("transperth_{slug}_option_{index}"),
        friendly_name: format!("Transperth {} Option {}", route.name, index),
        icon: SENSOR_ICON,
        state: option.map(|o| o.summary()),
        attributes,
        device: DeviceInfo::for_route(route),
    }
}

/// Build all sensors for a route; always [`MAX_JOURNEY_OPTIONS`] of them.
pub fn sensors_for_route(route: &RouteConfig, data: Option<&JourneyData>) -> Vec<SensorState> {
    (1..=MAX_JOURNEY_OPTIONS)
        .map(|index| sensor_for_option(route, data, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JourneyOption, LegKind, Location, TravelWhen};
    use chrono::{NaiveDate, NaiveTime};

    fn route() -> RouteConfig {
        let from = Location::new("Home", None, "-31.9471,115.8264", None).unwrap();
        let to = Location::new("Work", None, "-31.9546,115.8588", None).unwrap();
        RouteConfig::new("Home → Work", from, to)
    }

    fn data(count: usize) -> JourneyData {
        let options = (1..=count)
            .map(|index| JourneyOption {
                index,
                leave_time: format!("7:{}0am", index),
                arrive_time: format!("8:{}0am", index),
                travel_time: "60 mins".into(),
                legs: vec![
                    Leg::new(LegKind::Walk, "Stop 10432 (6 mins)", None),
                    Leg::new(LegKind::Bus, "81 81 Bus (24 mins)", Some("81".into())),
                ],
            })
            .collect();
        let when = TravelWhen {
            date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
        };
        JourneyData::new(options, "Home", "Work", &when)
    }

    #[test]
    fn always_five_sensors() {
        assert_eq!(sensors_for_route(&route(), None).len(), 5);
        assert_eq!(sensors_for_route(&route(), Some(&data(2))).len(), 5);
        assert_eq!(sensors_for_route(&route(), Some(&data(5))).len(), 5);
    }

    #[test]
    fn ids_and_names() {
        let sensors = sensors_for_route(&route(), None);
        assert_eq!(sensors[0].entity_id, "sensor.transperth_home_work_option_1");
        assert_eq!(sensors[4].entity_id, "sensor.transperth_home_work_option_5");
        assert_eq!(sensors[0].unique_id, "transperth_home_work_option_1");
        assert_eq!(sensors[0].friendly_name, "Transperth Home → Work Option 1");
        assert_eq!(sensors[0].icon, "mdi:bus");
        assert_eq!(
            sensors[0].device.name,
            "Transperth Journey Planner - Home → Work"
        );
    }

    #[test]
    fn available_sensor_state_and_attributes() {
        let data = data(2);
        let sensor = sensor_for_option(&route(), Some(&data), 2);

        assert!(sensor.is_available());
        assert_eq!(sensor.state.as_deref(), Some("7:20am → 8:20am"));
        let attrs = &sensor.attributes;
        assert_eq!(attrs.option_index, 2);
        assert_eq!(attrs.leave_time.as_deref(), Some("7:20am"));
        assert_eq!(attrs.from_location.as_deref(), Some("Home"));
        assert_eq!(attrs.date.as_deref(), Some("2026-02-02"));
        assert_eq!(attrs.time.as_deref(), Some("07:00"));
        assert_eq!(attrs.leg_count, Some(2));
    }

    #[test]
    fn missing_option_is_unavailable() {
        let data = data(2);
        let sensor = sensor_for_option(&route(), Some(&data), 3);

        assert!(!sensor.is_available());
        let json = serde_json::to_value(&sensor).unwrap();
        assert!(json["state"].is_null());
        assert_eq!(json["attributes"]["route_name"], "Home → Work");
        assert_eq!(json["attributes"]["option_index"], 3);
        assert!(json["attributes"].get("leave_time").is_none());
        assert!(json["attributes"].get("legs").is_none());
    }

    #[test]
    fn legs_serialize_with_type() {
        let data = data(1);
        let sensor = sensor_for_option(&route(), Some(&data), 1);
        let json = serde_json::to_value(&sensor).unwrap();

        let legs = &json["attributes"]["legs"];
        assert_eq!(legs[0]["type"], "walk");
        assert!(legs[0]["service_code"].is_null());
        assert_eq!(legs[1]["type"], "bus");
        assert_eq!(legs[1]["service_code"], "81");
        assert_eq!(json["attributes"]["leg_count"], 2);
    }
}
