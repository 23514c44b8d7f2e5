//! Askama templates for the dashboard.

use askama::Template;

use crate::coordinator::RouteSnapshot;
use crate::domain::RouteConfig;
use crate::sensor::SensorState;

/// Dashboard listing every route and its sensors.
#[derive(Template)]
#[template(path = "index.html")]
pub struct DashboardTemplate {
    pub routes: Vec<RouteView>,
    pub scan_interval_secs: u64,
    pub mock: bool,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Route view model.
#[derive(Debug, Clone)]
pub struct RouteView {
    pub name: String,
    pub slug: String,
    pub from: String,
    pub to: String,

    /// Last successful refresh, or empty if none yet
    pub last_success: String,
    pub error: String,
    pub sensors: Vec<SensorView>,
}

impl RouteView {
    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }

    pub fn from_route(
        route: &RouteConfig,
        snapshot: &RouteSnapshot,
        sensors: &[SensorState],
    ) -> Self {
        Self {
            name: route.name.clone(),
            slug: route.slug(),
            from: route.from.name.clone(),
            to: route.to.name.clone(),
            last_success: snapshot
                .last_success
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_default(),
            error: snapshot.last_error.clone().unwrap_or_default(),
            sensors: sensors.iter().map(SensorView::from_sensor).collect(),
        }
    }
}

/// One option slot.
#[derive(Debug, Clone)]
pub struct SensorView {
    pub entity_id: String,
    pub index: usize,
    pub available: bool,

    /// State text, or `unavailable`
    pub state: String,
    pub travel_time: String,
    pub legs: Vec<LegView>,
}

impl SensorView {
    pub fn from_sensor(sensor: &SensorState) -> Self {
        let attrs = &sensor.attributes;
        Self {
            entity_id: sensor.entity_id.clone(),
            index: attrs.option_index,
            available: sensor.is_available(),
            state: sensor
                .state
                .clone()
                .unwrap_or_else(|| "unavailable".to_string()),
            travel_time: attrs.travel_time.clone().unwrap_or_default(),
            legs: attrs
                .legs
                .iter()
                .flatten()
                .map(|leg| LegView {
                    kind: leg.kind.as_str(),
                    description: leg.description.clone(),
                    service_code: leg.service_code.clone().unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Leg view model.
#[derive(Debug, Clone)]
pub struct LegView {
    pub kind: &'static str,
    pub description: String,
    pub service_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JourneyData, JourneyOption, Leg, LegKind, Location, TravelWhen};
    use crate::sensor::sensors_for_route;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn route() -> RouteConfig {
        let from = Location::new("Home", None, "-31.9471,115.8264", None).unwrap();
        let to = Location::new("Work", None, "-31.9546,115.8588", None).unwrap();
        RouteConfig::new("Commute", from, to)
    }

    #[test]
    fn views_mark_unavailable_slots() {
        let when = TravelWhen {
            date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            time: NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
        };
        let data = JourneyData::new(
            vec![JourneyOption {
                index: 1,
                leave_time: "7:10am".into(),
                arrive_time: "7:40am".into(),
                travel_time: "30 mins".into(),
                legs: vec![Leg::new(LegKind::Train, "FRE (7 mins)", Some("FRE".into()))],
            }],
            "Home",
            "Work",
            &when,
        );
        let route = route();
        let snapshot = RouteSnapshot {
            data: Some(data.clone()),
            last_success: Some(Utc::now()),
            ..RouteSnapshot::default()
        };
        let sensors = sensors_for_route(&route, Some(&data));

        let view = RouteView::from_route(&route, &snapshot, &sensors);
        assert!(!view.has_error());
        assert_eq!(view.sensors.len(), 5);
        assert!(view.sensors[0].available);
        assert_eq!(view.sensors[0].state, "7:10am → 7:40am");
        assert_eq!(view.sensors[0].legs[0].kind, "train");
        assert!(!view.sensors[1].available);
        assert_eq!(view.sensors[1].state, "unavailable");
        assert!(view.sensors[1].legs.is_empty());
    }

    #[test]
    fn dashboard_renders() {
        let route = route();
        let snapshot = RouteSnapshot {
            last_error: Some("API error 503: down".into()),
            ..RouteSnapshot::default()
        };
        let sensors = sensors_for_route(&route, None);
        let html = DashboardTemplate {
            routes: vec![RouteView::from_route(&route, &snapshot, &sensors)],
            scan_interval_secs: 300,
            mock: true,
        }
        .render()
        .unwrap();

        assert!(html.contains("Commute"));
        assert!(html.contains("sensor.transperth_commute_option_5"));
        assert!(html.contains("API error 503: down"));
    }
}
