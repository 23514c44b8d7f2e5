//! Route set-up from journey-planner URLs.
//!
//! Planning a trip on the Transperth website leaves every route detail
//! in the results page's query string. Pasting that URL is the quickest
//! way to configure a route; this module turns it into a [`RouteDraft`]
//! and builds such URLs back for the results-page backend.

use reqwest::Url;
use serde::Serialize;
use tracing::debug;

use crate::domain::{
    DepartureOption, RouteConfig, TransportMode, TravelWhen, WalkSpeed,
};

/// Path segment every journey-planner page shares.
const PLANNER_PATH: &str = "Journey-Planner";

/// Path of the server-rendered results page.
const RESULTS_PATH: &str = "/Journey-Planner/Results";

/// Errors from URL parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuickConfigError {
    #[error("not a valid URL: {0}")]
    InvalidUrl(String),

    #[error("not a journey planner URL (path must contain {PLANNER_PATH})")]
    NotJourneyPlanner,

    #[error("journey planner URL has no route parameters")]
    NoParameters,
}

/// Route fields recovered from a journey-planner URL.
///
/// Every field is optional: explicit configuration fills the gaps and
/// overrides what the URL provides.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteDraft {
    pub from: Option<String>,
    pub from_type: Option<String>,
    pub from_position: Option<String>,
    pub from_locality: Option<String>,
    pub to: Option<String>,
    pub to_type: Option<String>,
    pub to_position: Option<String>,
    pub to_locality: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub departure_option: Option<DepartureOption>,
    pub transport_options: Option<Vec<TransportMode>>,
    pub walk_speed: Option<WalkSpeed>,
    pub max_connections: Option<u32>,
    pub max_walking_distance: Option<String>,
}

/// Parse a journey-planner URL into a route draft.
///
/// Unrecognised or malformed optional values (walk speed, departure
/// option, connection limit) are ignored rather than rejected; the
/// planner itself accepts URLs the site generated, and `Direct` has no
/// numeric equivalent.
///
/// # Examples
///
/// ```
/// use transperth_server::quick_config::parse_journey_url;
///
/// let draft = parse_journey_url(
///     "https://www.transperth.wa.gov.au/Journey-Planner/Results?from=Perth+Stn&time=08%3A15&bus=on",
/// )
/// .unwrap();
/// assert_eq!(draft.from.as_deref(), Some("Perth Stn"));
/// assert_eq!(draft.time.as_deref(), Some("08:15"));
/// ```
pub fn parse_journey_url(url: &str) -> Result<RouteDraft, QuickConfigError> {
    let parsed =
        Url::parse(url.trim()).map_err(|e| QuickConfigError::InvalidUrl(e.to_string()))?;

    if !parsed.path().contains(PLANNER_PATH) {
        return Err(QuickConfigError::NotJourneyPlanner);
    }

    let mut draft = RouteDraft::default();
    let mut modes = Vec::new();

    for (key, value) in parsed.query_pairs() {
        // Blank values count as absent, flags included
        if value.is_empty() {
            continue;
        }
        let value = value.into_owned();
        match key.as_ref() {
            "from" => draft.from = Some(value),
            "fromtype" => draft.from_type = Some(value),
            "fromposition" => draft.from_position = Some(value),
            "fromlocality" => draft.from_locality = Some(value),
            "to" => draft.to = Some(value),
            "totype" => draft.to_type = Some(value),
            "toposition" => draft.to_position = Some(value),
            "tolocality" => draft.to_locality = Some(value),
            "date" => draft.date = Some(value),
            "time" => draft.time = Some(value),
            "departureOption" => draft.departure_option = value.parse().ok(),
            "walkSpeed" => draft.walk_speed = value.parse().ok(),
            "maxConnections" => draft.max_connections = value.trim().parse().ok(),
            "maxWalkingDistance" => draft.max_walking_distance = Some(value),
            flag => {
                if let Some(mode) = TransportMode::ALL.into_iter().find(|m| m.url_flag() == flag) {
                    modes.push(mode);
                }
            }
        }
    }

    if !modes.is_empty() {
        draft.transport_options = Some(modes);
    }

    if draft == RouteDraft::default() {
        return Err(QuickConfigError::NoParameters);
    }

    debug!(?draft, "parsed journey planner URL");
    Ok(draft)
}

/// Build the results-page URL for a route at a resolved time.
pub fn results_url(
    base_url: &str,
    route: &RouteConfig,
    when: &TravelWhen,
) -> Result<Url, QuickConfigError> {
    let mut url = Url::parse(base_url.trim_end_matches('/'))
        .and_then(|base| base.join(RESULTS_PATH))
        .map_err(|e| QuickConfigError::InvalidUrl(e.to_string()))?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("from", &route.from.name)
            .append_pair("fromtype", &route.from.kind)
            .append_pair("fromposition", &route.from.position.to_string());
        if let Some(locality) = &route.from.locality {
            query.append_pair("fromlocality", locality);
        }
        query
            .append_pair("to", &route.to.name)
            .append_pair("totype", &route.to.kind)
            .append_pair("toposition", &route.to.position.to_string());
        if let Some(locality) = &route.to.locality {
            query.append_pair("tolocality", locality);
        }
        query
            .append_pair("date", &when.date_string())
            .append_pair("time", &when.time_string())
            .append_pair("departureOption", route.departure_option.url_value());
        for mode in route.transport.iter() {
            query.append_pair(mode.url_flag(), "on");
        }
        query.append_pair("walkSpeed", capitalized(route.walk_speed.as_str()).as_str());
        if let Some(max) = route.max_connections {
            query.append_pair("maxConnections", &max.to_string());
        }
        query.append_pair(
            "maxWalkingDistance",
            &route.max_walking_distance.metres().to_string(),
        );
    }

    Ok(url)
}

fn capitalized(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
