//! Request and response types for the JSON API.

use serde::{Deserialize, Serialize};

use crate::coordinator::RouteSnapshot;
use crate::domain::RouteConfig;
use crate::sensor::SensorState;

/// All published sensors.
#[derive(Debug, Serialize)]
pub struct SensorsResponse {
    pub sensors: Vec<SensorState>,
}

/// Refresh status of one route.
#[derive(Debug, Serialize)]
pub struct RouteStatus {
    pub name: String,
    pub slug: String,
    pub from: String,
    pub to: String,

    /// Options found by the last successful refresh
    pub option_count: usize,

    /// RFC 3339 timestamps
    pub last_attempt: Option<String>,
    pub last_success: Option<String>,
    pub last_error: Option<String>,
}

impl RouteStatus {
    pub fn new(route: &RouteConfig, snapshot: &RouteSnapshot) -> Self {
        Self {
            name: route.name.clone(),
            slug: route.slug(),
            from: route.from.name.clone(),
            to: route.to.name.clone(),
            option_count: snapshot.data.as_ref().map_or(0, |d| d.options().len()),
            last_attempt: snapshot.last_attempt.map(|t| t.to_rfc3339()),
            last_success: snapshot.last_success.map(|t| t.to_rfc3339()),
            last_error: snapshot.last_error.clone(),
        }
    }
}

/// Response for `GET /api/routes`.
#[derive(Debug, Serialize)]
pub struct RoutesResponse {
    pub scan_interval_secs: u64,

    /// Whether canned responses are being served
    pub mock: bool,

    pub routes: Vec<RouteStatus>,
}

/// Response for a single-route refresh.
///
/// A failed refresh still answers with the route's (now unavailable)
/// sensors; `error` says why.
#[derive(Debug, Serialize)]
pub struct RouteRefreshResponse {
    pub route: String,
    pub error: Option<String>,
    pub sensors: Vec<SensorState>,
}

/// Request body for `POST /api/quick-config`.
#[derive(Debug, Deserialize)]
pub struct QuickConfigRequest {
    pub url: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}
