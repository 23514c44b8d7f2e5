//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::coordinator::RefreshSummary;
use crate::quick_config::{QuickConfigError, RouteDraft, parse_journey_url};
use crate::sensor::SensorState;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/health", get(health))
        .route("/api/sensors", get(list_sensors))
        .route("/api/sensors/:entity_id", get(get_sensor))
        .route("/api/routes", get(list_routes))
        .route("/api/routes/:name/refresh", post(refresh_route))
        .route("/api/refresh", post(refresh_all))
        .route("/api/quick-config", post(quick_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Dashboard of every route's sensors.
async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let coordinator = &state.coordinator;
    let mut routes = Vec::with_capacity(coordinator.routes().len());

    for route in coordinator.routes() {
        let snapshot = coordinator.snapshot(&route.name).await;
        let sensors = coordinator.route_sensors(route).await;
        routes.push(RouteView::from_route(route, &snapshot, &sensors));
    }

    let template = DashboardTemplate {
        routes,
        scan_interval_secs: coordinator.interval().secs(),
        mock: coordinator.source().is_mock(),
    };
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;

    Ok(Html(html))
}

/// All sensors, in route order.
async fn list_sensors(State(state): State<AppState>) -> Json<SensorsResponse> {
    Json(SensorsResponse {
        sensors: state.coordinator.sensors().await,
    })
}

/// One sensor by entity id.
async fn get_sensor(
    State(state): State<AppState>,
    Path(entity_id): Path<String>,
) -> Result<Json<SensorState>, AppError> {
    state
        .coordinator
        .sensors()
        .await
        .into_iter()
        .find(|s| s.entity_id == entity_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            message: format!("Unknown sensor: {}", entity_id),
        })
}

/// Refresh status of every route.
async fn list_routes(State(state): State<AppState>) -> Json<RoutesResponse> {
    let coordinator = &state.coordinator;
    let mut routes = Vec::with_capacity(coordinator.routes().len());

    for route in coordinator.routes() {
        let snapshot = coordinator.snapshot(&route.name).await;
        routes.push(RouteStatus::new(route, &snapshot));
    }

    Json(RoutesResponse {
        scan_interval_secs: coordinator.interval().secs(),
        mock: coordinator.source().is_mock(),
        routes,
    })
}

/// Refresh one route now, by name or slug.
async fn refresh_route(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RouteRefreshResponse>, AppError> {
    let coordinator = &state.coordinator;
    let route = coordinator.route(&name).ok_or_else(|| AppError::NotFound {
        message: format!("Unknown route: {}", name),
    })?;

    info!(route = %route.name, "manual refresh requested");
    let error = coordinator.refresh_route(route).await.err().map(|e| e.to_string());

    Ok(Json(RouteRefreshResponse {
        route: route.name.clone(),
        error,
        sensors: coordinator.route_sensors(route).await,
    }))
}

/// Refresh every route now.
async fn refresh_all(State(state): State<AppState>) -> Json<RefreshSummary> {
    info!("manual refresh of all routes requested");
    Json(state.coordinator.refresh_all().await)
}

/// Parse a journey-planner URL into route fields.
async fn quick_config(Json(req): Json<QuickConfigRequest>) -> Result<Json<RouteDraft>, AppError> {
    parse_journey_url(&req.url)
        .map(Json)
        .map_err(AppError::from)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<QuickConfigError> for AppError {
    fn from(e: QuickConfigError) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
