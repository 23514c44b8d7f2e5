//! Mock journey planner for running without network access.
//!
//! Loads canned `PlanJourney` responses from JSON files and serves them
//! as if they were live planner answers.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::domain::{JourneyData, RouteConfig, TravelWhen};

use super::convert::parse_plan_response;
use super::error::TransperthError;

/// Mock planner that serves responses from JSON files.
#[derive(Clone)]
pub struct MockTransperthClient {
    /// Raw response bodies, keyed by route slug.
    responses: Arc<HashMap<String, String>>,
}

impl MockTransperthClient {
    /// Create a mock by loading JSON files from a directory.
    ///
    /// Expects files named `{route-slug}.json` (e.g. `home_to_work.json`),
    /// each holding a raw `PlanJourney` response body.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, TransperthError> {
        let data_dir = data_dir.as_ref();
        let mut responses = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| TransperthError::ApiError {
            status: 0,
            message: format!("Failed to read mock data directory: {}", e),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| TransperthError::ApiError {
                status: 0,
                message: format!("Failed to read directory entry: {}", e),
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let slug = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| TransperthError::ApiError {
                    status: 0,
                    message: format!("Invalid filename: {:?}", path),
                })?;

            let body = std::fs::read_to_string(&path).map_err(|e| TransperthError::ApiError {
                status: 0,
                message: format!("Failed to read {:?}: {}", path, e),
            })?;

            responses.insert(slug.to_string(), body);
        }

        if responses.is_empty() {
            return Err(TransperthError::ApiError {
                status: 0,
                message: format!("No mock response files found in {:?}", data_dir),
            });
        }

        info!(count = responses.len(), dir = ?data_dir, "loaded mock planner responses");
        Ok(Self::from_responses(responses))
    }

    /// Create a mock from in-memory response bodies keyed by route slug.
    pub fn from_responses(responses: HashMap<String, String>) -> Self {
        Self {
            responses: Arc::new(responses),
        }
    }

    /// Plan a journey from the canned response for the route's slug.
    ///
    /// Mimics `TransperthClient::plan_journey`; the requested time is
    /// echoed back but does not change the canned options.
    pub async fn plan_journey(
        &self,
        route: &RouteConfig,
        when: &TravelWhen,
    ) -> Result<JourneyData, TransperthError> {
        let responses = &self.responses;
        let slug = route.slug();

        let body = responses
            .get(&slug)
            .ok_or_else(|| TransperthError::ApiError {
                status: 404,
                message: format!(
                    "No mock data for route {}. Available: {:?}",
                    slug,
                    responses.keys().collect::<Vec<_>>()
                ),
            })?;

        let options = parse_plan_response(body)?;
        Ok(JourneyData::new(
            options,
            route.from.name.as_str(),
            route.to.name.as_str(),
            when,
        ))
    }

    /// Slugs with canned responses.
    pub fn available_routes(&self) -> Vec<String> {
        let mut slugs: Vec<String> = self.responses.keys().cloned().collect();
        slugs.sort();
        slugs
    }
}
