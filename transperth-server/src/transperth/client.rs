//! Transperth journey planner HTTP client.
//!
//! Talks to the website the way its own journey planner page does: a GET
//! of the planner page for cookies and session tokens, then a JSON POST
//! to `PlanJourney`. The server-rendered results page is available as an
//! alternative backend for when the JSON endpoint misbehaves.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{JourneyData, JourneyOption, RouteConfig, TravelWhen};
use crate::quick_config::results_url;

use super::convert::parse_plan_response;
use super::error::TransperthError;
use super::html::parse_results_page;
use super::session::{SessionTokens, parse_session_page};
use super::types::PlanJourneyRequest;

/// Default base URL of the Transperth website.
pub const DEFAULT_BASE_URL: &str = "https://www.transperth.wa.gov.au";

/// Path of the journey planner page, relative to the base URL.
const PLANNER_PAGE_PATH: &str = "/Journey-Planner";

/// Path of the JSON endpoint, relative to the base URL.
const PLAN_JOURNEY_PATH: &str = "/API/SilverRailRestService/SilverRailService/PlanJourney";

/// Timeout for fetching the planner page.
const SESSION_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

/// How journeys are fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// JSON `PlanJourney` endpoint
    #[default]
    Api,
    /// Scrape the server-rendered results page
    ResultsPage,
}

/// Configuration for the journey planner client.
#[derive(Debug, Clone)]
pub struct TransperthConfig {
    /// Base URL of the website (defaults to production)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub backend: Backend,
}

impl Default for TransperthConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            backend: Backend::default(),
        }
    }
}

impl TransperthConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }
}

/// Journey planner client.
///
/// Keeps a cookie store so the session cookie set by the planner page
/// accompanies later `PlanJourney` calls.
#[derive(Debug, Clone)]
pub struct TransperthClient {
    http: reqwest::Client,
    base_url: String,
    backend: Backend,
}

impl TransperthClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TransperthConfig) -> Result<Self, TransperthError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-GB,en;q=0.6"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            backend: config.backend,
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Visit the planner page and scrape session tokens from it.
    ///
    /// Also primes the cookie store. Tokens the page does not reveal fall
    /// back to their defaults; only a failed request is an error.
    pub async fn fetch_session(&self) -> Result<SessionTokens, TransperthError> {
        let url = format!("{}{}", self.base_url, PLANNER_PAGE_PATH);
        let response = self
            .http
            .get(&url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .timeout(SESSION_TIMEOUT)
            .send()
            .await?;

        let body = ensure_success(response).await?.text().await?;
        let tokens = parse_session_page(&body);
        debug!(
            has_token = tokens.request_verification_token.is_some(),
            module_id = %tokens.module_id,
            tab_id = %tokens.tab_id,
            "fetched planner session"
        );
        Ok(tokens)
    }

    /// Plan a journey with the configured backend.
    ///
    /// `tokens` are only used by the JSON backend.
    pub async fn plan_journey(
        &self,
        route: &RouteConfig,
        when: &TravelWhen,
        tokens: &SessionTokens,
    ) -> Result<JourneyData, TransperthError> {
        let options = match self.backend {
            Backend::Api => self.plan_via_api(route, when, tokens).await?,
            Backend::ResultsPage => self.plan_via_results_page(route, when).await?,
        };

        debug!(
            route = %route.name,
            count = options.len(),
            date = %when.date_string(),
            time = %when.time_string(),
            "planned journey"
        );
        Ok(JourneyData::new(
            options,
            route.from.name.as_str(),
            route.to.name.as_str(),
            when,
        ))
    }

    async fn plan_via_api(
        &self,
        route: &RouteConfig,
        when: &TravelWhen,
        tokens: &SessionTokens,
    ) -> Result<Vec<JourneyOption>, TransperthError> {
        let url = format!("{}{}", self.base_url, PLAN_JOURNEY_PATH);
        let payload = PlanJourneyRequest::new(route, when);

        let response = self
            .http
            .post(&url)
            .headers(self.session_headers(tokens)?)
            .json(&payload)
            .send()
            .await?;

        let body = ensure_success(response).await?.text().await?;
        parse_plan_response(&body)
    }

    async fn plan_via_results_page(
        &self,
        route: &RouteConfig,
        when: &TravelWhen,
    ) -> Result<Vec<JourneyOption>, TransperthError> {
        let url = results_url(&self.base_url, route, when)
            .map_err(|e| TransperthError::PageStructure(e.to_string()))?;

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        let body = ensure_success(response).await?.text().await?;
        let options = parse_results_page(&body);
        if options.is_empty() {
            warn!(route = %route.name, "results page listed no journeys");
        }
        Ok(options)
    }

    /// Headers the CMS expects on `PlanJourney` calls.
    fn session_headers(&self, tokens: &SessionTokens) -> Result<HeaderMap, TransperthError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::REFERER,
            header_value(&format!("{}{}", self.base_url, PLANNER_PAGE_PATH))?,
        );
        headers.insert(header::ORIGIN, header_value(&self.base_url)?);

        if let Some(token) = &tokens.request_verification_token {
            headers.insert(
                HeaderName::from_static("requestverificationtoken"),
                header_value(token)?,
            );
        }
        headers.insert(
            HeaderName::from_static("moduleid"),
            header_value(&tokens.module_id)?,
        );
        headers.insert(
            HeaderName::from_static("tabid"),
            header_value(&tokens.tab_id)?,
        );
        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, TransperthError> {
    HeaderValue::from_str(value).map_err(|_| TransperthError::ApiError {
        status: 0,
        message: format!("Invalid header value: {value:?}"),
    })
}

/// Turn a non-success status into an `ApiError` carrying the body.
async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, TransperthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(TransperthError::ApiError {
        status: status.as_u16(),
        message: body.chars().take(500).collect(),
    })
}
