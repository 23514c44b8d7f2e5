//! Session caching for the journey planner client.
//!
//! Fetching the planner page for fresh tokens on every refresh doubles
//! the request count, so tokens are cached for a while and shared by all
//! routes. A rejected request drops the cached tokens; the next refresh
//! fetches new ones.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::{debug, warn};

use crate::domain::{JourneyData, RouteConfig, TravelWhen};
use crate::transperth::{Backend, SessionTokens, TransperthClient, TransperthError};

/// Configuration for the session cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long fetched tokens are reused.
    pub session_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(600),
        }
    }
}

/// Journey planner client with cached session tokens.
pub struct CachedTransperthClient {
    client: TransperthClient,

    /// Single-entry cache; the key carries no information.
    session: MokaCache<(), Arc<SessionTokens>>,
}

impl CachedTransperthClient {
    /// Create a new cached client.
    pub fn new(client: TransperthClient, config: &CacheConfig) -> Self {
        let session = MokaCache::builder()
            .time_to_live(config.session_ttl)
            .max_capacity(1)
            .build();

        Self { client, session }
    }

    /// Current session tokens, fetching them if none are cached.
    ///
    /// A failed fetch is not fatal: the defaults are returned, uncached,
    /// and the next call tries again.
    pub async fn session(&self) -> Arc<SessionTokens> {
        let result = self
            .session
            .try_get_with((), async {
                self.client.fetch_session().await.map(Arc::new)
            })
            .await;

        match result {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "could not get session tokens, using defaults");
                Arc::new(SessionTokens::default())
            }
        }
    }

    /// Plan a journey, reusing cached session tokens.
    pub async fn plan_journey(
        &self,
        route: &RouteConfig,
        when: &TravelWhen,
    ) -> Result<JourneyData, TransperthError> {
        let tokens = match self.client.backend() {
            Backend::Api => self.session().await,
            Backend::ResultsPage => Arc::new(SessionTokens::default()),
        };

        let result = self.client.plan_journey(route, when, &tokens).await;

        if matches!(&result, Err(e) if e.invalidates_session()) {
            debug!(route = %route.name, "discarding cached session after rejection");
            self.invalidate_session().await;
        }

        result
    }

    /// Whether session tokens are currently cached.
    pub async fn has_session(&self) -> bool {
        self.session.get(&()).await.is_some()
    }

    /// Drop the cached session tokens.
    pub async fn invalidate_session(&self) {
        self.session.invalidate(&()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;
    use crate::transperth::TransperthConfig;
    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::{Html, IntoResponse, Response};
    use axum::routing::{get, post};
    use chrono::{NaiveDate, NaiveTime};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct Counters {
        pages: Arc<AtomicUsize>,
        plans: Arc<AtomicUsize>,
    }

    async fn page(State(counters): State<Counters>) -> Html<String> {
        let n = counters.pages.fetch_add(1, Ordering::SeqCst) + 1;
        Html(format!(
            r#"<input name="__RequestVerificationToken" value="tok-{n}">"#
        ))
    }

    /// Accepts only the first token; rejects later ones to force a refetch.
    async fn plan(State(counters): State<Counters>, headers: HeaderMap) -> Response {
        counters.plans.fetch_add(1, Ordering::SeqCst);
        match headers.get("requestverificationtoken").and_then(|v| v.to_str().ok()) {
            Some("tok-1") => {
                (StatusCode::OK, r#"{"result":"success","data":[]}"#).into_response()
            }
            _ => (StatusCode::FORBIDDEN, "expired").into_response(),
        }
    }

    async fn spawn(counters: Counters) -> String {
        let router = Router::new()
            .route("/Journey-Planner", get(page))
            .route(
                "/API/SilverRailRestService/SilverRailService/PlanJourney",
                post(plan),
            )
            .with_state(counters);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn route() -> RouteConfig {
        let from = Location::new("A", None, "-31.95,115.86", None).unwrap();
        let to = Location::new("B", None, "-31.96,115.87", None).unwrap();
        RouteConfig::new("A to B", from, to)
    }

    fn when() -> TravelWhen {
        TravelWhen {
            date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        }
    }

    fn cached(base: &str, backend: Backend) -> CachedTransperthClient {
        let client = TransperthClient::new(
            TransperthConfig::default()
                .with_base_url(base)
                .with_backend(backend),
        )
        .unwrap();
        CachedTransperthClient::new(client, &CacheConfig::default())
    }

    #[test]
    fn default_config() {
        assert_eq!(CacheConfig::default().session_ttl, Duration::from_secs(600));
    }

    #[tokio::test]
    async fn session_is_fetched_once() {
        let counters = Counters::default();
        let base = spawn(counters.clone()).await;
        let client = cached(&base, Backend::Api);

        client.plan_journey(&route(), &when()).await.unwrap();
        client.plan_journey(&route(), &when()).await.unwrap();

        assert_eq!(counters.pages.load(Ordering::SeqCst), 1);
        assert_eq!(counters.plans.load(Ordering::SeqCst), 2);
        assert!(client.has_session().await);
    }

    #[tokio::test]
    async fn rejection_drops_session() {
        let counters = Counters::default();
        let base = spawn(counters.clone()).await;
        let client = cached(&base, Backend::Api);

        client.plan_journey(&route(), &when()).await.unwrap();
        client.invalidate_session().await;

        // Second page visit hands out tok-2, which the planner rejects
        let err = client.plan_journey(&route(), &when()).await.unwrap_err();
        assert!(err.invalidates_session());
        assert!(!client.has_session().await);
        assert_eq!(counters.pages.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_session_fetch_uses_defaults() {
        let client = cached("http://127.0.0.1:9", Backend::Api);
        let tokens = client.session().await;
        assert_eq!(*tokens, SessionTokens::default());
        assert!(!client.has_session().await);
    }
}
