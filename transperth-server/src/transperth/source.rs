//! The seam between the coordinator and whatever answers its queries.

use std::future::Future;

use crate::cache::CachedTransperthClient;
use crate::domain::{JourneyData, RouteConfig, TravelWhen};

use super::error::TransperthError;
use super::mock::MockTransperthClient;

/// Anything that can plan a journey for a route.
///
/// Abstracts over live and canned planners so the coordinator can be
/// tested without network access.
pub trait JourneySource: Send + Sync + 'static {
    /// Plan journeys for `route` at the resolved time `when`.
    fn plan_journey(
        &self,
        route: &RouteConfig,
        when: &TravelWhen,
    ) -> impl Future<Output = Result<JourneyData, TransperthError>> + Send;
}

impl JourneySource for CachedTransperthClient {
    async fn plan_journey(
        &self,
        route: &RouteConfig,
        when: &TravelWhen,
    ) -> Result<JourneyData, TransperthError> {
        CachedTransperthClient::plan_journey(self, route, when).await
    }
}

impl JourneySource for MockTransperthClient {
    async fn plan_journey(
        &self,
        route: &RouteConfig,
        when: &TravelWhen,
    ) -> Result<JourneyData, TransperthError> {
        MockTransperthClient::plan_journey(self, route, when).await
    }
}

/// The source chosen at start-up.
pub enum AnySource {
    Live(CachedTransperthClient),
    Mock(MockTransperthClient),
}

impl AnySource {
    pub fn is_mock(&self) -> bool {
        matches!(self, AnySource::Mock(_))
    }
}

impl JourneySource for AnySource {
    async fn plan_journey(
        &self,
        route: &RouteConfig,
        when: &TravelWhen,
    ) -> Result<JourneyData, TransperthError> {
        match self {
            AnySource::Live(client) => client.plan_journey(route, when).await,
            AnySource::Mock(mock) => mock.plan_journey(route, when).await,
        }
    }
}
