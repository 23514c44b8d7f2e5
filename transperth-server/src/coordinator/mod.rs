//! Periodic refresh of every configured route.
//!
//! One background task owns the timer and refreshes routes one after
//! another; HTTP handlers read snapshots and may trigger extra refreshes.
//! Snapshots are swapped whole, so readers never see a half-updated
//! route.

mod interval;

pub use interval::{DEFAULT_SCAN_INTERVAL_SECS, MIN_SCAN_INTERVAL_SECS, ScanInterval};

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::domain::{JourneyData, RouteConfig};
use crate::sensor::{SensorState, sensors_for_route};
use crate::transperth::{JourneySource, TransperthError};

/// What the last refresh of a route produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteSnapshot {
    /// Journeys from the last successful refresh; cleared on failure
    pub data: Option<JourneyData>,
    pub last_attempt: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub refreshed: usize,
    pub failed: usize,
}

/// Owns the routes and their latest journey data.
pub struct Coordinator<S> {
    source: S,
    routes: Vec<RouteConfig>,
    snapshots: RwLock<HashMap<String, RouteSnapshot>>,
    interval: ScanInterval,

    /// Offset of the planner's local time, used to resolve "today"/"now"
    utc_offset: FixedOffset,
}

impl<S: JourneySource> Coordinator<S> {
    pub fn new(
        source: S,
        routes: Vec<RouteConfig>,
        interval: ScanInterval,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            source,
            routes,
            snapshots: RwLock::new(HashMap::new()),
            interval,
            utc_offset,
        }
    }

    pub fn routes(&self) -> &[RouteConfig] {
        &self.routes
    }

    /// Find a route by name or by slug.
    pub fn route(&self, name: &str) -> Option<&RouteConfig> {
        self.routes
            .iter()
            .find(|r| r.name == name)
            .or_else(|| self.routes.iter().find(|r| r.slug() == name))
    }

    pub fn interval(&self) -> ScanInterval {
        self.interval
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current wall-clock time in the planner's timezone.
    pub fn local_now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.utc_offset).naive_local()
    }

    /// Latest snapshot for a route; empty if it has never been refreshed.
    pub async fn snapshot(&self, route_name: &str) -> RouteSnapshot {
        self.snapshots
            .read()
            .await
            .get(route_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Sensors for one route from its latest snapshot.
    pub async fn route_sensors(&self, route: &RouteConfig) -> Vec<SensorState> {
        let snapshots = self.snapshots.read().await;
        let data = snapshots.get(&route.name).and_then(|s| s.data.as_ref());
        sensors_for_route(route, data)
    }

    /// Sensors for every route, in configuration order.
    pub async fn sensors(&self) -> Vec<SensorState> {
        let snapshots = self.snapshots.read().await;
        self.routes
            .iter()
            .flat_map(|route| {
                let data = snapshots.get(&route.name).and_then(|s| s.data.as_ref());
                sensors_for_route(route, data)
            })
            .collect()
    }

    /// Refresh one route and replace its snapshot.
    ///
    /// On failure the route's options are cleared, so its sensors go
    /// unavailable until a later refresh succeeds. Returns the number of
    /// options found.
    pub async fn refresh_route(&self, route: &RouteConfig) -> Result<usize, TransperthError> {
        let when = route.travel_when(self.local_now());
        let attempted = Utc::now();
        debug!(
            route = %route.name,
            date = %when.date_string(),
            time = %when.time_string(),
            "refreshing route"
        );

        let result = self.source.plan_journey(route, &when).await;

        let mut snapshots = self.snapshots.write().await;
        let snapshot = snapshots.entry(route.name.clone()).or_default();

        // An overlapping refresh that started later has already written
        if snapshot.last_attempt.is_some_and(|newer| newer > attempted) {
            debug!(route = %route.name, "discarding stale refresh result");
            return result.map(|data| data.options().len());
        }
        snapshot.last_attempt = Some(attempted);

        match result {
            Ok(data) => {
                let count = data.options().len();
                if count == 0 {
                    warn!(route = %route.name, "planner returned no journeys");
                }
                snapshot.data = Some(data);
                snapshot.last_success = Some(attempted);
                snapshot.last_error = None;
                Ok(count)
            }
            Err(e) => {
                error!(route = %route.name, error = %e, "failed to refresh route");
                snapshot.data = None;
                snapshot.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Refresh every route in order. One route's failure does not stop
    /// the others.
    pub async fn refresh_all(&self) -> RefreshSummary {
        let mut summary = RefreshSummary::default();

        for route in &self.routes {
            match self.refresh_route(route).await {
                Ok(_) => summary.refreshed += 1,
                Err(_) => summary.failed += 1,
            }
        }

        info!(
            refreshed = summary.refreshed,
            failed = summary.failed,
            "refresh cycle complete"
        );
        summary
    }

    /// Refresh on a timer until `shutdown` resolves.
    ///
    /// The first cycle runs immediately.
    pub async fn run(self: Arc<Self>, shutdown: impl Future<Output = ()>) {
        let mut ticker = tokio::time::interval(self.interval.duration());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            routes = self.routes.len(),
            interval_secs = self.interval.secs(),
            "coordinator started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("coordinator stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.refresh_all().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JourneyOption, Location, TravelWhen};
    use chrono::NaiveTime;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Source that fails for route names listed in `failing`.
    #[derive(Default)]
    struct FakeSource {
        failing: Vec<String>,
        calls: Mutex<Vec<(String, TravelWhen)>>,
    }

    impl JourneySource for FakeSource {
        async fn plan_journey(
            &self,
            route: &RouteConfig,
            when: &TravelWhen,
        ) -> Result<JourneyData, TransperthError> {
            self.calls
                .lock()
                .unwrap()
                .push((route.name.clone(), *when));

            if self.failing.contains(&route.name) {
                return Err(TransperthError::Rejected {
                    result: "error".into(),
                });
            }

            let options = (1..=3)
                .map(|index| JourneyOption {
                    index,
                    leave_time: format!("{index}:00pm"),
                    arrive_time: format!("{index}:30pm"),
                    travel_time: "30 mins".into(),
                    legs: Vec::new(),
                })
                .collect();
            Ok(JourneyData::new(
                options,
                route.from.name.as_str(),
                route.to.name.as_str(),
                when,
            ))
        }
    }

    fn route(name: &str) -> RouteConfig {
        let from = Location::new("Home", None, "-31.9471,115.8264", None).unwrap();
        let to = Location::new("Work", None, "-31.9546,115.8588", None).unwrap();
        RouteConfig::new(name, from, to)
    }

    fn perth() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn coordinator(source: FakeSource, names: &[&str]) -> Coordinator<FakeSource> {
        let routes = names.iter().map(|n| route(n)).collect();
        Coordinator::new(source, routes, ScanInterval::default(), perth())
    }

    #[tokio::test]
    async fn refresh_all_continues_past_failures() {
        let source = FakeSource {
            failing: vec!["Broken".into()],
            ..FakeSource::default()
        };
        let coordinator = coordinator(source, &["First", "Broken", "Last"]);

        let summary = coordinator.refresh_all().await;
        assert_eq!(summary, RefreshSummary { refreshed: 2, failed: 1 });

        let calls: Vec<String> = coordinator
            .source()
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        assert_eq!(calls, vec!["First", "Broken", "Last"]);

        let last = coordinator.snapshot("Last").await;
        assert_eq!(last.data.map(|d| d.options().len()), Some(3));
        assert!(last.last_success.is_some());

        let broken = coordinator.snapshot("Broken").await;
        assert!(broken.data.is_none());
        assert!(broken.last_attempt.is_some());
        assert!(broken.last_success.is_none());
        assert!(broken.last_error.unwrap().contains("rejected"));
    }

    #[tokio::test]
    async fn failure_clears_previous_options() {
        let coordinator = coordinator(FakeSource::default(), &["Flaky"]);
        let route = coordinator.routes()[0].clone();
        coordinator.refresh_route(&route).await.unwrap();
        assert!(coordinator.snapshot("Flaky").await.data.is_some());

        let mut failing = coordinator;
        failing.source.failing.push("Flaky".into());
        assert!(failing.refresh_route(&route).await.is_err());

        let snapshot = failing.snapshot("Flaky").await;
        assert!(snapshot.data.is_none());
        assert!(snapshot.last_success.is_some());
        assert!(snapshot.last_error.is_some());
    }

    #[tokio::test]
    async fn older_refresh_does_not_overwrite_newer_snapshot() {
        let coordinator = coordinator(FakeSource::default(), &["Busy"]);
        let route = coordinator.routes()[0].clone();
        let newer = RouteSnapshot {
            last_attempt: Some(Utc::now() + chrono::Duration::hours(1)),
            last_error: Some("from the later refresh".into()),
            ..RouteSnapshot::default()
        };
        coordinator
            .snapshots
            .write()
            .await
            .insert("Busy".into(), newer.clone());

        assert_eq!(coordinator.refresh_route(&route).await.unwrap(), 3);
        assert_eq!(coordinator.snapshot("Busy").await, newer);
    }

    #[tokio::test]
    async fn sensors_reflect_snapshots() {
        let source = FakeSource {
            failing: vec!["Down".into()],
            ..FakeSource::default()
        };
        let coordinator = coordinator(source, &["Up", "Down"]);

        let before = coordinator.sensors().await;
        assert_eq!(before.len(), 10);
        assert!(before.iter().all(|s| !s.is_available()));

        coordinator.refresh_all().await;
        let sensors = coordinator.sensors().await;
        let available: Vec<&str> = sensors
            .iter()
            .filter(|s| s.is_available())
            .map(|s| s.entity_id.as_str())
            .collect();
        assert_eq!(
            available,
            vec![
                "sensor.transperth_up_option_1",
                "sensor.transperth_up_option_2",
                "sensor.transperth_up_option_3",
            ]
        );
        assert_eq!(sensors[0].state.as_deref(), Some("1:00pm → 1:30pm"));
    }

    #[tokio::test]
    async fn fixed_time_is_sent_unchanged() {
        let mut coordinator = coordinator(FakeSource::default(), &["Morning"]);
        coordinator.routes[0].time = NaiveTime::from_hms_opt(7, 45, 0);
        let route = coordinator.routes()[0].clone();

        coordinator.refresh_route(&route).await.unwrap();
        let calls = coordinator.source().calls.lock().unwrap();
        assert_eq!(calls[0].1.time_string(), "07:45");
    }

    #[test]
    fn route_lookup_by_name_or_slug() {
        let coordinator = coordinator(FakeSource::default(), &["Home to Work"]);
        assert!(coordinator.route("Home to Work").is_some());
        assert!(coordinator.route("home_to_work").is_some());
        assert!(coordinator.route("Elsewhere").is_none());
    }

    #[tokio::test]
    async fn run_refreshes_immediately_and_stops() {
        let coordinator = Arc::new(coordinator(FakeSource::default(), &["Now"]));
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

        let task = tokio::spawn(Arc::clone(&coordinator).run(async move {
            let _ = stop_rx.await;
        }));

        let mut refreshed = false;
        for _ in 0..100 {
            if coordinator.snapshot("Now").await.data.is_some() {
                refreshed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(refreshed, "first refresh should run without waiting an interval");

        stop_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
