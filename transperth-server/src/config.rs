//! Command-line arguments and the TOML configuration file.
//!
//! Raw TOML is deserialized into loosely typed structs first, then
//! validated route by route into [`AppConfig`]. Validation stops at the
//! first problem and names the route and field at fault.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use clap::Parser;
use serde::Deserialize;
use tracing::debug;

use crate::cache::CacheConfig;
use crate::coordinator::ScanInterval;
use crate::domain::{
    DepartureOption, DomainError, Location, RouteConfig, TransportMode, TransportModes,
    TravelDate, WalkSpeed, WalkingDistance, parse_travel_time, slugify,
};
use crate::quick_config::{QuickConfigError, RouteDraft, parse_journey_url};
use crate::transperth::{Backend, DEFAULT_BASE_URL, TransperthConfig};

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Perth is UTC+8 all year.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

/// Longest accepted session token lifetime.
pub const MAX_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

/// Publish Transperth journey options as sensors.
#[derive(Debug, Clone, Parser)]
#[command(name = "transperth-server", version)]
pub struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "transperth.toml")]
    pub config: PathBuf,

    /// Address to listen on (overrides the config file)
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Seconds between refreshes (overrides the config file)
    #[arg(long)]
    pub scan_interval: Option<u64>,

    /// Serve canned planner responses from this directory instead of
    /// calling the website
    #[arg(long)]
    pub mock_data: Option<PathBuf>,
}

/// Errors loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no routes configured")]
    NoRoutes,

    #[error("route #{position} has no name")]
    EmptyRouteName { position: usize },

    #[error("route #{position}: name {name:?} has no letters or digits")]
    UnsluggableRouteName { position: usize, name: String },

    #[error("duplicate route name {0:?} (names must differ in more than case or punctuation)")]
    DuplicateRoute(String),

    #[error("route {route:?}: {field}: {source}")]
    InvalidField {
        route: String,
        field: &'static str,
        #[source]
        source: DomainError,
    },

    #[error("route {route:?}: journey planner url: {source}")]
    InvalidUrl {
        route: String,
        #[source]
        source: QuickConfigError,
    },

    #[error("invalid bind address {0:?}")]
    InvalidBind(String),

    #[error("invalid utc_offset_hours {0} (expected -23..=23)")]
    InvalidUtcOffset(i32),

    #[error("invalid session_ttl_secs {0} (expected at most 86400)")]
    InvalidSessionTtl(u64),

    #[error("invalid timeout_secs {0} (expected at least 1)")]
    InvalidTimeout(u64),
}

/// Validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub scan_interval: ScanInterval,
    pub utc_offset: FixedOffset,
    pub transperth: TransperthConfig,
    pub cache: CacheConfig,
    pub routes: Vec<RouteConfig>,

    /// Directory of canned responses; `None` means call the website
    pub mock_data: Option<PathBuf>,
}

impl AppConfig {
    /// Load the file named by `args` and apply command-line overrides.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(&args.config)?;

        if let Some(bind) = args.bind {
            config.bind = bind;
        }
        if let Some(secs) = args.scan_interval {
            config.scan_interval = ScanInterval::new(secs);
        }
        if args.mock_data.is_some() {
            config.mock_data = args.mock_data.clone();
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "read configuration file");
        text.parse()
    }
}

impl std::str::FromStr for AppConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: RawConfig = toml::from_str(s)?;
        raw.validate()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    bind: Option<String>,
    scan_interval: Option<u64>,
    utc_offset_hours: Option<i32>,
    mock_data: Option<PathBuf>,

    #[serde(default)]
    transperth: RawTransperth,

    #[serde(default)]
    routes: Vec<RawRoute>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTransperth {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    session_ttl_secs: Option<u64>,
    backend: Option<Backend>,
}

/// Walking distance as written: `1500` or `"1500m"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawDistance {
    Metres(u32),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRoute {
    name: Option<String>,

    /// Journey planner URL supplying defaults for the fields below
    url: Option<String>,

    from: Option<String>,
    from_type: Option<String>,
    from_position: Option<String>,
    from_locality: Option<String>,
    to: Option<String>,
    to_type: Option<String>,
    to_position: Option<String>,
    to_locality: Option<String>,
    date: Option<String>,
    time: Option<String>,
    departure_option: Option<String>,
    transport_options: Option<Vec<String>>,
    walk_speed: Option<String>,
    max_connections: Option<u32>,
    max_walking_distance: Option<RawDistance>,
}

impl RawConfig {
    fn validate(self) -> Result<AppConfig, ConfigError> {
        let bind_text = self.bind.as_deref().unwrap_or(DEFAULT_BIND);
        let bind = bind_text
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_text.to_string()))?;

        let offset_hours = self.utc_offset_hours.unwrap_or(DEFAULT_UTC_OFFSET_HOURS);
        let utc_offset = FixedOffset::east_opt(offset_hours * 3600)
            .filter(|_| offset_hours.abs() <= 23)
            .ok_or(ConfigError::InvalidUtcOffset(offset_hours))?;

        let mut transperth = TransperthConfig::default()
            .with_base_url(self.transperth.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
            .with_backend(self.transperth.backend.unwrap_or_default());
        if let Some(secs) = self.transperth.timeout_secs {
            if secs == 0 {
                return Err(ConfigError::InvalidTimeout(secs));
            }
            transperth = transperth.with_timeout(secs);
        }

        let mut cache = CacheConfig::default();
        if let Some(secs) = self.transperth.session_ttl_secs {
            if secs > MAX_SESSION_TTL_SECS {
                return Err(ConfigError::InvalidSessionTtl(secs));
            }
            cache.session_ttl = Duration::from_secs(secs);
        }

        if self.routes.is_empty() {
            return Err(ConfigError::NoRoutes);
        }

        let mut seen = HashSet::new();
        let mut routes = Vec::with_capacity(self.routes.len());
        for (i, raw) in self.routes.into_iter().enumerate() {
            let route = raw.validate(i + 1)?;
            // Routes differing only in punctuation or case would share entity ids
            if !seen.insert(route.slug()) {
                return Err(ConfigError::DuplicateRoute(route.name));
            }
            routes.push(route);
        }

        Ok(AppConfig {
            bind,
            scan_interval: self.scan_interval.map(ScanInterval::new).unwrap_or_default(),
            utc_offset,
            transperth,
            cache,
            routes,
            mock_data: self.mock_data,
        })
    }
}

impl RawRoute {
    /// Merge with the URL draft (explicit fields win) and validate.
    fn validate(self, position: usize) -> Result<RouteConfig, ConfigError> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(ConfigError::EmptyRouteName { position })?
            .to_string();

        // Entity ids are built from the slug
        if slugify(&name).is_empty() {
            return Err(ConfigError::UnsluggableRouteName { position, name });
        }

        let draft = match self.url.as_deref() {
            Some(url) => parse_journey_url(url).map_err(|source| ConfigError::InvalidUrl {
                route: name.clone(),
                source,
            })?,
            None => RouteDraft::default(),
        };

        let invalid = |field: &'static str| {
            let route = name.clone();
            move |source: DomainError| ConfigError::InvalidField {
                route,
                field,
                source,
            }
        };

        let from = build_location(
            self.from.or(draft.from),
            self.from_type.or(draft.from_type),
            self.from_position.or(draft.from_position),
            self.from_locality.or(draft.from_locality),
        )
        .map_err(invalid("from"))?;

        let to = build_location(
            self.to.or(draft.to),
            self.to_type.or(draft.to_type),
            self.to_position.or(draft.to_position),
            self.to_locality.or(draft.to_locality),
        )
        .map_err(invalid("to"))?;

        let mut route = RouteConfig::new(name.clone(), from, to);

        if let Some(date) = self.date.or(draft.date) {
            route.date = date.parse::<TravelDate>().map_err(invalid("date"))?;
        }
        if let Some(time) = self.time.or(draft.time) {
            route.time = parse_travel_time(&time).map_err(invalid("time"))?;
        }

        route.departure_option = match self.departure_option {
            Some(value) => value
                .parse::<DepartureOption>()
                .map_err(invalid("departure_option"))?,
            None => draft.departure_option.unwrap_or_default(),
        };

        route.transport = match self.transport_options {
            Some(values) => TransportModes::new(
                values
                    .iter()
                    .map(|v| v.parse::<TransportMode>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(invalid("transport_options"))?,
            ),
            None => draft
                .transport_options
                .map(TransportModes::new)
                .unwrap_or_default(),
        };

        route.walk_speed = match self.walk_speed {
            Some(value) => value.parse::<WalkSpeed>().map_err(invalid("walk_speed"))?,
            None => draft.walk_speed.unwrap_or_default(),
        };

        route.max_connections = self.max_connections.or(draft.max_connections);

        route.max_walking_distance = match self.max_walking_distance {
            Some(RawDistance::Metres(m)) => WalkingDistance::from(m),
            Some(RawDistance::Text(text)) => text
                .parse::<WalkingDistance>()
                .map_err(invalid("max_walking_distance"))?,
            None => match draft.max_walking_distance {
                Some(text) => text
                    .parse::<WalkingDistance>()
                    .map_err(invalid("max_walking_distance"))?,
                None => WalkingDistance::default(),
            },
        };

        debug!(route = %route.name, slug = %route.slug(), "validated route");
        Ok(route)
    }
}

fn build_location(
    name: Option<String>,
    kind: Option<String>,
    position: Option<String>,
    locality: Option<String>,
) -> Result<Location, DomainError> {
    let name = name.ok_or(DomainError::MissingField("location name"))?;
    let position = position.ok_or(DomainError::MissingField("location position"))?;
    Location::new(&name, kind.as_deref(), &position, locality.as_deref())
}
