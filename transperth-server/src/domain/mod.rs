//! Domain types for the journey sensors.
//!
//! Route configuration types validate their input at construction, so
//! code receiving a `RouteConfig` can trust every field. Journey types
//! hold what the planner returned, capped and ordered.

mod error;
mod journey;
mod leg;
mod location;
mod options;
mod route;
mod when;

pub use error::DomainError;
pub use journey::{JourneyData, JourneyOption, MAX_JOURNEY_OPTIONS};
pub use leg::{Leg, LegKind};
pub use location::{Coordinates, DEFAULT_LOCATION_TYPE, Location};
pub use options::{
    DEFAULT_MAX_WALKING_DISTANCE, DepartureOption, TransportMode, TransportModes, WalkSpeed,
    WalkingDistance,
};
pub use route::{RouteConfig, slugify};
pub use when::{DATE_FORMAT, TIME_FORMAT, TravelDate, TravelWhen, parse_travel_time};
