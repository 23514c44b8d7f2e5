//! Transperth journey planner client.
//!
//! The planner has no public API. This module drives the website the
//! way a browser does:
//! - the `Journey-Planner` page hands out an anti-forgery token plus the
//!   CMS module and tab ids, which `PlanJourney` wants back as headers
//! - `PlanJourney` answers with JSON whose display values are already
//!   formatted for people (`"7:42am"`, `"69 mins"`)
//! - the server-rendered results page carries the same options as HTML
//!   and serves as a fallback backend

mod client;
mod convert;
mod error;
mod html;
mod mock;
mod session;
mod source;
mod types;

pub use client::{Backend, DEFAULT_BASE_URL, TransperthClient, TransperthConfig};
pub use convert::{classify_trip, convert_journeys, parse_plan_response};
pub use error::TransperthError;
pub use html::parse_results_page;
pub use mock::MockTransperthClient;
pub use session::{DEFAULT_MODULE_ID, DEFAULT_TAB_ID, SessionTokens, parse_session_page};
pub use source::{AnySource, JourneySource};
pub use types::{JourneyDto, PlanJourneyRequest, PlanJourneyResponse, TripDto};
