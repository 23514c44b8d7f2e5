//! Web layer for the journey sensors.
//!
//! Publishes sensor states as JSON, serves a small HTML dashboard, and
//! exposes manual refresh and URL-based route set-up.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
