//! Domain error types.
//!
//! These errors represent validation failures when building route
//! configuration values. They are distinct from API/IO errors.

/// Domain-level errors for validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A required field was missing or blank
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Coordinates could not be parsed or are out of range
    #[error("invalid coordinates {value:?}: {reason}")]
    InvalidCoordinates { value: String, reason: &'static str },

    /// A value did not match any of the accepted choices
    #[error("invalid {field} {value:?} (expected one of: {expected})")]
    InvalidChoice {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Date was not `today`, `tomorrow`, or `YYYY-MM-DD`
    #[error("invalid date {0:?} (expected today, tomorrow, or YYYY-MM-DD)")]
    InvalidDate(String),

    /// Time was not `HH:MM`
    #[error("invalid time {0:?} (expected HH:MM)")]
    InvalidTime(String),

    /// Walking distance was not a number of metres
    #[error("invalid walking distance {0:?}")]
    InvalidDistance(String),
}
