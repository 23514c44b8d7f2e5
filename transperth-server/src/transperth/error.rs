//! Journey planner client error types.

use std::fmt;

/// Errors from the journey planner client.
#[derive(Debug)]
pub enum TransperthError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// Planner returned an error status code
    ApiError { status: u16, message: String },

    /// Planner answered, but with a result other than `success`
    Rejected { result: String },

    /// Results page did not have the expected structure
    PageStructure(String),
}

impl TransperthError {
    /// Whether the cached session tokens should be discarded after this error.
    ///
    /// Client errors and rejections usually mean an expired verification
    /// token; network failures say nothing about the session.
    pub fn invalidates_session(&self) -> bool {
        match self {
            TransperthError::ApiError { status, .. } => (400..500).contains(status),
            TransperthError::Rejected { .. } => true,
            _ => false,
        }
    }
}

impl fmt::Display for TransperthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransperthError::Http(e) => write!(f, "HTTP error: {e}"),
            TransperthError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            TransperthError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            TransperthError::Rejected { result } => {
                write!(f, "journey planner rejected the request (result: {result})")
            }
            TransperthError::PageStructure(msg) => {
                write!(f, "unexpected results page structure: {msg}")
            }
        }
    }
}

impl std::error::Error for TransperthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransperthError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransperthError {
    fn from(err: reqwest::Error) -> Self {
        TransperthError::Http(err)
    }
}
