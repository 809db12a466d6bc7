//! Transport error taxonomy

use thiserror::Error;

/// Errors raised by a single HTTP exchange with a REST backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// No HTTP response at all (DNS, refused connection, reset mid-body)
    #[error("Network error: Unable to reach {url}")]
    NetworkUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-2xx status
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    /// A 2xx response whose body is not JSON
    #[error("Failed to parse response JSON from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The endpoint cannot carry path segments (e.g. a `data:` URL)
    #[error("Cannot build a record URL from {url}")]
    InvalidUrl { url: String },
}

impl ApiError {
    /// HTTP status for `RequestFailed`, `None` for everything else
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
