use std::fmt;

use crate::domain::JobId;

/// Result type for radar-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug)]
pub enum Error {
    /// A job record violates the status/timestamp lifecycle
    InvalidJob { id: JobId, reason: String },

    /// A status string outside the job lifecycle
    UnknownStatus(String),

    /// A value could not be decoded from JSON
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidJob { id, reason } => write!(f, "Invalid job {}: {}", id, reason),
            Error::UnknownStatus(status) => write!(f, "Unknown job status: {}", status),
            Error::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJob { .. } | Error::UnknownStatus(_) => None,
            Error::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
