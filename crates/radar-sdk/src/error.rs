use std::fmt;

use radar_runtime::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    NotFound(String),
    InvalidInput(String),
    /// A store read failed in a way worth retrying
    Unavailable(String),
    Runtime(radar_runtime::Error),
    Internal(anyhow::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::Unavailable(msg) => write!(f, "Temporarily unavailable: {}", msg),
            Error::Runtime(err) => write!(f, "Runtime error: {}", err),
            Error::Internal(err) => write!(f, "Internal error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Runtime(err) => Some(err),
            Error::Internal(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Error::NotFound(format!("job {}", id)),
            StoreError::Transient(msg) => Error::Unavailable(msg),
        }
    }
}

impl From<radar_runtime::Error> for Error {
    fn from(err: radar_runtime::Error) -> Self {
        match err {
            radar_runtime::Error::Store(err) => err.into(),
            other => Error::Runtime(other),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err)
    }
}
