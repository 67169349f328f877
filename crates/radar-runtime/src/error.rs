use std::fmt;

use radar_types::JobId;

/// Result type for radar-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Job store failure
    Store(StoreError),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Store(err) => write!(f, "Store error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Store(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_) => None,
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Error::Store(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type for job store reads
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Why a job store read failed.
///
/// `NotFound` is final for the job id. `Transient` failures are worth
/// retrying on the next tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The job id has no record
    NotFound(JobId),

    /// Network, server or partially written data
    Transient(String),
}

impl StoreError {
    pub fn transient(msg: impl Into<String>) -> Self {
        StoreError::Transient(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "Job {} not found", id),
            StoreError::Transient(msg) => write!(f, "Transient failure: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
