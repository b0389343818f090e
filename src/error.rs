//! Error types for the search engine.

use thiserror::Error;

/// Every failure the engine, cache, loader and configuration layers can report.
///
/// The enum is `Clone` because a failed shared computation is handed to every
/// caller that waited on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NearbyError {
    /// A contract violation inside the core (e.g. a non-finite coordinate
    /// handed to the distance function).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid coordinates: latitude={latitude:.6}, longitude={longitude:.6}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Invalid limit {limit}: must be between 1 and {max}")]
    InvalidLimit { limit: usize, max: usize },

    /// The computation could not run (dataset unavailable, aborted computation).
    #[error("Search unavailable: {0}")]
    Unavailable(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl NearbyError {
    /// Wraps anything that is not already a contract violation or an
    /// availability failure into [`NearbyError::Unavailable`].
    pub fn into_unavailable(self) -> Self {
        match self {
            NearbyError::InvalidInput(_) | NearbyError::Unavailable(_) => self,
            other => NearbyError::Unavailable(other.to_string()),
        }
    }

    /// Caller errors, as opposed to failures of the engine itself.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            NearbyError::InvalidCoordinates { .. } | NearbyError::InvalidLimit { .. }
        )
    }
}

impl From<std::io::Error> for NearbyError {
    fn from(err: std::io::Error) -> Self {
        NearbyError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for NearbyError {
    fn from(err: serde_json::Error) -> Self {
        NearbyError::Serialization(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for NearbyError {
    fn from(err: toml::de::Error) -> Self {
        NearbyError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NearbyError>;
