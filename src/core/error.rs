//! Error types for the engine and its collaborators.

use std::time::Duration;
use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum Error {
    /// No host could be extracted from the URL
    #[error("Cannot extract a host from '{url}'")]
    HostExtraction {
        /// The offending URL
        url: String,
    },

    /// The host is not something the engine tracks (empty, or a single label)
    #[error("Invalid domain '{0}'")]
    InvalidDomain(String),

    /// No auth cookies for the scanning service
    #[error("No scanning service auth cookies found for '{cookie_domain}'")]
    Unauthenticated {
        /// Domain the auth cookies were looked up for
        cookie_domain: String,
    },

    /// The scanning service could not be reached or failed mid-request
    #[error("Scanning service unreachable: {0}")]
    ServiceUnreachable(String),

    /// The scanning service did not answer in time
    #[error("Scanning service did not respond within {0:?}")]
    Timeout(Duration),

    /// HTTP client construction or transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Persistent storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Snapshot (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be parsed or are invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the failure belongs to the "service could not be reached" family.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Error::ServiceUnreachable(_) | Error::Timeout(_) | Error::Http(_))
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;
