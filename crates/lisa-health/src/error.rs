//! Error types for probes and version checks.

use thiserror::Error;

pub type HealthResult<T> = Result<T, HealthError>;

/// Errors building a probe client.
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors from a version lookup.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("version endpoint {url} unreachable: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("version endpoint {url} returned a malformed response: {reason}")]
    MalformedResponse { url: String, reason: String },
}
