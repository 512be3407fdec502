//! Error types for registry and settings loading.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while loading the service registry or daemon settings.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid registry file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid settings file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("service with empty id")]
    EmptyId,

    #[error("duplicate service id: {0}")]
    DuplicateId(String),

    #[error("service {service_id}: invalid {field} {url:?}: {reason}")]
    InvalidUrl {
        service_id: String,
        field: &'static str,
        url: String,
        reason: String,
    },

    #[error("service {service_id}: {source}")]
    InvalidSchedule {
        service_id: String,
        #[source]
        source: ScheduleError,
    },
}

/// A cron expression that cannot be used as a polling schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("empty cron expression")]
    Empty,

    #[error("cron expression {expression:?} has {found} fields, expected 5")]
    FieldCount { expression: String, found: usize },

    #[error("malformed cron expression {expression:?}: {reason}")]
    Malformed { expression: String, reason: String },
}
