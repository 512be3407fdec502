//! Error types for the status store.

use thiserror::Error;

/// Result type alias for status store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur during status store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("service not found: {0}")]
    NotFound(String),

    #[error("status store already initialized")]
    AlreadyInitialized,
}
