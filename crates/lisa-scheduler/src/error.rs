//! Scheduler error types.

use thiserror::Error;

use lisa_core::ScheduleError;

/// Errors that can occur during scheduling operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("service {service_id}: {source}")]
    MalformedSchedule {
        service_id: String,
        #[source]
        source: ScheduleError,
    },

    #[error("scheduler already started")]
    AlreadyStarted,

    #[error("scheduler has been stopped; create a new one")]
    Stopped,

    #[error("status store must be initialized before probing")]
    StoreNotInitialized,
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
