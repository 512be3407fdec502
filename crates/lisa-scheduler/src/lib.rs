//! lisa-scheduler: when and how services get probed.
//!
//! - [`Scheduler`] owns one timer task per service and runs the startup sweep
//! - [`StatusWriter`] is the only task that writes probe results to the store
//! - [`HealthMonitor`] composes the two with a [`lisa_health::Prober`]
//!
//! # Architecture
//!
//! ```text
//! HealthMonitor
//!   ├── Scheduler
//!   │     ├── startup sweep (every service, concurrently)
//!   │     └── per-service timer ──► firing (JoinSet, panics isolated)
//!   ├── Prober (one HTTP GET per firing)
//!   └── StatusWriter ──► StatusStore::record_probe
//! ```

pub mod cadence;
pub mod error;
pub mod monitor;
pub mod scheduler;
pub mod writer;

pub use cadence::{Cadence, FixedInterval};
pub use error::{SchedulerError, SchedulerResult};
pub use monitor::HealthMonitor;
pub use scheduler::{BoxFuture, FireFn, Lifecycle, Scheduler, StartReport, SweepReport};
pub use writer::{StatusWriter, WriteHandle, WriteOutcome};
