//! lisa-core: shared types for the LISA service-health monitor.
//!
//! Holds the pieces every other crate reads but never mutates:
//!
//! - [`Service`]: one monitored system (health URL, version URL, cron cadence)
//! - [`Registry`]: the immutable set of services, loaded once from YAML
//! - [`CronSchedule`]: a validated 5-field cron expression
//! - [`Settings`]: daemon settings loaded from an optional TOML file

pub mod config;
pub mod error;
pub mod registry;
pub mod schedule;
pub mod service;

pub use config::{ProbeSettings, ScheduleSettings, ServerSettings, Settings, parse_duration};
pub use error::{CoreError, CoreResult, ScheduleError};
pub use registry::Registry;
pub use schedule::CronSchedule;
pub use service::{DEFAULT_SCHEDULE, Service, ServiceId};
