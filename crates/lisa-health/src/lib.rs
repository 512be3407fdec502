//! lisa-health: single-shot HTTP probes for LISA.
//!
//! Two read paths, both one request per call with no internal retry:
//!
//! - [`Prober::check`] probes a service's health URL and classifies the
//!   outcome into a [`Status`](lisa_state::Status)
//! - [`VersionChecker::get_version`] fetches the deployed version string
//!
//! # Classification
//!
//! ```text
//! request failed (connect, DNS, timeout) → FAILED
//! non-2xx                                → DOWN
//! 2xx slower than dodgy threshold        → DODGY
//! 2xx                                    → UP
//! ```
//!
//! Neither path writes to the status store; callers persist the result.

pub mod checker;
pub mod error;
pub mod version;

pub use checker::{ProbeConfig, ProbeOutcome, Prober, classify};
pub use error::{HealthError, HealthResult, VersionError};
pub use version::{VersionChecker, parse_version};
