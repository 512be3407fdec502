//! lisa-state: the in-memory status store for LISA.
//!
//! Holds exactly one [`StatusRecord`] per registered service. The key set
//! is fixed by a single [`StatusStore::initialize`] call; afterwards
//! records are only overwritten, never added or removed.
//!
//! # Concurrency
//!
//! The `StatusStore` is `Clone` + `Send` + `Sync` (backed by an `Arc`).
//! Each record sits behind its own lock, so writes to different services
//! never contend, and a reader always sees a whole record.
//!
//! Probe results carry a sequence number taken when the probe started.
//! A result older than the one already stored is dropped, so a slow probe
//! cannot overwrite a fresher result that finished before it.

pub mod error;
pub mod store;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StatusStore;
pub use types::*;
