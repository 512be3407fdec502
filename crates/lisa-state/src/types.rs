//! Status taxonomy and the per-service record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classified health of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Probe completed with 2xx inside the latency threshold.
    Up,
    /// Probe completed with a non-2xx response.
    Down,
    /// Probe completed with 2xx but slower than the latency threshold.
    Dodgy,
    /// Not probed yet.
    Unknown,
    /// Manually set; never assigned by a probe.
    Maintenance,
    /// The probe itself could not be completed (connect, DNS, timeout).
    Failed,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Up,
        Status::Down,
        Status::Dodgy,
        Status::Unknown,
        Status::Maintenance,
        Status::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Up => "UP",
            Status::Down => "DOWN",
            Status::Dodgy => "DODGY",
            Status::Unknown => "UNKNOWN",
            Status::Maintenance => "MAINTENANCE",
            Status::Failed => "FAILED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest known status of one service. No history is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: Status,
    /// Ordering stamp of the write that produced this record; 0 for the
    /// initial record.
    pub sequence: u64,
    /// Unix timestamp (seconds) of the last accepted write, `None` until
    /// the first one.
    pub updated_at: Option<u64>,
}

impl StatusRecord {
    pub(crate) fn initial() -> Self {
        Self {
            status: Status::Unknown,
            sequence: 0,
            updated_at: None,
        }
    }
}
