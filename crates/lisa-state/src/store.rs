//! StatusStore: current status per service.
//!
//! The key set is fixed once by `initialize`. Each record is guarded by
//! its own `RwLock`, so concurrent writes to different services do not
//! block each other and a read never observes a half-written record.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use crate::error::{StateError, StateResult};
use crate::types::*;

#[derive(Default)]
struct Inner {
    records: OnceLock<HashMap<String, RwLock<StatusRecord>>>,
    sequence: AtomicU64,
}

/// Thread-safe status store, cheap to clone and share across tasks.
#[derive(Clone, Default)]
pub struct StatusStore {
    inner: Arc<Inner>,
}

impl StatusStore {
    /// Create an empty, uninitialized store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record for every service id, each set to `Unknown`.
    ///
    /// May only succeed once per store.
    pub fn initialize<I, S>(&self, service_ids: I) -> StateResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records: HashMap<String, RwLock<StatusRecord>> = service_ids
            .into_iter()
            .map(|id| (id.into(), RwLock::new(StatusRecord::initial())))
            .collect();
        let count = records.len();

        self.inner
            .records
            .set(records)
            .map_err(|_| StateError::AlreadyInitialized)?;

        info!(services = count, "status store initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.records.get().is_some()
    }

    /// Current status of a service.
    pub fn get_status(&self, service_id: &str) -> StateResult<Status> {
        self.get_record(service_id).map(|record| record.status)
    }

    /// Current record of a service.
    pub fn get_record(&self, service_id: &str) -> StateResult<StatusRecord> {
        let slot = self.slot(service_id)?;
        let record = *slot.read().unwrap_or_else(PoisonError::into_inner);
        Ok(record)
    }

    /// Unconditionally overwrite a service's status.
    ///
    /// The write takes a fresh sequence number, so it supersedes any probe
    /// that started before it. This is the path for manual states such as
    /// `Maintenance`.
    pub fn set_status(&self, service_id: &str, status: Status) -> StateResult<()> {
        let slot = self.slot(service_id)?;
        let sequence = self.next_sequence();
        let mut record = slot.write().unwrap_or_else(PoisonError::into_inner);
        *record = StatusRecord {
            status,
            sequence,
            updated_at: Some(epoch_secs()),
        };
        debug!(%service_id, %status, sequence, "status set");
        Ok(())
    }

    /// Store a probe result unless a newer one is already recorded.
    ///
    /// `sequence` must come from [`next_sequence`](Self::next_sequence),
    /// taken when the probe started. Returns whether the write was applied.
    pub fn record_probe(
        &self,
        service_id: &str,
        sequence: u64,
        status: Status,
    ) -> StateResult<bool> {
        let slot = self.slot(service_id)?;
        let mut record = slot.write().unwrap_or_else(PoisonError::into_inner);
        if sequence <= record.sequence {
            debug!(
                %service_id,
                %status,
                sequence,
                current = record.sequence,
                "stale probe result dropped"
            );
            return Ok(false);
        }
        *record = StatusRecord {
            status,
            sequence,
            updated_at: Some(epoch_secs()),
        };
        debug!(%service_id, %status, sequence, "probe result recorded");
        Ok(true)
    }

    /// Allocate the next ordering stamp. Strictly increasing, starts at 1.
    pub fn next_sequence(&self) -> u64 {
        self.inner.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// All records, ordered by service id.
    pub fn snapshot(&self) -> Vec<(String, StatusRecord)> {
        let Some(records) = self.inner.records.get() else {
            return Vec::new();
        };
        let mut out: Vec<(String, StatusRecord)> = records
            .iter()
            .map(|(id, slot)| (id.clone(), *slot.read().unwrap_or_else(PoisonError::into_inner)))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn len(&self) -> usize {
        self.inner.records.get().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, service_id: &str) -> StateResult<&RwLock<StatusRecord>> {
        self.inner
            .records
            .get()
            .and_then(|records| records.get(service_id))
            .ok_or_else(|| StateError::NotFound(service_id.to_string()))
    }
}

/// Current Unix epoch in seconds.
fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
