//! StatusWriter: the single task that writes probe results to the store.
//!
//! Firings never touch the store directly. They submit
//! `(service, sequence, status)` over a channel and wait for the writer to
//! acknowledge. Once [`StatusWriter::close`] returns, the store receives
//! no further writes from this writer; anything still queued is dropped.

use std::sync::{Mutex, PoisonError};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use lisa_state::{StateError, Status, StatusStore};

/// Capacity of the submission queue.
const QUEUE_DEPTH: usize = 256;

/// What happened to a submitted result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Stored as the service's current status.
    Applied,
    /// A result from a later-started probe was already stored.
    Stale,
    /// The service id is not in the store.
    UnknownService,
    /// The writer has been closed; nothing was stored.
    Closed,
}

struct WriteCommand {
    service_id: String,
    sequence: u64,
    status: Status,
    ack: oneshot::Sender<WriteOutcome>,
}

/// Submission side of the writer, cloned into every firing.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<WriteCommand>,
}

impl WriteHandle {
    /// Submit a probe result and wait until the writer has handled it.
    pub async fn submit(&self, service_id: &str, sequence: u64, status: Status) -> WriteOutcome {
        let (ack, done) = oneshot::channel();
        let command = WriteCommand {
            service_id: service_id.to_string(),
            sequence,
            status,
            ack,
        };
        if self.tx.send(command).await.is_err() {
            return WriteOutcome::Closed;
        }
        done.await.unwrap_or(WriteOutcome::Closed)
    }
}

/// Owner of the writer task.
pub struct StatusWriter {
    handle: WriteHandle,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatusWriter {
    /// Spawn the writer task. Must be called inside a tokio runtime.
    pub fn spawn(store: StatusStore) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_writer(store, rx, shutdown_rx));
        Self {
            handle: WriteHandle { tx },
            shutdown_tx,
            task: Mutex::new(Some(task)),
        }
    }

    pub fn handle(&self) -> WriteHandle {
        self.handle.clone()
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.task.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }

    /// Stop the writer and wait for it to exit. Idempotent.
    pub async fn close(&self) {
        self.shutdown_tx.send_replace(true);
        let task = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "status writer task failed");
            }
        }
    }
}

async fn run_writer(
    store: StatusStore,
    mut rx: mpsc::Receiver<WriteCommand>,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!("status writer started");
    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            command = rx.recv() => {
                let Some(command) = command else { break };
                let outcome = apply(&store, &command);
                let _ = command.ack.send(outcome);
            }
        }
    }
    debug!("status writer stopped");
}

fn apply(store: &StatusStore, command: &WriteCommand) -> WriteOutcome {
    match store.record_probe(&command.service_id, command.sequence, command.status) {
        Ok(true) => WriteOutcome::Applied,
        Ok(false) => WriteOutcome::Stale,
        Err(StateError::NotFound(id)) => {
            warn!(service_id = %id, "probe result for unregistered service dropped");
            WriteOutcome::UnknownService
        }
        Err(e) => {
            warn!(service_id = %command.service_id, error = %e, "probe result not stored");
            WriteOutcome::UnknownService
        }
    }
}
