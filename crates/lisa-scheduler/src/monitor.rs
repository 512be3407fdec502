//! Health monitor: wires probes, the scheduler, and the status writer.
//!
//! Each firing takes a sequence number from the store, runs one probe,
//! and hands the result to the [`StatusWriter`]. The startup sweep uses
//! the same firing, so after [`HealthMonitor::start`] returns every
//! registered service has a probed status.

use std::sync::Arc;

use tracing::{debug, info};

use lisa_core::{ScheduleError, Service};
use lisa_health::Prober;
use lisa_state::StatusStore;

use crate::cadence::Cadence;
use crate::error::{SchedulerError, SchedulerResult};
use crate::scheduler::{BoxFuture, FireFn, Lifecycle, Scheduler, StartReport, SweepReport};
use crate::writer::StatusWriter;

/// Runs health probes for every registered service.
pub struct HealthMonitor {
    store: StatusStore,
    prober: Prober,
    scheduler: Scheduler,
    writer: StatusWriter,
}

impl HealthMonitor {
    /// Create a monitor. Must be called inside a tokio runtime.
    pub fn new(store: StatusStore, prober: Prober) -> Self {
        let writer = StatusWriter::spawn(store.clone());
        Self {
            store,
            prober,
            scheduler: Scheduler::new(),
            writer,
        }
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.scheduler.lifecycle()
    }

    /// Probe every service once, concurrently, and wait for the results
    /// to be stored.
    pub async fn sweep(&self, services: &[Arc<Service>]) -> SchedulerResult<SweepReport> {
        if self.lifecycle() == Lifecycle::Stopped || self.writer.is_closed() {
            return Err(SchedulerError::Stopped);
        }
        if !self.store.is_initialized() {
            return Err(SchedulerError::StoreNotInitialized);
        }
        Ok(self.scheduler.run_startup_sweep(services, &self.fire_fn()).await)
    }

    /// Run the startup sweep, then poll each service on its cron schedule.
    pub async fn start(&self, services: &[Arc<Service>]) -> SchedulerResult<StartReport> {
        self.ensure_startable()?;
        self.sweep(services).await?;
        self.scheduler.start(services, self.fire_fn())
    }

    /// Like [`start`](Self::start) but with a caller-supplied cadence.
    pub async fn start_with<F>(
        &self,
        services: &[Arc<Service>],
        cadence_for: F,
    ) -> SchedulerResult<StartReport>
    where
        F: FnMut(&Service) -> Result<Box<dyn Cadence>, ScheduleError>,
    {
        self.ensure_startable()?;
        self.sweep(services).await?;
        self.scheduler.start_with(services, cadence_for, self.fire_fn())
    }

    /// Stop scheduling and close the writer.
    ///
    /// In-flight probes finish but their results are discarded; once this
    /// returns the store is not written again by this monitor.
    pub async fn stop(&self) {
        self.scheduler.stop().await;
        self.writer.close().await;
        info!("health monitor stopped");
    }

    fn ensure_startable(&self) -> SchedulerResult<()> {
        match self.scheduler.lifecycle() {
            Lifecycle::Created => Ok(()),
            Lifecycle::Running => Err(SchedulerError::AlreadyStarted),
            Lifecycle::Stopped => Err(SchedulerError::Stopped),
        }
    }

    fn fire_fn(&self) -> FireFn {
        let store = self.store.clone();
        let prober = self.prober.clone();
        let writer = self.writer.handle();

        Arc::new(move |service: Arc<Service>| -> BoxFuture {
            let store = store.clone();
            let prober = prober.clone();
            let writer = writer.clone();
            Box::pin(async move {
                let sequence = store.next_sequence();
                let status = prober.check(&service).await;
                let outcome = writer.submit(&service.id, sequence, status).await;
                debug!(service_id = %service.id, %status, sequence, ?outcome, "firing complete");
            })
        })
    }
}
