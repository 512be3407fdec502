//! Scheduler: one independent timer per service.
//!
//! Each timer task sleeps until its cadence says to fire, then spawns the
//! firing as its own task and goes back to sleep. Firings are therefore
//! isolated: a slow or panicking firing never delays or cancels the next
//! one, for that service or any other.
//!
//! ```text
//! CREATED ──start──▶ RUNNING ──stop──▶ STOPPED
//!    └──────stop (no-op)
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};

use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use lisa_core::{CronSchedule, ScheduleError, Service};

use crate::cadence::{Cadence, next_fire};
use crate::error::{SchedulerError, SchedulerResult};

/// Work performed on each firing for one service.
pub type FireFn = Arc<dyn Fn(Arc<Service>) -> BoxFuture + Send + Sync>;

pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Running,
    Stopped,
}

/// Outcome of [`Scheduler::start`].
#[derive(Debug, Default)]
pub struct StartReport {
    /// Services that now have a running timer.
    pub scheduled: Vec<String>,
    /// Services whose schedule could not be parsed; they will not be polled.
    pub rejected: Vec<SchedulerError>,
}

/// Outcome of [`Scheduler::run_startup_sweep`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub completed: usize,
    pub panicked: usize,
}

/// Owns the per-service timers.
pub struct Scheduler {
    lifecycle: Mutex<Lifecycle>,
    shutdown_tx: watch::Sender<bool>,
    timers: Mutex<Vec<JoinHandle<()>>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            lifecycle: Mutex::new(Lifecycle::Created),
            shutdown_tx,
            timers: Mutex::new(Vec::new()),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        *self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fire `on_fire` once for every service, all at the same time, and
    /// wait until every firing has finished.
    pub async fn run_startup_sweep(&self, services: &[Arc<Service>], on_fire: &FireFn) -> SweepReport {
        let mut firings = JoinSet::new();
        for service in services {
            let fire = on_fire.clone();
            let service = service.clone();
            firings.spawn(async move { fire(service).await });
        }

        let mut report = SweepReport::default();
        while let Some(result) = firings.join_next().await {
            match result {
                Ok(()) => report.completed += 1,
                Err(e) => {
                    error!(error = %e, "startup probe panicked");
                    report.panicked += 1;
                }
            }
        }

        info!(
            completed = report.completed,
            panicked = report.panicked,
            "startup sweep finished"
        );
        report
    }

    /// Start a cron timer for every service.
    ///
    /// A service whose schedule does not parse is reported in
    /// [`StartReport::rejected`]; the others are scheduled regardless.
    pub fn start(&self, services: &[Arc<Service>], on_fire: FireFn) -> SchedulerResult<StartReport> {
        self.start_with(
            services,
            |service| {
                CronSchedule::parse(&service.schedule)
                    .map(|schedule| Box::new(schedule) as Box<dyn Cadence>)
            },
            on_fire,
        )
    }

    /// Start a timer for every service using a caller-supplied cadence.
    pub fn start_with<F>(
        &self,
        services: &[Arc<Service>],
        mut cadence_for: F,
        on_fire: FireFn,
    ) -> SchedulerResult<StartReport>
    where
        F: FnMut(&Service) -> Result<Box<dyn Cadence>, ScheduleError>,
    {
        // Held until every timer is recorded; stop() must see all of them.
        let mut lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        match *lifecycle {
            Lifecycle::Created => *lifecycle = Lifecycle::Running,
            Lifecycle::Running => return Err(SchedulerError::AlreadyStarted),
            Lifecycle::Stopped => return Err(SchedulerError::Stopped),
        }

        let mut report = StartReport::default();
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);

        for service in services {
            match cadence_for(service) {
                Ok(cadence) => {
                    timers.push(tokio::spawn(run_timer(
                        service.clone(),
                        cadence,
                        on_fire.clone(),
                        self.shutdown_tx.subscribe(),
                    )));
                    report.scheduled.push(service.id.clone());
                }
                Err(source) => {
                    warn!(
                        service_id = %service.id,
                        schedule = %service.schedule,
                        error = %source,
                        "malformed schedule, service will not be polled"
                    );
                    report.rejected.push(SchedulerError::MalformedSchedule {
                        service_id: service.id.clone(),
                        source,
                    });
                }
            }
        }

        info!(
            scheduled = report.scheduled.len(),
            rejected = report.rejected.len(),
            "scheduler started"
        );
        Ok(report)
    }

    /// Cancel all future firings and wait for the timers to exit.
    ///
    /// Firings already in flight keep running to completion. Calling this
    /// more than once, or before `start`, does nothing.
    pub async fn stop(&self) {
        let timers = {
            let mut lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
            if *lifecycle != Lifecycle::Running {
                return;
            }
            *lifecycle = Lifecycle::Stopped;
            self.shutdown_tx.send_replace(true);
            std::mem::take(&mut *self.timers.lock().unwrap_or_else(PoisonError::into_inner))
        };

        for handle in timers {
            if let Err(e) = handle.await {
                error!(error = %e, "timer task failed");
            }
        }
        info!("scheduler stopped");
    }
}

/// The timer loop for a single service.
async fn run_timer(
    service: Arc<Service>,
    cadence: Box<dyn Cadence>,
    on_fire: FireFn,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut firings = JoinSet::new();
    debug!(service_id = %service.id, "timer starting");

    let mut previous: Option<DateTime<Local>> = None;

    'timer: loop {
        if *shutdown.borrow() {
            break;
        }
        let now = Local::now();
        let Some(scheduled) = next_fire(cadence.as_ref(), previous, now) else {
            warn!(service_id = %service.id, "schedule has no further occurrences");
            break;
        };
        let delay = (scheduled - now).to_std().unwrap_or(Duration::ZERO);

        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => break,
                Some(result) = firings.join_next() => report_firing(&service.id, result),
                _ = shutdown.changed() => break 'timer,
            }
        }

        if *shutdown.borrow() {
            break;
        }
        previous = Some(scheduled);
        debug!(service_id = %service.id, %scheduled, "firing");
        let fire = on_fire.clone();
        let target = service.clone();
        firings.spawn(async move { fire(target).await });
    }

    // Let in-flight firings finish on their own.
    firings.detach_all();
    debug!(service_id = %service.id, "timer stopped");
}

fn report_firing(service_id: &str, result: Result<(), JoinError>) {
    match result {
        Ok(()) => {}
        Err(e) if e.is_panic() => error!(%service_id, "probe firing panicked"),
        Err(e) => debug!(%service_id, error = %e, "probe firing cancelled"),
    }
}
