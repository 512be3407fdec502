//! Health probe execution and classification.
//!
//! A probe is a single GET against the service's health URL, bounded by a
//! timeout. The raw outcome is classified by [`classify`], which is a pure
//! function so the policy can be tested without a network.

use std::time::{Duration, Instant};

use tracing::debug;

use lisa_core::{ProbeSettings, Service};
use lisa_state::Status;

use crate::error::HealthResult;

/// Probe timing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Upper bound on one probe, connect through response headers.
    pub timeout: Duration,
    /// Responses slower than this are `Dodgy`.
    pub dodgy_threshold: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            dodgy_threshold: Duration::from_secs(3),
        }
    }
}

impl From<&ProbeSettings> for ProbeConfig {
    fn from(settings: &ProbeSettings) -> Self {
        Self {
            timeout: settings.timeout,
            dodgy_threshold: settings.dodgy_threshold,
        }
    }
}

/// Raw result of a single probe, before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// A response arrived.
    Completed { status_code: u16, elapsed: Duration },
    /// No response: connection refused, DNS failure, or timeout.
    Failed,
}

/// Map a probe outcome to a status.
///
/// Never yields `Unknown` or `Maintenance`.
pub fn classify(outcome: ProbeOutcome, dodgy_threshold: Duration) -> Status {
    match outcome {
        ProbeOutcome::Failed => Status::Failed,
        ProbeOutcome::Completed { status_code, .. } if !(200..300).contains(&status_code) => {
            Status::Down
        }
        ProbeOutcome::Completed { elapsed, .. } if elapsed > dodgy_threshold => Status::Dodgy,
        ProbeOutcome::Completed { .. } => Status::Up,
    }
}

/// Executes health probes. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Prober {
    client: reqwest::Client,
    config: ProbeConfig,
}

impl Prober {
    pub fn new(config: ProbeConfig) -> HealthResult<Self> {
        // A redirect is a non-2xx answer from the health URL itself.
        let client = reqwest::Client::builder()
            .user_agent(concat!("lisa-health/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> ProbeConfig {
        self.config
    }

    /// Probe a service and classify the result.
    pub async fn check(&self, service: &Service) -> Status {
        let outcome = self.probe(&service.health_check_url).await;
        let status = classify(outcome, self.config.dodgy_threshold);
        debug!(service_id = %service.id, ?outcome, %status, "health probe finished");
        status
    }

    /// Issue one GET against `url` and measure time to response headers.
    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        let started = Instant::now();
        let request = self.client.get(url).send();

        match tokio::time::timeout(self.config.timeout, request).await {
            Ok(Ok(resp)) => ProbeOutcome::Completed {
                status_code: resp.status().as_u16(),
                elapsed: started.elapsed(),
            },
            Ok(Err(e)) => {
                debug!(error = %e, %url, "health probe request failed");
                ProbeOutcome::Failed
            }
            Err(_) => {
                debug!(%url, timeout = ?self.config.timeout, "health probe timed out");
                ProbeOutcome::Failed
            }
        }
    }
}
