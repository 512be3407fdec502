//! lisad: the LISA daemon.
//!
//! Single binary that assembles the health monitor:
//! - Service registry (YAML)
//! - Status store
//! - Prober + scheduler + status writer
//! - Query API (status, badges, versions)
//!
//! # Usage
//!
//! ```text
//! lisad serve --services config/services.yaml --config lisa.toml --port 8000
//! lisad check --services config/services.yaml
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use lisa_api::{ApiState, build_router};
use lisa_core::{CronSchedule, Registry, Settings};
use lisa_health::{ProbeConfig, Prober, VersionChecker};
use lisa_scheduler::HealthMonitor;
use lisa_state::StatusStore;

const DEFAULT_LOG_FILTER: &str = "info,lisad=debug,lisa=debug";

#[derive(Parser)]
#[command(name = "lisad", about = "LISA service health monitor")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe services on their schedules and serve the query API.
    Serve(ServeArgs),

    /// Validate a service registry and print each service's next probe time.
    Check {
        /// Service registry file.
        #[arg(long, env = "LISA_SERVICES", default_value = "config/services.yaml")]
        services: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Service registry file.
    #[arg(long, env = "LISA_SERVICES", default_value = "config/services.yaml")]
    services: PathBuf,

    /// Daemon settings file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind.
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Health probe timeout, e.g. "10s".
    #[arg(long, value_parser = duration_arg)]
    probe_timeout: Option<Duration>,

    /// Latency above which a healthy response counts as dodgy, e.g. "3s".
    #[arg(long, value_parser = duration_arg)]
    dodgy_threshold: Option<Duration>,

    /// Version lookup timeout, e.g. "10s".
    #[arg(long, value_parser = duration_arg)]
    version_timeout: Option<Duration>,

    /// Run scheduled probes. When false only the startup sweep runs.
    #[arg(
        long,
        env = "PING_ENABLED",
        action = clap::ArgAction::Set,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    ping_enabled: Option<bool>,
}

fn duration_arg(s: &str) -> Result<Duration, String> {
    lisa_core::parse_duration(s)
        .ok_or_else(|| format!("invalid duration `{s}` (expected e.g. 10s, 500ms, 2m)"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Check { services } => run_check(&services),
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Settings file first, then command-line overrides.
fn resolve_settings(args: &ServeArgs) -> anyhow::Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };

    if let Some(bind) = &args.bind {
        settings.server.bind = bind.clone();
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(timeout) = args.probe_timeout {
        settings.probe.timeout = timeout;
    }
    if let Some(threshold) = args.dodgy_threshold {
        settings.probe.dodgy_threshold = threshold;
    }
    if let Some(timeout) = args.version_timeout {
        settings.probe.version_timeout = timeout;
    }
    if let Some(enabled) = args.ping_enabled {
        settings.schedule.ping_enabled = enabled;
    }
    Ok(settings)
}

async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    info!("LISA daemon starting");

    let settings = resolve_settings(&args)?;
    let registry = Registry::from_file(&args.services)
        .with_context(|| format!("loading registry from {}", args.services.display()))?;
    info!(path = ?args.services, services = registry.len(), "registry loaded");

    // ── Initialize subsystems ──────────────────────────────────

    let store = StatusStore::new();
    store.initialize(registry.ids())?;

    let prober = Prober::new(ProbeConfig::from(&settings.probe))?;
    let versions = VersionChecker::new(settings.probe.version_timeout)?;
    info!(
        timeout = ?settings.probe.timeout,
        dodgy_threshold = ?settings.probe.dodgy_threshold,
        "prober initialized"
    );

    let monitor = HealthMonitor::new(store.clone(), prober);
    let services = registry.to_vec();

    if settings.schedule.ping_enabled {
        let report = monitor.start(&services).await?;
        for rejected in &report.rejected {
            warn!(error = %rejected, "service not scheduled");
        }
        info!(scheduled = report.scheduled.len(), "health monitor started");
    } else {
        let report = monitor.sweep(&services).await?;
        info!(completed = report.completed, "scheduled pings disabled; startup sweep only");
    }

    // ── Start API server ───────────────────────────────────────

    let router = build_router(ApiState {
        registry: Arc::new(registry),
        store,
        versions,
    });
    let ip: IpAddr = settings
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", settings.server.bind))?;
    let addr = SocketAddr::new(ip, settings.server.port);

    info!(%addr, "API server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    monitor.stop().await;
    served?;

    info!("LISA daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

fn run_check(path: &Path) -> anyhow::Result<()> {
    let registry = Registry::from_file(path)
        .with_context(|| format!("loading registry from {}", path.display()))?;

    println!("{} service(s) in {}", registry.len(), path.display());
    for service in registry.services() {
        let next = CronSchedule::parse(&service.schedule)?
            .next_fire()
            .map(|t| t.format("%Y-%m-%d %H:%M %Z").to_string())
            .unwrap_or_else(|| "never".to_string());
        println!("  {:<20} {:<16} next probe {}", service.id, service.schedule, next);
    }
    Ok(())
}
