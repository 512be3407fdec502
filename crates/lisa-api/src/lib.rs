//! lisa-api: HTTP query surface for LISA.
//!
//! Read-only routes over the status store, plus on-demand version lookups.
//! Handlers never wait on a probe; status reads hit memory only.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Welcome message |
//! | GET | `/services` | Every service with its current status |
//! | GET | `/health/{id}` | Current status of one service |
//! | GET | `/badge/{id}` | SVG badge for the current status |
//! | GET | `/version/{id}` | Version reported by the service right now |

pub mod badge;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use lisa_core::Registry;
use lisa_health::VersionChecker;
use lisa_state::StatusStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<Registry>,
    pub store: StatusStore,
    pub versions: VersionChecker,
}

/// Build the query router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/services", get(handlers::list_services))
        .route("/health/{id}", get(handlers::get_health))
        .route("/badge/{id}", get(handlers::get_badge))
        .route("/version/{id}", get(handlers::get_version))
        .with_state(state)
}
