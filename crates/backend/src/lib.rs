//! Tiendita backend library.
//!
//! The three event-driven core services behind the storefront product:
//! profile provisioning on account creation, slug validation, and per-store
//! daily view analytics. Exposed as a library so the HTTP surface can be
//! tested without a running server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::{Router, routing::get};

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

use state::AppState;

/// Build the application router: liveness endpoint plus the API routes.
///
/// Middleware layers (tracing, Sentry) and the readiness endpoint are
/// attached by the binary, which owns the database pool.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}
