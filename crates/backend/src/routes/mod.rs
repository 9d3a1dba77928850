//! HTTP surface for the core services.
//!
//! Three route groups: the account-created event consumer, the slug-check
//! API, and the analytics API.

use axum::Router;

use crate::state::AppState;

pub mod analytics;
pub mod events;
pub mod slug;

/// Build the full application router (without middleware layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(events::router())
        .merge(slug::router())
        .merge(analytics::router())
}
