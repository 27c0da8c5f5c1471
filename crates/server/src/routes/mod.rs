//! Read-only query routes.
//!
//! The administrative CRUD surface and the real-time transport live in
//! separate services; this server only answers pull-style queries about
//! resolution and sync runtime state.

pub mod health;
pub mod resolution;
pub mod sync_groups;

use axum::Router;

use crate::state::AppState;

/// All `/api/v1` routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(resolution::router())
        .merge(sync_groups::router())
}
