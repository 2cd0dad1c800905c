//! HTTP route handlers.

pub mod health;
pub mod table;

use axum::Router;

use crate::state::AppState;

/// Every route of the service, without middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(table::router())
}
