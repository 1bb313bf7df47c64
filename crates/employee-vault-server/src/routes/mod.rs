//! HTTP routes for the Employee Vault server.

pub mod employees;
pub mod ui;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// All page routes, awaiting state.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().merge(employees::router())
}
