//! Route table. Every handler delegates to one core service call.

pub mod health;
pub mod orders;
pub mod projects;
pub mod tasks;

use crate::AppState;
use axum::Router;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(projects::router())
        .merge(tasks::router())
}
