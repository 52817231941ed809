//! HTTP adapter for the DesignFlow core.
//!
//! # Responsibility
//! - Map REST requests onto core services and wrap results in `ApiResponse`.
//! - Run blocking SQLite work off the async runtime.
//!
//! # Invariants
//! - Handlers never touch SQL directly; every call goes through core services.
//! - All core work for one request runs under the single connection lock.

pub mod config;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
mod state;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use response::ApiResponse;
pub use state::AppState;

use axum::Router;

/// Full application router with every route under `/api`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_router())
        .with_state(state)
}
