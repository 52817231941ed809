use crate::{AppState, ApiResponse};
use axum::{response::Json as ResponseJson, routing::get, Router};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Health {
    pub ping: &'static str,
    pub version: &'static str,
}

/// GET /api/health
pub async fn health() -> ResponseJson<ApiResponse<Health>> {
    ResponseJson(ApiResponse::success(Health {
        ping: designflow_core::ping(),
        version: designflow_core::core_version(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
