use crate::extract::Json;
use crate::{ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::get,
    Router,
};
use designflow_core::{ClientInfo, OrderItem, OrderSnapshot, OrderSnapshotStore};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionRequest {
    #[serde(default)]
    pub client: ClientInfo,
    pub items: Vec<OrderItem>,
}

/// POST /api/orders/{order_id}/versions
pub async fn create_version(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<CreateVersionRequest>,
) -> ApiResult<(StatusCode, ResponseJson<ApiResponse<OrderSnapshot>>)> {
    let snapshot = state
        .run(move |ctx| {
            OrderSnapshotStore::new(ctx).create_version(order_id, &payload.client, &payload.items)
        })
        .await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::success(snapshot))))
}

/// GET /api/orders/{order_id}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<ResponseJson<ApiResponse<Vec<OrderSnapshot>>>> {
    let versions = state
        .run(move |ctx| OrderSnapshotStore::new(ctx).list_versions(order_id))
        .await?;
    Ok(ResponseJson(ApiResponse::success(versions)))
}

/// GET /api/orders/{order_id}/versions/latest
pub async fn get_latest_version(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<ResponseJson<ApiResponse<OrderSnapshot>>> {
    let snapshot = state
        .run(move |ctx| OrderSnapshotStore::new(ctx).get_latest_version(order_id))
        .await?;
    Ok(ResponseJson(ApiResponse::success(snapshot)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/orders/{order_id}/versions",
            get(list_versions).post(create_version),
        )
        .route("/orders/{order_id}/versions/latest", get(get_latest_version))
}
