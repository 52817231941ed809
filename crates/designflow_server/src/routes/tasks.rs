use crate::extract::Json;
use crate::{ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, patch},
    Router,
};
use designflow_core::{classify_due_date, DueDateTone, Task, TaskPatch, TaskService};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task plus its due-date classification at request time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub due: Option<DueView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueView {
    pub label: String,
    pub tone: DueDateTone,
    pub diff_days: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStepRequest {
    #[serde(alias = "status")]
    pub process_step_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[serde(default)]
    pub main_designer_ids: Vec<Uuid>,
    #[serde(default)]
    pub assistant_designer_ids: Vec<Uuid>,
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<ResponseJson<ApiResponse<TaskView>>> {
    let view = state
        .run(move |ctx| {
            let task = TaskService::new(ctx).get_task(task_id)?;
            let now = ctx.clock.now_ms();
            let due = task
                .due_date
                .and_then(|due| classify_due_date(due, now))
                .map(|status| DueView {
                    label: status.label.to_string(),
                    tone: status.tone,
                    diff_days: status.diff_days,
                });
            Ok(TaskView { task, due })
        })
        .await?;
    Ok(ResponseJson(ApiResponse::success(view)))
}

/// PATCH /api/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<TaskPatch>,
) -> ApiResult<ResponseJson<ApiResponse<Task>>> {
    let outcome = state
        .run(move |ctx| TaskService::new(ctx).update_task(task_id, &payload))
        .await?;
    Ok(ResponseJson(ApiResponse::mutation(outcome)))
}

/// PATCH /api/tasks/{id}/status
pub async fn set_process_step(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<SetStepRequest>,
) -> ApiResult<ResponseJson<ApiResponse<Task>>> {
    let outcome = state
        .run(move |ctx| TaskService::new(ctx).set_process_step(task_id, payload.process_step_id))
        .await?;
    Ok(ResponseJson(ApiResponse::mutation(outcome)))
}

/// PATCH /api/tasks/{id}/assign
pub async fn assign_designers(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<AssignRequest>,
) -> ApiResult<ResponseJson<ApiResponse<Task>>> {
    let outcome = state
        .run(move |ctx| {
            TaskService::new(ctx).assign_designers(
                task_id,
                &payload.main_designer_ids,
                &payload.assistant_designer_ids,
            )
        })
        .await?;
    Ok(ResponseJson(ApiResponse::mutation(outcome)))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<ResponseJson<ApiResponse<Uuid>>> {
    let outcome = state
        .run(move |ctx| TaskService::new(ctx).delete_task(task_id))
        .await?;
    Ok(ResponseJson(ApiResponse::mutation(outcome)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/tasks/{id}/status", patch(set_process_step))
        .route("/tasks/{id}/assign", patch(assign_designers))
}
