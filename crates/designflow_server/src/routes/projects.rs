use crate::extract::Json;
use crate::{ApiResponse, ApiResult, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json as ResponseJson,
    routing::{get, patch, post},
    Router,
};
use designflow_core::service::project_service::TaskBatch;
use designflow_core::{
    AppendTasks, NewProject, Project, ProjectRollup, ProjectService, ProjectStatusPatch, Task,
    TaskService,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveTasksRequest {
    pub task_ids: Vec<Uuid>,
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<NewProject>,
) -> ApiResult<(StatusCode, ResponseJson<ApiResponse<Project>>)> {
    let outcome = state
        .run(move |ctx| ProjectService::new(ctx).create_project(&payload))
        .await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::mutation(outcome))))
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
) -> ApiResult<ResponseJson<ApiResponse<Vec<Project>>>> {
    let projects = state
        .run(|ctx| ProjectService::new(ctx).list_projects())
        .await?;
    Ok(ResponseJson(ApiResponse::success(projects)))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<ResponseJson<ApiResponse<Project>>> {
    let project = state
        .run(move |ctx| ProjectService::new(ctx).get_project(project_id))
        .await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<ResponseJson<ApiResponse<Uuid>>> {
    state
        .run(move |ctx| ProjectService::new(ctx).delete_project(project_id))
        .await?;
    Ok(ResponseJson(ApiResponse::success(project_id)))
}

/// GET /api/projects/{id}/tasks
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<ResponseJson<ApiResponse<Vec<Task>>>> {
    let tasks = state
        .run(move |ctx| TaskService::new(ctx).list_project_tasks(project_id))
        .await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

/// POST /api/projects/{id}/tasks
pub async fn append_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<AppendTasks>,
) -> ApiResult<(StatusCode, ResponseJson<ApiResponse<TaskBatch>>)> {
    let outcome = state
        .run(move |ctx| ProjectService::new(ctx).append_tasks(project_id, &payload))
        .await?;
    Ok((StatusCode::CREATED, ResponseJson(ApiResponse::mutation(outcome))))
}

/// DELETE /api/projects/{id}/tasks
pub async fn remove_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<RemoveTasksRequest>,
) -> ApiResult<ResponseJson<ApiResponse<TaskBatch>>> {
    let outcome = state
        .run(move |ctx| ProjectService::new(ctx).remove_tasks(project_id, &payload.task_ids))
        .await?;
    Ok(ResponseJson(ApiResponse::mutation(outcome)))
}

/// PATCH /api/projects/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<ProjectStatusPatch>,
) -> ApiResult<ResponseJson<ApiResponse<Project>>> {
    let project = state
        .run(move |ctx| ProjectService::new(ctx).update_status(project_id, payload))
        .await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

/// POST /api/projects/{id}/recompute
pub async fn recompute(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<ResponseJson<ApiResponse<ProjectRollup>>> {
    let rollup = state
        .run(move |ctx| ProjectService::new(ctx).recompute(project_id))
        .await?;
    Ok(ResponseJson(ApiResponse::success(rollup)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/{id}", get(get_project).delete(delete_project))
        .route(
            "/projects/{id}/tasks",
            get(list_project_tasks)
                .post(append_tasks)
                .delete(remove_tasks),
        )
        .route("/projects/{id}/status", patch(update_status))
        .route("/projects/{id}/recompute", post(recompute))
}
