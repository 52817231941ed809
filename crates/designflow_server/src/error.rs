use crate::response::ApiResponse;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use designflow_core::{PartialFailure, ServiceError};
use log::{error, warn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Service(err) => match err {
                ServiceError::Validation(_) | ServiceError::InvalidState(_) => {
                    StatusCode::BAD_REQUEST
                }
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::PartialFailure(_) => StatusCode::MULTI_STATUS,
                ServiceError::Repo(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        let body: ApiResponse<PartialFailure> = match self {
            ApiError::Service(ServiceError::PartialFailure(failure)) => {
                warn!(
                    "event=request_partial module=server status=error failed_index={} created={} removed={}",
                    failure.failed_index,
                    failure.created_task_ids.len(),
                    failure.removed_task_ids.len()
                );
                ApiResponse::error(message, Some(failure))
            }
            _ => {
                if status.is_server_error() {
                    error!("event=request_failed module=server status=error error={message}");
                }
                ApiResponse::error(message, None)
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use designflow_core::{EntityRef, PartialFailure, RepoError, ServiceError};
    use uuid::Uuid;

    #[test]
    fn service_errors_map_to_status_codes() {
        let not_found = ApiError::from(ServiceError::NotFound(EntityRef::Task(Uuid::nil())));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = ApiError::from(ServiceError::InvalidState("no".to_string()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let repo = ApiError::from(ServiceError::Repo(RepoError::InvalidData("x".to_string())));
        assert_eq!(repo.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn partial_failure_is_multi_status() {
        let err = ApiError::from(ServiceError::PartialFailure(PartialFailure {
            project_id: Some(Uuid::nil()),
            snapshot_version: Some(2),
            created_task_ids: vec![Uuid::nil()],
            removed_task_ids: Vec::new(),
            failed_index: 1,
            message: "disk full".to_string(),
        }));
        assert_eq!(err.into_response().status(), StatusCode::MULTI_STATUS);
    }
}
