use designflow_core::{MutationOutcome, RollupStatus};
use serde::Serialize;

/// Response envelope shared by every route.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Success for a task-set mutation; a failed recompute becomes a warning.
    pub fn mutation(outcome: MutationOutcome<T>) -> Self {
        let message = match outcome.rollup {
            RollupStatus::Applied(_) => None,
            RollupStatus::Failed(reason) => {
                Some(format!("saved, but progress recompute failed: {reason}"))
            }
        };
        Self {
            success: true,
            message,
            data: Some(outcome.value),
        }
    }

    pub fn error(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data,
        }
    }
}
