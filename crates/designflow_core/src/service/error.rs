//! Service error type shared by every use-case service.

use crate::model::process::UnknownProcessStep;
use crate::model::project::ProjectId;
use crate::model::task::TaskId;
use crate::model::validation::ValidationError;
use crate::repo::error::{EntityRef, RepoError};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Multi-step workflow stopped midway. Work done before the failure is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialFailure {
    pub project_id: Option<ProjectId>,
    /// Order version recorded before the failing step, if any.
    pub snapshot_version: Option<u32>,
    pub created_task_ids: Vec<TaskId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed_task_ids: Vec<TaskId>,
    /// Position of the failing step in the batch. Equals the batch length
    /// when every item went through and a follow-up write failed.
    pub failed_index: usize,
    pub message: String,
}

impl Display for PartialFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "stopped at item {} after creating {} and removing {} task(s): {}",
            self.failed_index,
            self.created_task_ids.len(),
            self.removed_task_ids.len(),
            self.message
        )
    }
}

/// Use-case failure.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    NotFound(EntityRef),
    /// Requested transition is not allowed from the current state.
    InvalidState(String),
    PartialFailure(PartialFailure),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::InvalidState(message) => write!(f, "invalid state: {message}"),
            Self::PartialFailure(failure) => write!(f, "partial failure: {failure}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::InvalidState(_) | Self::PartialFailure(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(entity) => Self::NotFound(entity),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<UnknownProcessStep> for ServiceError {
    fn from(value: UnknownProcessStep) -> Self {
        Self::InvalidState(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use crate::model::validation::ValidationError;
    use crate::repo::error::{EntityRef, RepoError};
    use uuid::Uuid;

    #[test]
    fn repo_not_found_and_validation_keep_their_kind() {
        let id = Uuid::new_v4();
        let err = ServiceError::from(RepoError::NotFound(EntityRef::Task(id)));
        assert!(matches!(err, ServiceError::NotFound(EntityRef::Task(found)) if found == id));

        let err = ServiceError::from(RepoError::Validation(ValidationError::EmptyItems));
        assert!(matches!(err, ServiceError::Validation(ValidationError::EmptyItems)));

        let err = ServiceError::from(RepoError::InvalidData("bad".to_string()));
        assert!(matches!(err, ServiceError::Repo(_)));
    }
}
