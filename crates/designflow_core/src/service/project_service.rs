//! Project use-case service.
//!
//! # Responsibility
//! - Create a project and its tasks from one order snapshot.
//! - Append and remove tasks, re-snapshotting the linked order each time.
//! - Apply manual progress and settlement status changes.
//!
//! # Invariants
//! - Creation inserts the project before any task.
//! - Snapshots written here always hold the full item list of the linked
//!   order, never a delta.
//! - A failure after the first task insert or delete reports
//!   `PartialFailure`; work already committed is kept and the aggregator
//!   still runs.

use crate::model::order::{Contact, OrderId, OrderItem, OrderSnapshot};
use crate::model::project::{ProgressStatus, Project, ProjectId, ProjectRollup};
use crate::model::task::{SettlementStatus, Task, TaskId, UserId};
use crate::model::validation::ValidationError;
use crate::repo::error::EntityRef;
use crate::service::aggregator::ProgressAggregator;
use crate::service::error::{PartialFailure, ServiceError, ServiceResult};
use crate::service::order_service::OrderSnapshotStore;
use crate::service::{
    price_new_item, resolve_designers, MutationOutcome, NewTaskItem, ServiceContext,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Input for creating a project from an order version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub order_id: OrderId,
    /// Latest version when absent.
    #[serde(default)]
    pub version_number: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub client_requirements: Option<String>,
    #[serde(default)]
    pub main_designer_ids: Vec<UserId>,
    #[serde(default)]
    pub assistant_designer_ids: Vec<UserId>,
    /// Specification per snapshot item index.
    #[serde(default)]
    pub specifications: Vec<Option<String>>,
}

/// Input for appending catalog items to a project.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendTasks {
    pub items: Vec<NewTaskItem>,
    /// Replaces the client contact list when present.
    #[serde(default)]
    pub contacts: Option<Vec<Contact>>,
}

/// Manual status change; `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatusPatch {
    #[serde(default)]
    pub progress_status: Option<ProgressStatus>,
    #[serde(default)]
    pub settlement_status: Option<SettlementStatus>,
}

/// Project state after a task batch, with the order version it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBatch {
    pub project: Project,
    pub task_ids: Vec<TaskId>,
    pub snapshot: Option<OrderSnapshot>,
}

/// Project service facade over repository implementations.
pub struct ProjectService<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> ProjectService<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self {
        Self { ctx }
    }

    /// Creates a project with one task per snapshot item.
    ///
    /// Requested designers are attached to every initial task so they reach
    /// the derived project roster.
    pub fn create_project(&self, input: &NewProject) -> ServiceResult<MutationOutcome<Project>> {
        let snapshot = self
            .orders()
            .resolve_version(input.order_id, input.version_number)?;
        let main_designers = resolve_designers(self.ctx.users, &input.main_designer_ids)?;
        let assistant_designers =
            resolve_designers(self.ctx.users, &input.assistant_designer_ids)?;

        let now = self.ctx.clock.now_ms();
        let mut project = Project::new(
            input.name.as_str(),
            snapshot.client.clone(),
            Some(input.order_id),
            now,
        );
        project.team_id = input.team_id.clone();
        project.client_requirements = input.client_requirements.clone();
        self.ctx.projects.insert_project(&project)?;
        info!(
            "event=project_created module=projects status=ok project={} order={} version={}",
            project.id, input.order_id, snapshot.version_number
        );

        let tasks = snapshot.items.iter().enumerate().map(|(index, item)| {
            let mut task = Task::from_order_item(project.id, Some(input.order_id), item, now);
            task.specification = input.specifications.get(index).cloned().flatten();
            task.main_designers = main_designers.clone();
            task.assistant_designers = assistant_designers.clone();
            task
        });
        self.insert_batch(project.id, Some(snapshot.version_number), tasks)?;

        let rollup = self.aggregator().recompute_after_mutation(project.id);
        Ok(MutationOutcome {
            value: self.reload(project.id)?,
            rollup,
        })
    }

    /// Prices `input.items`, records a new order version, and creates their tasks.
    pub fn append_tasks(
        &self,
        project_id: ProjectId,
        input: &AppendTasks,
    ) -> ServiceResult<MutationOutcome<TaskBatch>> {
        if input.items.is_empty() {
            return Err(ValidationError::EmptyBatch("items").into());
        }
        let mut project = self.reload(project_id)?;
        let existing = self.ctx.tasks.list_project_tasks(project_id)?;

        let priced = input
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| price_new_item(self.ctx.catalog, index, item))
            .collect::<ServiceResult<Vec<_>>>()?;

        let order_id = project.linked_order();
        let snapshot = match order_id {
            Some(order_id) => {
                let retained = existing.iter().filter(|task| task.order_id == Some(order_id));
                let items = retained
                    .map(Task::to_order_item)
                    .chain(priced.iter().cloned())
                    .collect::<Vec<_>>();
                Some(self.snapshot_order(&project, order_id, input.contacts.as_deref(), &items)?)
            }
            None => None,
        };
        let snapshot_version = snapshot.as_ref().map(|s| s.version_number);

        let now = self.ctx.clock.now_ms();
        let tasks = priced.iter().zip(&input.items).map(|(line, item)| {
            let mut task = Task::from_order_item(project_id, order_id, line, now);
            task.specification = item.specification.clone();
            if let Some(priority) = item.priority {
                task.priority = priority;
            }
            task
        });
        let task_ids = self.insert_batch(project_id, snapshot_version, tasks)?;

        if let Some(contacts) = &input.contacts {
            if *contacts != project.client.contacts {
                project.client.contacts = contacts.clone();
                project.updated_at = now;
                if let Err(err) = self.ctx.projects.update_details(&project) {
                    return Err(self.fail_after_commit(PartialFailure {
                        project_id: Some(project_id),
                        snapshot_version,
                        failed_index: task_ids.len(),
                        created_task_ids: task_ids,
                        removed_task_ids: Vec::new(),
                        message: err.to_string(),
                    }));
                }
            }
        }

        let rollup = self.aggregator().recompute_after_mutation(project_id);
        Ok(MutationOutcome {
            value: TaskBatch {
                project: self.reload(project_id)?,
                task_ids,
                snapshot,
            },
            rollup,
        })
    }

    /// Deletes tasks of one project and re-snapshots the remaining order items.
    ///
    /// No version is written when the removal leaves the order without items.
    pub fn remove_tasks(
        &self,
        project_id: ProjectId,
        task_ids: &[TaskId],
    ) -> ServiceResult<MutationOutcome<TaskBatch>> {
        if task_ids.is_empty() {
            return Err(ValidationError::EmptyBatch("taskIds").into());
        }
        let project = self.reload(project_id)?;
        let existing = self.ctx.tasks.list_project_tasks(project_id)?;

        let mut requested: Vec<TaskId> = Vec::with_capacity(task_ids.len());
        for &task_id in task_ids {
            if !existing.iter().any(|task| task.id == task_id) {
                return Err(ServiceError::NotFound(EntityRef::Task(task_id)));
            }
            if !requested.contains(&task_id) {
                requested.push(task_id);
            }
        }
        let mut deleted: Vec<TaskId> = Vec::with_capacity(requested.len());
        for (index, &task_id) in requested.iter().enumerate() {
            if let Err(err) = self.ctx.tasks.delete_task(task_id) {
                if deleted.is_empty() {
                    return Err(err.into());
                }
                return Err(self.fail_after_commit(PartialFailure {
                    project_id: Some(project_id),
                    snapshot_version: None,
                    created_task_ids: Vec::new(),
                    removed_task_ids: deleted,
                    failed_index: index,
                    message: err.to_string(),
                }));
            }
            deleted.push(task_id);
        }
        info!(
            "event=tasks_removed module=projects status=ok project={} removed={}",
            project_id,
            deleted.len()
        );

        let mut snapshot = None;
        if let Some(order_id) = project.linked_order() {
            let items = existing
                .iter()
                .filter(|task| task.order_id == Some(order_id) && !deleted.contains(&task.id))
                .map(Task::to_order_item)
                .collect::<Vec<_>>();
            if !items.is_empty() {
                match self.snapshot_order(&project, order_id, None, &items) {
                    Ok(written) => snapshot = Some(written),
                    Err(err) => {
                        return Err(self.fail_after_commit(PartialFailure {
                            project_id: Some(project_id),
                            snapshot_version: None,
                            created_task_ids: Vec::new(),
                            failed_index: deleted.len(),
                            removed_task_ids: deleted,
                            message: err.to_string(),
                        }));
                    }
                }
            }
        }

        let rollup = self.aggregator().recompute_after_mutation(project_id);
        Ok(MutationOutcome {
            value: TaskBatch {
                project: self.reload(project_id)?,
                task_ids: deleted,
                snapshot,
            },
            rollup,
        })
    }

    /// Applies manual status changes after checking the progress transition.
    pub fn update_status(
        &self,
        project_id: ProjectId,
        patch: ProjectStatusPatch,
    ) -> ServiceResult<Project> {
        let mut project = self.reload(project_id)?;
        let mut changed = false;

        if let Some(next) = patch.progress_status {
            let current = project.progress_status;
            if !current.can_transition_to(next) {
                return Err(ServiceError::InvalidState(format!(
                    "project cannot move from `{}` to `{}`",
                    current.as_str(),
                    next.as_str()
                )));
            }
            changed |= current != next;
            project.progress_status = next;
        }
        if let Some(next) = patch.settlement_status {
            changed |= project.settlement_status != next;
            project.settlement_status = next;
        }

        if changed {
            project.updated_at = self.ctx.clock.now_ms();
            self.ctx.projects.update_details(&project)?;
            info!(
                "event=project_status_changed module=projects status=ok project={} progress_status={} settlement_status={}",
                project_id,
                project.progress_status.as_str(),
                project.settlement_status.as_str()
            );
        }
        Ok(project)
    }

    pub fn set_progress_status(
        &self,
        project_id: ProjectId,
        status: ProgressStatus,
    ) -> ServiceResult<Project> {
        self.update_status(
            project_id,
            ProjectStatusPatch {
                progress_status: Some(status),
                settlement_status: None,
            },
        )
    }

    pub fn set_settlement_status(
        &self,
        project_id: ProjectId,
        status: SettlementStatus,
    ) -> ServiceResult<Project> {
        self.update_status(
            project_id,
            ProjectStatusPatch {
                progress_status: None,
                settlement_status: Some(status),
            },
        )
    }

    /// Recomputes derived fields on demand; errors are returned, not swallowed.
    pub fn recompute(&self, project_id: ProjectId) -> ServiceResult<ProjectRollup> {
        self.reload(project_id)?;
        self.aggregator().recompute(project_id)
    }

    pub fn get_project(&self, project_id: ProjectId) -> ServiceResult<Project> {
        self.reload(project_id)
    }

    /// All projects, newest first.
    pub fn list_projects(&self) -> ServiceResult<Vec<Project>> {
        Ok(self.ctx.projects.list_projects()?)
    }

    /// Deletes the project and its tasks. Order snapshots are kept.
    pub fn delete_project(&self, project_id: ProjectId) -> ServiceResult<()> {
        self.ctx.projects.delete_project(project_id)?;
        info!(
            "event=project_deleted module=projects status=ok project={}",
            project_id
        );
        Ok(())
    }

    /// Inserts tasks in order, stopping at the first failure.
    fn insert_batch(
        &self,
        project_id: ProjectId,
        snapshot_version: Option<u32>,
        tasks: impl Iterator<Item = Task>,
    ) -> ServiceResult<Vec<TaskId>> {
        let mut created = Vec::new();
        for (index, task) in tasks.enumerate() {
            if let Err(err) = self.ctx.tasks.insert_task(&task) {
                return Err(self.fail_after_commit(PartialFailure {
                    project_id: Some(project_id),
                    snapshot_version,
                    created_task_ids: created,
                    removed_task_ids: Vec::new(),
                    failed_index: index,
                    message: err.to_string(),
                }));
            }
            created.push(task.id);
        }
        Ok(created)
    }

    /// Reports a workflow that failed after changing the task set.
    ///
    /// Committed changes stay, so the rollup is recomputed before returning.
    fn fail_after_commit(&self, failure: PartialFailure) -> ServiceError {
        let project_id = failure.project_id;
        warn!(
            "event=task_batch module=projects status=error project={} failed_index={} created={} removed={} error={}",
            project_id.map(|id| id.to_string()).unwrap_or_default(),
            failure.failed_index,
            failure.created_task_ids.len(),
            failure.removed_task_ids.len(),
            failure.message
        );
        if let Some(project_id) = project_id {
            self.aggregator().recompute_after_mutation(project_id);
        }
        ServiceError::PartialFailure(failure)
    }

    /// Writes the next order version using the latest client info.
    fn snapshot_order(
        &self,
        project: &Project,
        order_id: OrderId,
        contacts: Option<&[Contact]>,
        items: &[OrderItem],
    ) -> ServiceResult<OrderSnapshot> {
        let mut client = match self.ctx.orders.get_latest_version(order_id)? {
            Some(latest) => latest.client,
            None => project.client.clone(),
        };
        if let Some(contacts) = contacts {
            client.contacts = contacts.to_vec();
        }
        self.orders().create_version(order_id, &client, items)
    }

    fn reload(&self, project_id: ProjectId) -> ServiceResult<Project> {
        self.ctx
            .projects
            .get_project(project_id)?
            .ok_or(ServiceError::NotFound(EntityRef::Project(project_id)))
    }

    fn orders(&self) -> OrderSnapshotStore<'a> {
        OrderSnapshotStore::new(self.ctx)
    }

    fn aggregator(&self) -> ProgressAggregator<'a> {
        ProgressAggregator::new(self.ctx)
    }
}
