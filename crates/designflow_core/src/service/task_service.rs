//! Task use-case service.
//!
//! # Responsibility
//! - Create, edit, and delete tasks inside a project.
//! - Drive process-step transitions and the due-date rule.
//!
//! # Invariants
//! - Every mutation persists the task first, then runs the aggregator for the
//!   owning project.
//! - A rejected step transition leaves the stored task untouched.
//! - Commercial terms are never edited after creation.

use crate::model::catalog::ProcessStepId;
use crate::model::process::ProcessFlow;
use crate::model::project::ProjectId;
use crate::model::task::{SettlementStatus, Task, TaskId, TaskPriority, UserId};
use crate::repo::error::EntityRef;
use crate::service::aggregator::ProgressAggregator;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::{
    price_new_item, resolve_designers, MutationOutcome, NewTaskItem, ServiceContext,
};
use log::info;
use serde::Deserialize;

/// Editable task fields; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub settlement_status: Option<SettlementStatus>,
    #[serde(default)]
    pub specification: Option<String>,
}

/// Task service facade over repository implementations.
pub struct TaskService<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> TaskService<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self {
        Self { ctx }
    }

    /// Prices `item` and adds it to `project_id` as a task without an order link.
    pub fn create_task(
        &self,
        project_id: ProjectId,
        item: &NewTaskItem,
    ) -> ServiceResult<MutationOutcome<Task>> {
        if self.ctx.projects.get_project(project_id)?.is_none() {
            return Err(ServiceError::NotFound(EntityRef::Project(project_id)));
        }

        let line = price_new_item(self.ctx.catalog, 0, item)?;
        let mut task = Task::from_order_item(project_id, None, &line, self.ctx.clock.now_ms());
        task.specification = item.specification.clone();
        if let Some(priority) = item.priority {
            task.priority = priority;
        }
        self.ctx.tasks.insert_task(&task)?;
        info!(
            "event=task_created module=tasks status=ok project={} task={}",
            project_id, task.id
        );

        let rollup = self.aggregator().recompute_after_mutation(project_id);
        Ok(MutationOutcome { value: task, rollup })
    }

    pub fn update_task(
        &self,
        task_id: TaskId,
        patch: &TaskPatch,
    ) -> ServiceResult<MutationOutcome<Task>> {
        let mut task = self.load(task_id)?;
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(status) = patch.settlement_status {
            task.settlement_status = status;
        }
        if let Some(specification) = &patch.specification {
            let trimmed = specification.trim();
            task.specification = (!trimmed.is_empty()).then(|| trimmed.to_string());
        }
        task.updated_at = self.ctx.clock.now_ms();
        self.persist(task)
    }

    /// Moves a task to `step_id` of its service's process flow.
    ///
    /// Any member step is a valid target. A positive cycle resets the due
    /// date to now plus the cycle.
    pub fn set_process_step(
        &self,
        task_id: TaskId,
        step_id: ProcessStepId,
    ) -> ServiceResult<MutationOutcome<Task>> {
        let mut task = self.load(task_id)?;
        let service = self
            .ctx
            .catalog
            .get_service(task.service_id)?
            .ok_or(ServiceError::NotFound(EntityRef::Service(task.service_id)))?;

        let flow = ProcessFlow::for_service(&service);
        let step = flow.resolve_target(step_id)?.clone();
        info!(
            "event=task_step_changed module=tasks status=ok task={} step={} cycle_days={}",
            task.id, step.id, step.cycle_days
        );
        task.enter_process_step(step, self.ctx.clock.now_ms());
        self.persist(task)
    }

    /// Replaces both designer lists with directory-resolved users.
    pub fn assign_designers(
        &self,
        task_id: TaskId,
        main_ids: &[UserId],
        assistant_ids: &[UserId],
    ) -> ServiceResult<MutationOutcome<Task>> {
        let mut task = self.load(task_id)?;
        task.main_designers = resolve_designers(self.ctx.users, main_ids)?;
        task.assistant_designers = resolve_designers(self.ctx.users, assistant_ids)?;
        task.updated_at = self.ctx.clock.now_ms();
        self.persist(task)
    }

    pub fn delete_task(&self, task_id: TaskId) -> ServiceResult<MutationOutcome<TaskId>> {
        let task = self.load(task_id)?;
        self.ctx.tasks.delete_task(task_id)?;
        info!(
            "event=task_deleted module=tasks status=ok project={} task={}",
            task.project_id, task_id
        );

        let rollup = self.aggregator().recompute_after_mutation(task.project_id);
        Ok(MutationOutcome {
            value: task_id,
            rollup,
        })
    }

    pub fn get_task(&self, task_id: TaskId) -> ServiceResult<Task> {
        self.load(task_id)
    }

    /// Tasks of one project in creation order.
    pub fn list_project_tasks(&self, project_id: ProjectId) -> ServiceResult<Vec<Task>> {
        if self.ctx.projects.get_project(project_id)?.is_none() {
            return Err(ServiceError::NotFound(EntityRef::Project(project_id)));
        }
        Ok(self.ctx.tasks.list_project_tasks(project_id)?)
    }

    fn load(&self, task_id: TaskId) -> ServiceResult<Task> {
        self.ctx
            .tasks
            .get_task(task_id)?
            .ok_or(ServiceError::NotFound(EntityRef::Task(task_id)))
    }

    fn persist(&self, task: Task) -> ServiceResult<MutationOutcome<Task>> {
        self.ctx.tasks.update_task(&task)?;
        let rollup = self.aggregator().recompute_after_mutation(task.project_id);
        Ok(MutationOutcome { value: task, rollup })
    }

    fn aggregator(&self) -> ProgressAggregator<'a> {
        ProgressAggregator::new(self.ctx)
    }
}
