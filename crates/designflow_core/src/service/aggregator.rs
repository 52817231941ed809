//! Progress aggregator.
//!
//! # Responsibility
//! - Derive project progress and designer rosters from the project's tasks.
//! - Persist the derived fields through `ProjectRepository::save_rollup`.
//!
//! # Invariants
//! - `progress` is the half-up rounded mean of task step ratios, `0` without
//!   tasks. Tasks without a step count as `0`.
//! - Rosters are deduplicated by user id in first-seen task order.
//! - Directory names win over task snapshot names at aggregation time.
//! - A failed recompute never undoes the mutation that triggered it.

use crate::clock::Clock;
use crate::model::project::{ProjectId, ProjectRollup};
use crate::model::task::{DesignerRef, Task, UserId};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::user_repo::UserDirectory;
use crate::service::error::ServiceResult;
use crate::service::ServiceContext;
use log::{info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

/// Outcome of the recompute that follows a task-set mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "kebab-case")]
pub enum RollupStatus {
    Applied(ProjectRollup),
    Failed(String),
}

impl RollupStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Recomputes derived project fields.
pub struct ProgressAggregator<'a> {
    tasks: &'a dyn TaskRepository,
    projects: &'a dyn ProjectRepository,
    users: &'a dyn UserDirectory,
    clock: &'a dyn Clock,
}

impl<'a> ProgressAggregator<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self {
        Self {
            tasks: ctx.tasks,
            projects: ctx.projects,
            users: ctx.users,
            clock: ctx.clock,
        }
    }

    /// Loads the task set, derives the rollup, and stores it on the project.
    pub fn recompute(&self, project_id: ProjectId) -> ServiceResult<ProjectRollup> {
        let started_at = Instant::now();
        let tasks = self.tasks.list_project_tasks(project_id)?;

        let mut user_ids: Vec<UserId> = Vec::new();
        for designer in tasks
            .iter()
            .flat_map(|task| task.main_designers.iter().chain(&task.assistant_designers))
        {
            if !user_ids.contains(&designer.user_id) {
                user_ids.push(designer.user_id);
            }
        }
        let names = self.users.display_names(&user_ids)?;

        let rollup = derive_rollup(&tasks, &names);
        self.projects
            .save_rollup(project_id, &rollup, self.clock.now_ms())?;

        info!(
            "event=project_rollup module=aggregator status=ok project={} tasks={} progress={} duration_ms={}",
            project_id,
            tasks.len(),
            rollup.progress,
            started_at.elapsed().as_millis()
        );
        Ok(rollup)
    }

    /// Runs `recompute` after a committed mutation and reports the outcome.
    pub fn recompute_after_mutation(&self, project_id: ProjectId) -> RollupStatus {
        match self.recompute(project_id) {
            Ok(rollup) => RollupStatus::Applied(rollup),
            Err(err) => {
                warn!(
                    "event=project_rollup module=aggregator status=error project={} error={}",
                    project_id, err
                );
                RollupStatus::Failed(err.to_string())
            }
        }
    }
}

/// Derives the rollup for `tasks` listed in creation order.
pub fn derive_rollup(tasks: &[Task], names: &HashMap<UserId, String>) -> ProjectRollup {
    ProjectRollup {
        progress: mean_progress(tasks),
        main_designers: merge_designers(tasks.iter().flat_map(|t| &t.main_designers), names),
        assistant_designers: merge_designers(
            tasks.iter().flat_map(|t| &t.assistant_designers),
            names,
        ),
    }
}

fn mean_progress(tasks: &[Task]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }
    let count = tasks.len() as u64;
    let sum: u64 = tasks.iter().map(|task| u64::from(task.progress_ratio())).sum();
    // round-half-up on integers: floor((2 * sum + n) / (2 * n))
    let mean = (2 * sum + count) / (2 * count);
    mean.min(100) as u8
}

fn merge_designers<'t>(
    designers: impl Iterator<Item = &'t DesignerRef>,
    names: &HashMap<UserId, String>,
) -> Vec<DesignerRef> {
    let mut merged: Vec<DesignerRef> = Vec::new();
    for designer in designers {
        if merged.iter().any(|seen| seen.user_id == designer.user_id) {
            continue;
        }
        let name = names
            .get(&designer.user_id)
            .cloned()
            .unwrap_or_else(|| designer.name.clone());
        merged.push(DesignerRef {
            user_id: designer.user_id,
            name,
        });
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::derive_rollup;
    use crate::model::catalog::ProcessStep;
    use crate::model::order::OrderItem;
    use crate::model::task::{DesignerRef, Task};
    use std::collections::HashMap;
    use uuid::Uuid;

    fn task_at(ratio: Option<u8>) -> Task {
        let item = OrderItem {
            service_id: Uuid::new_v4(),
            service_name: "Layout".to_string(),
            category_name: "Interior".to_string(),
            unit_price: 10.0,
            unit: "set".to_string(),
            quantity: 1.0,
            subtotal: 10.0,
            pricing_policies: Vec::new(),
            price_description: "list price".to_string(),
        };
        let mut task = Task::from_order_item(Uuid::new_v4(), None, &item, 0);
        if let Some(ratio) = ratio {
            task.enter_process_step(ProcessStep::new("Step", 1, ratio, 0), 0);
        }
        task
    }

    fn designer(user_id: Uuid, name: &str) -> DesignerRef {
        DesignerRef {
            user_id,
            name: name.to_string(),
        }
    }

    #[test]
    fn progress_is_rounded_mean_of_step_ratios() {
        let tasks = vec![task_at(Some(20)), task_at(Some(40)), task_at(Some(100))];
        assert_eq!(derive_rollup(&tasks, &HashMap::new()).progress, 53);
    }

    #[test]
    fn half_values_round_up_and_no_step_counts_as_zero() {
        let tasks = vec![task_at(Some(25)), task_at(None)];
        assert_eq!(derive_rollup(&tasks, &HashMap::new()).progress, 13);
    }

    #[test]
    fn empty_task_set_has_zero_progress_and_no_designers() {
        let rollup = derive_rollup(&[], &HashMap::new());
        assert_eq!(rollup.progress, 0);
        assert!(rollup.main_designers.is_empty());
        assert!(rollup.assistant_designers.is_empty());
    }

    #[test]
    fn designers_are_deduplicated_in_first_seen_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut first = task_at(None);
        first.main_designers = vec![designer(a, "A"), designer(b, "B")];
        let mut second = task_at(None);
        second.main_designers = vec![designer(b, "B"), designer(c, "C")];

        let rollup = derive_rollup(&[first, second], &HashMap::new());
        let ids = rollup
            .main_designers
            .iter()
            .map(|d| d.user_id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn directory_names_replace_snapshot_names() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut task = task_at(None);
        task.assistant_designers = vec![designer(a, "old name"), designer(b, "Bo")];
        let names = HashMap::from([(a, "Alice".to_string())]);

        let rollup = derive_rollup(&[task], &names);
        assert_eq!(rollup.assistant_designers[0].name, "Alice");
        assert_eq!(rollup.assistant_designers[1].name, "Bo");
    }
}
