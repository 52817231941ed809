mod common;

use common::{client, list_item, seed_service, seed_user, NOW};
use designflow_core::db::open_db_in_memory;
use designflow_core::model::catalog::{CatalogService, ProcessStep};
use designflow_core::model::MS_PER_DAY;
use designflow_core::{
    classify_due_date, DueDateLabel, DueDateTone, EntityRef, FixedClock, NewProject,
    NewTaskItem, OrderSnapshotStore, ProjectService, RollupStatus, ServiceContext, ServiceError,
    SettlementStatus, SqliteRepositories, TaskPatch, TaskPriority, TaskService,
};
use uuid::Uuid;

fn steps() -> Vec<ProcessStep> {
    vec![
        ProcessStep::new("Survey", 1, 10, 2),
        ProcessStep::new("Drafting", 2, 50, 5),
        ProcessStep::new("Review", 3, 80, 0),
    ]
}

/// Creates a project with one task for `service` and returns the task id.
fn project_with_task(ctx: ServiceContext<'_>, service: &CatalogService) -> (Uuid, Uuid) {
    let order_id = Uuid::new_v4();
    OrderSnapshotStore::new(ctx)
        .create_version(order_id, &client(), &[list_item(service, 1.0)])
        .unwrap();
    let project = ProjectService::new(ctx)
        .create_project(&NewProject {
            order_id,
            version_number: None,
            name: "Cafe refit".to_string(),
            team_id: None,
            client_requirements: None,
            main_designer_ids: Vec::new(),
            assistant_designer_ids: Vec::new(),
            specifications: Vec::new(),
        })
        .unwrap()
        .value;
    (project.id, project.related_task_ids[0])
}

fn step_id(service: &CatalogService, name: &str) -> Uuid {
    service
        .process_steps
        .iter()
        .find(|step| step.name == name)
        .unwrap()
        .id
}

#[test]
fn positive_cycle_sets_due_date_and_zero_cycle_keeps_it() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let clock = FixedClock::new(NOW);
    let ctx = repos.context(&clock);
    let service = seed_service(&repos, "Layout", 100.0, steps(), &[]);
    let (_, task_id) = project_with_task(ctx, &service);
    let tasks = TaskService::new(ctx);

    let drafted = tasks
        .set_process_step(task_id, step_id(&service, "Drafting"))
        .unwrap();
    assert_eq!(drafted.value.due_date, Some(NOW + 5 * MS_PER_DAY));

    clock.advance_ms(MS_PER_DAY);
    let reviewed = tasks
        .set_process_step(task_id, step_id(&service, "Review"))
        .unwrap();
    assert_eq!(reviewed.value.due_date, Some(NOW + 5 * MS_PER_DAY));

    let stored = tasks.get_task(task_id).unwrap();
    assert_eq!(stored.current_process_step.unwrap().name, "Review");
    assert_eq!(stored.due_date, Some(NOW + 5 * MS_PER_DAY));
    assert_eq!(stored.updated_at, NOW + MS_PER_DAY);
}

#[test]
fn unknown_step_is_rejected_and_task_is_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let clock = FixedClock::new(NOW);
    let ctx = repos.context(&clock);
    let service = seed_service(&repos, "Layout", 100.0, steps(), &[]);
    let (_, task_id) = project_with_task(ctx, &service);
    let tasks = TaskService::new(ctx);

    tasks
        .set_process_step(task_id, step_id(&service, "Survey"))
        .unwrap();
    let before = tasks.get_task(task_id).unwrap();

    clock.advance_ms(MS_PER_DAY);
    let err = tasks.set_process_step(task_id, Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
    assert_eq!(tasks.get_task(task_id).unwrap(), before);
}

#[test]
fn steps_of_other_services_are_not_valid_targets() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let clock = FixedClock::new(NOW);
    let ctx = repos.context(&clock);
    let service = seed_service(&repos, "Layout", 100.0, steps(), &[]);
    let other = seed_service(&repos, "Lighting", 50.0, steps(), &[]);
    let (_, task_id) = project_with_task(ctx, &service);

    let err = TaskService::new(ctx)
        .set_process_step(task_id, step_id(&other, "Survey"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));
}

#[test]
fn transitions_may_go_backwards_and_update_progress() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let clock = FixedClock::new(NOW);
    let ctx = repos.context(&clock);
    let service = seed_service(&repos, "Layout", 100.0, steps(), &[]);
    let (project_id, task_id) = project_with_task(ctx, &service);
    let tasks = TaskService::new(ctx);

    tasks
        .set_process_step(task_id, step_id(&service, "Review"))
        .unwrap();
    let back = tasks
        .set_process_step(task_id, step_id(&service, "Survey"))
        .unwrap();

    assert_eq!(back.value.due_date, Some(NOW + 2 * MS_PER_DAY));
    match back.rollup {
        RollupStatus::Applied(rollup) => assert_eq!(rollup.progress, 10),
        RollupStatus::Failed(message) => panic!("rollup failed: {message}"),
    }
    let project = ProjectService::new(ctx).get_project(project_id).unwrap();
    assert_eq!(project.progress, 10);
}

#[test]
fn missing_service_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let clock = FixedClock::new(NOW);
    let ctx = repos.context(&clock);
    let service = seed_service(&repos, "Layout", 100.0, steps(), &[]);
    let (_, task_id) = project_with_task(ctx, &service);
    conn.execute("DELETE FROM catalog_services;", []).unwrap();

    let err = TaskService::new(ctx)
        .set_process_step(task_id, step_id(&service, "Survey"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(EntityRef::Service(id)) if id == service.id));
}

#[test]
fn designers_are_resolved_and_unknown_users_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let clock = FixedClock::new(NOW);
    let ctx = repos.context(&clock);
    let service = seed_service(&repos, "Layout", 100.0, steps(), &[]);
    let (project_id, task_id) = project_with_task(ctx, &service);
    let alice = seed_user(&repos, "Alice");
    let bo = seed_user(&repos, "Bo");
    let tasks = TaskService::new(ctx);

    let assigned = tasks
        .assign_designers(task_id, &[alice, bo, alice], &[bo])
        .unwrap();
    let names = assigned
        .value
        .main_designers
        .iter()
        .map(|d| d.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Alice", "Bo"]);

    let project = ProjectService::new(ctx).get_project(project_id).unwrap();
    assert_eq!(project.main_designer_ids(), vec![alice, bo]);
    assert_eq!(project.assistant_designer_names(), vec!["Bo"]);

    let stranger = Uuid::new_v4();
    let err = tasks.assign_designers(task_id, &[stranger], &[]).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(EntityRef::User(id)) if id == stranger));
    assert_eq!(tasks.get_task(task_id).unwrap().main_designers.len(), 2);
}

#[test]
fn patch_updates_only_given_fields() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let clock = FixedClock::new(NOW);
    let ctx = repos.context(&clock);
    let service = seed_service(&repos, "Layout", 100.0, steps(), &[]);
    let (_, task_id) = project_with_task(ctx, &service);
    let tasks = TaskService::new(ctx);

    tasks
        .update_task(
            task_id,
            &TaskPatch {
                priority: Some(TaskPriority::Urgent),
                settlement_status: None,
                specification: Some("  two floors ".to_string()),
            },
        )
        .unwrap();
    tasks
        .update_task(
            task_id,
            &TaskPatch {
                settlement_status: Some(SettlementStatus::Prepaid),
                ..TaskPatch::default()
            },
        )
        .unwrap();

    let stored = tasks.get_task(task_id).unwrap();
    assert_eq!(stored.priority, TaskPriority::Urgent);
    assert_eq!(stored.settlement_status, SettlementStatus::Prepaid);
    assert_eq!(stored.specification.as_deref(), Some("two floors"));
    assert_eq!(stored.subtotal, 100.0);
}

#[test]
fn created_and_deleted_tasks_drive_project_links() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let clock = FixedClock::new(NOW);
    let ctx = repos.context(&clock);
    let service = seed_service(&repos, "Layout", 100.0, steps(), &[]);
    let (project_id, first_task) = project_with_task(ctx, &service);
    let tasks = TaskService::new(ctx);
    let projects = ProjectService::new(ctx);

    let created = tasks
        .create_task(
            project_id,
            &NewTaskItem {
                service_id: service.id,
                quantity: 3.0,
                pricing_policy_ids: Vec::new(),
                specification: None,
                priority: Some(TaskPriority::Low),
            },
        )
        .unwrap();
    assert_eq!(created.value.subtotal, 300.0);
    assert_eq!(created.value.order_id, None);
    assert_eq!(
        projects.get_project(project_id).unwrap().related_task_ids,
        vec![first_task, created.value.id]
    );

    tasks
        .set_process_step(created.value.id, step_id(&service, "Drafting"))
        .unwrap();
    assert_eq!(projects.get_project(project_id).unwrap().progress, 25);

    let deleted = tasks.delete_task(first_task).unwrap();
    assert_eq!(deleted.value, first_task);
    let project = projects.get_project(project_id).unwrap();
    assert_eq!(project.related_task_ids, vec![created.value.id]);
    assert_eq!(project.progress, 50);

    let err = tasks.delete_task(first_task).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(EntityRef::Task(_))));
}

#[test]
fn stored_due_dates_classify_against_now() {
    let conn = open_db_in_memory().unwrap();
    let repos = SqliteRepositories::try_new(&conn).unwrap();
    let clock = FixedClock::new(NOW);
    let ctx = repos.context(&clock);
    let service = seed_service(&repos, "Layout", 100.0, steps(), &[]);
    let (_, task_id) = project_with_task(ctx, &service);

    let task = TaskService::new(ctx)
        .set_process_step(task_id, step_id(&service, "Survey"))
        .unwrap()
        .value;
    let status = classify_due_date(task.due_date.unwrap(), NOW).unwrap();
    assert_eq!(status.label, DueDateLabel::DayAfterTomorrow);
    assert_eq!(status.tone, DueDateTone::Orange);

    let status = classify_due_date(task.due_date.unwrap(), NOW + 3 * MS_PER_DAY).unwrap();
    assert_eq!(status.label, DueDateLabel::Overdue);
    assert_eq!(status.tone, DueDateTone::Red);
}
