//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist tasks and list them per project in creation order.
//!
//! # Invariants
//! - Listing order is `sort_order ASC`, assigned at insert as `max + 1` per
//!   project. The aggregator's first-seen rules depend on this order.
//! - Writes reject non-positive quantities.
//! - Deletes are hard deletes; the order snapshot history keeps the audit trail.

use crate::model::project::ProjectId;
use crate::model::task::{SettlementStatus, Task, TaskId, TaskPriority};
use crate::model::validation::validate_quantity;
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use crate::repo::sql::{
    ensure_connection_ready, from_json, parse_code, parse_optional_uuid, parse_uuid, to_json,
};
use rusqlite::{params, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    task_uuid,
    project_uuid,
    order_uuid,
    service_uuid,
    service_name,
    category_name,
    specification,
    quantity,
    unit,
    unit_price,
    subtotal,
    pricing_policies,
    price_description,
    current_process_step,
    main_designers,
    assistant_designers,
    priority,
    due_date,
    settlement_status,
    created_at,
    updated_at
FROM tasks";

/// Task persistence contract.
pub trait TaskRepository {
    fn insert_task(&self, task: &Task) -> RepoResult<()>;
    /// Replaces mutable task fields; `NotFound` when the task is gone.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_project_tasks(&self, project_id: ProjectId) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["tasks"])?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, task: &Task) -> RepoResult<()> {
        validate_quantity(0, task.quantity)?;

        self.conn.execute(
            "INSERT INTO tasks (
                task_uuid,
                project_uuid,
                order_uuid,
                service_uuid,
                service_name,
                category_name,
                specification,
                quantity,
                unit,
                unit_price,
                subtotal,
                pricing_policies,
                price_description,
                current_process_step,
                main_designers,
                assistant_designers,
                priority,
                due_date,
                settlement_status,
                sort_order,
                created_at,
                updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                ?17, ?18, ?19,
                (SELECT COALESCE(MAX(sort_order), -1) + 1 FROM tasks WHERE project_uuid = ?2),
                ?20, ?21
            );",
            params![
                task.id.to_string(),
                task.project_id.to_string(),
                task.order_id.map(|id| id.to_string()),
                task.service_id.to_string(),
                task.service_name.as_str(),
                task.category_name.as_str(),
                task.specification.as_deref(),
                task.quantity,
                task.unit.as_str(),
                task.unit_price,
                task.subtotal,
                to_json(&task.pricing_policies)?,
                task.price_description.as_str(),
                task.current_process_step
                    .as_ref()
                    .map(to_json)
                    .transpose()?,
                to_json(&task.main_designers)?,
                to_json(&task.assistant_designers)?,
                task.priority.as_str(),
                task.due_date,
                task.settlement_status.as_str(),
                task.created_at,
                task.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                specification = ?2,
                current_process_step = ?3,
                main_designers = ?4,
                assistant_designers = ?5,
                priority = ?6,
                due_date = ?7,
                settlement_status = ?8,
                updated_at = ?9
             WHERE task_uuid = ?1;",
            params![
                task.id.to_string(),
                task.specification.as_deref(),
                task.current_process_step
                    .as_ref()
                    .map(to_json)
                    .transpose()?,
                to_json(&task.main_designers)?,
                to_json(&task.assistant_designers)?,
                task.priority.as_str(),
                task.due_date,
                task.settlement_status.as_str(),
                task.updated_at,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Task(task.id)));
        }
        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE task_uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_task_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_project_tasks(&self, project_id: ProjectId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE project_uuid = ?1
             ORDER BY sort_order ASC, task_uuid ASC;"
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE task_uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Task(id)));
        }
        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let task_text: String = row.get("task_uuid")?;
    let project_text: String = row.get("project_uuid")?;
    let service_text: String = row.get("service_uuid")?;
    let policies: String = row.get("pricing_policies")?;
    let step: Option<String> = row.get("current_process_step")?;
    let main_designers: String = row.get("main_designers")?;
    let assistant_designers: String = row.get("assistant_designers")?;
    let priority: String = row.get("priority")?;
    let settlement: String = row.get("settlement_status")?;

    Ok(Task {
        id: parse_uuid(&task_text, "tasks.task_uuid")?,
        project_id: parse_uuid(&project_text, "tasks.project_uuid")?,
        order_id: parse_optional_uuid(row.get("order_uuid")?, "tasks.order_uuid")?,
        service_id: parse_uuid(&service_text, "tasks.service_uuid")?,
        service_name: row.get("service_name")?,
        category_name: row.get("category_name")?,
        specification: row.get("specification")?,
        quantity: row.get("quantity")?,
        unit: row.get("unit")?,
        unit_price: row.get("unit_price")?,
        subtotal: row.get("subtotal")?,
        pricing_policies: from_json(&policies, "tasks.pricing_policies")?,
        price_description: row.get("price_description")?,
        current_process_step: step
            .map(|text| from_json(&text, "tasks.current_process_step"))
            .transpose()?,
        main_designers: from_json(&main_designers, "tasks.main_designers")?,
        assistant_designers: from_json(&assistant_designers, "tasks.assistant_designers")?,
        priority: parse_code(&priority, "tasks.priority", TaskPriority::parse)?,
        due_date: row.get("due_date")?,
        settlement_status: parse_code(
            &settlement,
            "tasks.settlement_status",
            SettlementStatus::parse,
        )?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
