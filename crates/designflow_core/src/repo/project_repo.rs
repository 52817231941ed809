//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist project details and the derived rollup separately.
//!
//! # Invariants
//! - `update_details` never touches `progress` or designer rosters; only
//!   `save_rollup` writes them.
//! - `related_task_ids` is read from the owned task rows in creation order,
//!   so it cannot drift from the task table.
//! - Deleting a project cascades to its tasks.

use crate::model::order::ClientInfo;
use crate::model::project::{ProgressStatus, Project, ProjectId, ProjectRollup};
use crate::model::task::SettlementStatus;
use crate::model::validation::require_text;
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use crate::repo::sql::{
    ensure_connection_ready, from_json, parse_code, parse_optional_uuid, parse_uuid, to_json,
};
use rusqlite::{params, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    project_uuid,
    name,
    client_uuid,
    client_name,
    contacts,
    team_id,
    client_requirements,
    progress,
    main_designers,
    assistant_designers,
    progress_status,
    settlement_status,
    related_orders,
    created_at,
    updated_at
FROM projects";

/// Project persistence contract.
pub trait ProjectRepository {
    fn insert_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// All projects, newest first.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    /// Writes manually editable fields; derived fields are left untouched.
    fn update_details(&self, project: &Project) -> RepoResult<()>;
    /// Writes the derived fields produced by the aggregator.
    fn save_rollup(
        &self,
        id: ProjectId,
        rollup: &ProjectRollup,
        updated_at: i64,
    ) -> RepoResult<()>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["projects", "tasks"])?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn insert_project(&self, project: &Project) -> RepoResult<()> {
        let name = require_text("project name", &project.name)?;

        self.conn.execute(
            "INSERT INTO projects (
                project_uuid,
                name,
                client_uuid,
                client_name,
                contacts,
                team_id,
                client_requirements,
                progress,
                main_designers,
                assistant_designers,
                progress_status,
                settlement_status,
                related_orders,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
            params![
                project.id.to_string(),
                name,
                project.client.client_id.map(|id| id.to_string()),
                project.client.client_name.as_str(),
                to_json(&project.client.contacts)?,
                project.team_id.as_deref(),
                project.client_requirements.as_deref(),
                project.progress,
                to_json(&project.main_designers)?,
                to_json(&project.assistant_designers)?,
                project.progress_status.as_str(),
                project.settlement_status.as_str(),
                to_json(&project.related_orders)?,
                project.created_at,
                project.updated_at,
            ],
        )?;
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE project_uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(self.hydrate(row)?)),
            None => Ok(None),
        }
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} ORDER BY created_at DESC, project_uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(self.hydrate(row)?);
        }
        Ok(projects)
    }

    fn update_details(&self, project: &Project) -> RepoResult<()> {
        let name = require_text("project name", &project.name)?;

        let changed = self.conn.execute(
            "UPDATE projects
             SET
                name = ?2,
                client_uuid = ?3,
                client_name = ?4,
                contacts = ?5,
                team_id = ?6,
                client_requirements = ?7,
                progress_status = ?8,
                settlement_status = ?9,
                related_orders = ?10,
                updated_at = ?11
             WHERE project_uuid = ?1;",
            params![
                project.id.to_string(),
                name,
                project.client.client_id.map(|id| id.to_string()),
                project.client.client_name.as_str(),
                to_json(&project.client.contacts)?,
                project.team_id.as_deref(),
                project.client_requirements.as_deref(),
                project.progress_status.as_str(),
                project.settlement_status.as_str(),
                to_json(&project.related_orders)?,
                project.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Project(project.id)));
        }
        Ok(())
    }

    fn save_rollup(
        &self,
        id: ProjectId,
        rollup: &ProjectRollup,
        updated_at: i64,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                progress = ?2,
                main_designers = ?3,
                assistant_designers = ?4,
                updated_at = ?5
             WHERE project_uuid = ?1;",
            params![
                id.to_string(),
                rollup.progress,
                to_json(&rollup.main_designers)?,
                to_json(&rollup.assistant_designers)?,
                updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Project(id)));
        }
        Ok(())
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM projects WHERE project_uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Project(id)));
        }
        Ok(())
    }
}

impl SqliteProjectRepository<'_> {
    fn hydrate(&self, row: &Row<'_>) -> RepoResult<Project> {
        let project_text: String = row.get("project_uuid")?;
        let id = parse_uuid(&project_text, "projects.project_uuid")?;
        let contacts: String = row.get("contacts")?;
        let main_designers: String = row.get("main_designers")?;
        let assistant_designers: String = row.get("assistant_designers")?;
        let progress_status: String = row.get("progress_status")?;
        let settlement_status: String = row.get("settlement_status")?;
        let related_orders: String = row.get("related_orders")?;

        Ok(Project {
            id,
            name: row.get("name")?,
            client: ClientInfo {
                client_id: parse_optional_uuid(row.get("client_uuid")?, "projects.client_uuid")?,
                client_name: row.get("client_name")?,
                contacts: from_json(&contacts, "projects.contacts")?,
            },
            team_id: row.get("team_id")?,
            client_requirements: row.get("client_requirements")?,
            progress: row.get("progress")?,
            main_designers: from_json(&main_designers, "projects.main_designers")?,
            assistant_designers: from_json(&assistant_designers, "projects.assistant_designers")?,
            progress_status: parse_code(
                &progress_status,
                "projects.progress_status",
                ProgressStatus::parse,
            )?,
            settlement_status: parse_code(
                &settlement_status,
                "projects.settlement_status",
                SettlementStatus::parse,
            )?,
            related_orders: from_json(&related_orders, "projects.related_orders")?,
            related_task_ids: list_task_ids(self.conn, id)?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

fn list_task_ids(conn: &Connection, project_id: ProjectId) -> RepoResult<Vec<uuid::Uuid>> {
    let mut stmt = conn.prepare(
        "SELECT task_uuid FROM tasks
         WHERE project_uuid = ?1
         ORDER BY sort_order ASC, task_uuid ASC;",
    )?;
    let mut rows = stmt.query([project_id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let text: String = row.get(0)?;
        ids.push(parse_uuid(&text, "tasks.task_uuid")?);
    }
    Ok(ids)
}
