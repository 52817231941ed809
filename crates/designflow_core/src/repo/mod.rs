//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate their input before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.
//! - Every SQLite repository refuses connections below the latest schema.

pub mod catalog_repo;
pub mod error;
pub mod order_repo;
pub mod project_repo;
mod sql;
pub mod task_repo;
pub mod user_repo;

use crate::clock::Clock;
use crate::service::ServiceContext;
use catalog_repo::SqliteCatalogRepository;
use error::RepoResult;
use order_repo::SqliteOrderSnapshotRepository;
use project_repo::SqliteProjectRepository;
use rusqlite::Connection;
use task_repo::SqliteTaskRepository;
use user_repo::SqliteUserDirectory;

/// Every SQLite repository bound to one connection.
pub struct SqliteRepositories<'conn> {
    pub catalog: SqliteCatalogRepository<'conn>,
    pub users: SqliteUserDirectory<'conn>,
    pub orders: SqliteOrderSnapshotRepository<'conn>,
    pub projects: SqliteProjectRepository<'conn>,
    pub tasks: SqliteTaskRepository<'conn>,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            catalog: SqliteCatalogRepository::try_new(conn)?,
            users: SqliteUserDirectory::try_new(conn)?,
            orders: SqliteOrderSnapshotRepository::try_new(conn)?,
            projects: SqliteProjectRepository::try_new(conn)?,
            tasks: SqliteTaskRepository::try_new(conn)?,
        })
    }

    /// Borrows the repositories as the trait objects services consume.
    pub fn context<'a>(&'a self, clock: &'a dyn Clock) -> ServiceContext<'a> {
        ServiceContext {
            catalog: &self.catalog,
            users: &self.users,
            orders: &self.orders,
            projects: &self.projects,
            tasks: &self.tasks,
            clock,
        }
    }
}
