//! Core domain logic for DesignFlow.
//! This crate is the single source of truth for project lifecycle invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod pricing;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::due_date::{classify_due_date, DueDateLabel, DueDateStatus, DueDateTone};
pub use model::order::{ClientInfo, Contact, OrderItem, OrderSnapshot};
pub use model::project::{ProgressStatus, Project, ProjectRollup};
pub use model::task::{DesignerRef, SettlementStatus, Task, TaskPriority};
pub use pricing::{quote_price, PriceQuote};
pub use repo::error::{EntityRef, RepoError, RepoResult};
pub use repo::SqliteRepositories;
pub use service::aggregator::{derive_rollup, ProgressAggregator, RollupStatus};
pub use service::error::{PartialFailure, ServiceError, ServiceResult};
pub use service::order_service::OrderSnapshotStore;
pub use service::project_service::{AppendTasks, NewProject, ProjectService, ProjectStatusPatch};
pub use service::task_service::{TaskPatch, TaskService};
pub use service::{MutationOutcome, NewTaskItem, ServiceContext};

/// Minimal health-check API for adapters.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
