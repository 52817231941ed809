//! SQLite storage for the DesignFlow core.
//!
//! # Responsibility
//! - Open connections holding the catalog, order snapshot and project tables.
//! - Bring every connection to the latest schema before repositories see it.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`.
//! - Repositories refuse connections whose version differs from `latest_version()`.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating a DesignFlow database.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    /// One migration script failed. Nothing from the batch is committed.
    #[error("migration {version} ({name}) failed: {source}")]
    MigrationFailed {
        version: u32,
        name: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    /// The file was written by a newer build that knows more migrations.
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
