//! Ordered schema scripts for the DesignFlow database.
//!
//! | version | name | contents |
//! |---------|------|----------|
//! | 1 | catalog | services, their process steps and pricing policies, users |
//! | 2 | order_snapshots | versioned order snapshots and their line items |
//! | 3 | projects_tasks | projects and the tasks materialized from order items |
//!
//! Version 2 installs `BEFORE UPDATE` / `BEFORE DELETE` triggers on both
//! snapshot tables. A stored snapshot row can only ever be inserted; a new
//! order revision is a new version number.
//!
//! All pending scripts run inside one transaction, so a failing script
//! leaves `user_version` where it was.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "catalog",
        sql: include_str!("0001_catalog.sql"),
    },
    Migration {
        version: 2,
        name: "order_snapshots",
        sql: include_str!("0002_orders.sql"),
    },
    Migration {
        version: 3,
        name: "projects_tasks",
        sql: include_str!("0003_projects_tasks.sql"),
    },
];

/// Latest schema version this build can open.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Runs every script newer than the connection's `user_version`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let latest = latest_version();

    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        let script = format!(
            "{}\nPRAGMA user_version = {};",
            migration.sql, migration.version
        );
        tx.execute_batch(&script)
            .map_err(|source| DbError::MigrationFailed {
                version: migration.version,
                name: migration.name,
                source,
            })?;
        info!(
            "event=db_migrate module=db status=applied version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={latest}");
    Ok(())
}

/// Schema version currently recorded on the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_contiguous_from_one() {
        for (index, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version as usize, index + 1, "{}", migration.name);
        }
    }

    #[test]
    fn upgrade_from_catalog_only_schema_adds_remaining_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(MIGRATIONS[0].sql).unwrap();
        conn.execute_batch("PRAGMA user_version = 1;").unwrap();

        apply_migrations(&mut conn).unwrap();

        assert_eq!(current_user_version(&conn).unwrap(), latest_version());
        let tasks: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'tasks';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tasks, 1);
    }

    #[test]
    fn failing_script_keeps_previous_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(MIGRATIONS[0].sql).unwrap();
        // Occupies the name migration 2 needs for a table.
        conn.execute_batch("CREATE VIEW order_snapshots AS SELECT 1; PRAGMA user_version = 1;")
            .unwrap();

        let err = apply_migrations(&mut conn).unwrap_err();

        assert!(matches!(
            err,
            DbError::MigrationFailed {
                version: 2,
                name: "order_snapshots",
                ..
            }
        ));
        assert_eq!(current_user_version(&conn).unwrap(), 1);
    }
}
