//! User directory contract and SQLite implementation.
//!
//! The directory is the authoritative source of designer display names.
//! Unknown ids are simply absent from lookup results; callers decide whether
//! that is an error.

use crate::model::catalog::DirectoryUser;
use crate::model::task::UserId;
use crate::model::validation::require_text;
use crate::repo::error::RepoResult;
use crate::repo::sql::ensure_connection_ready;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

/// Read-mostly user lookup.
pub trait UserDirectory {
    fn upsert_user(&self, user: &DirectoryUser) -> RepoResult<()>;
    /// Returns display names for the ids that exist.
    fn display_names(&self, ids: &[UserId]) -> RepoResult<HashMap<UserId, String>>;
}

/// SQLite-backed user directory.
pub struct SqliteUserDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserDirectory<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["users"])?;
        Ok(Self { conn })
    }
}

impl UserDirectory for SqliteUserDirectory<'_> {
    fn upsert_user(&self, user: &DirectoryUser) -> RepoResult<()> {
        let display_name = require_text("display name", &user.display_name)?;
        self.conn.execute(
            "INSERT INTO users (user_uuid, display_name) VALUES (?1, ?2)
             ON CONFLICT(user_uuid) DO UPDATE SET
                display_name = excluded.display_name,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![user.id.to_string(), display_name],
        )?;
        Ok(())
    }

    fn display_names(&self, ids: &[UserId]) -> RepoResult<HashMap<UserId, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT display_name FROM users WHERE user_uuid = ?1;")?;
        let mut names = HashMap::with_capacity(ids.len());
        for &id in ids {
            if names.contains_key(&id) {
                continue;
            }
            let name = stmt
                .query_row([id.to_string()], |row| row.get::<_, String>(0))
                .optional()?;
            if let Some(name) = name {
                names.insert(id, name);
            }
        }
        Ok(names)
    }
}
