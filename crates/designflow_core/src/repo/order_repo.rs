//! Order snapshot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append new order versions and read existing ones.
//!
//! # Invariants
//! - Version numbers are assigned as `max + 1` inside the same immediate
//!   transaction as the insert.
//! - Rows are append-only; schema triggers abort any update or delete.
//! - Items are returned in their recorded position order.

use crate::model::order::{validate_items, ClientInfo, OrderId, OrderItem, OrderSnapshot};
use crate::repo::error::RepoResult;
use crate::repo::sql::{
    ensure_connection_ready, from_json, parse_optional_uuid, parse_uuid, to_json,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const SNAPSHOT_SELECT_SQL: &str = "SELECT
    snapshot_uuid,
    order_uuid,
    version_number,
    client_uuid,
    client_name,
    contacts,
    created_at
FROM order_snapshots";

/// Append-only storage of order versions.
pub trait OrderSnapshotRepository {
    /// Validates `items` and stores them as the next version of `order_id`.
    fn insert_next_version(
        &self,
        order_id: OrderId,
        client: &ClientInfo,
        items: &[OrderItem],
        created_at: i64,
    ) -> RepoResult<OrderSnapshot>;
    fn get_version(&self, order_id: OrderId, version_number: u32)
        -> RepoResult<Option<OrderSnapshot>>;
    fn get_latest_version(&self, order_id: OrderId) -> RepoResult<Option<OrderSnapshot>>;
    /// All versions of one order, ascending by version number.
    fn list_versions(&self, order_id: OrderId) -> RepoResult<Vec<OrderSnapshot>>;
}

/// SQLite-backed order snapshot repository.
pub struct SqliteOrderSnapshotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrderSnapshotRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["order_snapshots", "order_snapshot_items"])?;
        Ok(Self { conn })
    }
}

impl OrderSnapshotRepository for SqliteOrderSnapshotRepository<'_> {
    fn insert_next_version(
        &self,
        order_id: OrderId,
        client: &ClientInfo,
        items: &[OrderItem],
        created_at: i64,
    ) -> RepoResult<OrderSnapshot> {
        validate_items(items)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let version_number: u32 = tx.query_row(
            "SELECT COALESCE(MAX(version_number), 0) + 1
             FROM order_snapshots
             WHERE order_uuid = ?1;",
            [order_id.to_string()],
            |row| row.get(0),
        )?;

        let snapshot_id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO order_snapshots (
                snapshot_uuid,
                order_uuid,
                version_number,
                client_uuid,
                client_name,
                contacts,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                snapshot_id.to_string(),
                order_id.to_string(),
                version_number,
                client.client_id.map(|id| id.to_string()),
                client.client_name.as_str(),
                to_json(&client.contacts)?,
                created_at,
            ],
        )?;

        for (position, item) in items.iter().enumerate() {
            tx.execute(
                "INSERT INTO order_snapshot_items (
                    snapshot_uuid,
                    position,
                    service_uuid,
                    service_name,
                    category_name,
                    unit_price,
                    unit,
                    quantity,
                    subtotal,
                    pricing_policies,
                    price_description
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
                params![
                    snapshot_id.to_string(),
                    position as i64,
                    item.service_id.to_string(),
                    item.service_name.as_str(),
                    item.category_name.as_str(),
                    item.unit_price,
                    item.unit.as_str(),
                    item.quantity,
                    item.subtotal,
                    to_json(&item.pricing_policies)?,
                    item.price_description.as_str(),
                ],
            )?;
        }
        tx.commit()?;

        Ok(OrderSnapshot {
            id: snapshot_id,
            order_id,
            version_number,
            client: client.clone(),
            items: items.to_vec(),
            created_at,
        })
    }

    fn get_version(
        &self,
        order_id: OrderId,
        version_number: u32,
    ) -> RepoResult<Option<OrderSnapshot>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SNAPSHOT_SELECT_SQL}
             WHERE order_uuid = ?1 AND version_number = ?2;"
        ))?;
        let mut rows = stmt.query(params![order_id.to_string(), version_number])?;
        match rows.next()? {
            Some(row) => Ok(Some(self.hydrate(row)?)),
            None => Ok(None),
        }
    }

    fn get_latest_version(&self, order_id: OrderId) -> RepoResult<Option<OrderSnapshot>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SNAPSHOT_SELECT_SQL}
             WHERE order_uuid = ?1
             ORDER BY version_number DESC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([order_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(self.hydrate(row)?)),
            None => Ok(None),
        }
    }

    fn list_versions(&self, order_id: OrderId) -> RepoResult<Vec<OrderSnapshot>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SNAPSHOT_SELECT_SQL}
             WHERE order_uuid = ?1
             ORDER BY version_number ASC;"
        ))?;
        let mut rows = stmt.query([order_id.to_string()])?;
        let mut snapshots = Vec::new();
        while let Some(row) = rows.next()? {
            snapshots.push(self.hydrate(row)?);
        }
        Ok(snapshots)
    }
}

impl SqliteOrderSnapshotRepository<'_> {
    fn hydrate(&self, row: &Row<'_>) -> RepoResult<OrderSnapshot> {
        let snapshot_text: String = row.get("snapshot_uuid")?;
        let order_text: String = row.get("order_uuid")?;
        let contacts: String = row.get("contacts")?;
        let snapshot_id = parse_uuid(&snapshot_text, "order_snapshots.snapshot_uuid")?;

        Ok(OrderSnapshot {
            id: snapshot_id,
            order_id: parse_uuid(&order_text, "order_snapshots.order_uuid")?,
            version_number: row.get("version_number")?,
            client: ClientInfo {
                client_id: parse_optional_uuid(
                    row.get("client_uuid")?,
                    "order_snapshots.client_uuid",
                )?,
                client_name: row.get("client_name")?,
                contacts: from_json(&contacts, "order_snapshots.contacts")?,
            },
            items: load_items(self.conn, snapshot_id)?,
            created_at: row.get("created_at")?,
        })
    }
}

fn load_items(conn: &Connection, snapshot_id: Uuid) -> RepoResult<Vec<OrderItem>> {
    let mut stmt = conn.prepare(
        "SELECT
            service_uuid,
            service_name,
            category_name,
            unit_price,
            unit,
            quantity,
            subtotal,
            pricing_policies,
            price_description
         FROM order_snapshot_items
         WHERE snapshot_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([snapshot_id.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        let service_text: String = row.get(0)?;
        let policies: String = row.get(7)?;
        items.push(OrderItem {
            service_id: parse_uuid(&service_text, "order_snapshot_items.service_uuid")?,
            service_name: row.get(1)?,
            category_name: row.get(2)?,
            unit_price: row.get(3)?,
            unit: row.get(4)?,
            quantity: row.get(5)?,
            subtotal: row.get(6)?,
            pricing_policies: from_json(&policies, "order_snapshot_items.pricing_policies")?,
            price_description: row.get(8)?,
        });
    }
    Ok(items)
}
