//! Catalog lookup contracts and SQLite implementation.
//!
//! # Responsibility
//! - Serve catalog services with their process steps and offered policies.
//! - Serve pricing policy definitions in caller-requested order.
//!
//! # Invariants
//! - Writes validate services/policies before SQL mutations.
//! - A service's step set is replaced atomically on upsert.
//! - Policy lookups preserve the order of the requested ids.

use crate::model::catalog::{
    CatalogService, PricingPolicy, PricingPolicyId, PricingPolicyKind, PricingTier, ProcessStep,
    ServiceId,
};
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use crate::repo::sql::{ensure_connection_ready, from_json, parse_uuid, to_json};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

/// Read/write access to catalog data.
pub trait CatalogRepository {
    /// Inserts or replaces one service including its process steps.
    fn upsert_service(&self, service: &CatalogService) -> RepoResult<()>;
    /// Loads one service with steps in display order.
    fn get_service(&self, id: ServiceId) -> RepoResult<Option<CatalogService>>;
    /// Inserts or replaces one pricing policy.
    fn upsert_pricing_policy(&self, policy: &PricingPolicy) -> RepoResult<()>;
    /// Loads policies in the order of `ids`; any missing id is `NotFound`.
    fn get_pricing_policies(&self, ids: &[PricingPolicyId]) -> RepoResult<Vec<PricingPolicy>>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &["catalog_services", "process_steps", "pricing_policies"],
        )?;
        Ok(Self { conn })
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn upsert_service(&self, service: &CatalogService) -> RepoResult<()> {
        service.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO catalog_services (
                service_uuid,
                name,
                category_name,
                unit_price,
                unit,
                pricing_policy_ids
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(service_uuid) DO UPDATE SET
                name = excluded.name,
                category_name = excluded.category_name,
                unit_price = excluded.unit_price,
                unit = excluded.unit,
                pricing_policy_ids = excluded.pricing_policy_ids,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                service.id.to_string(),
                service.name.as_str(),
                service.category_name.as_str(),
                service.unit_price,
                service.unit.as_str(),
                to_json(&service.pricing_policy_ids)?,
            ],
        )?;

        tx.execute(
            "DELETE FROM process_steps WHERE service_uuid = ?1;",
            [service.id.to_string()],
        )?;
        for step in &service.process_steps {
            tx.execute(
                "INSERT INTO process_steps (
                    step_uuid,
                    service_uuid,
                    name,
                    description,
                    sort_order,
                    progress_ratio,
                    cycle_days
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    step.id.to_string(),
                    service.id.to_string(),
                    step.name.as_str(),
                    step.description.as_str(),
                    step.order,
                    step.progress_ratio,
                    step.cycle_days,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn get_service(&self, id: ServiceId) -> RepoResult<Option<CatalogService>> {
        let row = self
            .conn
            .query_row(
                "SELECT name, category_name, unit_price, unit, pricing_policy_ids
                 FROM catalog_services
                 WHERE service_uuid = ?1;",
                [id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((name, category_name, unit_price, unit, policy_ids)) = row else {
            return Ok(None);
        };

        Ok(Some(CatalogService {
            id,
            name,
            category_name,
            unit_price,
            unit,
            process_steps: load_steps(self.conn, id)?,
            pricing_policy_ids: from_json(&policy_ids, "catalog_services.pricing_policy_ids")?,
        }))
    }

    fn upsert_pricing_policy(&self, policy: &PricingPolicy) -> RepoResult<()> {
        policy.validate()?;

        self.conn.execute(
            "INSERT INTO pricing_policies (policy_uuid, name, kind, discount_ratio, tiers)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(policy_uuid) DO UPDATE SET
                name = excluded.name,
                kind = excluded.kind,
                discount_ratio = excluded.discount_ratio,
                tiers = excluded.tiers,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                policy.id.to_string(),
                policy.name.as_str(),
                policy_kind_to_db(policy.kind),
                policy.discount_ratio,
                to_json(&policy.tiers)?,
            ],
        )?;
        Ok(())
    }

    fn get_pricing_policies(&self, ids: &[PricingPolicyId]) -> RepoResult<Vec<PricingPolicy>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, kind, discount_ratio, tiers
             FROM pricing_policies
             WHERE policy_uuid = ?1;",
        )?;

        let mut policies = Vec::with_capacity(ids.len());
        for &id in ids {
            let row = stmt
                .query_row([id.to_string()], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<f64>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })
                .optional()?;
            let (name, kind, discount_ratio, tiers) =
                row.ok_or(RepoError::NotFound(EntityRef::PricingPolicy(id)))?;

            let kind = parse_policy_kind(&kind).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid policy kind `{kind}` in pricing_policies.kind"
                ))
            })?;
            let tiers: Vec<PricingTier> = from_json(&tiers, "pricing_policies.tiers")?;
            policies.push(PricingPolicy {
                id,
                name,
                kind,
                discount_ratio,
                tiers,
            });
        }
        Ok(policies)
    }
}

fn load_steps(conn: &Connection, service_id: ServiceId) -> RepoResult<Vec<ProcessStep>> {
    let mut stmt = conn.prepare(
        "SELECT step_uuid, name, description, sort_order, progress_ratio, cycle_days
         FROM process_steps
         WHERE service_uuid = ?1
         ORDER BY sort_order ASC, step_uuid ASC;",
    )?;
    let mut rows = stmt.query([service_id.to_string()])?;
    let mut steps = Vec::new();
    while let Some(row) = rows.next()? {
        let step_uuid: String = row.get(0)?;
        steps.push(ProcessStep {
            id: parse_uuid(&step_uuid, "process_steps.step_uuid")?,
            name: row.get(1)?,
            description: row.get(2)?,
            order: row.get(3)?,
            progress_ratio: row.get(4)?,
            cycle_days: row.get(5)?,
        });
    }
    Ok(steps)
}

fn policy_kind_to_db(kind: PricingPolicyKind) -> &'static str {
    match kind {
        PricingPolicyKind::UniformDiscount => "uniform_discount",
        PricingPolicyKind::TieredDiscount => "tiered_discount",
    }
}

fn parse_policy_kind(value: &str) -> Option<PricingPolicyKind> {
    match value {
        "uniform_discount" => Some(PricingPolicyKind::UniformDiscount),
        "tiered_discount" => Some(PricingPolicyKind::TieredDiscount),
        _ => None,
    }
}
