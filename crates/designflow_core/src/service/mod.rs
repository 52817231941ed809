//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep HTTP/CLI adapters decoupled from storage details.
//!
//! # Invariants
//! - Every task-set mutation runs the progress aggregator before returning.
//! - Services depend on repository traits only, injected through
//!   `ServiceContext`.

pub mod aggregator;
pub mod error;
pub mod order_service;
pub mod project_service;
pub mod task_service;

use crate::clock::Clock;
use crate::model::catalog::PricingPolicyId;
use crate::model::order::OrderItem;
use crate::model::task::{DesignerRef, TaskPriority, UserId};
use crate::model::validation::{validate_quantity, ValidationError};
use crate::pricing::price_order_item;
use crate::repo::catalog_repo::CatalogRepository;
use crate::repo::error::EntityRef;
use crate::repo::order_repo::OrderSnapshotRepository;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::user_repo::UserDirectory;
use aggregator::RollupStatus;
use error::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Borrowed collaborators shared by all services.
#[derive(Clone, Copy)]
pub struct ServiceContext<'a> {
    pub catalog: &'a dyn CatalogRepository,
    pub users: &'a dyn UserDirectory,
    pub orders: &'a dyn OrderSnapshotRepository,
    pub projects: &'a dyn ProjectRepository,
    pub tasks: &'a dyn TaskRepository,
    pub clock: &'a dyn Clock,
}

/// Result of a task-set mutation plus the aggregation that followed it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationOutcome<T> {
    pub value: T,
    pub rollup: RollupStatus,
}

/// Catalog item requested for a new task.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskItem {
    pub service_id: Uuid,
    pub quantity: f64,
    #[serde(default)]
    pub pricing_policy_ids: Vec<PricingPolicyId>,
    #[serde(default)]
    pub specification: Option<String>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
}

/// Prices one requested item through the catalog.
///
/// Selected policies must be offered by the service.
pub(crate) fn price_new_item(
    catalog: &dyn CatalogRepository,
    index: usize,
    item: &NewTaskItem,
) -> ServiceResult<OrderItem> {
    validate_quantity(index, item.quantity)?;
    let service = catalog
        .get_service(item.service_id)?
        .ok_or(ServiceError::NotFound(EntityRef::Service(item.service_id)))?;

    for &policy_id in &item.pricing_policy_ids {
        if !service.offers_policy(policy_id) {
            return Err(ValidationError::PolicyNotOffered {
                service_id: service.id,
                policy_id,
            }
            .into());
        }
    }
    let policies = catalog.get_pricing_policies(&item.pricing_policy_ids)?;
    Ok(price_order_item(&service, item.quantity, &policies))
}

/// Resolves designer ids to directory names, dropping repeats.
///
/// Unknown users are `NotFound`.
pub(crate) fn resolve_designers(
    users: &dyn UserDirectory,
    ids: &[UserId],
) -> ServiceResult<Vec<DesignerRef>> {
    let mut unique = Vec::with_capacity(ids.len());
    for &id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }

    let names = users.display_names(&unique)?;
    unique
        .into_iter()
        .map(|user_id| {
            names
                .get(&user_id)
                .map(|name| DesignerRef {
                    user_id,
                    name: name.clone(),
                })
                .ok_or(ServiceError::NotFound(EntityRef::User(user_id)))
        })
        .collect()
}
