//! Order snapshot model.
//!
//! # Responsibility
//! - Define the immutable, versioned record of an order's line items.
//! - Validate line items before a version is written.
//!
//! # Invariants
//! - `version_number` starts at 1 and increases by one per order.
//! - Client/contact fields are a denormalized copy taken at version time.
//! - Items never change after the version exists; corrections are new versions.

use crate::model::catalog::{PricingPolicyId, ServiceId};
use crate::model::validation::{validate_quantity, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type OrderId = Uuid;
pub type OrderSnapshotId = Uuid;

/// One contact person captured with the client snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub contact_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// Client and contact state copied into snapshots and projects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

/// Pricing policy reference captured with an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRef {
    pub policy_id: PricingPolicyId,
    pub name: String,
}

/// One order line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub service_id: ServiceId,
    pub service_name: String,
    #[serde(default)]
    pub category_name: String,
    pub unit_price: f64,
    #[serde(default)]
    pub unit: String,
    pub quantity: f64,
    pub subtotal: f64,
    #[serde(default)]
    pub pricing_policies: Vec<PolicyRef>,
    #[serde(default)]
    pub price_description: String,
}

impl OrderItem {
    pub fn policy_ids(&self) -> Vec<PricingPolicyId> {
        self.pricing_policies.iter().map(|p| p.policy_id).collect()
    }
}

/// Immutable recorded state of one order version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    pub id: OrderSnapshotId,
    pub order_id: OrderId,
    pub version_number: u32,
    pub client: ClientInfo,
    pub items: Vec<OrderItem>,
    pub created_at: i64,
}

/// Validates the item list of a version about to be written.
///
/// # Errors
/// - `EmptyItems` when no items are given.
/// - `MissingServiceId` when an item carries the nil UUID.
/// - `InvalidQuantity` when a quantity is zero, negative, or not finite.
pub fn validate_items(items: &[OrderItem]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::EmptyItems);
    }
    for (index, item) in items.iter().enumerate() {
        if item.service_id.is_nil() {
            return Err(ValidationError::MissingServiceId { index });
        }
        validate_quantity(index, item.quantity)?;
    }
    Ok(())
}
