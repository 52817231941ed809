//! Catalog records consumed by task creation and pricing.
//!
//! # Responsibility
//! - Describe a sellable design service with its process steps and the
//!   pricing policies it offers.
//! - Validate policy/step settings before they enter storage.
//!
//! # Invariants
//! - `PricingPolicy::discount_ratio` and every tier ratio lie in `0..=1`.
//! - `ProcessStep::progress_ratio` lies in `0..=100`.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub type ServiceId = Uuid;
pub type ProcessStepId = Uuid;
pub type PricingPolicyId = Uuid;

/// One named stage in a service workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStep {
    pub id: ProcessStepId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Display order key. Transitions are not restricted by it.
    pub order: i64,
    /// Contribution to project progress, `0..=100`.
    pub progress_ratio: u8,
    /// Turnaround in days; `0` leaves the task due date untouched.
    #[serde(rename = "cycle", default)]
    pub cycle_days: u32,
}

impl ProcessStep {
    pub fn new(name: impl Into<String>, order: i64, progress_ratio: u8, cycle_days: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            order,
            progress_ratio,
            cycle_days,
        }
    }
}

/// Catalog service definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogService {
    pub id: ServiceId,
    pub name: String,
    #[serde(default)]
    pub category_name: String,
    pub unit_price: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub process_steps: Vec<ProcessStep>,
    /// Policies an operator may select for this service, in catalog order.
    #[serde(default)]
    pub pricing_policy_ids: Vec<PricingPolicyId>,
}

impl CatalogService {
    pub fn new(name: impl Into<String>, unit_price: f64, unit: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category_name: String::new(),
            unit_price,
            unit: unit.into(),
            process_steps: Vec::new(),
            pricing_policy_ids: Vec::new(),
        }
    }

    /// Checks step ratios and step id uniqueness.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankField("service name"));
        }
        let mut seen = HashSet::new();
        for step in &self.process_steps {
            if step.progress_ratio > 100 {
                return Err(ValidationError::ProgressRatioOutOfRange {
                    step_id: step.id,
                    ratio: step.progress_ratio,
                });
            }
            if !seen.insert(step.id) {
                return Err(ValidationError::DuplicateProcessStep(step.id));
            }
        }
        Ok(())
    }

    pub fn offers_policy(&self, policy_id: PricingPolicyId) -> bool {
        self.pricing_policy_ids.contains(&policy_id)
    }
}

/// Discount rule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingPolicyKind {
    /// Single ratio applied regardless of quantity.
    UniformDiscount,
    /// Ratio chosen by the quantity bucket.
    TieredDiscount,
}

/// Quantity bucket of a tiered policy. Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    pub min_quantity: f64,
    /// `None` means open-ended.
    #[serde(default)]
    pub max_quantity: Option<f64>,
    pub discount_ratio: f64,
}

impl PricingTier {
    pub fn contains(&self, quantity: f64) -> bool {
        quantity >= self.min_quantity && self.max_quantity.map_or(true, |max| quantity <= max)
    }
}

/// Discount rule definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPolicy {
    pub id: PricingPolicyId,
    pub name: String,
    pub kind: PricingPolicyKind,
    /// Used by `UniformDiscount` only.
    #[serde(default)]
    pub discount_ratio: Option<f64>,
    /// Used by `TieredDiscount` only, matched in listed order.
    #[serde(default)]
    pub tiers: Vec<PricingTier>,
}

impl PricingPolicy {
    pub fn uniform(name: impl Into<String>, discount_ratio: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: PricingPolicyKind::UniformDiscount,
            discount_ratio: Some(discount_ratio),
            tiers: Vec::new(),
        }
    }

    pub fn tiered(name: impl Into<String>, tiers: Vec<PricingTier>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: PricingPolicyKind::TieredDiscount,
            discount_ratio: None,
            tiers,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.kind {
            PricingPolicyKind::UniformDiscount => {
                let ratio = self
                    .discount_ratio
                    .ok_or(ValidationError::IncompletePolicy(self.id))?;
                check_ratio(self.id, ratio)?;
            }
            PricingPolicyKind::TieredDiscount => {
                if self.tiers.is_empty() {
                    return Err(ValidationError::IncompletePolicy(self.id));
                }
                for (tier_index, tier) in self.tiers.iter().enumerate() {
                    check_ratio(self.id, tier.discount_ratio)?;
                    if let Some(max) = tier.max_quantity {
                        if max < tier.min_quantity {
                            return Err(ValidationError::InvalidTierRange {
                                policy_id: self.id,
                                tier_index,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_ratio(policy_id: PricingPolicyId, ratio: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&ratio) {
        Ok(())
    } else {
        Err(ValidationError::DiscountRatioOutOfRange { policy_id, ratio })
    }
}

/// Directory entry for one designer/user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    pub id: Uuid,
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::{CatalogService, PricingPolicy, PricingTier, ProcessStep};
    use crate::model::validation::ValidationError;

    #[test]
    fn tier_bounds_are_inclusive_and_open_ended() {
        let bounded = PricingTier {
            min_quantity: 5.0,
            max_quantity: Some(10.0),
            discount_ratio: 0.1,
        };
        assert!(bounded.contains(5.0));
        assert!(bounded.contains(10.0));
        assert!(!bounded.contains(10.5));

        let open = PricingTier {
            min_quantity: 11.0,
            max_quantity: None,
            discount_ratio: 0.2,
        };
        assert!(open.contains(1_000.0));
        assert!(!open.contains(4.0));
    }

    #[test]
    fn policy_validation_rejects_bad_ratio_and_reversed_tier() {
        let uniform = PricingPolicy::uniform("too generous", 1.2);
        assert!(matches!(
            uniform.validate(),
            Err(ValidationError::DiscountRatioOutOfRange { .. })
        ));

        let reversed = PricingPolicy::tiered(
            "reversed",
            vec![PricingTier {
                min_quantity: 10.0,
                max_quantity: Some(2.0),
                discount_ratio: 0.1,
            }],
        );
        assert!(matches!(
            reversed.validate(),
            Err(ValidationError::InvalidTierRange { tier_index: 0, .. })
        ));

        let empty = PricingPolicy::tiered("empty", Vec::new());
        assert_eq!(
            empty.validate(),
            Err(ValidationError::IncompletePolicy(empty.id))
        );
    }

    #[test]
    fn service_validation_rejects_out_of_range_step_ratio() {
        let mut service = CatalogService::new("Floor plan", 100.0, "m2");
        service.process_steps.push(ProcessStep::new("Draft", 1, 101, 0));
        assert!(matches!(
            service.validate(),
            Err(ValidationError::ProgressRatioOutOfRange { ratio: 101, .. })
        ));
    }
}
