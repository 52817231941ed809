//! Discount calculator.
//!
//! `uniform_discount` always applies. `tiered_discount` applies only when the
//! quantity falls in one of its tiers; the first matching tier is used. The
//! first selected policy that applies wins, later ones are ignored even when
//! they would give a bigger or smaller discount.

use crate::model::catalog::{CatalogService, PricingPolicy, PricingPolicyId, PricingPolicyKind};
use crate::model::order::{OrderItem, PolicyRef};
use serde::Serialize;

/// Result of pricing one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// `unit_price * quantity` before discount.
    pub original_price: f64,
    pub discounted_price: f64,
    pub discount_amount: f64,
    /// Ratio of the applied policy, `0.0` when none applied.
    pub discount_ratio: f64,
    pub applied_policy: Option<PricingPolicyId>,
    #[serde(skip)]
    applied_policy_name: Option<String>,
}

impl PriceQuote {
    pub fn applied_policy_name(&self) -> Option<&str> {
        self.applied_policy_name.as_deref()
    }
}

/// Rounds a currency amount to 2 decimals, halves away from zero.
///
/// The scaled value is nudged by a relative epsilon first so binary
/// representations like `1.005` round up as written.
pub fn round_currency(value: f64) -> f64 {
    let scaled = value * 100.0;
    let nudged = scaled + scaled.signum() * scaled.abs().max(1.0) * f64::EPSILON * 4.0;
    nudged.round() / 100.0
}

/// Prices `quantity` units at `unit_price` with the given policies, in
/// selection order.
pub fn quote_price(unit_price: f64, quantity: f64, policies: &[PricingPolicy]) -> PriceQuote {
    let original = unit_price * quantity;
    let applied = policies
        .iter()
        .find_map(|policy| applicable_ratio(policy, quantity).map(|ratio| (policy, ratio)));

    match applied {
        Some((policy, ratio)) => {
            let discounted = round_currency(original * (1.0 - ratio));
            let original = round_currency(original);
            PriceQuote {
                original_price: original,
                discounted_price: discounted,
                discount_amount: round_currency(original - discounted),
                discount_ratio: ratio,
                applied_policy: Some(policy.id),
                applied_policy_name: Some(policy.name.clone()),
            }
        }
        None => {
            let original = round_currency(original);
            PriceQuote {
                original_price: original,
                discounted_price: original,
                discount_amount: 0.0,
                discount_ratio: 0.0,
                applied_policy: None,
                applied_policy_name: None,
            }
        }
    }
}

fn applicable_ratio(policy: &PricingPolicy, quantity: f64) -> Option<f64> {
    match policy.kind {
        PricingPolicyKind::UniformDiscount => policy.discount_ratio,
        PricingPolicyKind::TieredDiscount => policy
            .tiers
            .iter()
            .find(|tier| tier.contains(quantity))
            .map(|tier| tier.discount_ratio),
    }
}

/// Short operator-facing description of a quote.
pub fn describe_quote(quote: &PriceQuote) -> String {
    match quote.applied_policy_name() {
        Some(name) => {
            let percent = round_currency(quote.discount_ratio * 100.0);
            format!("{name}: {percent}% off")
        }
        None => "list price".to_string(),
    }
}

/// Builds an order line for `service` with the selected `policies`.
///
/// Every selected policy is recorded on the item, the subtotal reflects only
/// the one that applied.
pub fn price_order_item(
    service: &CatalogService,
    quantity: f64,
    policies: &[PricingPolicy],
) -> OrderItem {
    let quote = quote_price(service.unit_price, quantity, policies);
    OrderItem {
        service_id: service.id,
        service_name: service.name.clone(),
        category_name: service.category_name.clone(),
        unit_price: service.unit_price,
        unit: service.unit.clone(),
        quantity,
        subtotal: quote.discounted_price,
        pricing_policies: policies
            .iter()
            .map(|policy| PolicyRef {
                policy_id: policy.id,
                name: policy.name.clone(),
            })
            .collect(),
        price_description: describe_quote(&quote),
    }
}
