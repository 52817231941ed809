//! Pricing and discount calculation.
//!
//! # Responsibility
//! - Compute task subtotals from unit price, quantity, and selected policies.
//! - Build order line items from catalog data.
//!
//! # Invariants
//! - Calculation is pure; no storage or clock access.
//! - At most one policy is applied per quote (first applicable wins).

pub mod calculator;

pub use calculator::{describe_quote, price_order_item, quote_price, round_currency, PriceQuote};
