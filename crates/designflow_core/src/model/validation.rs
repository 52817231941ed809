//! Input validation errors shared by model constructors and services.

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Rejected input shape. Surfaced to callers as a validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An order snapshot must carry at least one item.
    EmptyItems,
    /// Item at `index` has a nil service id.
    MissingServiceId { index: usize },
    /// Item at `index` has a zero, negative, or non-finite quantity.
    InvalidQuantity { index: usize, quantity: f64 },
    /// A required text field is blank after trim.
    BlankField(&'static str),
    /// Discount ratio must lie within `0..=1`.
    DiscountRatioOutOfRange { policy_id: Uuid, ratio: f64 },
    /// Uniform policy without a ratio, or tiered policy without tiers.
    IncompletePolicy(Uuid),
    /// Tier upper bound is below its lower bound.
    InvalidTierRange { policy_id: Uuid, tier_index: usize },
    /// Process step ratio must lie within `0..=100`.
    ProgressRatioOutOfRange { step_id: Uuid, ratio: u8 },
    /// Process step ids must be unique within one service.
    DuplicateProcessStep(Uuid),
    /// Policy is not offered for the selected service.
    PolicyNotOffered { service_id: Uuid, policy_id: Uuid },
    /// A batch operation was called with nothing to do.
    EmptyBatch(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyItems => write!(f, "order snapshot requires at least one item"),
            Self::MissingServiceId { index } => write!(f, "item {index} is missing serviceId"),
            Self::InvalidQuantity { index, quantity } => {
                write!(f, "item {index} has invalid quantity {quantity}")
            }
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::DiscountRatioOutOfRange { policy_id, ratio } => write!(
                f,
                "pricing policy {policy_id} has discount ratio {ratio} outside 0..=1"
            ),
            Self::IncompletePolicy(policy_id) => {
                write!(f, "pricing policy {policy_id} is missing its discount settings")
            }
            Self::InvalidTierRange {
                policy_id,
                tier_index,
            } => write!(
                f,
                "pricing policy {policy_id} tier {tier_index} has maxQuantity below minQuantity"
            ),
            Self::ProgressRatioOutOfRange { step_id, ratio } => write!(
                f,
                "process step {step_id} has progress ratio {ratio} outside 0..=100"
            ),
            Self::DuplicateProcessStep(step_id) => {
                write!(f, "process step {step_id} is listed more than once")
            }
            Self::PolicyNotOffered {
                service_id,
                policy_id,
            } => write!(
                f,
                "pricing policy {policy_id} is not offered for service {service_id}"
            ),
            Self::EmptyBatch(what) => write!(f, "{what} must not be empty"),
        }
    }
}

impl Error for ValidationError {}

/// Validates one quantity value for item `index`.
pub fn validate_quantity(index: usize, quantity: f64) -> Result<(), ValidationError> {
    if quantity.is_finite() && quantity > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidQuantity { index, quantity })
    }
}

/// Validates that `value` is not blank; returns the trimmed text.
pub fn require_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{require_text, validate_quantity, ValidationError};

    #[test]
    fn quantity_must_be_positive_and_finite() {
        assert!(validate_quantity(0, 1.5).is_ok());
        assert!(matches!(
            validate_quantity(2, 0.0),
            Err(ValidationError::InvalidQuantity { index: 2, .. })
        ));
        assert!(validate_quantity(0, -3.0).is_err());
        assert!(validate_quantity(0, f64::NAN).is_err());
    }

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("name", "  Villa  ").unwrap(), "Villa");
        assert_eq!(
            require_text("name", "   ").unwrap_err(),
            ValidationError::BlankField("name")
        );
    }
}
