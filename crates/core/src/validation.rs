//! Validation errors raised at the schema boundary.

use rust_decimal::Decimal;
use thiserror::Error;

/// A malformed or out-of-range input.
///
/// Raised before anything is persisted; the rejected operation leaves no
/// partial write behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A line item that must be non-negative was negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount {
        /// Dotted path of the offending line item.
        field: String,
        /// The rejected value.
        value: Decimal,
    },

    /// A line item exceeded the largest accepted amount.
    #[error("{field} exceeds the maximum accepted amount")]
    AmountTooLarge {
        /// Dotted path of the offending line item.
        field: String,
    },

    /// A required category was absent.
    #[error("missing required category: {0}")]
    MissingCategory(String),

    /// A line item was present but not a number.
    #[error("invalid amount for {field}: {reason}")]
    InvalidAmount {
        /// Dotted path of the offending line item.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A non-amount field had the wrong shape or value.
    #[error("invalid value for {field}: {reason}")]
    InvalidField {
        /// Field name.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A key that is not part of the schema.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A field that may not be changed after creation.
    #[error("field cannot be modified: {0}")]
    ImmutableField(String),

    /// An integer outside its allowed range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
        /// The rejected value.
        value: i64,
    },

    /// A rate outside `[0, 1]`.
    #[error("{field} must be between 0 and 1, got {value}")]
    RateOutOfRange {
        /// Field name.
        field: String,
        /// The rejected value.
        value: Decimal,
    },

    /// Month/quarter presence does not match the report type.
    #[error("period does not match report type: {0}")]
    PeriodMismatch(String),

    /// A required string was empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// A string exceeded its maximum length.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Field name.
        field: &'static str,
        /// Maximum number of characters.
        max: usize,
    },

    /// An email address that does not parse.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}

/// Checks that `value` is non-empty after trimming.
pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

/// Checks that `value` has at most `max` characters.
pub(crate) fn require_max_len(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Checks that `value` lies in `[0, 1]`.
pub(crate) fn require_rate(field: &str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ValidationError::RateOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Checks that `value` lies in `[min, max]`.
pub(crate) fn require_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}
