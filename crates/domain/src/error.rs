//! Payload validation errors.

use thiserror::Error;

/// Errors raised when a payload violates one of its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    /// The denormalized order totals disagree with the line items.
    #[error(
        "Inconsistent order totals: declared {declared_items} items / {declared_amount}, \
         line items sum to {actual_items} items / {actual_amount}"
    )]
    InconsistentTotals {
        declared_items: u32,
        declared_amount: f64,
        actual_items: u32,
        actual_amount: f64,
    },

    /// A line item has a zero quantity.
    #[error("Invalid quantity for product {code}: {quantity}")]
    InvalidQuantity { code: String, quantity: u32 },

    /// A unit value is negative or not a finite number.
    #[error("Invalid unit value for product {code}: {value}")]
    InvalidUnitValue { code: String, value: f64 },

    /// A required field is empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The document version cannot be incremented any further.
    #[error("Document is already at the maximum version")]
    VersionOverflow { document_id: Option<i64> },
}

/// Convenience type alias for payload results.
pub type Result<T> = std::result::Result<T, PayloadError>;
