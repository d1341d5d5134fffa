//! Domain error types shared across Stockroom crates.
//!
//! `CoreError` covers the pure ledger checks that need no storage (quantity
//! validation, plan feasibility, batch transitions). Storage errors live in
//! `stk-db`. `ErrorKind` is the stable classification callers match on.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised by the in-memory ledger logic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A quantity argument was out of range.
    #[error("Invalid quantity for {field}: {value}")]
    InvalidQuantity { field: &'static str, value: i64 },

    /// The requested quantity exceeds what is available.
    #[error("Insufficient stock for item {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: String,
        requested: i64,
        available: i64,
    },

    /// The item is batch-tracked but no batch has remaining stock.
    #[error("Item {item_id} has no open batches")]
    NoOpenBatches { item_id: String },

    /// A batch transition was attempted that is not allowed.
    #[error("Invalid batch transition: {batch_id} from {from} to {to}")]
    InvalidTransition {
        batch_id: String,
        from: String,
        to: String,
    },

    /// Data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl CoreError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuantity { .. } | Self::InvalidTransition { .. } | Self::Validation(_) => {
                ErrorKind::InvalidArgument
            }
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            Self::NoOpenBatches { .. } => ErrorKind::NoOpenBatches,
        }
    }
}

/// Stable error classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    InsufficientStock,
    NoOpenBatches,
    Forbidden,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// Only lost races are worth retrying with the same input.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Conflict)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidArgument => "invalid_argument",
            Self::InsufficientStock => "insufficient_stock",
            Self::NoOpenBatches => "no_open_batches",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reject zero and negative quantities.
///
/// # Errors
///
/// Returns `CoreError::InvalidQuantity` if `value <= 0`.
pub const fn require_positive(field: &'static str, value: i64) -> Result<i64, CoreError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(CoreError::InvalidQuantity { field, value })
    }
}

/// Reject negative quantities.
///
/// # Errors
///
/// Returns `CoreError::InvalidQuantity` if `value < 0`.
pub const fn require_non_negative(field: &'static str, value: i64) -> Result<i64, CoreError> {
    if value >= 0 {
        Ok(value)
    } else {
        Err(CoreError::InvalidQuantity { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflict_is_retryable() {
        assert!(ErrorKind::Conflict.is_retryable());
        assert!(!ErrorKind::InsufficientStock.is_retryable());
        assert!(!ErrorKind::Internal.is_retryable());
    }

    #[test]
    fn positive_guard() {
        assert_eq!(require_positive("quantity", 1), Ok(1));
        assert_eq!(
            require_positive("quantity", 0),
            Err(CoreError::InvalidQuantity {
                field: "quantity",
                value: 0
            })
        );
        assert!(require_non_negative("actual_quantity", 0).is_ok());
        assert!(require_non_negative("actual_quantity", -1).is_err());
    }

    #[test]
    fn core_error_kinds() {
        let err = CoreError::NoOpenBatches {
            item_id: "itm-1".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NoOpenBatches);
        assert_eq!(err.to_string(), "Item itm-1 has no open batches");
    }
}
