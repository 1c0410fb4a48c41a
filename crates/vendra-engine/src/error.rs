//! # Engine Error Types
//!
//! The error taxonomy for sale workflows.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError (vendra-core)                                         │
//! │       │  rejected before any side effect                               │
//! │       ▼                                                                 │
//! │  EngineError (this module) ← stock, auth and workflow failures         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Request layer maps variants to user-facing responses                  │
//! │                                                                         │
//! │  EngineError::Compensation is the exception: it is an alerting         │
//! │  condition (manual stock reconciliation required), not a normal        │
//! │  user-facing error.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these errors are retried automatically - retrying a stock
//! operation without re-validating availability would be unsafe.

use thiserror::Error;

use vendra_core::ValidationError;

use crate::gate::SaleAction;

// =============================================================================
// Engine Error
// =============================================================================

/// Errors surfaced by the sale transaction workflows.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Request rejected before any side effect.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The authorization gate denied the action. Short-circuits with no
    /// side effect.
    #[error("actor {actor} is not allowed to {action} sales")]
    Forbidden { actor: String, action: SaleAction },

    /// Sale referenced by the request does not exist.
    #[error("sale not found: {0}")]
    SaleNotFound(String),

    /// Product referenced by a line item does not exist.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Requested quantity exceeds the stock on record at write time.
    ///
    /// ## When This Occurs
    /// Reported by the ledger's conditional decrement - never by an earlier
    /// stale read - so two concurrent reservations cannot both pass on the
    /// same units.
    #[error("insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Refund requested for a sale that is already refunded.
    ///
    /// Refund is not idempotent: a second attempt is an error, not a no-op,
    /// and does not double-restore stock.
    #[error("sale {0} has already been refunded")]
    AlreadyRefunded(String),

    /// A compensating rollback itself failed.
    ///
    /// ## When This Occurs
    /// - Release after a failed reserve could not complete
    /// - Re-reserving original items after a failed update could not complete
    ///
    /// The system may be in an inconsistent state requiring manual stock
    /// reconciliation. Logged at `error!` level where it arises; treat as
    /// an alerting condition, not a normal user-facing error.
    #[error("compensation failed during {operation}: {source}")]
    Compensation {
        operation: &'static str,
        #[source]
        source: Box<EngineError>,
    },

    /// Storage backend failure (pool, query, constraint, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl EngineError {
    /// Wraps any displayable storage fault as a backend error.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        EngineError::Backend(err.to_string())
    }

    /// True for the fatal/alerting condition that indicates lost
    /// consistency.
    pub fn is_compensation_failure(&self) -> bool {
        matches!(self, EngineError::Compensation { .. })
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::InsufficientStock {
            product_id: "prod-9".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product prod-9: available 3, requested 5"
        );

        let err = EngineError::Forbidden {
            actor: "user-1".to_string(),
            action: SaleAction::Refund,
        };
        assert_eq!(err.to_string(), "actor user-1 is not allowed to refund sales");
    }

    #[test]
    fn test_compensation_wraps_source() {
        let source = EngineError::backend("connection reset");
        let err = EngineError::Compensation {
            operation: "stock release for delete",
            source: Box::new(source),
        };

        assert!(err.is_compensation_failure());
        assert!(err.to_string().contains("stock release for delete"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_validation_converts_to_engine_error() {
        let validation_err = ValidationError::required("items");
        let err: EngineError = validation_err.into();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
