//! # Validation Module
//!
//! Request validation for the sale engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request layer (external)                                     │
//! │  ├── Type validation (deserialization, closed enums)                   │
//! │  └── Immediate caller feedback                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Business rule validation before ANY side effect                   │
//! │  └── Empty item lists, non-positive quantities, missing store          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage (SQLite)                                             │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  └── CHECK (quantity >= 0)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vendra_core::types::LineItemRequest;
//! use vendra_core::validation::validate_line_requests;
//!
//! let items = vec![LineItemRequest { product_id: "p1".into(), quantity: 2 }];
//! assert!(validate_line_requests(&items).is_ok());
//! ```

use crate::error::{ValidationError, ValidationResult};
use crate::types::{LineItemRequest, NewSale, SalePatch};
use crate::MAX_SALE_ITEMS;

/// Maximum length for free-form sale notes.
const MAX_NOTES_LEN: usize = 1000;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a store reference.
///
/// ## Rules
/// - Must not be empty or whitespace
pub fn validate_store_id(store_id: &str) -> ValidationResult<()> {
    if store_id.trim().is_empty() {
        return Err(ValidationError::required("store_id"));
    }

    Ok(())
}

/// Validates a requested line-item set.
///
/// ## Rules
/// - Must not be empty (a sale carries at least one line)
/// - At most [`MAX_SALE_ITEMS`] lines
/// - Every `product_id` non-empty
/// - Every `quantity` positive (> 0)
pub fn validate_line_requests(items: &[LineItemRequest]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::required("items"));
    }

    if items.len() > MAX_SALE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_SALE_ITEMS as i64,
        });
    }

    for item in items {
        if item.product_id.trim().is_empty() {
            return Err(ValidationError::required("product_id"));
        }

        if item.quantity <= 0 {
            return Err(ValidationError::must_be_positive("quantity"));
        }
    }

    Ok(())
}

/// Validates optional free-form notes.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    if let Some(notes) = notes {
        if notes.len() > MAX_NOTES_LEN {
            return Err(ValidationError::TooLong {
                field: "notes".to_string(),
                max: MAX_NOTES_LEN,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates a sale creation request.
///
/// Runs before any stock mutation: a rejected request has no side effect.
pub fn validate_new_sale(draft: &NewSale) -> ValidationResult<()> {
    validate_store_id(&draft.store_id)?;
    validate_line_requests(&draft.items)?;
    validate_notes(draft.notes.as_deref())?;

    Ok(())
}

/// Validates a sale patch.
///
/// Only supplied fields are checked. An items replacement must satisfy the
/// same rules as at creation - in particular it may not be empty (deleting
/// the sale is the way to remove all lines).
pub fn validate_patch(patch: &SalePatch) -> ValidationResult<()> {
    if let Some(items) = &patch.items {
        validate_line_requests(items)?;
    }

    if let Some(store_id) = &patch.store_id {
        validate_store_id(store_id)?;
    }

    validate_notes(patch.notes.as_deref())?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;

    fn request(product_id: &str, quantity: i64) -> LineItemRequest {
        LineItemRequest {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_validate_store_id() {
        assert!(validate_store_id("store-1").is_ok());
        assert!(validate_store_id("").is_err());
        assert!(validate_store_id("   ").is_err());
    }

    #[test]
    fn test_validate_line_requests() {
        assert!(validate_line_requests(&[request("p1", 1)]).is_ok());
        assert!(validate_line_requests(&[request("p1", 1), request("p2", 50)]).is_ok());

        // Empty set rejected
        assert!(validate_line_requests(&[]).is_err());
        // Non-positive quantities rejected
        assert!(validate_line_requests(&[request("p1", 0)]).is_err());
        assert!(validate_line_requests(&[request("p1", -3)]).is_err());
        // Blank product reference rejected
        assert!(validate_line_requests(&[request("", 1)]).is_err());
    }

    #[test]
    fn test_validate_line_requests_cap() {
        let items: Vec<LineItemRequest> =
            (0..=MAX_SALE_ITEMS).map(|i| request(&format!("p{i}"), 1)).collect();
        assert!(validate_line_requests(&items).is_err());
    }

    #[test]
    fn test_validate_new_sale() {
        let draft = NewSale {
            store_id: "store-1".to_string(),
            items: vec![request("p1", 2)],
            discount_cents: 0,
            tax_cents: 0,
            payment_method: PaymentMethod::Cash,
            notes: None,
        };
        assert!(validate_new_sale(&draft).is_ok());

        let missing_store = NewSale {
            store_id: "".to_string(),
            ..draft.clone()
        };
        assert!(validate_new_sale(&missing_store).is_err());

        let no_items = NewSale {
            items: vec![],
            ..draft
        };
        assert!(validate_new_sale(&no_items).is_err());
    }

    #[test]
    fn test_validate_patch() {
        // Empty patch touches nothing and is fine to validate
        assert!(validate_patch(&SalePatch::default()).is_ok());

        let patch = SalePatch {
            items: Some(vec![request("p1", 3)]),
            discount_cents: Some(100),
            ..SalePatch::default()
        };
        assert!(validate_patch(&patch).is_ok());

        // Replacing items with an empty set is rejected
        let empty_items = SalePatch {
            items: Some(vec![]),
            ..SalePatch::default()
        };
        assert!(validate_patch(&empty_items).is_err());
    }

    #[test]
    fn test_validate_notes() {
        assert!(validate_notes(None).is_ok());
        assert!(validate_notes(Some("paid in two installments")).is_ok());
        assert!(validate_notes(Some(&"x".repeat(2000))).is_err());
    }
}
