//! # Pricing Module
//!
//! The line-item calculator: pure arithmetic over integer cents.
//!
//! ## Where This Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Totals Recomputation                                │
//! │                                                                         │
//! │  reserve() snapshots ──► LineItem { unit_price, cost_price, qty }      │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  price_line() ──► total_price = qty × unit_price                       │
//! │                   profit      = (unit_price − cost_price) × qty        │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  sale_totals() ──► subtotal     = Σ total_price                        │
//! │                    total_amount = subtotal − discount + tax            │
//! │                                                                         │
//! │  The orchestrator recomputes on EVERY mutation; callers never supply   │
//! │  totals.                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No rounding happens here - inputs are already integer cents. Negative
//! totals (discount exceeding subtotal + tax) are returned as-is; clamping
//! is explicitly not this module's job.

use crate::money::Money;
use crate::types::LineItem;

/// Computed amounts for a single sale line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePricing {
    pub total_price_cents: i64,
    pub profit_cents: i64,
}

/// Sale-level totals derived from the current line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal_cents: i64,
    pub total_amount_cents: i64,
}

/// Prices one line: `total_price = quantity × unit_price`,
/// `profit = (unit_price − cost_price) × quantity`.
///
/// Negative `quantity`/`unit_price` are rejected by the caller's validation
/// before this is invoked; this function just does the arithmetic.
///
/// ## Example
/// ```rust
/// use vendra_core::pricing::price_line;
///
/// let line = price_line(4, 500, 300);
/// assert_eq!(line.total_price_cents, 2000);
/// assert_eq!(line.profit_cents, 800);
/// ```
pub fn price_line(quantity: i64, unit_price_cents: i64, cost_price_cents: i64) -> LinePricing {
    let unit_price = Money::from_cents(unit_price_cents);
    let margin = unit_price - Money::from_cents(cost_price_cents);

    LinePricing {
        total_price_cents: unit_price.multiply_quantity(quantity).cents(),
        profit_cents: margin.multiply_quantity(quantity).cents(),
    }
}

/// Computes sale totals from the current items:
/// `subtotal = Σ item.total_price`, `total_amount = subtotal − discount + tax`.
///
/// No clamping - a `total_amount` may be negative if discount exceeds
/// subtotal + tax. That value is surfaced, not silently corrected.
pub fn sale_totals(items: &[LineItem], discount_cents: i64, tax_cents: i64) -> SaleTotals {
    let subtotal = items
        .iter()
        .fold(Money::zero(), |acc, item| acc + item.total_price());

    let total_amount = subtotal - Money::from_cents(discount_cents) + Money::from_cents(tax_cents);

    SaleTotals {
        subtotal_cents: subtotal.cents(),
        total_amount_cents: total_amount.cents(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, unit_price_cents: i64, cost_price_cents: i64) -> LineItem {
        let pricing = price_line(quantity, unit_price_cents, cost_price_cents);
        LineItem {
            product_id: "p".to_string(),
            product_name: "Product".to_string(),
            quantity,
            unit_price_cents,
            total_price_cents: pricing.total_price_cents,
            cost_price_cents,
            profit_cents: pricing.profit_cents,
        }
    }

    #[test]
    fn test_price_line_basic() {
        // 4 units at $5.00, cost $3.00
        let line = price_line(4, 500, 300);
        assert_eq!(line.total_price_cents, 2000);
        assert_eq!(line.profit_cents, 800);
    }

    #[test]
    fn test_price_line_selling_below_cost() {
        // Clearance: selling below acquisition cost yields negative profit.
        let line = price_line(2, 300, 500);
        assert_eq!(line.total_price_cents, 600);
        assert_eq!(line.profit_cents, -400);
    }

    #[test]
    fn test_sale_totals_no_discount_no_tax() {
        let items = vec![item(4, 500, 300)];
        let totals = sale_totals(&items, 0, 0);
        assert_eq!(totals.subtotal_cents, 2000);
        assert_eq!(totals.total_amount_cents, 2000);
    }

    #[test]
    fn test_sale_totals_with_discount_and_tax() {
        let items = vec![item(4, 500, 300), item(1, 1000, 900)];
        // subtotal 3000, -200 discount, +150 tax
        let totals = sale_totals(&items, 200, 150);
        assert_eq!(totals.subtotal_cents, 3000);
        assert_eq!(totals.total_amount_cents, 2950);
    }

    #[test]
    fn test_sale_totals_discount_exceeding_subtotal_goes_negative() {
        let items = vec![item(1, 500, 300)];
        let totals = sale_totals(&items, 1000, 100);
        assert_eq!(totals.subtotal_cents, 500);
        // 500 - 1000 + 100: surfaced, not clamped
        assert_eq!(totals.total_amount_cents, -400);
    }

    #[test]
    fn test_sale_totals_empty_items() {
        let totals = sale_totals(&[], 0, 0);
        assert_eq!(totals.subtotal_cents, 0);
        assert_eq!(totals.total_amount_cents, 0);
    }
}
