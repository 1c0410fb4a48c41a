//! # Stock Reconciliation Step
//!
//! Translates a set of requested line-item quantities into
//! atomic-as-possible adjustments to product stock, and the inverse
//! (restoration) for edits, deletes and refunds.
//!
//! ## All-or-Nothing Batches
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                reserve([A×4, B×2, C×9])                                 │
//! │                                                                         │
//! │  A: quantity 10 ──► decrement 4 ──► ok (stock 6)                       │
//! │  B: quantity  5 ──► decrement 2 ──► ok (stock 3)                       │
//! │  C: quantity  1 ──► decrement 9 ──► InsufficientStock!                 │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  roll back this batch before returning:                                │
//! │  B: increment 2 (stock 5 again)                                        │
//! │  A: increment 4 (stock 10 again)                                       │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  Err(InsufficientStock { C, available: 1, requested: 9 })              │
//! │                                                                         │
//! │  No partial decrements from a failed batch are ever retained. This is  │
//! │  the contract every orchestrator workflow depends on.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Items are processed in the order supplied by the caller. Duplicate
//! product references in one batch are legal; their deltas apply (and roll
//! back) sequentially.

use tracing::{debug, error, warn};

use vendra_core::pricing::price_line;
use vendra_core::{LineItem, LineItemRequest, Product};

use crate::error::{EngineError, EngineResult};
use crate::ledger::ProductLedger;

// =============================================================================
// Reserve
// =============================================================================

/// Reserves stock for the requested items and returns the line-item
/// snapshots.
///
/// For each request, the referenced product's quantity is decremented via
/// the ledger's conditional write; the product row it returns supplies the
/// frozen `product_name` / `unit_price_cents` / `cost_price_cents` for the
/// snapshot. On a mid-batch failure every decrement already applied in this
/// batch is rolled back before the error propagates.
pub async fn reserve<L>(ledger: &L, requests: &[LineItemRequest]) -> EngineResult<Vec<LineItem>>
where
    L: ProductLedger + ?Sized,
{
    let entries: Vec<(&str, i64)> = requests
        .iter()
        .map(|r| (r.product_id.as_str(), r.quantity))
        .collect();

    let products = decrement_batch(ledger, &entries).await?;

    let items = requests
        .iter()
        .zip(products)
        .map(|(request, product)| snapshot_line(request, &product))
        .collect();

    Ok(items)
}

// =============================================================================
// Release
// =============================================================================

/// Restores stock for previously reserved items.
///
/// The inverse of [`reserve`]: each referenced product's quantity is
/// incremented by the item quantity. A product that no longer exists
/// (deleted after the sale) is a logged no-op rather than a fatal error -
/// historical line items outlive their products.
pub async fn release<L>(ledger: &L, items: &[LineItem]) -> EngineResult<()>
where
    L: ProductLedger + ?Sized,
{
    for item in items {
        match ledger.adjust_quantity(&item.product_id, item.quantity).await {
            Ok(product) => {
                debug!(
                    product_id = %product.id,
                    restored = item.quantity,
                    stock = product.quantity,
                    "stock released"
                );
            }
            Err(EngineError::ProductNotFound(id)) => {
                warn!(
                    product_id = %id,
                    quantity = item.quantity,
                    "product missing during stock release; units not restored"
                );
            }
            Err(other) => return Err(other),
        }
    }

    Ok(())
}

// =============================================================================
// Reapply
// =============================================================================

/// Re-decrements stock for items that were already snapshotted.
///
/// Used to restore a prior reservation after a failed update swap: the
/// quantities come back off the shelf but the existing snapshots are kept
/// untouched (re-pricing them would rewrite history). Same all-or-nothing
/// contract as [`reserve`].
pub async fn reapply<L>(ledger: &L, items: &[LineItem]) -> EngineResult<()>
where
    L: ProductLedger + ?Sized,
{
    let entries: Vec<(&str, i64)> = items
        .iter()
        .map(|i| (i.product_id.as_str(), i.quantity))
        .collect();

    decrement_batch(ledger, &entries).await.map(|_| ())
}

// =============================================================================
// Internals
// =============================================================================

/// Builds the frozen line-item snapshot from the just-adjusted product row.
fn snapshot_line(request: &LineItemRequest, product: &Product) -> LineItem {
    let pricing = price_line(request.quantity, product.price_cents, product.cost_price_cents);

    LineItem {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        quantity: request.quantity,
        unit_price_cents: product.price_cents,
        total_price_cents: pricing.total_price_cents,
        cost_price_cents: product.cost_price_cents,
        profit_cents: pricing.profit_cents,
    }
}

/// Applies one decrement per entry, in caller order, undoing the whole batch
/// if any entry fails.
async fn decrement_batch<L>(ledger: &L, entries: &[(&str, i64)]) -> EngineResult<Vec<Product>>
where
    L: ProductLedger + ?Sized,
{
    let mut adjusted = Vec::with_capacity(entries.len());

    for (idx, &(product_id, quantity)) in entries.iter().enumerate() {
        match ledger.adjust_quantity(product_id, -quantity).await {
            Ok(product) => adjusted.push(product),
            Err(err) => {
                undo_decrements(ledger, &entries[..idx]).await?;
                return Err(err);
            }
        }
    }

    Ok(adjusted)
}

/// Rolls back decrements already applied for the leading entries of a failed
/// batch. A failure here is a compensation failure: some units may stay
/// deducted with no sale to show for them.
async fn undo_decrements<L>(ledger: &L, applied: &[(&str, i64)]) -> EngineResult<()>
where
    L: ProductLedger + ?Sized,
{
    for &(product_id, quantity) in applied {
        match ledger.adjust_quantity(product_id, quantity).await {
            Ok(_) => {}
            Err(EngineError::ProductNotFound(id)) => {
                warn!(
                    product_id = %id,
                    quantity,
                    "product missing during batch rollback; units not restored"
                );
            }
            Err(other) => {
                error!(
                    product_id = %product_id,
                    error = %other,
                    "stock batch rollback failed; manual reconciliation required"
                );
                return Err(EngineError::Compensation {
                    operation: "stock batch rollback",
                    source: Box::new(other),
                });
            }
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::MemoryLedger;

    fn request(product_id: &str, quantity: i64) -> LineItemRequest {
        LineItemRequest {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_reserve_decrements_and_snapshots() {
        let ledger = MemoryLedger::new();
        ledger.put_product("prod-a", "Widget", 10, 500, 300);

        let items = reserve(&ledger, &[request("prod-a", 4)]).await.unwrap();

        assert_eq!(ledger.stock("prod-a"), 6);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, "Widget");
        assert_eq!(items[0].unit_price_cents, 500);
        assert_eq!(items[0].cost_price_cents, 300);
        assert_eq!(items[0].total_price_cents, 2000);
        assert_eq!(items[0].profit_cents, 800);
    }

    #[tokio::test]
    async fn test_reserve_all_or_nothing() {
        let ledger = MemoryLedger::new();
        ledger.put_product("prod-a", "Widget", 10, 500, 300);
        ledger.put_product("prod-b", "Gadget", 1, 900, 700);

        let err = reserve(&ledger, &[request("prod-a", 4), request("prod-b", 9)])
            .await
            .unwrap_err();

        match err {
            EngineError::InsufficientStock {
                product_id,
                available,
                requested,
            } => {
                assert_eq!(product_id, "prod-b");
                assert_eq!(available, 1);
                assert_eq!(requested, 9);
            }
            other => panic!("unexpected error: {other}"),
        }

        // The first item's decrement was rolled back.
        assert_eq!(ledger.stock("prod-a"), 10);
        assert_eq!(ledger.stock("prod-b"), 1);
    }

    #[tokio::test]
    async fn test_reserve_unknown_product() {
        let ledger = MemoryLedger::new();
        ledger.put_product("prod-a", "Widget", 10, 500, 300);

        let err = reserve(&ledger, &[request("prod-a", 2), request("ghost", 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::ProductNotFound(id) if id == "ghost"));
        assert_eq!(ledger.stock("prod-a"), 10);
    }

    #[tokio::test]
    async fn test_reserve_duplicate_lines_roll_back_together() {
        let ledger = MemoryLedger::new();
        ledger.put_product("prod-a", "Widget", 10, 500, 300);

        // 7 + 7 exceeds the available 10; the first decrement succeeds,
        // the second fails, and the rollback restores the first.
        let err = reserve(&ledger, &[request("prod-a", 7), request("prod-a", 7)])
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::InsufficientStock { .. }));
        assert_eq!(ledger.stock("prod-a"), 10);
    }

    #[tokio::test]
    async fn test_release_restores_stock() {
        let ledger = MemoryLedger::new();
        ledger.put_product("prod-a", "Widget", 10, 500, 300);

        let items = reserve(&ledger, &[request("prod-a", 4)]).await.unwrap();
        assert_eq!(ledger.stock("prod-a"), 6);

        release(&ledger, &items).await.unwrap();
        assert_eq!(ledger.stock("prod-a"), 10);
    }

    #[tokio::test]
    async fn test_release_missing_product_is_noop() {
        let ledger = MemoryLedger::new();
        ledger.put_product("prod-a", "Widget", 10, 500, 300);

        let items = reserve(&ledger, &[request("prod-a", 4)]).await.unwrap();
        ledger.remove_product("prod-a");

        // The product vanished after the sale; release logs and carries on.
        release(&ledger, &items).await.unwrap();
    }

    #[tokio::test]
    async fn test_reapply_uses_existing_snapshots() {
        let ledger = MemoryLedger::new();
        ledger.put_product("prod-a", "Widget", 10, 500, 300);

        let items = reserve(&ledger, &[request("prod-a", 4)]).await.unwrap();
        release(&ledger, &items).await.unwrap();

        // Price changes between release and reapply must not leak into the
        // already-written snapshots.
        ledger.set_price("prod-a", 999);
        reapply(&ledger, &items).await.unwrap();

        assert_eq!(ledger.stock("prod-a"), 6);
        assert_eq!(items[0].unit_price_cents, 500);
    }
}
