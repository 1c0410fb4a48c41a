//! # Sale Transaction Orchestrator
//!
//! Implements the create/update/delete/refund workflows, composing the
//! line-item calculator and the stock reconciliation step, enforcing
//! invariants and authorization.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │   DRAFT (transient, never persisted)                                   │
//! │     │  create: reserve stock, compute totals, persist                  │
//! │     ▼                                                                   │
//! │   COMPLETED ◄──┐                                                       │
//! │     │     │    │ update: release old items, reserve new, re-persist    │
//! │     │     └────┘                                                       │
//! │     │                                                                   │
//! │     ├── refund: release stock, mark refunded ──► REFUNDED              │
//! │     │                                            (record retained)     │
//! │     │                                                                   │
//! │     └── delete: release stock, remove record ──► DELETED               │
//! │                                                  (terminal, gone)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Compensation
//! No transaction spans a sale write and a product write. Whenever a later
//! step fails after stock has moved, the orchestrator undoes the stock
//! movement before surfacing the error, so the system lands in a
//! well-defined pre- or post-state - never partially applied. A failed
//! undo is the fatal [`EngineError::Compensation`] case.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use vendra_core::pricing::sale_totals;
use vendra_core::validation::{validate_new_sale, validate_patch};
use vendra_core::{NewSale, PaymentStatus, Sale, SalePatch, SaleStatus};

use crate::error::{EngineError, EngineResult};
use crate::gate::{AuthorizationGate, SaleAction, SALES_RESOURCE};
use crate::ledger::ProductLedger;
use crate::reconcile;
use crate::store::SaleStore;

// =============================================================================
// Sale Engine
// =============================================================================

/// The sale transaction and inventory consistency engine.
///
/// Generic over its three ports so request layers can wire in any storage
/// backend and permission service:
///
/// ```rust,ignore
/// let engine = SaleEngine::new(db.products(), db.sales(), permission_gate);
/// let sale = engine.create_sale("user-7", draft).await?;
/// ```
pub struct SaleEngine<L, S, G> {
    ledger: L,
    sales: S,
    gate: G,
}

impl<L, S, G> SaleEngine<L, S, G>
where
    L: ProductLedger,
    S: SaleStore,
    G: AuthorizationGate,
{
    /// Creates an engine over the given ports.
    pub fn new(ledger: L, sales: S, gate: G) -> Self {
        SaleEngine { ledger, sales, gate }
    }

    // -------------------------------------------------------------------------
    // Create
    // -------------------------------------------------------------------------

    /// Creates a sale: reserves stock for every requested line, computes
    /// totals, and persists the record as `completed`/`paid` (point-of-sale
    /// model - payment is settled at creation).
    ///
    /// ## Failure Behavior
    /// - Validation and authorization failures have no side effect.
    /// - A reservation failure leaves no partial decrements (all-or-nothing).
    /// - A persist failure releases the reservation before returning - stock
    ///   is never left decremented with no sale recorded.
    pub async fn create_sale(&self, actor: &str, draft: NewSale) -> EngineResult<Sale> {
        debug!(
            actor,
            store_id = %draft.store_id,
            items = draft.items.len(),
            "create_sale"
        );

        self.authorize(actor, SaleAction::Create).await?;
        validate_new_sale(&draft)?;

        let items = reconcile::reserve(&self.ledger, &draft.items).await?;

        let totals = sale_totals(&items, draft.discount_cents, draft.tax_cents);
        let now = Utc::now();

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_number: generate_sale_number(now),
            store_id: draft.store_id,
            items,
            subtotal_cents: totals.subtotal_cents,
            discount_cents: draft.discount_cents,
            tax_cents: draft.tax_cents,
            total_amount_cents: totals.total_amount_cents,
            payment_method: draft.payment_method,
            payment_status: PaymentStatus::Paid,
            status: SaleStatus::Completed,
            notes: draft.notes,
            sale_date: now,
            created_at: now,
            updated_at: now,
        };

        if let Err(store_err) = self.sales.insert_sale(&sale).await {
            if let Err(undo_err) = reconcile::release(&self.ledger, &sale.items).await {
                return Err(compensation_failure(
                    "stock release after failed create",
                    undo_err,
                ));
            }
            return Err(store_err);
        }

        info!(
            sale_id = %sale.id,
            sale_number = %sale.sale_number,
            total = %sale.total_amount(),
            items = sale.items.len(),
            "sale created"
        );

        Ok(sale)
    }

    // -------------------------------------------------------------------------
    // Update
    // -------------------------------------------------------------------------

    /// Updates a sale in place, retaining its identity and `sale_number`.
    ///
    /// Only fields present in the patch change. When `items` is present the
    /// stock effect is re-reconciled: the old items are released **before**
    /// the new ones are reserved. That ordering allows swapping to a
    /// product/quantity combination that would be rejected if both
    /// reservations were held simultaneously, at the cost of a brief window
    /// where no stock is reserved for this sale.
    ///
    /// ## Failure Behavior
    /// - A failed reservation of the new items re-reserves the original
    ///   items (restoring the pre-update state) before surfacing the error.
    /// - A failed persist after an item swap releases the new items and
    ///   re-reserves the originals.
    pub async fn update_sale(
        &self,
        actor: &str,
        sale_id: &str,
        patch: SalePatch,
    ) -> EngineResult<Sale> {
        debug!(actor, sale_id, "update_sale");

        self.authorize(actor, SaleAction::Update).await?;
        validate_patch(&patch)?;

        let mut sale = self
            .sales
            .get_sale(sale_id)
            .await?
            .ok_or_else(|| EngineError::SaleNotFound(sale_id.to_string()))?;

        let original_items = sale.items.clone();
        let mut items_swapped = false;

        if let Some(new_items) = &patch.items {
            reconcile::release(&self.ledger, &original_items)
                .await
                .map_err(|err| compensation_failure("stock release during update", err))?;

            match reconcile::reserve(&self.ledger, new_items).await {
                Ok(reserved) => {
                    sale.items = reserved;
                    items_swapped = true;
                }
                Err(reserve_err) => {
                    if let Err(undo_err) =
                        reconcile::reapply(&self.ledger, &original_items).await
                    {
                        return Err(compensation_failure(
                            "restore original reservation",
                            undo_err,
                        ));
                    }
                    return Err(reserve_err);
                }
            }
        }

        // Partial update semantics: omitted fields stay as they are.
        if let Some(store_id) = patch.store_id {
            sale.store_id = store_id;
        }
        if let Some(discount_cents) = patch.discount_cents {
            sale.discount_cents = discount_cents;
        }
        if let Some(tax_cents) = patch.tax_cents {
            sale.tax_cents = tax_cents;
        }
        if let Some(payment_method) = patch.payment_method {
            sale.payment_method = payment_method;
        }
        if let Some(payment_status) = patch.payment_status {
            sale.payment_status = payment_status;
        }
        if let Some(notes) = patch.notes {
            sale.notes = Some(notes);
        }

        // Totals are never taken from the caller.
        let totals = sale_totals(&sale.items, sale.discount_cents, sale.tax_cents);
        sale.subtotal_cents = totals.subtotal_cents;
        sale.total_amount_cents = totals.total_amount_cents;
        sale.updated_at = Utc::now();

        if let Err(store_err) = self.sales.update_sale(&sale).await {
            if items_swapped {
                let mut undo = reconcile::release(&self.ledger, &sale.items).await;
                if undo.is_ok() {
                    undo = reconcile::reapply(&self.ledger, &original_items).await;
                }
                if let Err(undo_err) = undo {
                    return Err(compensation_failure(
                        "revert item swap after failed update",
                        undo_err,
                    ));
                }
            }
            return Err(store_err);
        }

        info!(
            sale_id = %sale.id,
            total = %sale.total_amount(),
            items_swapped,
            "sale updated"
        );

        Ok(sale)
    }

    // -------------------------------------------------------------------------
    // Delete
    // -------------------------------------------------------------------------

    /// Hard-deletes a sale, reversing its stock effect.
    ///
    /// Stock is restored unconditionally, regardless of the sale's current
    /// status; the record is then removed permanently (no tombstone).
    pub async fn delete_sale(&self, actor: &str, sale_id: &str) -> EngineResult<()> {
        debug!(actor, sale_id, "delete_sale");

        self.authorize(actor, SaleAction::Delete).await?;

        let sale = self
            .sales
            .get_sale(sale_id)
            .await?
            .ok_or_else(|| EngineError::SaleNotFound(sale_id.to_string()))?;

        reconcile::release(&self.ledger, &sale.items)
            .await
            .map_err(|err| compensation_failure("stock release for delete", err))?;

        if let Err(store_err) = self.sales.delete_sale(&sale.id).await {
            if let Err(undo_err) = reconcile::reapply(&self.ledger, &sale.items).await {
                return Err(compensation_failure(
                    "re-reserve after failed delete",
                    undo_err,
                ));
            }
            return Err(store_err);
        }

        info!(
            sale_id = %sale.id,
            sale_number = %sale.sale_number,
            "sale deleted, stock restored"
        );

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Refund
    // -------------------------------------------------------------------------

    /// Refunds a sale: restores stock and marks the record
    /// `refunded`/`refunded`. Unlike delete, the record is retained.
    ///
    /// Not idempotent: refunding an already-refunded sale is an
    /// [`EngineError::AlreadyRefunded`] error and does not double-restore
    /// stock.
    pub async fn refund_sale(&self, actor: &str, sale_id: &str) -> EngineResult<Sale> {
        debug!(actor, sale_id, "refund_sale");

        self.authorize(actor, SaleAction::Refund).await?;

        let mut sale = self
            .sales
            .get_sale(sale_id)
            .await?
            .ok_or_else(|| EngineError::SaleNotFound(sale_id.to_string()))?;

        if sale.status == SaleStatus::Refunded {
            return Err(EngineError::AlreadyRefunded(sale.id));
        }

        reconcile::release(&self.ledger, &sale.items)
            .await
            .map_err(|err| compensation_failure("stock release for refund", err))?;

        sale.status = SaleStatus::Refunded;
        sale.payment_status = PaymentStatus::Refunded;
        sale.updated_at = Utc::now();

        if let Err(store_err) = self.sales.update_sale(&sale).await {
            if let Err(undo_err) = reconcile::reapply(&self.ledger, &sale.items).await {
                return Err(compensation_failure(
                    "re-reserve after failed refund",
                    undo_err,
                ));
            }
            return Err(store_err);
        }

        info!(
            sale_id = %sale.id,
            sale_number = %sale.sale_number,
            "sale refunded, stock restored"
        );

        Ok(sale)
    }

    // -------------------------------------------------------------------------
    // Read-Only Access
    // -------------------------------------------------------------------------

    /// Loads one sale. Read-only; not gated.
    pub async fn get_sale(&self, sale_id: &str) -> EngineResult<Option<Sale>> {
        self.sales.get_sale(sale_id).await
    }

    /// Enumerates persisted sales, newest first, for export/reporting
    /// collaborators. Read-only; never mutates.
    pub async fn list_sales(&self, limit: u32) -> EngineResult<Vec<Sale>> {
        self.sales.list_sales(limit).await
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Queries the gate; a deny short-circuits with no side effect.
    async fn authorize(&self, actor: &str, action: SaleAction) -> EngineResult<()> {
        if self.gate.allows(actor, action, SALES_RESOURCE).await {
            return Ok(());
        }

        debug!(actor, %action, "authorization denied");
        Err(EngineError::Forbidden {
            actor: actor.to_string(),
            action,
        })
    }
}

// =============================================================================
// Sale Numbers
// =============================================================================

/// Generates a human-readable sale number: `YYYYMMDD-HHMMSS-xxxxxx`.
///
/// The timestamp keeps numbers operator-sortable; the uuid-derived suffix
/// makes concurrent creation in the same second collision-resistant. The
/// store's unique constraint on `sale_number` backstops the remaining
/// astronomically-unlikely case.
fn generate_sale_number(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", now.format("%Y%m%d-%H%M%S"), &suffix[..6])
}

/// Logs and wraps a failed compensating action. This is the alerting
/// condition: stock may be inconsistent and needs manual reconciliation.
fn compensation_failure(operation: &'static str, source: EngineError) -> EngineError {
    error!(
        operation,
        error = %source,
        "compensation failed; manual stock reconciliation required"
    );
    EngineError::Compensation {
        operation,
        source: Box::new(source),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
