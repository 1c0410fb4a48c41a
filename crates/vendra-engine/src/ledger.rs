//! # Product Ledger Port
//!
//! The engine's view of product stock. The ledger owns per-product quantity,
//! price and cost fields; the engine reads products and adjusts quantities,
//! nothing more.
//!
//! ## The Write Is the Authority
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Why adjust_quantity Carries the Check                   │
//! │                                                                         │
//! │  ❌ WRONG: check-then-write (races under concurrency)                  │
//! │     let p = ledger.get_product(id)?;                                   │
//! │     if p.quantity >= wanted { ledger.decrement(id, wanted)? }          │
//! │     // another request can consume the stock between read and write   │
//! │                                                                         │
//! │  ✅ CORRECT: conditional write                                         │
//! │     ledger.adjust_quantity(id, -wanted)                                │
//! │     // the write itself fails with InsufficientStock if the quantity  │
//! │     // on record AT WRITE TIME is too small                            │
//! │                                                                         │
//! │  Two concurrent reservations against the same product can never both  │
//! │  succeed past available stock.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use vendra_core::Product;

use crate::error::EngineResult;

/// Port to the product stock ledger.
///
/// Implementations must serialize quantity updates per product (e.g. an
/// atomic conditional decrement) rather than relying on optimistic
/// application-level locking across the whole request.
#[async_trait]
pub trait ProductLedger: Send + Sync {
    /// Reads a product by id. `Ok(None)` when it does not exist.
    async fn get_product(&self, id: &str) -> EngineResult<Option<Product>>;

    /// Atomically adjusts a product's quantity by `delta` (negative for
    /// reservation, positive for release) and returns the updated product.
    ///
    /// ## Contract
    /// - Fails with [`crate::EngineError::InsufficientStock`] when a negative
    ///   delta would take the quantity below zero, judged against the
    ///   quantity on record at write time.
    /// - Fails with [`crate::EngineError::ProductNotFound`] when the product
    ///   does not exist.
    /// - The returned product carries the name/price/cost used for line-item
    ///   snapshots.
    async fn adjust_quantity(&self, id: &str, delta: i64) -> EngineResult<Product>;
}
