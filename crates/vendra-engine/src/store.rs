//! # Sale Store Port
//!
//! The engine's view of persisted sale records. A `Sale` travels through this
//! port whole - line items embedded - because items are not independently
//! addressable.

use async_trait::async_trait;

use vendra_core::Sale;

use crate::error::EngineResult;

/// Port to the sale record store.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Persists a new sale with its embedded items.
    async fn insert_sale(&self, sale: &Sale) -> EngineResult<()>;

    /// Loads a sale by id. `Ok(None)` when it does not exist.
    async fn get_sale(&self, id: &str) -> EngineResult<Option<Sale>>;

    /// Replaces a persisted sale's fields and items, keeping its identity.
    ///
    /// Fails with [`crate::EngineError::SaleNotFound`] when the sale does
    /// not exist.
    async fn update_sale(&self, sale: &Sale) -> EngineResult<()>;

    /// Hard-deletes a sale and its items. No tombstone is left behind.
    ///
    /// Fails with [`crate::EngineError::SaleNotFound`] when the sale does
    /// not exist.
    async fn delete_sale(&self, id: &str) -> EngineResult<()>;

    /// Read-only enumeration of persisted sales, newest first.
    ///
    /// Consumed by export/reporting collaborators; never used to mutate.
    async fn list_sales(&self, limit: u32) -> EngineResult<Vec<Sale>>;
}
