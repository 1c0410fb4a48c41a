//! # Product Repository
//!
//! Database operations for the product stock ledger.
//!
//! ## Conditional Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read-check-write (races between concurrent sales)          │
//! │     SELECT quantity FROM products WHERE id = ?                         │
//! │     -- another request decrements here --                              │
//! │     UPDATE products SET quantity = 7 WHERE id = ?                      │
//! │                                                                         │
//! │  ✅ CORRECT: conditional delta update                                  │
//! │     UPDATE products                                                    │
//! │     SET quantity = quantity + :delta                                   │
//! │     WHERE id = :id AND quantity + :delta >= 0                          │
//! │     RETURNING ...                                                      │
//! │                                                                         │
//! │  The UPDATE itself is the authority: it matches no row when the       │
//! │  quantity on record at write time is insufficient, so two concurrent  │
//! │  reservations can never both take the same units. SQLite serializes   │
//! │  the writes; the condition decides.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vendra_core::Product;
use vendra_engine::{EngineError, EngineResult, ProductLedger};

/// Repository for product ledger operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// // Reserve 4 units (fails at write time if fewer than 4 remain)
/// let product = repo.adjust_quantity("uuid-here", -4).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, sku, name, quantity, price_cents, cost_price_cents,
                   created_at, updated_at
            FROM products
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, quantity,
                price_cents, cost_price_cents,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.price_cents)
        .bind(product.cost_price_cents)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Atomically adjusts product stock by `delta` (negative for
    /// reservation, positive for release) and returns the updated row.
    ///
    /// The UPDATE carries the non-negativity condition, so an oversell is
    /// rejected by the write itself - never by an earlier read. When the
    /// update matches no row, a follow-up read distinguishes a missing
    /// product from insufficient stock.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Updated product (post-adjustment quantity)
    /// * `Err(DbError::InsufficientStock)` - Decrement would go below zero
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn adjust_quantity(&self, id: &str, delta: i64) -> DbResult<Product> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET quantity = quantity + ?1,
                updated_at = ?2
            WHERE id = ?3 AND quantity + ?1 >= 0
            RETURNING id, sku, name, quantity, price_cents, cost_price_cents,
                      created_at, updated_at
            "#,
        )
        .bind(delta)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(product) = updated {
            return Ok(product);
        }

        // The condition rejected the write: missing row or too little stock.
        let available: Option<i64> =
            sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match available {
            Some(available) => Err(DbError::InsufficientStock {
                product_id: id.to_string(),
                available,
                requested: -delta,
            }),
            None => Err(DbError::not_found("Product", id)),
        }
    }

    /// Counts products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// ProductLedger Port
// =============================================================================

/// The engine's Product Ledger, backed by the `products` table.
#[async_trait]
impl ProductLedger for ProductRepository {
    async fn get_product(&self, id: &str) -> EngineResult<Option<Product>> {
        self.get_by_id(id).await.map_err(EngineError::backend)
    }

    async fn adjust_quantity(&self, id: &str, delta: i64) -> EngineResult<Product> {
        ProductRepository::adjust_quantity(self, id, delta)
            .await
            .map_err(|err| match err {
                DbError::NotFound { .. } => EngineError::ProductNotFound(id.to_string()),
                DbError::InsufficientStock {
                    product_id,
                    available,
                    requested,
                } => EngineError::InsufficientStock {
                    product_id,
                    available,
                    requested,
                },
                other => EngineError::backend(other),
            })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn product(quantity: i64, price_cents: i64, cost_price_cents: i64) -> Product {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        Product {
            sku: format!("SKU-{}", &id[..8]),
            id,
            name: "Test Product".to_string(),
            quantity,
            price_cents,
            cost_price_cents,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let p = product(10, 500, 300);
        repo.insert(&p).await.unwrap();

        let loaded = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(loaded.sku, p.sku);
        assert_eq!(loaded.quantity, 10);
        assert_eq!(loaded.price_cents, 500);
        assert_eq!(loaded.cost_price_cents, 300);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = test_db().await;
        let repo = db.products();

        let p = product(10, 500, 300);
        repo.insert(&p).await.unwrap();

        let mut clash = product(5, 100, 50);
        clash.sku = p.sku.clone();
        let err = repo.insert(&clash).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_adjust_quantity_decrement_and_increment() {
        let db = test_db().await;
        let repo = db.products();

        let p = product(10, 500, 300);
        repo.insert(&p).await.unwrap();

        let after = repo.adjust_quantity(&p.id, -4).await.unwrap();
        assert_eq!(after.quantity, 6);
        // Price/cost ride along for snapshotting.
        assert_eq!(after.price_cents, 500);
        assert_eq!(after.cost_price_cents, 300);

        let after = repo.adjust_quantity(&p.id, 4).await.unwrap();
        assert_eq!(after.quantity, 10);
    }

    #[tokio::test]
    async fn test_adjust_quantity_to_exactly_zero() {
        let db = test_db().await;
        let repo = db.products();

        let p = product(4, 500, 300);
        repo.insert(&p).await.unwrap();

        let after = repo.adjust_quantity(&p.id, -4).await.unwrap();
        assert_eq!(after.quantity, 0);
    }

    #[tokio::test]
    async fn test_adjust_quantity_rejects_oversell() {
        let db = test_db().await;
        let repo = db.products();

        let p = product(3, 500, 300);
        repo.insert(&p).await.unwrap();

        let err = repo.adjust_quantity(&p.id, -5).await.unwrap_err();
        match err {
            DbError::InsufficientStock {
                product_id,
                available,
                requested,
            } => {
                assert_eq!(product_id, p.id);
                assert_eq!(available, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("unexpected error: {other}"),
        }

        // Quantity untouched by the rejected write.
        let loaded = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(loaded.quantity, 3);
    }

    #[tokio::test]
    async fn test_adjust_quantity_missing_product() {
        let db = test_db().await;
        let repo = db.products();

        let err = repo.adjust_quantity("ghost", -1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = repo.adjust_quantity("ghost", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
