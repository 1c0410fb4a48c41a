//! # Sale Repository
//!
//! Database operations for sale records and their embedded line items.
//!
//! ## Persistence Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sale Persistence                                     │
//! │                                                                         │
//! │  Sale (domain)                        sales (row)                       │
//! │  ├── id, sale_number, store_id  ────► one row                          │
//! │  ├── totals, status, payment    ────► columns                          │
//! │  └── items: Vec<LineItem>       ────► sale_items rows, ordered by      │
//! │                                       `position`                        │
//! │                                                                         │
//! │  Every mutation (insert/update/delete) touches the sale row and its    │
//! │  item rows inside ONE transaction: a sale is never persisted with      │
//! │  half its items.                                                       │
//! │                                                                         │
//! │  Line items are snapshots: product_name / unit_price / cost_price      │
//! │  are frozen copies taken at reservation time, kept for historical      │
//! │  accuracy even if the product changes or disappears later.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vendra_core::{LineItem, PaymentMethod, PaymentStatus, Sale, SaleStatus};
use vendra_engine::{EngineError, EngineResult, SaleStore};

/// Repository for sale record operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

// =============================================================================
// Row Types
// =============================================================================

/// The `sales` table row, without its items.
#[derive(Debug, Clone, sqlx::FromRow)]
struct SaleRow {
    id: String,
    sale_number: String,
    store_id: String,
    status: SaleStatus,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    subtotal_cents: i64,
    discount_cents: i64,
    tax_cents: i64,
    total_amount_cents: i64,
    notes: Option<String>,
    sale_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_sale(self, items: Vec<LineItem>) -> Sale {
        Sale {
            id: self.id,
            sale_number: self.sale_number,
            store_id: self.store_id,
            items,
            subtotal_cents: self.subtotal_cents,
            discount_cents: self.discount_cents,
            tax_cents: self.tax_cents,
            total_amount_cents: self.total_amount_cents,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            status: self.status,
            notes: self.notes,
            sale_date: self.sale_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// The `sale_items` snapshot columns.
#[derive(Debug, Clone, sqlx::FromRow)]
struct LineItemRow {
    product_id: String,
    product_name: String,
    quantity: i64,
    unit_price_cents: i64,
    total_price_cents: i64,
    cost_price_cents: i64,
    profit_cents: i64,
}

impl From<LineItemRow> for LineItem {
    fn from(row: LineItemRow) -> Self {
        LineItem {
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
            total_price_cents: row.total_price_cents,
            cost_price_cents: row.cost_price_cents,
            profit_cents: row.profit_cents,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Persists a new sale with its embedded items in one transaction.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, sale_number = %sale.sale_number, "Inserting sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, sale_number, store_id, status,
                payment_method, payment_status,
                subtotal_cents, discount_cents, tax_cents, total_amount_cents,
                notes, sale_date, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.sale_number)
        .bind(&sale.store_id)
        .bind(sale.status)
        .bind(sale.payment_method)
        .bind(sale.payment_status)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.tax_cents)
        .bind(sale.total_amount_cents)
        .bind(&sale.notes)
        .bind(sale.sale_date)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        insert_items(&mut tx, &sale.id, &sale.items).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Gets a sale with its items by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, sale_number, store_id, status,
                   payment_method, payment_status,
                   subtotal_cents, discount_cents, tax_cents, total_amount_cents,
                   notes, sale_date, created_at, updated_at
            FROM sales
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.get_items(id).await?;
        Ok(Some(row.into_sale(items)))
    }

    /// Replaces a sale's fields and items, keeping identity and sale number.
    ///
    /// `sale_number`, `sale_date` and `created_at` are immutable and never
    /// rewritten.
    pub async fn update(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, "Updating sale");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                store_id = ?,
                status = ?,
                payment_method = ?,
                payment_status = ?,
                subtotal_cents = ?,
                discount_cents = ?,
                tax_cents = ?,
                total_amount_cents = ?,
                notes = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&sale.store_id)
        .bind(sale.status)
        .bind(sale.payment_method)
        .bind(sale.payment_status)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.tax_cents)
        .bind(sale.total_amount_cents)
        .bind(&sale.notes)
        .bind(sale.updated_at)
        .bind(&sale.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", &sale.id));
        }

        // Items are embedded: replace the whole set with the sale row.
        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?")
            .bind(&sale.id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, &sale.id, &sale.items).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Hard-deletes a sale and its items. No tombstone.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM sales WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Lists sales newest first, items included.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, sale_number, store_id, status,
                   payment_method, payment_status,
                   subtotal_cents, discount_cents, tax_cents, total_amount_cents,
                   notes, sale_date, created_at, updated_at
            FROM sales
            ORDER BY sale_date DESC, created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.get_items(&row.id).await?;
            sales.push(row.into_sale(items));
        }

        Ok(sales)
    }

    /// Gets the item snapshots for one sale, in their original order.
    async fn get_items(&self, sale_id: &str) -> DbResult<Vec<LineItem>> {
        let rows = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT product_id, product_name, quantity,
                   unit_price_cents, total_price_cents,
                   cost_price_cents, profit_cents
            FROM sale_items
            WHERE sale_id = ?
            ORDER BY position
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LineItem::from).collect())
    }
}

/// Inserts item snapshot rows for a sale inside the caller's transaction.
async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    sale_id: &str,
    items: &[LineItem],
) -> DbResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, product_id, product_name, quantity,
                unit_price_cents, total_price_cents,
                cost_price_cents, profit_cents, position
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(sale_id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.total_price_cents)
        .bind(item.cost_price_cents)
        .bind(item.profit_cents)
        .bind(position as i64)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

// =============================================================================
// SaleStore Port
// =============================================================================

/// The engine's Sale Store, backed by the `sales`/`sale_items` tables.
#[async_trait]
impl SaleStore for SaleRepository {
    async fn insert_sale(&self, sale: &Sale) -> EngineResult<()> {
        self.insert(sale).await.map_err(EngineError::backend)
    }

    async fn get_sale(&self, id: &str) -> EngineResult<Option<Sale>> {
        self.get_by_id(id).await.map_err(EngineError::backend)
    }

    async fn update_sale(&self, sale: &Sale) -> EngineResult<()> {
        self.update(sale).await.map_err(|err| match err {
            DbError::NotFound { .. } => EngineError::SaleNotFound(sale.id.clone()),
            other => EngineError::backend(other),
        })
    }

    async fn delete_sale(&self, id: &str) -> EngineResult<()> {
        self.delete(id).await.map_err(|err| match err {
            DbError::NotFound { .. } => EngineError::SaleNotFound(id.to_string()),
            other => EngineError::backend(other),
        })
    }

    async fn list_sales(&self, limit: u32) -> EngineResult<Vec<Sale>> {
        self.list_recent(limit).await.map_err(EngineError::backend)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use vendra_core::pricing::price_line;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn item(product_id: &str, quantity: i64, unit_price_cents: i64, cost_price_cents: i64) -> LineItem {
        let pricing = price_line(quantity, unit_price_cents, cost_price_cents);
        LineItem {
            product_id: product_id.to_string(),
            product_name: format!("Product {product_id}"),
            quantity,
            unit_price_cents,
            total_price_cents: pricing.total_price_cents,
            cost_price_cents,
            profit_cents: pricing.profit_cents,
        }
    }

    fn sale(id: &str, items: Vec<LineItem>) -> Sale {
        let now = Utc::now();
        let subtotal: i64 = items.iter().map(|i| i.total_price_cents).sum();
        Sale {
            id: id.to_string(),
            sale_number: format!("20260807-120000-{id}"),
            store_id: "store-1".to_string(),
            items,
            subtotal_cents: subtotal,
            discount_cents: 0,
            tax_cents: 0,
            total_amount_cents: subtotal,
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Paid,
            status: SaleStatus::Completed,
            notes: None,
            sale_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let db = test_db().await;
        let repo = db.sales();

        let s = sale(
            "sale-1",
            vec![item("p1", 4, 500, 300), item("p2", 1, 900, 700)],
        );
        repo.insert(&s).await.unwrap();

        let loaded = repo.get_by_id("sale-1").await.unwrap().unwrap();
        assert_eq!(loaded.sale_number, s.sale_number);
        assert_eq!(loaded.status, SaleStatus::Completed);
        assert_eq!(loaded.payment_status, PaymentStatus::Paid);
        assert_eq!(loaded.subtotal_cents, 2900);

        // Item order and snapshots survive the round trip.
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.items[0].product_id, "p1");
        assert_eq!(loaded.items[0].profit_cents, 800);
        assert_eq!(loaded.items[1].product_id, "p2");
    }

    #[tokio::test]
    async fn test_get_missing_sale() {
        let db = test_db().await;
        assert!(db.sales().get_by_id("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_items_and_fields() {
        let db = test_db().await;
        let repo = db.sales();

        let mut s = sale("sale-1", vec![item("p1", 4, 500, 300)]);
        repo.insert(&s).await.unwrap();

        s.items = vec![item("p1", 2, 500, 300)];
        s.subtotal_cents = 1000;
        s.total_amount_cents = 1000;
        s.status = SaleStatus::Refunded;
        s.payment_status = PaymentStatus::Refunded;
        s.notes = Some("customer returned the goods".to_string());
        repo.update(&s).await.unwrap();

        let loaded = repo.get_by_id("sale-1").await.unwrap().unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].quantity, 2);
        assert_eq!(loaded.subtotal_cents, 1000);
        assert_eq!(loaded.status, SaleStatus::Refunded);
        assert_eq!(loaded.payment_status, PaymentStatus::Refunded);
        assert_eq!(loaded.notes.as_deref(), Some("customer returned the goods"));
        // Identity fields untouched.
        assert_eq!(loaded.sale_number, s.sale_number);
    }

    #[tokio::test]
    async fn test_update_missing_sale() {
        let db = test_db().await;
        let s = sale("ghost", vec![item("p1", 1, 100, 50)]);
        let err = db.sales().update(&s).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_sale_and_items() {
        let db = test_db().await;
        let repo = db.sales();

        let s = sale("sale-1", vec![item("p1", 4, 500, 300)]);
        repo.insert(&s).await.unwrap();

        repo.delete("sale-1").await.unwrap();
        assert!(repo.get_by_id("sale-1").await.unwrap().is_none());

        // Hard delete: no tombstone, second delete is NotFound.
        let err = repo.delete("sale-1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // Item rows went with the sale.
        let orphans: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sale_items WHERE sale_id = 'sale-1'")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_duplicate_sale_number_rejected() {
        let db = test_db().await;
        let repo = db.sales();

        let first = sale("sale-1", vec![item("p1", 1, 100, 50)]);
        repo.insert(&first).await.unwrap();

        let mut clash = sale("sale-2", vec![item("p1", 1, 100, 50)]);
        clash.sale_number = first.sale_number.clone();
        let err = repo.insert(&clash).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_recent_orders_and_limits() {
        let db = test_db().await;
        let repo = db.sales();

        for i in 0..3 {
            let mut s = sale(&format!("sale-{i}"), vec![item("p1", 1, 100, 50)]);
            s.sale_date = Utc::now() + chrono::Duration::seconds(i);
            repo.insert(&s).await.unwrap();
        }

        let sales = repo.list_recent(10).await.unwrap();
        assert_eq!(sales.len(), 3);
        assert_eq!(sales[0].id, "sale-2");
        assert_eq!(sales[2].id, "sale-0");

        let limited = repo.list_recent(2).await.unwrap();
        assert_eq!(limited.len(), 2);
    }
}
