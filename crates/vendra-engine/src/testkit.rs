//! In-memory port implementations for workflow tests.
//!
//! `MemoryLedger` and `MemorySaleStore` back the orchestrator tests without
//! a database; the store supports one-shot failure injection to exercise the
//! compensation paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use vendra_core::{Product, Sale};

use crate::error::{EngineError, EngineResult};
use crate::gate::{AuthorizationGate, SaleAction};
use crate::ledger::ProductLedger;
use crate::store::SaleStore;

// =============================================================================
// Memory Ledger
// =============================================================================

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryLedger {
    products: Arc<Mutex<HashMap<String, Product>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_product(&self, id: &str, name: &str, quantity: i64, price_cents: i64, cost_price_cents: i64) {
        let now = Utc::now();
        let product = Product {
            id: id.to_string(),
            sku: format!("SKU-{id}"),
            name: name.to_string(),
            quantity,
            price_cents,
            cost_price_cents,
            created_at: now,
            updated_at: now,
        };
        self.products
            .lock()
            .expect("ledger mutex poisoned")
            .insert(id.to_string(), product);
    }

    pub fn remove_product(&self, id: &str) {
        self.products
            .lock()
            .expect("ledger mutex poisoned")
            .remove(id);
    }

    pub fn set_price(&self, id: &str, price_cents: i64) {
        let mut products = self.products.lock().expect("ledger mutex poisoned");
        products
            .get_mut(id)
            .expect("unknown product in set_price")
            .price_cents = price_cents;
    }

    pub fn stock(&self, id: &str) -> i64 {
        self.products
            .lock()
            .expect("ledger mutex poisoned")
            .get(id)
            .expect("unknown product in stock")
            .quantity
    }
}

#[async_trait]
impl ProductLedger for MemoryLedger {
    async fn get_product(&self, id: &str) -> EngineResult<Option<Product>> {
        Ok(self
            .products
            .lock()
            .expect("ledger mutex poisoned")
            .get(id)
            .cloned())
    }

    async fn adjust_quantity(&self, id: &str, delta: i64) -> EngineResult<Product> {
        let mut products = self.products.lock().expect("ledger mutex poisoned");

        let product = products
            .get_mut(id)
            .ok_or_else(|| EngineError::ProductNotFound(id.to_string()))?;

        let next = product.quantity + delta;
        if next < 0 {
            return Err(EngineError::InsufficientStock {
                product_id: id.to_string(),
                available: product.quantity,
                requested: -delta,
            });
        }

        product.quantity = next;
        product.updated_at = Utc::now();
        Ok(product.clone())
    }
}

// =============================================================================
// Memory Sale Store
// =============================================================================

#[derive(Debug, Clone, Default)]
pub(crate) struct MemorySaleStore {
    sales: Arc<Mutex<HashMap<String, Sale>>>,
    fail_next_insert: Arc<AtomicBool>,
    fail_next_update: Arc<AtomicBool>,
    fail_next_delete: Arc<AtomicBool>,
}

impl MemorySaleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_delete(&self) {
        self.fail_next_delete.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.sales.lock().expect("store mutex poisoned").len()
    }

    fn trip(&self, flag: &AtomicBool, what: &str) -> EngineResult<()> {
        if flag.swap(false, Ordering::SeqCst) {
            return Err(EngineError::backend(format!("injected {what} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl SaleStore for MemorySaleStore {
    async fn insert_sale(&self, sale: &Sale) -> EngineResult<()> {
        self.trip(&self.fail_next_insert, "insert")?;

        self.sales
            .lock()
            .expect("store mutex poisoned")
            .insert(sale.id.clone(), sale.clone());
        Ok(())
    }

    async fn get_sale(&self, id: &str) -> EngineResult<Option<Sale>> {
        Ok(self
            .sales
            .lock()
            .expect("store mutex poisoned")
            .get(id)
            .cloned())
    }

    async fn update_sale(&self, sale: &Sale) -> EngineResult<()> {
        self.trip(&self.fail_next_update, "update")?;

        let mut sales = self.sales.lock().expect("store mutex poisoned");
        if !sales.contains_key(&sale.id) {
            return Err(EngineError::SaleNotFound(sale.id.clone()));
        }
        sales.insert(sale.id.clone(), sale.clone());
        Ok(())
    }

    async fn delete_sale(&self, id: &str) -> EngineResult<()> {
        self.trip(&self.fail_next_delete, "delete")?;

        self.sales
            .lock()
            .expect("store mutex poisoned")
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| EngineError::SaleNotFound(id.to_string()))
    }

    async fn list_sales(&self, limit: u32) -> EngineResult<Vec<Sale>> {
        let sales = self.sales.lock().expect("store mutex poisoned");
        let mut all: Vec<Sale> = sales.values().cloned().collect();
        all.sort_by(|a, b| b.sale_date.cmp(&a.sale_date));
        all.truncate(limit as usize);
        Ok(all)
    }
}

// =============================================================================
// Gates
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DenyAll;

#[async_trait]
impl AuthorizationGate for DenyAll {
    async fn allows(&self, _actor: &str, _action: SaleAction, _resource: &str) -> bool {
        false
    }
}
