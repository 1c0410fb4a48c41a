//! # Domain Types
//!
//! Core domain types for the sale transaction and inventory engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  product_id     │       │
//! │  │  sku (business) │   │  sale_number    │   │  product_name   │       │
//! │  │  quantity       │   │  status         │   │  unit_price     │       │
//! │  │  price_cents    │   │  totals         │   │  profit_cents   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   SaleStatus    │   │ PaymentMethod   │   │ PaymentStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Pending        │   │  Cash Card Upi  │   │  Pending Paid   │       │
//! │  │  Completed      │   │  BankTransfer   │   │  Partial Failed │       │
//! │  │  Cancelled      │   │  Credit         │   │  Refunded       │       │
//! │  │  Refunded       │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, sale_number) - human-readable, shown to operators
//!
//! ## Snapshot Pattern
//! A [`LineItem`] freezes `product_name`, `unit_price_cents` and
//! `cost_price_cents` at the moment the sale reserves stock. Later edits to
//! the Product never rewrite historical line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the stock ledger.
///
/// Products are owned by the (out-of-scope) catalog CRUD; this engine only
/// reads them and adjusts `quantity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown to operators and snapshotted onto line items.
    pub name: String,

    /// On-hand unit count. Never negative after a committed operation.
    pub quantity: i64,

    /// Selling price in cents.
    pub price_cents: i64,

    /// Most recent acquisition cost in cents.
    pub cost_price_cents: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the acquisition cost as a Money type.
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
///
/// Closed variant set: unrecognized values are rejected at the
/// deserialization boundary instead of silently defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Accepted but not yet settled (not produced by this engine's
    /// point-of-sale creation path, which settles immediately).
    Pending,
    /// Sale has been paid and finalized.
    Completed,
    /// Sale was cancelled.
    Cancelled,
    /// Sale was refunded; stock restored, record retained.
    Refunded,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
    Credit,
}

// =============================================================================
// Payment Status
// =============================================================================

/// Settlement state of the payment attached to a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Partial,
    Failed,
    Refunded,
}

// =============================================================================
// Line Item
// =============================================================================

/// A line item embedded in a sale.
///
/// Uses the snapshot pattern to freeze product data at time of sale:
/// `product_name`, `unit_price_cents` and `cost_price_cents` are copies, not
/// live references. The `product_id` reference is weak - deleting the product
/// later does not cascade into historical sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product reference (UUID).
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Quantity sold. Always positive.
    pub quantity: i64,
    /// Unit selling price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Line total: unit_price × quantity.
    pub total_price_cents: i64,
    /// Acquisition cost in cents at time of sale (frozen).
    pub cost_price_cents: i64,
    /// Line profit: (unit_price − cost_price) × quantity.
    pub profit_cents: i64,
}

impl LineItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }

    /// Returns the line profit as Money.
    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale transaction with its embedded line items.
///
/// ## Invariants
/// - `total_amount_cents == subtotal_cents - discount_cents + tax_cents`,
///   recomputed on every mutation and never accepted from a caller.
/// - `subtotal_cents == Σ items[i].total_price_cents`.
/// - `sale_number` is generated at creation and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Human-readable transaction number, generated at creation.
    pub sale_number: String,
    /// Store the sale was rung up in (weak reference).
    pub store_id: String,
    /// Embedded line items; not independently addressable.
    pub items: Vec<LineItem>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    /// May be negative when discount exceeds subtotal + tax; surfaced as-is.
    pub total_amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: SaleStatus,
    pub notes: Option<String>,
    /// When the sale happened (set at creation).
    pub sale_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    /// Returns the total profit across all line items as Money.
    pub fn total_profit(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, item| acc + item.profit())
    }
}

// =============================================================================
// Request Shapes
// =============================================================================
// The caller-facing mutation inputs. Prices never appear here: every price
// and cost on a line item is snapshotted from the ledger at reservation time.

/// One requested sale line: which product, how many units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Input for creating a sale.
///
/// `discount_cents`/`tax_cents` default to 0 when the caller omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub store_id: String,
    pub items: Vec<LineItemRequest>,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub tax_cents: i64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update for a sale: each field independently optional, applied
/// field-by-field. Omitted fields are left unchanged.
///
/// Replaces wholesale object replacement - the caller states exactly which
/// fields it intends to touch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalePatch {
    /// Full replacement item set; triggers stock re-reconciliation.
    #[serde(default)]
    pub items: Option<Vec<LineItemRequest>>,
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub discount_cents: Option<i64>,
    #[serde(default)]
    pub tax_cents: Option<i64>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SalePatch {
    /// True when the patch touches nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_none()
            && self.store_id.is_none()
            && self.discount_cents.is_none()
            && self.tax_cents.is_none()
            && self.payment_method.is_none()
            && self.payment_status.is_none()
            && self.notes.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
