//! # Repository Module
//!
//! Database repository implementations for Vendra.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  SaleEngine                                                            │
//! │       │                                                                 │
//! │       │  ledger.adjust_quantity("prod-1", -4)                          │
//! │       │  ↓ (ProductLedger port)                                        │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, product)                                            │
//! │  └── adjust_quantity(&self, id, delta)  ← conditional UPDATE           │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • SQL is isolated in one place                                        │
//! │  • The engine stays storage-agnostic behind its ports                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Stock ledger reads and conditional
//!   quantity adjustments
//! - [`sale::SaleRepository`] - Sale records with embedded line items

pub mod product;
pub mod sale;
