//! # vendra-engine: Sale Transaction & Inventory Consistency Engine
//!
//! This crate implements the one part of Vendra where multiple mutable
//! records (a sale and N products) must change together without a single
//! atomic commit primitive.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vendra Data Flow                                 │
//! │                                                                         │
//! │  Request layer (external)                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AuthorizationGate ── deny? ──► short-circuit, no side effect          │
//! │       │ allow                                                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 SaleEngine (THIS CRATE)                         │   │
//! │  │                                                                 │   │
//! │  │   create ──► reserve ──► totals ──► persist                    │   │
//! │  │   update ──► release old ──► reserve new ──► persist           │   │
//! │  │   delete ──► release ──► remove record                         │   │
//! │  │   refund ──► release ──► mark refunded                         │   │
//! │  │                                                                 │   │
//! │  │   every failure after a stock mutation triggers a              │   │
//! │  │   compensating rollback                                        │   │
//! │  └───────────────┬─────────────────────────────┬───────────────────┘   │
//! │                  │                             │                        │
//! │                  ▼                             ▼                        │
//! │          ProductLedger                    SaleStore                    │
//! │          (stock authority)                (sale records)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - The sale transaction orchestrator ([`SaleEngine`])
//! - [`reconcile`] - Stock reconciliation step (reserve/release/reapply)
//! - [`ledger`] - The [`ProductLedger`] port
//! - [`store`] - The [`SaleStore`] port
//! - [`gate`] - The [`AuthorizationGate`] port
//! - [`error`] - Engine error taxonomy
//!
//! ## Consistency Model
//!
//! The engine never assumes a transaction spanning a sale write and a
//! product write. Instead every workflow is written so a failure at any
//! suspension point leaves the system in one of two well-defined states
//! (pre-operation or post-operation), using explicit compensation:
//! stock released when a persist fails, original reservations reapplied
//! when a swap fails. A failed *compensation* is the one condition that
//! is surfaced as fatal ([`error::EngineError::Compensation`]) because it
//! means manual stock reconciliation is required.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod gate;
pub mod ledger;
pub mod reconcile;
pub mod store;

#[cfg(test)]
pub(crate) mod testkit;

// =============================================================================
// Re-exports
// =============================================================================

pub use engine::SaleEngine;
pub use error::{EngineError, EngineResult};
pub use gate::{AuthorizationGate, SaleAction, AllowAll, SALES_RESOURCE};
pub use ledger::ProductLedger;
pub use store::SaleStore;
