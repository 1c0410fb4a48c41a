//! # Authorization Gate Port
//!
//! The engine consumes authorization as an external capability: "is this
//! actor allowed to perform action A on resource R". Role and permission
//! storage live elsewhere; the engine only asks allow/deny and short-circuits
//! on deny before any side effect.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Sale Actions
// =============================================================================

/// The resource name the engine presents to the gate.
pub const SALES_RESOURCE: &str = "sales";

/// The four actions a caller can perform on sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleAction {
    Create,
    Update,
    Delete,
    Refund,
}

impl SaleAction {
    /// Stable lowercase name, matching the wire form consumed by the gate.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleAction::Create => "create",
            SaleAction::Update => "update",
            SaleAction::Delete => "delete",
            SaleAction::Refund => "refund",
        }
    }
}

impl fmt::Display for SaleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Gate Port
// =============================================================================

/// External allow/deny decision point for actor + action + resource triples.
///
/// Implementations typically consult a role/permission service; the engine
/// never inspects roles itself.
#[async_trait]
pub trait AuthorizationGate: Send + Sync {
    /// Returns whether `actor` may perform `action` on `resource`.
    async fn allows(&self, actor: &str, action: SaleAction, resource: &str) -> bool;
}

/// A gate that allows everything.
///
/// For local tooling (the seed binary) and tests. Production deployments
/// wire in the real permission service instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl AuthorizationGate for AllowAll {
    async fn allows(&self, _actor: &str, _action: SaleAction, _resource: &str) -> bool {
        true
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        assert_eq!(SaleAction::Create.to_string(), "create");
        assert_eq!(SaleAction::Refund.to_string(), "refund");
        assert_eq!(
            serde_json::to_string(&SaleAction::Delete).unwrap_or_default(),
            "\"delete\""
        );
    }

    #[tokio::test]
    async fn test_allow_all() {
        let gate = AllowAll;
        assert!(gate.allows("anyone", SaleAction::Delete, SALES_RESOURCE).await);
    }
}
