//! Read-only row sources for the role graph

use crate::error::Result;
use crate::types::{Role, RoleEdge};
use async_trait::async_trait;

/// Source of role containment edges
///
/// Read once per role graph rebuild. Implementations must not assume any
/// call frequency beyond "at most once per cache TTL per process".
#[async_trait]
pub trait RoleEdgeSource: Send + Sync {
    /// All containment edges currently stored
    async fn all_edges(&self) -> Result<Vec<RoleEdge>>;
}

/// Source of administrator-defined roles
#[async_trait]
pub trait RoleSource: Send + Sync {
    /// Roles that are not part of the predefined system catalogue
    async fn user_defined_roles(&self) -> Result<Vec<Role>>;
}
