//! Authenticated user abstraction

use crate::types::{RoleId, Uid, UserState};
use std::collections::BTreeSet;
use std::fmt::Debug;

/// A user as seen by the authorization gate
///
/// Only explicitly assigned roles are exposed. Effective roles are never
/// stored on the user; the gate expands them through the role graph.
pub trait User: Send + Sync + Debug {
    fn uid(&self) -> Uid;

    fn login(&self) -> &str;

    /// Roles assigned directly to this user
    fn explicit_role_ids(&self) -> &BTreeSet<RoleId>;

    fn state(&self) -> UserState;
}
