//! Authorization gate
//!
//! Decides whether the caller may perform an action on a module,
//! optionally for a particular record. The decision is a plain `bool`;
//! turning a denial into a forbidden or authentication-required outcome
//! is up to the calling module.

use crate::identity::Identity;
use crate::policy::{AccessPolicy, Requirement};
use crate::role_graph::RoleGraph;
use crate::roles;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use wiking_core::{Record, RoleId, User, UserState};

/// Roles a user holds by virtue of the account state alone
pub fn special_role_ids(state: UserState) -> Vec<RoleId> {
    let mut ids = vec![roles::ANYONE.to_string(), roles::AUTHENTICATED.to_string()];
    if state != UserState::New {
        ids.push(roles::REGISTERED.to_string());
    }
    if state == UserState::Enabled {
        ids.push(roles::USER.to_string());
    }
    ids
}

/// Combines access policies, caller identity and the role graph
#[derive(Clone)]
pub struct AuthorizationGate {
    graph: Arc<RoleGraph>,
}

impl AuthorizationGate {
    pub fn new(graph: Arc<RoleGraph>) -> Self {
        Self { graph }
    }

    pub fn role_graph(&self) -> &Arc<RoleGraph> {
        &self.graph
    }

    /// Whether `action` is permitted under `policy`
    ///
    /// Actions open to ANYONE never trigger authentication.
    pub async fn authorized(
        &self,
        identity: &Identity,
        policy: &AccessPolicy,
        action: &str,
        record: Option<&Record>,
    ) -> bool {
        let allowed = match policy.requirement(action) {
            Requirement::Always => true,
            Requirement::Never => false,
            Requirement::AnyOf(required) => {
                self.holds_any(identity, &required, policy.owner_column.as_deref(), record)
                    .await
            }
        };

        if !allowed {
            debug!(action, record = ?record.map(|r| &r.key), "Action not authorized");
        }
        allowed
    }

    /// Whether the caller holds any of `required`
    pub async fn check_roles(&self, identity: &Identity, required: &[RoleId]) -> bool {
        self.holds_any(identity, required, None, None).await
    }

    /// Effective roles: account-state roles plus explicit roles, expanded
    /// through the containment graph
    ///
    /// Explicit roles only count for enabled accounts. An anonymous caller
    /// holds what ANYONE includes.
    pub async fn effective_roles(&self, user: Option<&dyn User>) -> BTreeSet<RoleId> {
        let base = match user {
            None => vec![roles::ANYONE.to_string()],
            Some(user) => {
                let mut base = special_role_ids(user.state());
                if user.state() == UserState::Enabled {
                    base.extend(user.explicit_role_ids().iter().cloned());
                }
                base
            }
        };
        self.graph.included_role_ids_by_role_ids(&base).await
    }

    async fn holds_any(
        &self,
        identity: &Identity,
        required: &[RoleId],
        owner_column: Option<&str>,
        record: Option<&Record>,
    ) -> bool {
        if required.iter().any(|r| r == roles::ANYONE) {
            return true;
        }
        if required.is_empty() {
            return false;
        }

        // A rejected login is treated as no login; Identity already logged it
        let user = identity.user().await.unwrap_or(None);
        let mut effective = self.effective_roles(user.as_deref()).await;

        if let (Some(user), Some(column), Some(record)) = (&user, owner_column, record) {
            if record.matches(column, &user.uid().to_string()) {
                effective.insert(roles::OWNER.to_string());
            }
        }

        required.iter().any(|r| effective.contains(r))
    }
}
