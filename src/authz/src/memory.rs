//! In-memory role store and account directory

use crate::error::{AuthzError, Result as AuthzResult};
use crate::identity::{Authenticator, Credentials};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use wiking_core::{Account, CoreError, Result, Role, RoleEdge, RoleEdgeSource, RoleSource, User};

/// Role edges and user-defined roles held in memory
///
/// Edits become visible to a role graph on its next rebuild.
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    edges: RwLock<Vec<RoleEdge>>,
    roles: RwLock<Vec<Role>>,
    edge_reads: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edges(edges: Vec<RoleEdge>) -> Self {
        let store = Self::new();
        *store.edges.write() = edges;
        store
    }

    pub fn add_edge(&self, container: impl Into<String>, granted: impl Into<String>) {
        self.edges.write().push(RoleEdge::new(container, granted));
    }

    pub fn remove_edge(&self, container: &str, granted: &str) {
        self.edges
            .write()
            .retain(|e| !(e.container == container && e.granted == granted));
    }

    /// Add a role, replacing any role with the same id
    pub fn add_role(&self, role: Role) {
        let mut roles = self.roles.write();
        roles.retain(|r| r.id != role.id);
        roles.push(role);
    }

    /// Make subsequent reads fail, simulating an unavailable database
    pub fn fail_reads(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of edge scans served so far
    pub fn edge_reads(&self) -> usize {
        self.edge_reads.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CoreError::source("role store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl RoleEdgeSource for InMemoryRoleStore {
    async fn all_edges(&self) -> Result<Vec<RoleEdge>> {
        self.check_available()?;
        self.edge_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.edges.read().clone())
    }
}

#[async_trait]
impl RoleSource for InMemoryRoleStore {
    async fn user_defined_roles(&self) -> Result<Vec<Role>> {
        self.check_available()?;
        Ok(self.roles.read().clone())
    }
}

/// Account directory authenticating by login name
///
/// Trusts the presented login; password verification belongs to the
/// transport in front of it.
#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    accounts: RwLock<HashMap<String, Arc<Account>>>,
    authentications: AtomicUsize,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: Account) {
        self.accounts
            .write()
            .insert(account.login.clone(), Arc::new(account));
    }

    pub fn get(&self, login: &str) -> Option<Arc<Account>> {
        self.accounts.read().get(login).cloned()
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }

    /// Number of authentication attempts served so far
    pub fn authentications(&self) -> usize {
        self.authentications.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for InMemoryAccounts {
    async fn authenticate(&self, credentials: &Credentials) -> AuthzResult<Option<Arc<dyn User>>> {
        self.authentications.fetch_add(1, Ordering::SeqCst);

        let Some(login) = credentials.login.as_deref() else {
            return Ok(None);
        };
        match self.get(login) {
            Some(account) => Ok(Some(account as Arc<dyn User>)),
            None => Err(AuthzError::AuthenticationFailed(format!("unknown login '{}'", login))),
        }
    }
}
