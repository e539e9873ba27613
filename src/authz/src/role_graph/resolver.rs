//! Role graph resolver with time-bounded caching
//!
//! The resolver keeps two independently refreshed structures:
//!
//! - **Containment snapshot**: forward and reverse adjacency maps built
//!   from one scan of the edge source, plus a memo of computed closures
//!   keyed by `(start roles, direction, instances)`
//! - **Role catalogue**: administrator-defined roles used to look up and
//!   materialise `Role` instances
//!
//! Each public call checks the age of the structure it needs and
//! rebuilds it synchronously when it is older than the TTL. Snapshots
//! are immutable and published with a single `Arc` swap, so concurrent
//! rebuilds only duplicate work.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wiking_authz::memory::InMemoryRoleStore;
//! use wiking_authz::role_graph::RoleGraph;
//!
//! # async fn example() {
//! let store = Arc::new(InMemoryRoleStore::new());
//! store.add_edge("editor-in-chief", "editor");
//! store.add_edge("editor", "author");
//!
//! let graph = RoleGraph::new(store.clone(), store);
//! let included = graph.included_role_ids("editor-in-chief").await;
//! assert!(included.contains("author"));
//! # }
//! ```

use super::clock::{Clock, SystemClock};
use super::snapshot::{Closure, ContainmentSnapshot, Direction, Freshness, ResolutionKey, RoleCatalog};
use crate::roles;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use wiking_core::{Role, RoleEdgeSource, RoleId, RoleSource};

/// Default TTL of both cached structures
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

/// Default bound on memoized closures per snapshot
pub const DEFAULT_MAX_CACHED_RESOLUTIONS: usize = 10_000;

/// Role graph configuration
#[derive(Debug, Clone)]
pub struct RoleGraphConfig {
    /// Maximum age of a snapshot before it is rebuilt
    pub ttl: Duration,

    /// Memoized closures kept per snapshot; further results are computed
    /// but not stored
    pub max_cached_resolutions: usize,

    /// Merge the predefined `cms-admin` containment edges into every build
    pub builtin_edges: bool,
}

impl Default for RoleGraphConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_cached_resolutions: DEFAULT_MAX_CACHED_RESOLUTIONS,
            builtin_edges: true,
        }
    }
}

/// Process-wide role containment service
///
/// # Thread Safety
///
/// Share it with `Arc`. Readers clone the current snapshot `Arc` and
/// never hold a lock across an await point.
pub struct RoleGraph {
    edges: Arc<dyn RoleEdgeSource>,
    roles: Arc<dyn RoleSource>,
    clock: Arc<dyn Clock>,
    config: RoleGraphConfig,
    containment: RwLock<Arc<ContainmentSnapshot>>,
    catalog: RwLock<Arc<RoleCatalog>>,
    stats: Arc<DashMap<String, usize>>,
}

impl RoleGraph {
    /// Create a resolver with default settings and the system clock
    pub fn new(edges: Arc<dyn RoleEdgeSource>, roles: Arc<dyn RoleSource>) -> Self {
        Self::with_config(edges, roles, Arc::new(SystemClock), RoleGraphConfig::default())
    }

    pub fn with_config(
        edges: Arc<dyn RoleEdgeSource>,
        roles: Arc<dyn RoleSource>,
        clock: Arc<dyn Clock>,
        config: RoleGraphConfig,
    ) -> Self {
        let seed = if config.builtin_edges {
            roles::builtin_edges()
        } else {
            Vec::new()
        };

        Self {
            edges,
            roles,
            clock,
            containment: RwLock::new(Arc::new(ContainmentSnapshot::build(seed, Freshness::never()))),
            catalog: RwLock::new(Arc::new(RoleCatalog {
                roles: Vec::new(),
                freshness: Freshness::never(),
            })),
            config,
            stats: Arc::new(DashMap::new()),
        }
    }

    pub fn config(&self) -> &RoleGraphConfig {
        &self.config
    }

    /// Roles whose rights members of `role` hold, `role` included
    ///
    /// An unknown role yields the singleton set.
    pub async fn included_role_ids(&self, role: &str) -> BTreeSet<RoleId> {
        self.included_role_ids_by_role_ids(&[role.to_string()]).await
    }

    /// Union of the forward closures of `role_ids`
    pub async fn included_role_ids_by_role_ids(&self, role_ids: &[RoleId]) -> BTreeSet<RoleId> {
        self.closure_ids(role_ids, Direction::Included).await.as_ref().clone()
    }

    /// Roles whose members hold the rights of `role`, `role` included
    pub async fn containing_role_ids(&self, role: &str) -> BTreeSet<RoleId> {
        self.closure_ids(&[role.to_string()], Direction::Containing)
            .await
            .as_ref()
            .clone()
    }

    /// Forward closure of `role` as role instances, ordered by id
    pub async fn included_roles(&self, role: &str) -> Vec<Role> {
        self.included_roles_by_role_ids(&[role.to_string()]).await
    }

    pub async fn included_roles_by_role_ids(&self, role_ids: &[RoleId]) -> Vec<Role> {
        let snapshot = self.containment().await;
        let key = ResolutionKey::new(role_ids, Direction::Included, true);

        if let Some(Closure::Roles(cached)) = snapshot.resolutions.get(&key).map(|e| e.value().clone()) {
            self.increment_stat("hits");
            return cached.as_ref().clone();
        }
        self.increment_stat("misses");

        let ids = snapshot.closure(key.role_ids(), Direction::Included);
        let catalog = self.catalog().await;
        let materialised: Vec<Role> = ids.iter().map(|id| materialise(&catalog, id)).collect();

        self.memoize(&snapshot, key, Closure::Roles(Arc::new(materialised.clone())));
        materialised
    }

    /// Roles defined by administrators, excluding the predefined catalogue
    pub async fn user_defined_roles(&self) -> Vec<Role> {
        self.catalog().await.roles.clone()
    }

    /// Predefined or user-defined role with the given id
    pub async fn get_role(&self, id: &str) -> Option<Role> {
        if let Some(role) = roles::predefined_role(id) {
            return Some(role);
        }
        self.catalog().await.find(id).cloned()
    }

    /// Mark both cached structures stale
    ///
    /// The next query rebuilds them. Until a rebuild succeeds the old
    /// data keeps serving.
    pub fn invalidate(&self) {
        self.containment.read().freshness.expire();
        self.catalog.read().freshness.expire();
        debug!("Role graph invalidated");
    }

    /// Get cache statistics
    pub fn cache_stats(&self) -> RoleGraphStats {
        let snapshot = self.containment.read().clone();
        let now = self.clock.now();

        RoleGraphStats {
            entries: snapshot.resolutions.len(),
            max_entries: self.config.max_cached_resolutions,
            edges: snapshot.edge_count(),
            hits: self.get_stat("hits"),
            misses: self.get_stat("misses"),
            rebuilds: self.get_stat("rebuilds"),
            rebuild_failures: self.get_stat("rebuild_failures"),
            snapshot_age: snapshot.freshness.age(now),
            ttl_seconds: self.config.ttl.as_secs(),
        }
    }

    async fn closure_ids(&self, role_ids: &[RoleId], direction: Direction) -> Arc<BTreeSet<RoleId>> {
        let snapshot = self.containment().await;
        let key = ResolutionKey::new(role_ids, direction, false);

        if let Some(Closure::Ids(ids)) = snapshot.resolutions.get(&key).map(|e| e.value().clone()) {
            self.increment_stat("hits");
            return ids;
        }
        self.increment_stat("misses");

        let ids = Arc::new(snapshot.closure(key.role_ids(), direction));
        self.memoize(&snapshot, key, Closure::Ids(ids.clone()));
        ids
    }

    fn memoize(&self, snapshot: &ContainmentSnapshot, key: ResolutionKey, closure: Closure) {
        if snapshot.resolutions.len() < self.config.max_cached_resolutions {
            snapshot.resolutions.insert(key, closure);
        }
    }

    /// Current containment snapshot, rebuilt first when stale
    async fn containment(&self) -> Arc<ContainmentSnapshot> {
        let now = self.clock.now();
        let current = self.containment.read().clone();
        if current.freshness.is_fresh(now, self.config.ttl) {
            return current;
        }

        match self.edges.all_edges().await {
            Ok(mut edges) => {
                if self.config.builtin_edges {
                    edges.extend(roles::builtin_edges());
                }
                let rebuilt = Arc::new(ContainmentSnapshot::build(edges, Freshness::at(now)));
                *self.containment.write() = rebuilt.clone();
                self.increment_stat("rebuilds");
                debug!(edges = rebuilt.edge_count(), "Role containment map rebuilt");
                rebuilt
            }
            Err(e) => {
                self.increment_stat("rebuild_failures");
                warn!(error = %e, "Failed to read role edges, serving previous containment map");
                current
            }
        }
    }

    /// Current role catalogue, rebuilt first when stale
    async fn catalog(&self) -> Arc<RoleCatalog> {
        let now = self.clock.now();
        let current = self.catalog.read().clone();
        if current.freshness.is_fresh(now, self.config.ttl) {
            return current;
        }

        match self.roles.user_defined_roles().await {
            Ok(defined) => {
                let defined = defined
                    .into_iter()
                    .filter(|role| !roles::is_predefined(&role.id))
                    .collect::<Vec<_>>();
                debug!(roles = defined.len(), "Role catalogue rebuilt");
                let rebuilt = Arc::new(RoleCatalog {
                    roles: defined,
                    freshness: Freshness::at(now),
                });
                *self.catalog.write() = rebuilt.clone();
                rebuilt
            }
            Err(e) => {
                warn!(error = %e, "Failed to read user defined roles, serving previous catalogue");
                current
            }
        }
    }

    fn increment_stat(&self, key: &str) {
        self.stats
            .entry(key.to_string())
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}

fn materialise(catalog: &RoleCatalog, id: &str) -> Role {
    if let Some(role) = roles::predefined_role(id) {
        return role;
    }
    match catalog.find(id) {
        Some(role) => role.clone(),
        None => {
            debug!(role = id, "Role not in catalogue, using its id as name");
            Role::bare(id)
        }
    }
}

/// Role graph statistics
#[derive(Debug, Clone)]
pub struct RoleGraphStats {
    /// Memoized closures in the current snapshot
    pub entries: usize,
    pub max_entries: usize,
    /// Distinct containment edges in the current snapshot
    pub edges: usize,
    pub hits: usize,
    pub misses: usize,
    pub rebuilds: usize,
    pub rebuild_failures: usize,
    /// Age of the current snapshot, `None` before the first build
    pub snapshot_age: Option<Duration>,
    pub ttl_seconds: u64,
}

impl RoleGraphStats {
    /// Calculate memo hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryRoleStore;
    use crate::role_graph::ManualClock;

    fn graph_with(edges: &[(&str, &str)]) -> (RoleGraph, Arc<InMemoryRoleStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemoryRoleStore::new());
        for (container, granted) in edges {
            store.add_edge(*container, *granted);
        }
        let clock = Arc::new(ManualClock::new());
        let config = RoleGraphConfig {
            builtin_edges: false,
            ..Default::default()
        };
        let graph = RoleGraph::with_config(store.clone(), store.clone(), clock.clone(), config);
        (graph, store, clock)
    }

    fn set(role_ids: &[&str]) -> BTreeSet<RoleId> {
        role_ids.iter().map(|r| r.to_string()).collect()
    }

    #[tokio::test]
    async fn test_unknown_role_is_singleton() {
        let (graph, _, _) = graph_with(&[("a", "b")]);
        assert_eq!(graph.included_role_ids("ghost").await, set(&["ghost"]));
        assert_eq!(graph.containing_role_ids("ghost").await, set(&["ghost"]));
    }

    #[tokio::test]
    async fn test_memo_hits_on_repeated_query() {
        let (graph, store, _) = graph_with(&[("a", "b"), ("b", "c")]);

        let first = graph.included_role_ids("a").await;
        let second = graph.included_role_ids("a").await;
        assert_eq!(first, second);

        let stats = graph.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.rebuilds, 1);
        assert_eq!(store.edge_reads(), 1);
    }

    #[tokio::test]
    async fn test_start_role_order_shares_memo_entry() {
        let (graph, _, _) = graph_with(&[("a", "b"), ("c", "d")]);

        let ab = graph
            .included_role_ids_by_role_ids(&["a".to_string(), "c".to_string()])
            .await;
        let ba = graph
            .included_role_ids_by_role_ids(&["c".to_string(), "a".to_string()])
            .await;

        assert_eq!(ab, set(&["a", "b", "c", "d"]));
        assert_eq!(ab, ba);
        assert_eq!(graph.cache_stats().entries, 1);
    }

    #[tokio::test]
    async fn test_rebuild_after_ttl_drops_memo() {
        let (graph, store, clock) = graph_with(&[("a", "b")]);
        graph.included_role_ids("a").await;
        assert_eq!(graph.cache_stats().entries, 1);

        store.add_edge("b", "c");
        clock.advance(DEFAULT_TTL);

        assert_eq!(graph.included_role_ids("a").await, set(&["a", "b", "c"]));
        let stats = graph.cache_stats();
        assert_eq!(stats.rebuilds, 2);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_source_failure_keeps_previous_snapshot() {
        let (graph, store, clock) = graph_with(&[("a", "b")]);
        assert_eq!(graph.included_role_ids("a").await, set(&["a", "b"]));

        store.fail_reads(true);
        clock.advance(DEFAULT_TTL);
        assert_eq!(graph.included_role_ids("a").await, set(&["a", "b"]));
        assert_eq!(graph.cache_stats().rebuild_failures, 1);

        // Retried on the next call once the source recovers
        store.fail_reads(false);
        store.add_edge("b", "c");
        assert_eq!(graph.included_role_ids("a").await, set(&["a", "b", "c"]));
    }

    #[tokio::test]
    async fn test_invalidate_forces_rebuild() {
        let (graph, store, _) = graph_with(&[("a", "b")]);
        graph.included_role_ids("a").await;

        store.add_edge("b", "c");
        assert_eq!(graph.included_role_ids("a").await, set(&["a", "b"]));

        graph.invalidate();
        assert_eq!(graph.included_role_ids("a").await, set(&["a", "b", "c"]));
    }

    #[tokio::test]
    async fn test_included_roles_materialises_instances() {
        let (graph, store, _) = graph_with(&[("chief", "editor"), ("editor", roles::USER)]);
        store.add_role(Role::new("chief", "Editor in chief"));

        let included = graph.included_roles("chief").await;
        let names: Vec<_> = included.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["Editor in chief", "editor", "User"]);
    }

    #[tokio::test]
    async fn test_get_role_lookup() {
        let (graph, store, _) = graph_with(&[]);
        store.add_role(Role::new("reviewer", "Reviewer"));

        assert_eq!(
            graph.get_role(roles::ADMIN).await.map(|r| r.display_name),
            Some("Administrator".to_string())
        );
        assert_eq!(
            graph.get_role("reviewer").await.map(|r| r.display_name),
            Some("Reviewer".to_string())
        );
        assert!(graph.get_role("nobody").await.is_none());
    }

    #[tokio::test]
    async fn test_user_defined_roles_exclude_predefined() {
        let (graph, store, _) = graph_with(&[]);
        store.add_role(Role::new("reviewer", "Reviewer"));
        store.add_role(Role::new(roles::ADMIN, "Shadowed"));

        let defined = graph.user_defined_roles().await;
        assert_eq!(defined, vec![Role::new("reviewer", "Reviewer")]);
    }

    #[tokio::test]
    async fn test_builtin_admin_edges() {
        let store = Arc::new(InMemoryRoleStore::new());
        let graph = RoleGraph::new(store.clone(), store);

        let included = graph.included_role_ids(roles::ADMIN).await;
        for admin_role in roles::ADMIN_ROLES {
            assert!(included.contains(admin_role));
        }
        let containing = graph.containing_role_ids(roles::MAIL_ADMIN).await;
        assert_eq!(containing, set(&[roles::ADMIN, roles::MAIL_ADMIN]));
    }

    #[tokio::test]
    async fn test_memo_bound() {
        let store = Arc::new(InMemoryRoleStore::new());
        let config = RoleGraphConfig {
            max_cached_resolutions: 2,
            builtin_edges: false,
            ..Default::default()
        };
        let graph = RoleGraph::with_config(store.clone(), store, Arc::new(SystemClock), config);

        for role in ["a", "b", "c", "d"] {
            graph.included_role_ids(role).await;
        }
        assert_eq!(graph.cache_stats().entries, 2);
    }
}
