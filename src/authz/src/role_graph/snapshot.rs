//! Immutable containment snapshots and closure traversal

use dashmap::DashMap;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiking_core::{Role, RoleEdge, RoleId};

/// Direction of a closure query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Roles whose rights the start roles' members hold
    Included,
    /// Roles whose members hold the rights of the start roles
    Containing,
}

/// Build time of a cached structure
#[derive(Debug)]
pub(crate) struct Freshness {
    built_at: Option<Instant>,
    expired: AtomicBool,
}

impl Freshness {
    pub(crate) fn at(built_at: Instant) -> Self {
        Self {
            built_at: Some(built_at),
            expired: AtomicBool::new(false),
        }
    }

    pub(crate) fn never() -> Self {
        Self {
            built_at: None,
            expired: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        if self.expired.load(Ordering::Acquire) {
            return false;
        }
        self.built_at
            .map(|built_at| now.saturating_duration_since(built_at) < ttl)
            .unwrap_or(false)
    }

    pub(crate) fn age(&self, now: Instant) -> Option<Duration> {
        self.built_at.map(|built_at| now.saturating_duration_since(built_at))
    }

    pub(crate) fn expire(&self) {
        self.expired.store(true, Ordering::Release);
    }
}

/// Memo key: sorted, deduplicated start roles plus query shape
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub(crate) struct ResolutionKey {
    role_ids: Vec<RoleId>,
    direction: Direction,
    instances: bool,
}

impl ResolutionKey {
    pub(crate) fn new(role_ids: &[RoleId], direction: Direction, instances: bool) -> Self {
        let mut role_ids = role_ids.to_vec();
        // Sort for consistent hashing
        role_ids.sort();
        role_ids.dedup();
        Self {
            role_ids,
            direction,
            instances,
        }
    }

    pub(crate) fn role_ids(&self) -> &[RoleId] {
        &self.role_ids
    }
}

/// Memoized closure
#[derive(Debug, Clone)]
pub(crate) enum Closure {
    Ids(Arc<BTreeSet<RoleId>>),
    Roles(Arc<Vec<Role>>),
}

/// Adjacency maps built from one scan of the edge source
///
/// The resolution memo lives inside the snapshot, so replacing the
/// snapshot drops every memoized closure with it.
#[derive(Debug)]
pub(crate) struct ContainmentSnapshot {
    included: HashMap<RoleId, Vec<RoleId>>,
    containing: HashMap<RoleId, Vec<RoleId>>,
    pub(crate) resolutions: DashMap<ResolutionKey, Closure>,
    pub(crate) freshness: Freshness,
    edge_count: usize,
}

impl ContainmentSnapshot {
    pub(crate) fn build(edges: Vec<RoleEdge>, freshness: Freshness) -> Self {
        let mut included: HashMap<RoleId, Vec<RoleId>> = HashMap::new();
        let mut containing: HashMap<RoleId, Vec<RoleId>> = HashMap::new();
        let mut edge_count = 0;

        for edge in edges {
            let granted = included.entry(edge.container.clone()).or_default();
            if granted.contains(&edge.granted) {
                continue;
            }
            granted.push(edge.granted.clone());
            containing
                .entry(edge.granted)
                .or_default()
                .push(edge.container);
            edge_count += 1;
        }

        Self {
            included,
            containing,
            resolutions: DashMap::new(),
            freshness,
            edge_count,
        }
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Transitive closure of `starts`, the start roles included
    ///
    /// Iterative worklist with a visited set: terminates on cyclic data.
    pub(crate) fn closure(&self, starts: &[RoleId], direction: Direction) -> BTreeSet<RoleId> {
        let adjacency = match direction {
            Direction::Included => &self.included,
            Direction::Containing => &self.containing,
        };

        let mut visited = BTreeSet::new();
        let mut worklist: Vec<RoleId> = starts.to_vec();

        while let Some(role_id) = worklist.pop() {
            if visited.contains(&role_id) {
                continue;
            }
            if let Some(next) = adjacency.get(&role_id) {
                worklist.extend(next.iter().filter(|r| !visited.contains(*r)).cloned());
            }
            visited.insert(role_id);
        }

        visited
    }
}

/// Administrator-defined roles with their own build time
#[derive(Debug)]
pub(crate) struct RoleCatalog {
    pub(crate) roles: Vec<Role>,
    pub(crate) freshness: Freshness,
}

impl RoleCatalog {
    pub(crate) fn find(&self, id: &str) -> Option<&Role> {
        self.roles.iter().find(|role| role.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(edges: &[(&str, &str)]) -> ContainmentSnapshot {
        let edges = edges.iter().map(|(c, g)| RoleEdge::new(*c, *g)).collect();
        ContainmentSnapshot::build(edges, Freshness::never())
    }

    fn ids(roles: &[&str]) -> BTreeSet<RoleId> {
        roles.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn test_forward_closure_includes_start() {
        let snap = snapshot(&[("a", "b"), ("b", "c")]);
        let closure = snap.closure(&["a".to_string()], Direction::Included);
        assert_eq!(closure, ids(&["a", "b", "c"]));
    }

    #[test]
    fn test_reverse_closure() {
        let snap = snapshot(&[("a", "b"), ("b", "c"), ("x", "c")]);
        let closure = snap.closure(&["c".to_string()], Direction::Containing);
        assert_eq!(closure, ids(&["a", "b", "c", "x"]));
    }

    #[test]
    fn test_cycle_terminates() {
        let snap = snapshot(&[("a", "b"), ("b", "a")]);
        let closure = snap.closure(&["a".to_string()], Direction::Included);
        assert_eq!(closure, ids(&["a", "b"]));
    }

    #[test]
    fn test_self_loop_terminates() {
        let snap = snapshot(&[("a", "a")]);
        let closure = snap.closure(&["a".to_string()], Direction::Included);
        assert_eq!(closure, ids(&["a"]));
    }

    #[test]
    fn test_duplicate_edges_counted_once() {
        let snap = snapshot(&[("a", "b"), ("a", "b")]);
        assert_eq!(snap.edge_count(), 1);
        let closure = snap.closure(&["b".to_string()], Direction::Containing);
        assert_eq!(closure, ids(&["a", "b"]));
    }

    #[test]
    fn test_resolution_key_is_order_independent() {
        let a = ResolutionKey::new(
            &["b".to_string(), "a".to_string(), "a".to_string()],
            Direction::Included,
            false,
        );
        let b = ResolutionKey::new(&["a".to_string(), "b".to_string()], Direction::Included, false);
        assert_eq!(a, b);
        assert_eq!(a.role_ids(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_freshness_window() {
        let start = Instant::now();
        let ttl = Duration::from_secs(30);
        let fresh = Freshness::at(start);

        assert!(fresh.is_fresh(start + Duration::from_secs(29), ttl));
        assert!(!fresh.is_fresh(start + ttl, ttl));
        assert!(!Freshness::never().is_fresh(start, ttl));

        fresh.expire();
        assert!(!fresh.is_fresh(start, ttl));
    }
}
