//! Integration tests for the role graph resolver
//!
//! Covers closure correctness on arbitrary acyclic graphs, defensive
//! termination on cycles, TTL-bounded staleness and concurrent access.

use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use wiking_authz::memory::InMemoryRoleStore;
use wiking_authz::{ManualClock, RoleGraph, RoleGraphConfig};
use wiking_core::RoleId;

fn plain_graph(store: &Arc<InMemoryRoleStore>, clock: &Arc<ManualClock>) -> RoleGraph {
    let config = RoleGraphConfig {
        builtin_edges: false,
        ..Default::default()
    };
    RoleGraph::with_config(store.clone(), store.clone(), clock.clone(), config)
}

fn set(role_ids: &[&str]) -> BTreeSet<RoleId> {
    role_ids.iter().map(|r| r.to_string()).collect()
}

// ============================================================================
// CLOSURE PROPERTIES
// ============================================================================

#[tokio::test]
async fn test_transitivity() {
    let store = Arc::new(InMemoryRoleStore::new());
    store.add_edge("A", "B");
    store.add_edge("B", "C");
    let graph = plain_graph(&store, &Arc::new(ManualClock::new()));

    assert!(graph.included_role_ids("A").await.contains("C"));
}

#[tokio::test]
async fn test_containment_chain() {
    let store = Arc::new(InMemoryRoleStore::new());
    store.add_edge("ADMIN", "CONTENT_ADMIN");
    store.add_edge("CONTENT_ADMIN", "EDITOR");
    let graph = plain_graph(&store, &Arc::new(ManualClock::new()));

    assert_eq!(
        graph.included_role_ids("ADMIN").await,
        set(&["ADMIN", "CONTENT_ADMIN", "EDITOR"])
    );
    assert_eq!(
        graph.containing_role_ids("EDITOR").await,
        set(&["ADMIN", "CONTENT_ADMIN", "EDITOR"])
    );
}

#[tokio::test]
async fn test_cycle_terminates() {
    let store = Arc::new(InMemoryRoleStore::new());
    store.add_edge("A", "B");
    store.add_edge("B", "A");
    let graph = plain_graph(&store, &Arc::new(ManualClock::new()));

    let included = tokio::time::timeout(Duration::from_secs(1), graph.included_role_ids("A"))
        .await
        .expect("closure over a cycle must terminate");
    assert_eq!(included, set(&["A", "B"]));
    assert_eq!(graph.containing_role_ids("A").await, set(&["A", "B"]));
}

#[tokio::test]
async fn test_idempotence() {
    let store = Arc::new(InMemoryRoleStore::new());
    store.add_edge("A", "B");
    store.add_edge("A", "C");
    store.add_edge("C", "D");
    let graph = plain_graph(&store, &Arc::new(ManualClock::new()));

    let first = graph.included_role_ids("A").await;
    let second = graph.included_role_ids("A").await;
    assert_eq!(first, second);
}

// ============================================================================
// STALENESS
// ============================================================================

#[tokio::test]
async fn test_bounded_staleness() {
    let store = Arc::new(InMemoryRoleStore::new());
    store.add_edge("A", "B");
    let clock = Arc::new(ManualClock::new());
    let graph = plain_graph(&store, &clock);

    assert_eq!(graph.included_role_ids("A").await, set(&["A", "B"]));

    // Written inside the TTL window: may still be missing
    store.add_edge("B", "C");
    clock.advance(Duration::from_secs(10));
    assert_eq!(graph.included_role_ids("A").await, set(&["A", "B"]));

    // Once the TTL has elapsed it must be there
    clock.advance(Duration::from_secs(20));
    assert_eq!(graph.included_role_ids("A").await, set(&["A", "B", "C"]));
}

#[tokio::test]
async fn test_edge_removal_visible_after_ttl() {
    let store = Arc::new(InMemoryRoleStore::new());
    store.add_edge("A", "B");
    let clock = Arc::new(ManualClock::new());
    let config = RoleGraphConfig {
        ttl: Duration::from_secs(5),
        builtin_edges: false,
        ..Default::default()
    };
    let graph = RoleGraph::with_config(store.clone(), store.clone(), clock.clone(), config);

    assert!(graph.included_role_ids("A").await.contains("B"));
    store.remove_edge("A", "B");
    clock.advance(Duration::from_secs(5));
    assert_eq!(graph.included_role_ids("A").await, set(&["A"]));
}

#[tokio::test]
async fn test_single_scan_per_ttl_window() {
    let store = Arc::new(InMemoryRoleStore::new());
    store.add_edge("A", "B");
    let clock = Arc::new(ManualClock::new());
    let graph = plain_graph(&store, &clock);

    for role in ["A", "B", "C"] {
        graph.included_role_ids(role).await;
        graph.containing_role_ids(role).await;
    }
    assert_eq!(store.edge_reads(), 1);

    clock.advance(Duration::from_secs(30));
    graph.included_role_ids("A").await;
    assert_eq!(store.edge_reads(), 2);
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_queries_agree() {
    let store = Arc::new(InMemoryRoleStore::new());
    for i in 0..20 {
        store.add_edge(format!("r{}", i), format!("r{}", i + 1));
    }
    let graph = Arc::new(plain_graph(&store, &Arc::new(ManualClock::new())));

    let mut tasks = JoinSet::new();
    for _ in 0..32 {
        let graph = graph.clone();
        tasks.spawn(async move { graph.included_role_ids("r0").await });
    }

    while let Some(result) = tasks.join_next().await {
        let included = result.unwrap();
        assert_eq!(included.len(), 21);
        assert!(included.contains("r20"));
    }
}

// ============================================================================
// PROPERTY TESTS
// ============================================================================

fn reachable(edges: &[(u8, u8)], start: u8) -> BTreeSet<RoleId> {
    let mut adjacency: HashMap<u8, Vec<u8>> = HashMap::new();
    for (from, to) in edges {
        adjacency.entry(*from).or_default().push(*to);
    }

    let mut seen = BTreeSet::new();
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        if seen.insert(node) {
            stack.extend(adjacency.get(&node).into_iter().flatten().copied());
        }
    }
    seen.into_iter().map(|n| format!("r{}", n)).collect()
}

proptest! {
    #[test]
    fn test_closure_equals_reachable_set(
        raw in prop::collection::vec((0u8..12, 0u8..12), 0..40),
        start in 0u8..12
    ) {
        // Orient every edge from lower to higher id: acyclic by construction
        let edges: Vec<(u8, u8)> = raw
            .into_iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();

        let expected = reachable(&edges, start);

        let included = tokio_test::block_on(async {
            let store = Arc::new(InMemoryRoleStore::new());
            for (from, to) in &edges {
                store.add_edge(format!("r{}", from), format!("r{}", to));
            }
            let graph = plain_graph(&store, &Arc::new(ManualClock::new()));
            graph.included_role_ids(&format!("r{}", start)).await
        });

        prop_assert_eq!(included, expected);
    }

    #[test]
    fn test_closure_terminates_on_arbitrary_graphs(
        raw in prop::collection::vec((0u8..8, 0u8..8), 0..30),
        start in 0u8..8
    ) {
        let included = tokio_test::block_on(async {
            let store = Arc::new(InMemoryRoleStore::new());
            for (from, to) in &raw {
                store.add_edge(format!("r{}", from), format!("r{}", to));
            }
            let graph = plain_graph(&store, &Arc::new(ManualClock::new()));
            graph.included_role_ids(&format!("r{}", start)).await
        });

        prop_assert_eq!(included, reachable(&raw, start));
    }
}
