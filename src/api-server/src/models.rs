use serde::{Deserialize, Serialize};
use wiking_authz::role_graph::RoleGraphStats;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub role_cache: RoleCacheResponse,
}

/// Role graph cache counters
#[derive(Debug, Serialize, Deserialize)]
pub struct RoleCacheResponse {
    pub entries: usize,
    pub edges: usize,
    pub hits: usize,
    pub misses: usize,
    pub rebuilds: usize,
    pub rebuild_failures: usize,
    pub hit_rate: f64,
    pub ttl_seconds: u64,
}

impl From<RoleGraphStats> for RoleCacheResponse {
    fn from(stats: RoleGraphStats) -> Self {
        Self {
            entries: stats.entries,
            edges: stats.edges,
            hits: stats.hits,
            misses: stats.misses,
            rebuilds: stats.rebuilds,
            rebuild_failures: stats.rebuild_failures,
            hit_rate: stats.hit_rate(),
            ttl_seconds: stats.ttl_seconds,
        }
    }
}
