use std::sync::Arc;
use std::time::Instant;
use wiking_authz::RoleGraph;
use wiking_dispatch::Dispatcher;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,

    /// Server start time for uptime calculation
    pub start_time: Instant,

    pub version: String,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn role_graph(&self) -> &Arc<RoleGraph> {
        self.dispatcher.services().gate.role_graph()
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
