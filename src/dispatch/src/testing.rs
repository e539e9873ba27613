//! Test doubles shared by unit tests

use crate::context::RequestContext;
use crate::dispatcher::Services;
use crate::frame::ForwardFrame;
use crate::module::Module;
use crate::registry::ModuleRegistry;
use crate::signal::{ControlSignal, HandlerResult, Response};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use wiking_authz::memory::InMemoryRoleStore;
use wiking_authz::{AccessPolicy, AuthorizationGate, NoAuthentication, RoleGraph};

pub(crate) fn services(modules: Vec<Arc<dyn Module>>) -> Arc<Services> {
    let mut registry = ModuleRegistry::new();
    for module in modules {
        registry.register(module).unwrap();
    }
    let store = Arc::new(InMemoryRoleStore::new());
    let gate = AuthorizationGate::new(Arc::new(RoleGraph::new(store.clone(), store)));
    Arc::new(Services::new(registry, gate, Arc::new(NoAuthentication)))
}

/// Records the forwarding stack it was invoked under
pub(crate) struct StubModule {
    name: String,
    policy: AccessPolicy,
    frames: Mutex<Vec<ForwardFrame>>,
}

impl StubModule {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            policy: AccessPolicy::default(),
            frames: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn seen_frames(&self) -> Vec<ForwardFrame> {
        self.frames.lock().clone()
    }
}

#[async_trait]
impl Module for StubModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn access_policy(&self) -> &AccessPolicy {
        &self.policy
    }

    async fn handle(&self, req: &mut RequestContext) -> HandlerResult {
        *self.frames.lock() = req.forwards();
        Ok(Response::text(self.name.clone()))
    }
}

/// Always ends with the given signal
pub(crate) struct FailingModule {
    signal: ControlSignal,
    policy: AccessPolicy,
}

impl FailingModule {
    pub(crate) fn new(signal: ControlSignal) -> Self {
        Self {
            signal,
            policy: AccessPolicy::default(),
        }
    }
}

#[async_trait]
impl Module for FailingModule {
    fn name(&self) -> &str {
        "Failing"
    }

    fn access_policy(&self) -> &AccessPolicy {
        &self.policy
    }

    async fn handle(&self, _req: &mut RequestContext) -> HandlerResult {
        Err(self.signal.clone())
    }
}

/// Never completes
pub(crate) struct PendingModule {
    name: String,
    policy: AccessPolicy,
}

impl PendingModule {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            policy: AccessPolicy::default(),
        }
    }
}

#[async_trait]
impl Module for PendingModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn access_policy(&self) -> &AccessPolicy {
        &self.policy
    }

    async fn handle(&self, _req: &mut RequestContext) -> HandlerResult {
        std::future::pending::<()>().await;
        Ok(Response::text(""))
    }
}
