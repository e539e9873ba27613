//! Per-request context and the forwarding stack

use crate::dispatcher::Services;
use crate::frame::{ForwardFrame, ForwardMetadata};
use crate::module::Module;
use crate::path::RequestPath;
use crate::registry::ModuleRegistry;
use crate::signal::{ControlSignal, HandlerResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use wiking_authz::{AuthorizationGate, Identity};
use wiking_core::{Record, RoleId};

/// State of one request as it travels through modules
///
/// Owned by a single request; never shared across requests.
pub struct RequestContext {
    id: Uuid,
    path: RequestPath,
    params: BTreeMap<String, String>,
    identity: Identity,
    services: Arc<Services>,
    frames: Arc<Mutex<Vec<ForwardFrame>>>,
}

/// Pops the stack back to its depth at push time when dropped
///
/// Runs on normal return, on an error signal, on panic and when the
/// request future is dropped mid-flight.
struct FrameGuard {
    frames: Arc<Mutex<Vec<ForwardFrame>>>,
    depth: usize,
}

impl FrameGuard {
    fn push(frames: &Arc<Mutex<Vec<ForwardFrame>>>, frame: ForwardFrame) -> Self {
        let mut stack = frames.lock();
        let depth = stack.len();
        stack.push(frame);
        Self {
            frames: frames.clone(),
            depth,
        }
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        self.frames.lock().truncate(self.depth);
    }
}

impl RequestContext {
    pub fn new(
        services: Arc<Services>,
        path: RequestPath,
        params: BTreeMap<String, String>,
        identity: Identity,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            path,
            params,
            identity,
            services,
            frames: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adopt an id assigned upstream, such as an HTTP request id
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &RequestPath {
        &self.path
    }

    pub fn path_mut(&mut self) -> &mut RequestPath {
        &mut self.path
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    pub fn gate(&self) -> &AuthorizationGate {
        &self.services.gate
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.services.registry
    }

    /// Hand the request to `module`, recording a frame for the duration
    ///
    /// The frame captures the current resolved/unresolved split. Whatever
    /// `module` returns, signals included, is passed through unchanged.
    pub async fn forward(&mut self, module: Arc<dyn Module>, metadata: ForwardMetadata) -> HandlerResult {
        let frame = ForwardFrame::new(
            module.clone(),
            self.path.resolved().to_vec(),
            self.path.unresolved().to_vec(),
            metadata,
        );
        let _guard = FrameGuard::push(&self.frames, frame);

        debug!(
            module = module.name(),
            depth = self.depth(),
            resolved = ?self.path.resolved(),
            unresolved = ?self.path.unresolved(),
            "Forwarding"
        );

        module.handle(self).await
    }

    /// Snapshot of the forwarding stack, oldest first
    pub fn forwards(&self) -> Vec<ForwardFrame> {
        self.frames.lock().clone()
    }

    /// Current forwarding stack depth
    pub fn depth(&self) -> usize {
        self.frames.lock().len()
    }

    /// Turn a denial of `action` into the matching signal
    pub async fn authorize(&self, module: &dyn Module, action: &str, record: Option<&Record>) -> Result<(), ControlSignal> {
        if module.authorized(self, action, record).await {
            Ok(())
        } else {
            Err(self.denial().await)
        }
    }

    /// Whether the caller holds any of `roles`
    pub async fn has_any_role(&self, roles: &[RoleId]) -> bool {
        self.gate().check_roles(&self.identity, roles).await
    }

    /// AuthenticationRequired for anonymous callers, Forbidden otherwise
    pub async fn denial(&self) -> ControlSignal {
        match self.identity.user().await {
            Ok(Some(_)) => ControlSignal::Forbidden,
            _ => ControlSignal::AuthenticationRequired,
        }
    }
}
