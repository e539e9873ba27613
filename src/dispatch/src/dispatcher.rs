//! Request entry point

use crate::application::Application;
use crate::context::RequestContext;
use crate::path::RequestPath;
use crate::registry::ModuleRegistry;
use crate::signal::{ControlSignal, HandlerResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;
use wiking_authz::{Authenticator, AuthorizationGate, Credentials, Identity};

/// Shared services every request sees
pub struct Services {
    pub registry: ModuleRegistry,
    pub gate: AuthorizationGate,
    pub authenticator: Arc<dyn Authenticator>,
}

impl Services {
    pub fn new(registry: ModuleRegistry, gate: AuthorizationGate, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            registry,
            gate,
            authenticator,
        }
    }
}

/// Transport-independent incoming request
#[derive(Debug, Clone, Default)]
pub struct IncomingRequest {
    /// Percent-encoded path
    pub path: String,
    pub params: BTreeMap<String, String>,
    pub credentials: Credentials,
    /// Id for log correlation, generated when absent
    pub request_id: Option<Uuid>,
}

impl IncomingRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.credentials = Credentials::login(login);
        self
    }

    pub fn with_request_id(mut self, id: Uuid) -> Self {
        self.request_id = Some(id);
        self
    }
}

/// Runs requests through the application
pub struct Dispatcher {
    application: Arc<Application>,
    services: Arc<Services>,
}

impl Dispatcher {
    pub fn new(application: Application, services: Services) -> Self {
        Self {
            application: Arc::new(application),
            services: Arc::new(services),
        }
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    pub fn application(&self) -> &Application {
        &self.application
    }

    /// Handle one request to completion
    pub async fn dispatch(&self, incoming: IncomingRequest) -> HandlerResult {
        let path = RequestPath::parse(&incoming.path)?;
        let identity = Identity::new(incoming.credentials, self.services.authenticator.clone());
        let mut req = RequestContext::new(self.services.clone(), path, incoming.params, identity);
        if let Some(id) = incoming.request_id {
            req = req.with_id(id);
        }

        let span = info_span!("request", id = %req.id(), path = %incoming.path);
        let outcome = self.application.handle(&mut req).instrument(span.clone()).await;

        span.in_scope(|| match &outcome {
            Ok(response) => debug!(content_type = %response.content_type, "Request handled"),
            Err(ControlSignal::Internal(msg)) => tracing::error!(error = %msg, "Request failed"),
            Err(signal) => info!(signal = %signal, "Request ended with signal"),
        });
        outcome
    }
}
