//! Module abstraction and bindings

use crate::context::RequestContext;
use crate::signal::HandlerResult;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use wiking_authz::AccessPolicy;
use wiking_core::Record;

/// Decides per parent record whether a binding may be entered
pub type EnabledPredicate = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// Parent to child delegation of a sub-path segment
///
/// A module resolved to a record hands the next path segment to
/// `target_module` when it equals `id`. With a binding column set, the
/// child only sees its rows whose binding column equals the parent
/// record's key.
#[derive(Clone)]
pub struct Binding {
    pub id: String,
    pub title: String,
    pub target_module: String,
    pub binding_column: Option<String>,
    enabled: EnabledPredicate,
}

impl Binding {
    pub fn new(id: impl Into<String>, title: impl Into<String>, target_module: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            target_module: target_module.into(),
            binding_column: None,
            enabled: Arc::new(|_| true),
        }
    }

    pub fn with_binding_column(mut self, column: impl Into<String>) -> Self {
        self.binding_column = Some(column.into());
        self
    }

    pub fn with_enabled<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.enabled = Arc::new(predicate);
        self
    }

    pub fn is_enabled(&self, record: &Record) -> bool {
        (self.enabled)(record)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("target_module", &self.target_module)
            .field("binding_column", &self.binding_column)
            .finish_non_exhaustive()
    }
}

/// Named request handler
#[async_trait]
pub trait Module: Send + Sync {
    /// Registry name, unique per application
    fn name(&self) -> &str;

    fn title(&self) -> &str {
        self.name()
    }

    fn bindings(&self) -> &[Binding] {
        &[]
    }

    fn access_policy(&self) -> &AccessPolicy;

    /// Handle the unresolved rest of the request path
    async fn handle(&self, req: &mut RequestContext) -> HandlerResult;

    /// Whether the caller may perform `action`, optionally on `record`
    async fn authorized(&self, req: &RequestContext, action: &str, record: Option<&Record>) -> bool {
        req.gate()
            .authorized(req.identity(), self.access_policy(), action, record)
            .await
    }
}
