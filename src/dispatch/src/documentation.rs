//! Documentation pages under the reserved `_doc` prefix

use crate::context::RequestContext;
use crate::module::Module;
use crate::signal::{ControlSignal, HandlerResult, Response};
use async_trait::async_trait;
use serde_json::json;
use wiking_authz::{actions, AccessPolicy};

pub const DOCUMENTATION_MODULE: &str = "Documentation";

/// Resolves the whole remaining path as a document name
#[derive(Debug, Default)]
pub struct Documentation {
    policy: AccessPolicy,
}

impl Documentation {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Module for Documentation {
    fn name(&self) -> &str {
        DOCUMENTATION_MODULE
    }

    fn access_policy(&self) -> &AccessPolicy {
        &self.policy
    }

    async fn handle(&self, req: &mut RequestContext) -> HandlerResult {
        let document = req.path_mut().consume_all();
        if document.is_empty() {
            return Err(ControlSignal::NotFound);
        }
        req.authorize(self, actions::VIEW, None).await?;
        Response::json(&json!({ "document": document.join("/") }))
    }
}
