//! Top-level request handler
//!
//! The application picks the first module from the first path segment:
//! reserved system prefixes come from a static table, everything else
//! from the page mapping. An empty path lands on the first visible menu
//! item.

use crate::context::RequestContext;
use crate::documentation::DOCUMENTATION_MODULE;
use crate::frame::ForwardMetadata;
use crate::management::MANAGEMENT_MODULE;
use crate::mapping::PageMapping;
use crate::menu::MenuProvider;
use crate::signal::{ControlSignal, HandlerResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Root handler of a site
///
/// Not a frame on the forwarding stack itself; the first frame is the
/// module it forwards to.
pub struct Application {
    static_mapping: BTreeMap<String, String>,
    pages: Option<PageMapping>,
    menu: Arc<dyn MenuProvider>,
}

impl Application {
    pub fn new(menu: Arc<dyn MenuProvider>) -> Self {
        Self {
            static_mapping: BTreeMap::new(),
            pages: None,
            menu,
        }
    }

    /// Application with the reserved `_doc` and `_wmi` prefixes mapped
    pub fn standard(menu: Arc<dyn MenuProvider>) -> Self {
        Self::new(menu)
            .with_static("_doc", DOCUMENTATION_MODULE)
            .with_static("_wmi", MANAGEMENT_MODULE)
    }

    pub fn with_static(mut self, prefix: impl Into<String>, module: impl Into<String>) -> Self {
        self.static_mapping.insert(prefix.into(), module.into());
        self
    }

    pub fn with_pages(mut self, pages: PageMapping) -> Self {
        self.pages = Some(pages);
        self
    }

    pub fn static_mapping(&self) -> &BTreeMap<String, String> {
        &self.static_mapping
    }

    pub async fn handle(&self, req: &mut RequestContext) -> HandlerResult {
        let Some(identifier) = req.path().peek().map(str::to_owned) else {
            return self.handle_root(req).await;
        };

        let module_name = match self.static_mapping.get(&identifier) {
            Some(name) => name.clone(),
            None => match &self.pages {
                Some(pages) => pages.resolve(req, &identifier).await?,
                None => return Err(ControlSignal::NotFound),
            },
        };

        let module = req.registry().require(&module_name)?;
        req.path_mut().consume();
        req.forward(module, ForwardMetadata::new()).await
    }

    async fn handle_root(&self, req: &RequestContext) -> HandlerResult {
        let menu: Vec<_> = self
            .menu
            .menu(req)
            .await
            .into_iter()
            .filter(|item| !item.hidden)
            .collect();

        // Authenticate before redirecting so that login and logout
        // requests are not lost with the redirect
        let user = req.identity().user().await.unwrap_or(None);

        if let Some(first) = menu.first() {
            debug!(uri = %first.uri, "Redirecting root to first menu item");
            return Err(ControlSignal::redirect(first.uri.clone()));
        }
        match user {
            None => Err(ControlSignal::AuthenticationRequired),
            Some(_) => Err(ControlSignal::Forbidden),
        }
    }
}
