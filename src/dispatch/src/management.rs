//! Management interface under the reserved `_wmi` prefix
//!
//! Administration modules are grouped into sections. The path is
//! `/_wmi/<section>/<module>`; a missing part redirects to the first
//! module of the (first) section.

use crate::context::RequestContext;
use crate::frame::ForwardMetadata;
use crate::module::Module;
use crate::path::uri_of;
use crate::signal::{ControlSignal, HandlerResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wiking_authz::{roles, AccessPolicy};

pub const MANAGEMENT_MODULE: &str = "WikingManagementInterface";

/// Action checked when entering the interface
pub const ENTER: &str = "enter";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    /// Module names in menu order
    pub modules: Vec<String>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>, modules: &[&str]) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            modules: modules.iter().map(|m| m.to_string()).collect(),
        }
    }
}

pub struct ManagementInterface {
    sections: Vec<Section>,
    policy: AccessPolicy,
}

impl ManagementInterface {
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            sections,
            policy: AccessPolicy::new().with_rights(ENTER, &roles::ADMIN_ROLES),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    fn first_module_uri(base: &[String], section: &Section) -> Option<String> {
        let module = section.modules.first()?;
        let mut path = base.to_vec();
        path.push(section.id.clone());
        path.push(module.clone());
        Some(uri_of(&path))
    }
}

#[async_trait]
impl Module for ManagementInterface {
    fn name(&self) -> &str {
        MANAGEMENT_MODULE
    }

    fn title(&self) -> &str {
        "Management interface"
    }

    fn access_policy(&self) -> &AccessPolicy {
        &self.policy
    }

    async fn handle(&self, req: &mut RequestContext) -> HandlerResult {
        req.authorize(self, ENTER, None).await?;
        let base = req.path().resolved().to_vec();

        let Some(section_id) = req.path().peek().map(str::to_owned) else {
            return self
                .sections
                .iter()
                .find_map(|section| Self::first_module_uri(&base, section))
                .map(|uri| Err(ControlSignal::redirect(uri)))
                .unwrap_or(Err(ControlSignal::NotFound));
        };

        let section = self
            .sections
            .iter()
            .find(|section| section.id == section_id)
            .ok_or(ControlSignal::NotFound)?;
        req.path_mut().consume();

        match req.path().peek().map(str::to_owned) {
            None => Self::first_module_uri(&base, section)
                .map(|uri| Err(ControlSignal::redirect(uri)))
                .unwrap_or(Err(ControlSignal::NotFound)),
            Some(module_name) if section.modules.contains(&module_name) => {
                let module = req.registry().require(&module_name)?;
                req.path_mut().consume();
                req.forward(module, ForwardMetadata::new().with_arg("section", section.id.clone()))
                    .await
            }
            Some(_) => Err(ControlSignal::NotFound),
        }
    }
}
