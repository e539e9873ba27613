//! Navigation menu

use crate::context::RequestContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use wiking_core::RoleId;

/// One menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub uri: String,
    pub title: String,
    /// Reachable but not listed in navigation
    #[serde(default)]
    pub hidden: bool,
    /// Roles that may see the item; empty means everybody
    #[serde(default)]
    pub visible_to: Vec<RoleId>,
}

impl MenuItem {
    pub fn new(uri: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
            hidden: false,
            visible_to: Vec::new(),
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn visible_to(mut self, roles: &[&str]) -> Self {
        self.visible_to = roles.iter().map(|r| r.to_string()).collect();
        self
    }
}

/// Source of the caller's menu
#[async_trait]
pub trait MenuProvider: Send + Sync {
    /// Items the caller may see, hidden ones included
    async fn menu(&self, req: &RequestContext) -> Vec<MenuItem>;
}

/// Fixed list of items filtered by role visibility
#[derive(Debug, Clone, Default)]
pub struct StaticMenu {
    items: Vec<MenuItem>,
}

impl StaticMenu {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl MenuProvider for StaticMenu {
    async fn menu(&self, req: &RequestContext) -> Vec<MenuItem> {
        let mut visible = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if item.visible_to.is_empty() || req.has_any_role(&item.visible_to).await {
                visible.push(item.clone());
            }
        }
        visible
    }
}
