//! Per-module access policy
//!
//! The default policy lets anybody read (`view`, `list`, `rss`,
//! `print_field`), requires an elevated role to write (`insert`,
//! `update`, `delete`) and denies every other action. Explicit rights
//! per action override all of that.

use crate::roles;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wiking_core::RoleId;

/// Well-known action names
pub mod actions {
    pub const VIEW: &str = "view";
    pub const LIST: &str = "list";
    pub const RSS: &str = "rss";
    pub const PRINT_FIELD: &str = "print_field";
    pub const INSERT: &str = "insert";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
}

/// Actions permitted to everybody unless overridden
pub const READ_ONLY_ACTIONS: [&str; 4] = [
    actions::VIEW,
    actions::LIST,
    actions::RSS,
    actions::PRINT_FIELD,
];

/// Actions requiring the elevated roles unless overridden
pub const MUTATING_ACTIONS: [&str; 3] = [actions::INSERT, actions::UPDATE, actions::DELETE];

/// What an action requires from the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Permitted without looking at the caller
    Always,
    /// Permitted when the caller holds any of these roles
    AnyOf(Vec<RoleId>),
    Never,
}

/// Access rules of one module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// Explicit rights per action name
    #[serde(default)]
    pub rights: BTreeMap<String, Vec<RoleId>>,

    /// Roles required by mutating actions without explicit rights
    #[serde(default = "default_elevated_roles")]
    pub elevated_roles: Vec<RoleId>,

    /// Column holding the owner's uid; enables the `owner` pseudo-role
    #[serde(default)]
    pub owner_column: Option<String>,
}

fn default_elevated_roles() -> Vec<RoleId> {
    vec![roles::ADMIN.to_string()]
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            rights: BTreeMap::new(),
            elevated_roles: default_elevated_roles(),
            owner_column: None,
        }
    }
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set explicit rights for an action
    ///
    /// An empty role list denies the action to everybody.
    pub fn with_rights(mut self, action: impl Into<String>, role_ids: &[&str]) -> Self {
        self.rights.insert(action.into(), roles::ids(role_ids));
        self
    }

    pub fn with_elevated_roles(mut self, role_ids: &[&str]) -> Self {
        self.elevated_roles = roles::ids(role_ids);
        self
    }

    pub fn with_owner_column(mut self, column: impl Into<String>) -> Self {
        self.owner_column = Some(column.into());
        self
    }

    pub fn requirement(&self, action: &str) -> Requirement {
        if let Some(role_ids) = self.rights.get(action) {
            return requirement_of(role_ids);
        }
        if READ_ONLY_ACTIONS.contains(&action) {
            Requirement::Always
        } else if MUTATING_ACTIONS.contains(&action) {
            requirement_of(&self.elevated_roles)
        } else {
            Requirement::Never
        }
    }
}

fn requirement_of(role_ids: &[RoleId]) -> Requirement {
    if role_ids.iter().any(|r| r == roles::ANYONE) {
        Requirement::Always
    } else if role_ids.is_empty() {
        Requirement::Never
    } else {
        Requirement::AnyOf(role_ids.to_vec())
    }
}
