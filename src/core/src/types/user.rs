//! User account types

use crate::traits::User;
use crate::types::RoleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Numeric user identifier
pub type Uid = i64;

/// Account life cycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserState {
    /// Registered but not yet confirmed
    New,
    /// Confirmed, waiting for administrator approval
    Unapproved,
    #[default]
    Enabled,
    Disabled,
}

/// Plain account record implementing [`User`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub uid: Uid,
    pub login: String,
    #[serde(default)]
    pub roles: BTreeSet<RoleId>,
    #[serde(default)]
    pub state: UserState,
}

impl Account {
    pub fn new(uid: Uid, login: impl Into<String>) -> Self {
        Self {
            uid,
            login: login.into(),
            roles: BTreeSet::new(),
            state: UserState::Enabled,
        }
    }

    pub fn with_role(mut self, role: impl Into<RoleId>) -> Self {
        self.roles.insert(role.into());
        self
    }

    pub fn with_state(mut self, state: UserState) -> Self {
        self.state = state;
        self
    }
}

impl User for Account {
    fn uid(&self) -> Uid {
        self.uid
    }

    fn login(&self) -> &str {
        &self.login
    }

    fn explicit_role_ids(&self) -> &BTreeSet<RoleId> {
        &self.roles
    }

    fn state(&self) -> UserState {
        self.state
    }
}
