//! Role and containment edge types

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Role identifier
pub type RoleId = String;

/// A named, assignable capability bucket
///
/// Two roles are the same role when their ids match; the display name
/// is presentation only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub display_name: String,
}

impl Role {
    pub fn new(id: impl Into<RoleId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Role whose display name is its id, used when no catalogue entry exists
    pub fn bare(id: impl Into<RoleId>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
        }
    }
}

impl PartialEq for Role {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Role {}

impl Hash for Role {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// Containment edge: members of `container` gain the rights of `granted`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleEdge {
    pub container: RoleId,
    pub granted: RoleId,
}

impl RoleEdge {
    pub fn new(container: impl Into<RoleId>, granted: impl Into<RoleId>) -> Self {
        Self {
            container: container.into(),
            granted: granted.into(),
        }
    }
}
