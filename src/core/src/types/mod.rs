//! Shared types for the Wiking core

pub mod record;
pub mod role;
pub mod user;

// Re-export commonly used types
pub use record::Record;
pub use role::{Role, RoleEdge, RoleId};
pub use user::{Account, Uid, UserState};
