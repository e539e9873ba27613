//! Shared traits for the Wiking core

pub mod record;
pub mod source;
pub mod user;

// Re-export commonly used traits
pub use record::{Condition, RecordLookup};
pub use source::{RoleEdgeSource, RoleSource};
pub use user::User;
