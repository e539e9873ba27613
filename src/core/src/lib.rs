//! # Wiking Core
//!
//! Shared types, traits, and error handling for the Wiking routing and
//! authorization crates. Keeps the role graph, the gate, and the
//! dispatcher free of circular dependencies.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use traits::{Condition, RecordLookup, RoleEdgeSource, RoleSource, User};
pub use types::{Account, Record, Role, RoleEdge, RoleId, Uid, UserState};
