//! # Wiking Authorization
//!
//! Role containment resolution and authorization decisions:
//!
//! - **Role graph**: transitive closure over role containment edges with
//!   a TTL-bounded two-tier cache
//! - **Identity**: lazily authenticated caller of one request
//! - **Access policy**: per-module action rules
//! - **Authorization gate**: policy plus identity plus role graph
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use wiking_authz::{AccessPolicy, AuthorizationGate, Identity, RoleGraph};
//! use wiking_authz::memory::InMemoryRoleStore;
//!
//! # async fn example() {
//! let store = Arc::new(InMemoryRoleStore::new());
//! let gate = AuthorizationGate::new(Arc::new(RoleGraph::new(store.clone(), store)));
//!
//! let allowed = gate
//!     .authorized(&Identity::anonymous(), &AccessPolicy::default(), "view", None)
//!     .await;
//! assert!(allowed);
//! # }
//! ```

pub mod error;
pub mod gate;
pub mod identity;
pub mod memory;
pub mod policy;
pub mod role_graph;
pub mod roles;

pub use error::{AuthzError, Result};
pub use gate::AuthorizationGate;
pub use identity::{Authenticator, Credentials, Identity, NoAuthentication};
pub use policy::{actions, AccessPolicy, Requirement};
pub use role_graph::{Clock, ManualClock, RoleGraph, RoleGraphConfig, SystemClock};
