//! Role containment graph
//!
//! Answers transitive closure queries over role containment edges
//! (`container -> granted`). Edges are read from a [`RoleEdgeSource`]
//! and cached in an immutable snapshot together with a memo of already
//! computed closures. A snapshot older than the configured TTL is
//! rebuilt on the next query, so an edge written to the source becomes
//! visible within one TTL window.
//!
//! [`RoleEdgeSource`]: wiking_core::RoleEdgeSource

mod clock;
mod resolver;
mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use resolver::{RoleGraph, RoleGraphConfig, RoleGraphStats};
pub use snapshot::Direction;
