//! # Tabmarks Model
//!
//! Shared data model for the tabmarks reconciliation engine.
//!
//! ## Ownership
//!
//! ```text
//! Host (persistent tree, live entries)
//!     │
//!     ├──> SavedNode / LiveEntry (host-shaped inputs)
//!     │
//!     ├──> Reconciliation Index
//!     │      └─> SavedEntry (enriched, index-owned)
//!     │
//!     └──> ProjectedView (read-only partitions for presentation)
//! ```
//!
//! The host owns the persistent tree and the live entries; the index owns
//! the enriched model exclusively and the host never reads it back.

mod command;
mod entries;
mod host;

pub use command::{Command, GroupCategory, GroupProps};
pub use entries::{
    GroupId, LiveEntry, LiveId, ProjectedView, SavedEntry, SavedId, SavedNode,
};
pub use host::{HostError, HostResult};
