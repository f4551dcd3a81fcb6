//! # Tabmarks Groups
//!
//! The group reconciler: keeps at most two host-visible visual groups
//! ("pinned" and "saved") consistent with the index's partition of live
//! entries, and recovers its group handles after a process restart.
//!
//! ## Handle lifecycle
//!
//! ```text
//! Unbound ──recover/create──> Bound ──host removal──> Unbound
//! ```
//!
//! The reconciler owns no entity data; it reads association results from
//! the index (via its caller) and talks to the host through [`GroupHost`].
//! Host failures are never fatal: the affected handle drops back to
//! Unbound and recovery is retried on the next operation.

mod host;
mod reconciler;

pub use host::{GroupHost, GroupInfo};
pub use reconciler::GroupReconciler;
