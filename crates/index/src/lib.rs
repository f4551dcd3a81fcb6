//! # Tabmarks Index
//!
//! The reconciliation index: a one-to-one association between persistent
//! saved entries and ephemeral live entries, keyed by normalized
//! destination.
//!
//! ## Structure
//!
//! ```text
//! SavedNode tree + LiveEntry list + pinned ids
//!     │
//!     ├──> Flattener (folders included, order preserved)
//!     │      └─> entity store + traversal order
//!     │
//!     ├──> Reverse indexes
//!     │      ├─ live id    -> saved id   (the partial bijection)
//!     │      └─ normalized -> saved ids  (match candidates, O(1) amortized)
//!     │
//!     └──> Projection
//!            └─> pinned / saved-tree / unassociated partitions
//! ```
//!
//! Every operation is total: stale ids are no-ops, ambiguous matches
//! resolve deterministically by tree-traversal order, and any state left
//! behind between operations is internally consistent. The orchestrator
//! falls back to [`ReconciliationIndex::rebuild`] whenever an incremental
//! path cannot compute its effect safely.

mod index;
mod project;

pub use index::ReconciliationIndex;
