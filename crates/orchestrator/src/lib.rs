//! # Tabmarks Orchestrator
//!
//! Wires host lifecycle notifications into the reconciliation index and
//! the group reconciler, persists pinned order and presentation settings,
//! and relays debounced [`ProjectedView`] snapshots to the presentation
//! layer.
//!
//! ## Flow
//!
//! ```text
//! HostEvent (mpsc) ─┐
//!                   ├──> Orchestrator ──> ReconciliationIndex
//! Command (mpsc) ───┘        │                  │
//!                            │                  └─> GroupReconciler
//!                            │
//!                            └─ debounce ──> ProjectedView (watch)
//! ```
//!
//! Single logical worker: one `tokio::select!` loop dispatches one handler
//! at a time. The index's maps carry no locks; handlers leave only
//! internally consistent state behind at every await point, and any
//! structurally ambiguous notification falls back to a full
//! [`Orchestrator::resync`].
//!
//! [`ProjectedView`]: tabmarks_model::ProjectedView

mod debounce;
mod error;
mod events;
mod host;
mod orchestrator;
mod settings;

pub use debounce::Debouncer;
pub use error::{OrchestratorError, Result};
pub use events::HostEvent;
pub use host::SyncHost;
pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use settings::{
    JsonSettingsStore, Settings, SettingsStore, SETTINGS_SCHEMA_VERSION,
};
