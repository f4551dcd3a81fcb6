use async_trait::async_trait;
use tabmarks_model::{HostResult, LiveEntry, LiveId, SavedId, SavedNode};

/// Host surface for tree and live-entry queries and actions. Calls may
/// fail because the entity vanished concurrently; callers degrade to
/// "not found" and never propagate.
#[async_trait]
pub trait SyncHost: Send + Sync {
    /// The persistent subtree under the root of interest.
    async fn saved_tree(&self, root: &SavedId) -> HostResult<Option<SavedNode>>;

    /// Snapshot of all live entries, in host order.
    async fn live_entries(&self) -> HostResult<Vec<LiveEntry>>;

    /// The currently focused live entry, if any.
    async fn active_live(&self) -> HostResult<Option<LiveId>>;

    /// Bring an existing live entry to the foreground.
    async fn focus_live(&self, live_id: LiveId) -> HostResult<()>;

    /// Open a new live entry for `url` and return its snapshot.
    async fn open_url(&self, url: &str) -> HostResult<LiveEntry>;
}
