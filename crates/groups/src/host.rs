use async_trait::async_trait;
use tabmarks_model::{GroupId, GroupProps, HostResult, LiveEntry, LiveId};

/// A host-visible group as returned by a label query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub id: GroupId,
    pub label: String,
}

/// Host surface for visual-group mutations.
///
/// Any call may fail because the target vanished mid-operation; callers
/// treat failure as absence and degrade.
#[async_trait]
pub trait GroupHost: Send + Sync {
    /// All existing groups carrying `label`, in host order.
    async fn query_groups(&self, label: &str) -> HostResult<Vec<GroupInfo>>;

    /// Live entries currently inside `group`.
    async fn members(&self, group: GroupId) -> HostResult<Vec<LiveId>>;

    /// Add entries to `group`, or create a new group from them when
    /// `group` is `None`. Returns the (possibly new) group id.
    async fn group(&self, live_ids: &[LiveId], group: Option<GroupId>) -> HostResult<GroupId>;

    /// Remove entries from whatever group they are in.
    async fn ungroup(&self, live_ids: &[LiveId]) -> HostResult<()>;

    /// Re-apply label, color, and collapsed state.
    async fn update_group(&self, group: GroupId, props: &GroupProps) -> HostResult<()>;

    /// Move the whole group so its first entry sits at `index` within the
    /// live entries' organizational unit.
    async fn move_group(&self, group: GroupId, index: u32) -> HostResult<()>;

    /// Current snapshot of one live entry, `None` if it no longer exists.
    async fn live_entry(&self, live_id: LiveId) -> HostResult<Option<LiveEntry>>;
}
