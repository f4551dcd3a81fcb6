use log::{debug, warn};
use tabmarks_model::{GroupCategory, GroupId, GroupProps, LiveId};

use crate::host::GroupHost;

/// Keeps live-entry group membership consistent with the pinned/saved
/// partition. Holds at most one handle per category; a handle is only a
/// belief, and any host failure invalidates it back to Unbound.
pub struct GroupReconciler<H: GroupHost> {
    host: H,
    pinned: Option<GroupId>,
    saved: Option<GroupId>,
}

impl<H: GroupHost> GroupReconciler<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            pinned: None,
            saved: None,
        }
    }

    pub fn handle(&self, category: GroupCategory) -> Option<GroupId> {
        match category {
            GroupCategory::Pinned => self.pinned,
            GroupCategory::Saved => self.saved,
        }
    }

    fn set_handle(&mut self, category: GroupCategory, handle: Option<GroupId>) {
        match category {
            GroupCategory::Pinned => self.pinned = handle,
            GroupCategory::Saved => self.saved = handle,
        }
    }

    /// Rebind handles after a process (re)start from whatever labeled
    /// groups survived. Duplicates left behind by a crash are consolidated
    /// into the first group found.
    pub async fn recover_handles(&mut self) {
        for category in GroupCategory::ALL {
            let handle = self.find_and_consolidate(category).await;
            if let Some(id) = handle {
                debug!("recovered {} group handle {id}", category.label());
            }
            self.set_handle(category, handle);
        }
    }

    /// Put a live entry into its category's group, creating or recovering
    /// the group as needed. Label/color/collapsed state and relative
    /// ordering are re-asserted unconditionally afterwards; the host can
    /// reassign membership asynchronously after entry creation, and a
    /// conditional re-apply would race with that.
    pub async fn add_to_group(&mut self, live_id: LiveId, category: GroupCategory) {
        let Some((group, seeded)) = self.ensure_bound(category, live_id).await else {
            return;
        };
        if !seeded {
            if let Err(err) = self.host.group(&[live_id], Some(group)).await {
                warn!(
                    "failed to add live {live_id} to {} group: {err}",
                    category.label()
                );
                self.set_handle(category, None);
                return;
            }
        }
        self.assert_props(category).await;
        self.assert_order().await;
    }

    /// Explicit ungroup, then ordering re-assertion.
    pub async fn remove_from_group(&mut self, live_id: LiveId) {
        if let Err(err) = self.host.ungroup(&[live_id]).await {
            warn!("failed to ungroup live {live_id}: {err}");
        }
        self.assert_order().await;
    }

    /// A live entry may inherit group membership from the entry that
    /// spawned it. Unmanaged entries must never remain in a managed group:
    /// if `live_id` is unassociated but sits in one of our groups, it is
    /// ungrouped.
    pub async fn reconcile_orphan(&mut self, live_id: LiveId, is_associated: bool) {
        if is_associated {
            return;
        }
        let entry = match self.host.live_entry(live_id).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return,
            Err(err) => {
                warn!("orphan check for live {live_id} failed: {err}");
                return;
            }
        };
        let Some(group) = entry.group else {
            return;
        };
        if Some(group) == self.pinned || Some(group) == self.saved {
            if let Err(err) = self.host.ungroup(&[live_id]).await {
                warn!("failed to evict orphan live {live_id}: {err}");
            }
        }
    }

    /// Validate the remembered handle, else search by label (consolidating
    /// duplicates), else create a group seeded with `seed`. The returned
    /// flag says whether `seed` is already a member via creation.
    async fn ensure_bound(
        &mut self,
        category: GroupCategory,
        seed: LiveId,
    ) -> Option<(GroupId, bool)> {
        if let Some(group) = self.handle(category) {
            match self.host.members(group).await {
                Ok(_) => return Some((group, false)),
                Err(err) => {
                    warn!(
                        "{} group handle {group} is gone: {err}",
                        category.label()
                    );
                    self.set_handle(category, None);
                }
            }
        }
        if let Some(group) = self.find_and_consolidate(category).await {
            self.set_handle(category, Some(group));
            return Some((group, false));
        }
        match self.host.group(&[seed], None).await {
            Ok(group) => {
                self.set_handle(category, Some(group));
                Some((group, true))
            }
            Err(err) => {
                warn!("failed to create {} group: {err}", category.label());
                None
            }
        }
    }

    async fn find_and_consolidate(&mut self, category: GroupCategory) -> Option<GroupId> {
        let groups = match self.host.query_groups(category.label()).await {
            Ok(groups) => groups,
            Err(err) => {
                warn!("group query for {} failed: {err}", category.label());
                return None;
            }
        };
        let first = groups.first()?.id;
        for duplicate in &groups[1..] {
            let members = match self.host.members(duplicate.id).await {
                Ok(members) => members,
                Err(err) => {
                    warn!("duplicate group {} already gone: {err}", duplicate.id);
                    continue;
                }
            };
            if members.is_empty() {
                continue;
            }
            if let Err(err) = self.host.group(&members, Some(first)).await {
                warn!("failed to consolidate group {}: {err}", duplicate.id);
            }
        }
        Some(first)
    }

    async fn assert_props(&mut self, category: GroupCategory) {
        let Some(group) = self.handle(category) else {
            return;
        };
        let props = GroupProps::for_category(category);
        if let Err(err) = self.host.update_group(group, &props).await {
            warn!(
                "failed to re-assert {} group props: {err}",
                category.label()
            );
            self.set_handle(category, None);
        }
    }

    /// Pinned group leftmost, saved group immediately after. A handle
    /// disappearing mid-reorder drops to Unbound.
    async fn assert_order(&mut self) {
        let mut saved_index = 0u32;
        if let Some(group) = self.pinned {
            match self.host.move_group(group, 0).await {
                Ok(()) => match self.host.members(group).await {
                    Ok(members) => saved_index = members.len() as u32,
                    Err(err) => {
                        warn!("pinned group {group} vanished mid-reorder: {err}");
                        self.pinned = None;
                    }
                },
                Err(err) => {
                    warn!("failed to move pinned group {group}: {err}");
                    self.pinned = None;
                }
            }
        }
        if let Some(group) = self.saved {
            if let Err(err) = self.host.move_group(group, saved_index).await {
                warn!("failed to move saved group {group}: {err}");
                self.saved = None;
            }
        }
    }
}
