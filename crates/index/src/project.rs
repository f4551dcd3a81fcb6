use tabmarks_model::{LiveEntry, LiveId, ProjectedView, SavedEntry};

use crate::index::ReconciliationIndex;

impl ReconciliationIndex {
    /// Project current state into the read-only presentation partitions.
    ///
    /// Refreshing the transient `is_active` flags is the one sanctioned
    /// mutation a projection performs; everything else is a pure read.
    /// At most one entry across all partitions is active, the one
    /// associated with `active_live`. `presentable` is the host
    /// classification predicate for unassociated live entries (e.g.
    /// excluding internal pages).
    pub fn project<F>(
        &mut self,
        active_live: Option<LiveId>,
        live: &[LiveEntry],
        presentable: F,
    ) -> ProjectedView
    where
        F: Fn(&LiveEntry) -> bool,
    {
        let active_saved = active_live.and_then(|id| self.by_live.get(&id).cloned());
        for entry in self.entries.values_mut() {
            entry.is_active = false;
        }
        if let Some(saved_id) = &active_saved {
            if let Some(entry) = self.entries.get_mut(saved_id) {
                entry.is_active = true;
            }
        }

        let pinned: Vec<SavedEntry> = self
            .pinned
            .iter()
            .filter_map(|id| self.entries.get(id))
            .cloned()
            .collect();

        // Pinned leaves live in the pinned partition only; folders stay in
        // the tree even when emptied by the filter. The root of interest
        // itself is not a row.
        let saved: Vec<SavedEntry> = self
            .order
            .iter()
            .filter(|id| **id != self.root_id)
            .filter_map(|id| self.entries.get(id))
            .filter(|entry| entry.is_folder || !entry.is_pinned)
            .cloned()
            .collect();

        let unassociated: Vec<LiveEntry> = live
            .iter()
            .filter(|l| !self.by_live.contains_key(&l.id))
            .filter(|l| presentable(l))
            .cloned()
            .collect();

        ProjectedView {
            pinned,
            saved,
            unassociated,
            active_live,
            pinned_ids: self.pinned.clone(),
            root_id: self.root_id.clone(),
        }
    }
}
