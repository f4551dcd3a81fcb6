use log::debug;
use std::collections::{HashMap, HashSet, VecDeque};
use tabmarks_model::{LiveEntry, LiveId, SavedEntry, SavedId, SavedNode};

/// Bound on walk-toward-root traversals. Host trees with corrupted parent
/// links could otherwise loop; exhaustion is treated as "not found".
const MAX_PARENT_DEPTH: usize = 64;

/// Canonical entity store plus the reverse indexes and the pinned order.
///
/// Owns the enriched [`SavedEntry`] model exclusively. Every operation is
/// total: a stale id is a no-op, never an error.
pub struct ReconciliationIndex {
    pub(crate) entries: HashMap<SavedId, SavedEntry>,
    /// Flattened tree-traversal order, root first. Determines first-fit
    /// priority for ambiguous destination matches.
    pub(crate) order: Vec<SavedId>,
    /// Live side of the partial bijection.
    pub(crate) by_live: HashMap<LiveId, SavedId>,
    /// Normalized destination -> saved ids sharing it (folders excluded),
    /// buckets kept in traversal order.
    pub(crate) by_url: HashMap<String, Vec<SavedId>>,
    pub(crate) pinned: Vec<SavedId>,
    pub(crate) root_id: SavedId,
}

impl ReconciliationIndex {
    pub fn new(root_id: impl Into<SavedId>) -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            by_live: HashMap::new(),
            by_url: HashMap::new(),
            pinned: Vec::new(),
            root_id: root_id.into(),
        }
    }

    /// Discard all in-memory state and recompute from scratch.
    ///
    /// Greedy matching is first-fit by traversal order: for each saved
    /// entry in tree order, the first not-yet-consumed live entry (in
    /// live-input order) with a matching destination is taken. Pinned ids
    /// absent from the rebuilt entity set are dropped from the in-memory
    /// order; persisting the pruned list is the caller's concern.
    ///
    /// Idempotent: identical inputs rebuild identical state.
    pub fn rebuild(
        &mut self,
        tree: &SavedNode,
        live: &[LiveEntry],
        pinned_ids: &[SavedId],
        root_id: &SavedId,
    ) {
        self.entries.clear();
        self.order.clear();
        self.by_live.clear();
        self.by_url.clear();
        self.pinned.clear();
        self.root_id = root_id.clone();

        // Phase 1: flatten, folders included, order preserved
        let mut flat = Vec::new();
        flatten(tree, None, 0, &mut flat);
        for entry in flat {
            if !entry.is_folder {
                if let Some(url) = entry.url.as_deref() {
                    self.by_url
                        .entry(tabmarks_matcher::normalize(url))
                        .or_default()
                        .push(entry.id.clone());
                }
            }
            self.order.push(entry.id.clone());
            self.entries.insert(entry.id.clone(), entry);
        }

        // Phase 2: greedy first-fit matching via per-destination queues of
        // live entries in input order
        let mut free: HashMap<String, VecDeque<&LiveEntry>> = HashMap::new();
        for live_entry in live {
            if let Some(url) = live_entry.url.as_deref() {
                free.entry(tabmarks_matcher::normalize(url))
                    .or_default()
                    .push_back(live_entry);
            }
        }
        for id in self.order.clone() {
            let Some(entry) = self.entries.get_mut(&id) else {
                continue;
            };
            if entry.is_folder {
                continue;
            }
            let Some(url) = entry.url.as_deref() else {
                continue;
            };
            let Some(queue) = free.get_mut(&tabmarks_matcher::normalize(url)) else {
                continue;
            };
            if let Some(live_entry) = queue.pop_front() {
                entry.live_id = Some(live_entry.id);
                entry.live_url = live_entry.url.clone();
                entry.favicon = live_entry.favicon.clone();
                self.by_live.insert(live_entry.id, id);
            }
        }

        // Phase 3: pinned order, stale ids dropped
        for pinned_id in pinned_ids {
            if let Some(entry) = self.entries.get_mut(pinned_id) {
                entry.is_pinned = true;
                if !self.pinned.contains(pinned_id) {
                    self.pinned.push(pinned_id.clone());
                }
            } else {
                debug!("rebuild: dropping stale pinned id {pinned_id}");
            }
        }
    }

    /// Forcibly associate, tearing down any existing association on either
    /// end first. Snapshot fields are updated when supplied.
    pub fn associate(
        &mut self,
        saved_id: &SavedId,
        live_id: LiveId,
        snapshot: Option<&LiveEntry>,
    ) -> bool {
        if !self.entries.contains_key(saved_id) {
            return false;
        }
        let (live_url, favicon) = match snapshot {
            Some(s) => (s.url.clone(), s.favicon.clone()),
            None => (None, None),
        };
        self.bind(saved_id.clone(), live_id, live_url, favicon);
        true
    }

    /// Remove an association from the saved side; clears the live snapshot
    /// and the active flag.
    pub fn dissociate(&mut self, saved_id: &SavedId) -> bool {
        let Some(entry) = self.entries.get_mut(saved_id) else {
            return false;
        };
        let Some(live_id) = entry.live_id.take() else {
            return false;
        };
        entry.live_url = None;
        entry.favicon = None;
        entry.is_active = false;
        self.by_live.remove(&live_id);
        true
    }

    /// Remove an association from the live side.
    pub fn dissociate_by_live(&mut self, live_id: LiveId) -> bool {
        let Some(saved_id) = self.by_live.get(&live_id).cloned() else {
            return false;
        };
        self.dissociate(&saved_id)
    }

    /// Associate `live_id` with the first free saved entry matching `url`,
    /// in traversal order. Mutates nothing and returns `None` when every
    /// candidate is taken.
    pub fn try_associate_by_url(
        &mut self,
        live_id: LiveId,
        url: &str,
        snapshot: Option<&LiveEntry>,
    ) -> Option<SavedId> {
        let key = tabmarks_matcher::normalize(url);
        let candidate = self
            .by_url
            .get(&key)?
            .iter()
            .find(|id| {
                self.entries
                    .get(*id)
                    .is_some_and(|e| !e.is_folder && e.live_id.is_none())
            })
            .cloned()?;
        let favicon = snapshot.and_then(|s| s.favicon.clone());
        self.bind(candidate.clone(), live_id, Some(url.to_string()), favicon);
        Some(candidate)
    }

    /// A live entry changed destination while still existing.
    ///
    /// The current association (if any) is tentatively broken and the new
    /// destination re-matched. With no free candidate the original
    /// association is rolled back as a shadow link, with its stored
    /// snapshot refreshed to the new destination so the divergence from
    /// the saved destination stays visible. Returns the saved id the live
    /// entry ends up associated with.
    pub fn handle_navigation(
        &mut self,
        live_id: LiveId,
        new_url: &str,
        snapshot: Option<&LiveEntry>,
    ) -> Option<SavedId> {
        let Some(previous) = self.by_live.get(&live_id).cloned() else {
            return self.try_associate_by_url(live_id, new_url, snapshot);
        };
        let previous_favicon = self.entries.get(&previous).and_then(|e| e.favicon.clone());
        // Tentative break. Any handler reading between here and the rebind
        // sees a merely-unassociated entry, which is consistent.
        self.dissociate(&previous);
        if let Some(rematched) = self.try_associate_by_url(live_id, new_url, snapshot) {
            debug!("navigation moved live {live_id}: {previous} -> {rematched}");
            return Some(rematched);
        }
        let favicon = snapshot
            .and_then(|s| s.favicon.clone())
            .or(previous_favicon);
        self.bind(previous.clone(), live_id, Some(new_url.to_string()), favicon);
        Some(previous)
    }

    /// Idempotent pin. Returns whether the pinned order changed; pinning
    /// an already-pinned id is a no-op on the order, not an error.
    pub fn pin(&mut self, saved_id: &SavedId) -> bool {
        let Some(entry) = self.entries.get_mut(saved_id) else {
            return false;
        };
        entry.is_pinned = true;
        if self.pinned.contains(saved_id) {
            return false;
        }
        self.pinned.push(saved_id.clone());
        true
    }

    /// Idempotent unpin. Returns whether the pinned order changed.
    pub fn unpin(&mut self, saved_id: &SavedId) -> bool {
        if let Some(entry) = self.entries.get_mut(saved_id) {
            entry.is_pinned = false;
        }
        let before = self.pinned.len();
        self.pinned.retain(|id| id != saved_id);
        self.pinned.len() != before
    }

    /// Remove then re-insert at a clamped index. No-op when absent.
    pub fn reorder_pinned(&mut self, saved_id: &SavedId, to_index: usize) -> bool {
        let Some(position) = self.pinned.iter().position(|id| id == saved_id) else {
            return false;
        };
        let id = self.pinned.remove(position);
        let clamped = to_index.min(self.pinned.len());
        self.pinned.insert(clamped, id);
        true
    }

    /// Drop pinned ids that no longer reference a saved entry. Returns
    /// whether anything changed, signalling the caller to persist.
    pub fn cleanup_pinned(&mut self) -> bool {
        let before = self.pinned.len();
        let entries = &self.entries;
        self.pinned.retain(|id| entries.contains_key(id));
        self.pinned.len() != before
    }

    /// Incrementally add a node (subtree included), splicing it into the
    /// flattened order by parent and sibling index, then attempt an
    /// opportunistic match against currently free live entries.
    pub fn add_entry(&mut self, node: &SavedNode, live: &[LiveEntry]) {
        if self.entries.contains_key(&node.id) {
            self.remove_entry(&node.id);
        }
        let mut flat = Vec::new();
        flatten(node, None, node.index.unwrap_or(0), &mut flat);
        let ids: Vec<SavedId> = flat.iter().map(|e| e.id.clone()).collect();

        let position = self.insertion_pos(node.parent_id.as_ref(), node.index);
        self.order.splice(position..position, ids.iter().cloned());

        let mut touched_keys = HashSet::new();
        for entry in flat {
            if !entry.is_folder {
                if let Some(url) = entry.url.as_deref() {
                    touched_keys.insert(tabmarks_matcher::normalize(url));
                }
            }
            self.entries.insert(entry.id.clone(), entry);
        }
        for key in touched_keys {
            self.rebuild_bucket(&key);
        }

        for id in &ids {
            let Some(entry) = self.entries.get(id) else {
                continue;
            };
            if entry.is_folder || entry.live_id.is_some() {
                continue;
            }
            let Some(url) = entry.url.clone() else {
                continue;
            };
            if let Some((live_id, live_url, favicon)) = self.free_live_snapshot(&url, live) {
                self.bind(id.clone(), live_id, live_url, favicon);
            }
        }
    }

    /// Remove an entry and its subtree. Associations of removed entries
    /// are dissociated; the pinned order is left for [`Self::cleanup_pinned`]
    /// to prune and report.
    pub fn remove_entry(&mut self, saved_id: &SavedId) -> bool {
        if !self.entries.contains_key(saved_id) {
            return false;
        }
        let doomed: Vec<SavedId> = self
            .order
            .iter()
            .filter(|id| *id == saved_id || self.has_ancestor(id, saved_id))
            .cloned()
            .collect();
        let mut touched_keys = HashSet::new();
        for id in &doomed {
            if let Some(entry) = self.entries.remove(id) {
                if let Some(live_id) = entry.live_id {
                    self.by_live.remove(&live_id);
                }
                if !entry.is_folder {
                    if let Some(url) = entry.url.as_deref() {
                        touched_keys.insert(tabmarks_matcher::normalize(url));
                    }
                }
            }
        }
        self.order.retain(|id| !doomed.contains(id));
        for key in touched_keys {
            self.rebuild_bucket(&key);
        }
        true
    }

    /// Host-reported destination change on a saved entry. Maintains the
    /// reverse index and repairs the association: a now-mismatched live
    /// entry is dissociated and a free matching one claimed when present.
    pub fn update_destination(
        &mut self,
        saved_id: &SavedId,
        new_url: Option<&str>,
        live: &[LiveEntry],
    ) {
        let Some(entry) = self.entries.get(saved_id) else {
            return;
        };
        if entry.is_folder {
            return;
        }
        let old_key = entry.url.as_deref().map(tabmarks_matcher::normalize);
        let new_key = new_url.map(tabmarks_matcher::normalize);
        if let Some(entry) = self.entries.get_mut(saved_id) {
            entry.url = new_url.map(str::to_string);
        }
        if old_key != new_key {
            if let Some(key) = old_key {
                self.rebuild_bucket(&key);
            }
            if let Some(key) = &new_key {
                self.rebuild_bucket(key);
            }
        }

        let (associated, live_url) = match self.entries.get(saved_id) {
            Some(e) => (e.live_id, e.live_url.clone()),
            None => return,
        };
        if associated.is_some() {
            if tabmarks_matcher::matches(new_url, live_url.as_deref()) {
                return;
            }
            self.dissociate(saved_id);
        }
        if let Some(url) = new_url {
            if let Some((live_id, live_url, favicon)) = self.free_live_snapshot(url, live) {
                self.bind(saved_id.clone(), live_id, live_url, favicon);
            }
        }
    }

    /// Host-reported rename.
    pub fn set_title(&mut self, saved_id: &SavedId, title: &str) {
        if let Some(entry) = self.entries.get_mut(saved_id) {
            entry.title = title.to_string();
        }
    }

    pub fn entry(&self, saved_id: &SavedId) -> Option<&SavedEntry> {
        self.entries.get(saved_id)
    }

    /// Live ids associated with `saved_id` or any of its descendants.
    /// Callers use this to ungroup before a subtree removal.
    pub fn subtree_live_ids(&self, saved_id: &SavedId) -> Vec<LiveId> {
        self.order
            .iter()
            .filter(|id| *id == saved_id || self.has_ancestor(id, saved_id))
            .filter_map(|id| self.entries.get(id).and_then(|e| e.live_id))
            .collect()
    }

    pub fn saved_for_live(&self, live_id: LiveId) -> Option<&SavedId> {
        self.by_live.get(&live_id)
    }

    pub fn is_pinned(&self, saved_id: &SavedId) -> bool {
        self.entries.get(saved_id).is_some_and(|e| e.is_pinned)
    }

    pub fn pinned_ids(&self) -> &[SavedId] {
        &self.pinned
    }

    pub fn root_id(&self) -> &SavedId {
        &self.root_id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bijection-preserving write: both ends are torn down before the new
    /// pair is recorded, so no intermediate state ever maps one id twice.
    fn bind(
        &mut self,
        saved_id: SavedId,
        live_id: LiveId,
        live_url: Option<String>,
        favicon: Option<String>,
    ) {
        if let Some(previous_saved) = self.by_live.remove(&live_id) {
            if previous_saved != saved_id {
                if let Some(entry) = self.entries.get_mut(&previous_saved) {
                    entry.live_id = None;
                    entry.live_url = None;
                    entry.favicon = None;
                    entry.is_active = false;
                }
            }
        }
        if let Some(entry) = self.entries.get_mut(&saved_id) {
            if let Some(old_live) = entry.live_id {
                if old_live != live_id {
                    self.by_live.remove(&old_live);
                }
            }
            entry.live_id = Some(live_id);
            if live_url.is_some() {
                entry.live_url = live_url;
            }
            if favicon.is_some() {
                entry.favicon = favicon;
            }
            self.by_live.insert(live_id, saved_id);
        }
    }

    fn free_live_snapshot(
        &self,
        url: &str,
        live: &[LiveEntry],
    ) -> Option<(LiveId, Option<String>, Option<String>)> {
        live.iter()
            .find(|l| {
                !self.by_live.contains_key(&l.id)
                    && tabmarks_matcher::matches(Some(url), l.url.as_deref())
            })
            .map(|l| (l.id, l.url.clone(), l.favicon.clone()))
    }

    /// Recompute the candidate bucket for one normalized destination from
    /// the traversal order, keeping first-fit deterministic.
    fn rebuild_bucket(&mut self, key: &str) {
        let ids: Vec<SavedId> = self
            .order
            .iter()
            .filter(|id| {
                self.entries.get(*id).is_some_and(|e| {
                    !e.is_folder
                        && e.url
                            .as_deref()
                            .is_some_and(|u| tabmarks_matcher::normalize(u) == key)
                })
            })
            .cloned()
            .collect();
        if ids.is_empty() {
            self.by_url.remove(key);
        } else {
            self.by_url.insert(key.to_string(), ids);
        }
    }

    fn has_ancestor(&self, id: &SavedId, ancestor: &SavedId) -> bool {
        let mut current = self.entries.get(id).and_then(|e| e.parent_id.clone());
        for _ in 0..MAX_PARENT_DEPTH {
            match current {
                Some(parent) if parent == *ancestor => return true,
                Some(parent) => {
                    current = self.entries.get(&parent).and_then(|e| e.parent_id.clone());
                }
                None => return false,
            }
        }
        false
    }

    /// Best-effort position for a new id in the flattened order: before
    /// the sibling currently holding the requested index, else after the
    /// parent's subtree, else at the end.
    fn insertion_pos(&self, parent: Option<&SavedId>, index: Option<u32>) -> usize {
        let Some(parent) = parent else {
            return self.order.len();
        };
        let Some(parent_pos) = self.order.iter().position(|id| id == parent) else {
            return self.order.len();
        };
        let mut pos = parent_pos + 1;
        let mut sibling_ordinal = 0u32;
        while pos < self.order.len() {
            let id = &self.order[pos];
            let Some(entry) = self.entries.get(id) else {
                break;
            };
            let within =
                entry.parent_id.as_ref() == Some(parent) || self.has_ancestor(id, parent);
            if !within {
                break;
            }
            if entry.parent_id.as_ref() == Some(parent) {
                if let Some(want) = index {
                    if sibling_ordinal >= want {
                        break;
                    }
                }
                sibling_ordinal += 1;
            }
            pos += 1;
        }
        pos
    }
}

/// Depth-first flatten retaining parent/child links. Parent id and sibling
/// index are derived from the traversal when the host left them unset.
fn flatten(node: &SavedNode, parent: Option<&SavedId>, ordinal: u32, out: &mut Vec<SavedEntry>) {
    let mut entry = SavedEntry::from_node(node);
    if entry.parent_id.is_none() {
        entry.parent_id = parent.cloned();
    }
    if entry.index.is_none() {
        entry.index = Some(ordinal);
    }
    out.push(entry);
    if let Some(children) = &node.children {
        for (i, child) in children.iter().enumerate() {
            flatten(child, Some(&node.id), i as u32, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn root_with(children: Vec<SavedNode>) -> SavedNode {
        SavedNode::folder("root", "Root", children)
    }

    fn built(children: Vec<SavedNode>, live: &[LiveEntry], pinned: &[&str]) -> ReconciliationIndex {
        let mut index = ReconciliationIndex::new("root");
        let pinned: Vec<SavedId> = pinned.iter().map(|s| s.to_string()).collect();
        index.rebuild(&root_with(children), live, &pinned, &"root".to_string());
        index
    }

    #[test]
    fn rebuild_matches_by_normalized_destination() {
        let live = [LiveEntry::new(1, "https://a.com/x/")];
        let index = built(vec![SavedNode::leaf("s1", "A", "https://a.com/x")], &live, &[]);
        assert_eq!(index.entry(&"s1".into()).unwrap().live_id, Some(1));
        assert_eq!(index.saved_for_live(1), Some(&"s1".to_string()));
    }

    #[test]
    fn shared_destination_goes_to_earlier_traversal_entry() {
        let live = [LiveEntry::new(7, "https://a.com")];
        let index = built(
            vec![
                SavedNode::leaf("first", "A", "https://a.com"),
                SavedNode::leaf("second", "A again", "https://a.com"),
            ],
            &live,
            &[],
        );
        assert_eq!(index.entry(&"first".into()).unwrap().live_id, Some(7));
        assert_eq!(index.entry(&"second".into()).unwrap().live_id, None);
    }

    #[test]
    fn associate_steals_from_both_ends() {
        let live = [
            LiveEntry::new(1, "https://a.com"),
            LiveEntry::new(2, "https://b.com"),
        ];
        let mut index = built(
            vec![
                SavedNode::leaf("sa", "A", "https://a.com"),
                SavedNode::leaf("sb", "B", "https://b.com"),
            ],
            &live,
            &[],
        );
        // sa<->1 and sb<->2; force sa<->2
        index.associate(&"sa".into(), 2, Some(&live[1]));
        assert_eq!(index.entry(&"sa".into()).unwrap().live_id, Some(2));
        assert_eq!(index.entry(&"sb".into()).unwrap().live_id, None);
        assert_eq!(index.saved_for_live(2), Some(&"sa".to_string()));
        assert_eq!(index.saved_for_live(1), None);
    }

    #[test]
    fn dissociate_clears_snapshot_both_directions() {
        let live = [LiveEntry::new(1, "https://a.com")];
        let mut index = built(vec![SavedNode::leaf("s1", "A", "https://a.com")], &live, &[]);
        assert!(index.dissociate_by_live(1));
        let entry = index.entry(&"s1".into()).unwrap();
        assert_eq!(entry.live_id, None);
        assert_eq!(entry.live_url, None);
        assert!(!index.dissociate(&"s1".into()));
    }

    #[test]
    fn navigation_rollback_keeps_shadow_link() {
        let live = [LiveEntry::new(1, "https://a.com")];
        let mut index = built(vec![SavedNode::leaf("s1", "A", "https://a.com")], &live, &[]);
        let kept = index.handle_navigation(1, "https://nowhere.com", None);
        assert_eq!(kept, Some("s1".to_string()));
        let entry = index.entry(&"s1".into()).unwrap();
        assert_eq!(entry.live_id, Some(1));
        assert_eq!(entry.live_url.as_deref(), Some("https://nowhere.com"));
        assert_eq!(entry.url.as_deref(), Some("https://a.com"));
    }

    #[test]
    fn navigation_reassigns_when_a_free_match_exists() {
        let live = [LiveEntry::new(1, "https://a.com")];
        let mut index = built(
            vec![
                SavedNode::leaf("s1", "A", "https://a.com"),
                SavedNode::leaf("s2", "B", "https://b.com"),
            ],
            &live,
            &[],
        );
        let moved = index.handle_navigation(1, "https://b.com", None);
        assert_eq!(moved, Some("s2".to_string()));
        assert_eq!(index.entry(&"s1".into()).unwrap().live_id, None);
        assert_eq!(index.entry(&"s2".into()).unwrap().live_id, Some(1));
    }

    #[test]
    fn navigation_without_prior_association_degrades_to_match() {
        let mut index = built(vec![SavedNode::leaf("s1", "A", "https://a.com")], &[], &[]);
        let got = index.handle_navigation(5, "https://a.com/#top", None);
        assert_eq!(got, Some("s1".to_string()));
    }

    #[test]
    fn pin_unpin_round_trip() {
        let mut index = built(vec![SavedNode::leaf("s1", "A", "https://a.com")], &[], &[]);
        assert!(index.pin(&"s1".into()));
        assert!(index.is_pinned(&"s1".into()));
        // second pin is a no-op on the order, not an error
        assert!(!index.pin(&"s1".into()));
        assert_eq!(index.pinned_ids(), ["s1".to_string()]);
        assert!(index.unpin(&"s1".into()));
        assert!(!index.is_pinned(&"s1".into()));
        assert!(index.pinned_ids().is_empty());
    }

    #[test]
    fn reorder_pinned_clamps_and_ignores_absent() {
        let mut index = built(
            vec![
                SavedNode::leaf("a", "A", "https://a.com"),
                SavedNode::leaf("b", "B", "https://b.com"),
                SavedNode::leaf("c", "C", "https://c.com"),
            ],
            &[],
            &["a", "b", "c"],
        );
        assert!(index.reorder_pinned(&"a".into(), 99));
        assert_eq!(
            index.pinned_ids(),
            ["b".to_string(), "c".to_string(), "a".to_string()]
        );
        assert!(!index.reorder_pinned(&"ghost".into(), 0));
    }

    #[test]
    fn cleanup_pinned_prunes_and_reports() {
        let mut index = built(
            vec![
                SavedNode::leaf("keep", "K", "https://k.com"),
                SavedNode::leaf("gone1", "G", "https://g1.com"),
                SavedNode::leaf("gone2", "G", "https://g2.com"),
            ],
            &[],
            &["keep", "gone1", "gone2"],
        );
        index.remove_entry(&"gone1".into());
        index.remove_entry(&"gone2".into());
        assert!(index.cleanup_pinned());
        assert_eq!(index.pinned_ids(), ["keep".to_string()]);
        assert!(!index.cleanup_pinned());
    }

    #[test]
    fn add_entry_splices_by_sibling_index_and_matches() {
        let live = [LiveEntry::new(3, "https://new.com")];
        let mut index = built(
            vec![
                SavedNode::leaf("a", "A", "https://a.com"),
                SavedNode::leaf("c", "C", "https://c.com"),
            ],
            &[],
            &[],
        );
        let mut node = SavedNode::leaf("b", "B", "https://new.com");
        node.parent_id = Some("root".to_string());
        node.index = Some(1);
        index.add_entry(&node, &live);
        assert_eq!(
            index.order,
            ["root", "a", "b", "c"]
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
        );
        assert_eq!(index.entry(&"b".into()).unwrap().live_id, Some(3));
    }

    #[test]
    fn remove_entry_takes_the_subtree() {
        let mut folder = SavedNode::folder(
            "dir",
            "Dir",
            vec![SavedNode::leaf("inner", "I", "https://i.com")],
        );
        folder.parent_id = Some("root".to_string());
        let live = [LiveEntry::new(9, "https://i.com")];
        let mut index = built(
            vec![folder, SavedNode::leaf("outer", "O", "https://o.com")],
            &live,
            &[],
        );
        assert_eq!(index.saved_for_live(9), Some(&"inner".to_string()));
        assert!(index.remove_entry(&"dir".into()));
        assert!(index.entry(&"inner".into()).is_none());
        assert_eq!(index.saved_for_live(9), None);
        assert!(index.entry(&"outer".into()).is_some());
    }

    #[test]
    fn update_destination_repairs_association() {
        let live = [
            LiveEntry::new(1, "https://a.com"),
            LiveEntry::new(2, "https://b.com"),
        ];
        let mut index = built(vec![SavedNode::leaf("s1", "A", "https://a.com")], &live, &[]);
        assert_eq!(index.entry(&"s1".into()).unwrap().live_id, Some(1));
        index.update_destination(&"s1".into(), Some("https://b.com"), &live);
        let entry = index.entry(&"s1".into()).unwrap();
        assert_eq!(entry.url.as_deref(), Some("https://b.com"));
        assert_eq!(entry.live_id, Some(2));
        assert_eq!(index.saved_for_live(1), None);
    }

    #[test]
    fn bijection_holds_across_mutations() {
        let live = [
            LiveEntry::new(1, "https://a.com"),
            LiveEntry::new(2, "https://a.com"),
        ];
        let mut index = built(
            vec![
                SavedNode::leaf("a1", "A", "https://a.com"),
                SavedNode::leaf("a2", "A", "https://a.com"),
            ],
            &live,
            &[],
        );
        index.associate(&"a1".into(), 2, None);
        index.handle_navigation(2, "https://a.com", None);
        index.try_associate_by_url(1, "https://a.com", None);

        let mut seen_live = HashSet::new();
        let mut seen_saved = HashSet::new();
        for (live_id, saved_id) in &index.by_live {
            assert!(seen_live.insert(*live_id));
            assert!(seen_saved.insert(saved_id.clone()));
            assert_eq!(index.entry(saved_id).unwrap().live_id, Some(*live_id));
        }
    }
}
