use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tabmarks_groups::{GroupHost, GroupInfo, GroupReconciler};
use tabmarks_model::{
    GroupCategory, GroupId, GroupProps, HostError, HostResult, LiveEntry, LiveId,
};

/// In-memory host: groups vanish when emptied, and ids in `dead` fail
/// every call, emulating entities removed mid-operation.
#[derive(Default)]
struct MockHost {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_group: GroupId,
    groups: Vec<(GroupId, String)>,
    membership: HashMap<LiveId, GroupId>,
    live: HashMap<LiveId, LiveEntry>,
    props: HashMap<GroupId, GroupProps>,
    moves: Vec<(GroupId, u32)>,
    dead: HashSet<GroupId>,
}

impl MockHost {
    fn with_state(f: impl FnOnce(&mut State)) -> Self {
        let host = Self::default();
        f(&mut host.state.lock().unwrap());
        host
    }

    fn seed_group(state: &mut State, label: &str, members: &[LiveId]) -> GroupId {
        state.next_group += 1;
        let id = state.next_group;
        state.groups.push((id, label.to_string()));
        for live in members {
            state.membership.insert(*live, id);
        }
        id
    }

    fn members_of(&self, group: GroupId) -> Vec<LiveId> {
        let state = self.state.lock().unwrap();
        let mut members: Vec<LiveId> = state
            .membership
            .iter()
            .filter(|(_, g)| **g == group)
            .map(|(l, _)| *l)
            .collect();
        members.sort_unstable();
        members
    }

    fn label_of(&self, group: GroupId) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .groups
            .iter()
            .find(|(id, _)| *id == group)
            .map(|(_, label)| label.clone())
    }

    fn moves(&self) -> Vec<(GroupId, u32)> {
        self.state.lock().unwrap().moves.clone()
    }

    fn kill_group(&self, group: GroupId) {
        let mut state = self.state.lock().unwrap();
        state.dead.insert(group);
        state.groups.retain(|(id, _)| *id != group);
        state.membership.retain(|_, g| *g != group);
    }
}

fn prune_empty(state: &mut State) {
    let occupied: HashSet<GroupId> = state.membership.values().copied().collect();
    state.groups.retain(|(id, _)| occupied.contains(id));
}

#[async_trait]
impl GroupHost for &MockHost {
    async fn query_groups(&self, label: &str) -> HostResult<Vec<GroupInfo>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .groups
            .iter()
            .filter(|(_, l)| l == label)
            .map(|(id, l)| GroupInfo {
                id: *id,
                label: l.clone(),
            })
            .collect())
    }

    async fn members(&self, group: GroupId) -> HostResult<Vec<LiveId>> {
        let state = self.state.lock().unwrap();
        if state.dead.contains(&group) || !state.groups.iter().any(|(id, _)| *id == group) {
            return Err(HostError::Gone(format!("group {group}")));
        }
        Ok(state
            .membership
            .iter()
            .filter(|(_, g)| **g == group)
            .map(|(l, _)| *l)
            .collect())
    }

    async fn group(&self, live_ids: &[LiveId], group: Option<GroupId>) -> HostResult<GroupId> {
        let mut state = self.state.lock().unwrap();
        let target = match group {
            Some(id) => {
                if state.dead.contains(&id) {
                    return Err(HostError::Gone(format!("group {id}")));
                }
                id
            }
            None => {
                state.next_group += 1;
                let id = state.next_group;
                state.groups.push((id, String::new()));
                id
            }
        };
        for live in live_ids {
            state.membership.insert(*live, target);
        }
        prune_empty(&mut state);
        Ok(target)
    }

    async fn ungroup(&self, live_ids: &[LiveId]) -> HostResult<()> {
        let mut state = self.state.lock().unwrap();
        for live in live_ids {
            state.membership.remove(live);
        }
        prune_empty(&mut state);
        Ok(())
    }

    async fn update_group(&self, group: GroupId, props: &GroupProps) -> HostResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.dead.contains(&group) {
            return Err(HostError::Gone(format!("group {group}")));
        }
        let Some(slot) = state.groups.iter_mut().find(|(id, _)| *id == group) else {
            return Err(HostError::Gone(format!("group {group}")));
        };
        slot.1 = props.label.clone();
        state.props.insert(group, props.clone());
        Ok(())
    }

    async fn move_group(&self, group: GroupId, index: u32) -> HostResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.dead.contains(&group) || !state.groups.iter().any(|(id, _)| *id == group) {
            return Err(HostError::Gone(format!("group {group}")));
        }
        state.moves.push((group, index));
        Ok(())
    }

    async fn live_entry(&self, live_id: LiveId) -> HostResult<Option<LiveEntry>> {
        let state = self.state.lock().unwrap();
        Ok(state.live.get(&live_id).cloned().map(|mut entry| {
            entry.group = state.membership.get(&live_id).copied();
            entry
        }))
    }
}

#[tokio::test]
async fn first_add_creates_and_labels_the_group() {
    let host = MockHost::default();
    let mut reconciler = GroupReconciler::new(&host);

    reconciler.add_to_group(42, GroupCategory::Pinned).await;

    let handle = reconciler.handle(GroupCategory::Pinned).expect("bound");
    assert_eq!(host.members_of(handle), vec![42]);
    assert_eq!(host.label_of(handle).as_deref(), Some("Pinned"));
    // new group is immediately asserted leftmost
    assert_eq!(host.moves().last(), Some(&(handle, 0)));
}

#[tokio::test]
async fn recover_consolidates_crash_duplicates() {
    let host = MockHost::with_state(|state| {
        MockHost::seed_group(state, "Saved", &[10]);
        MockHost::seed_group(state, "Saved", &[11, 12]);
    });
    let mut reconciler = GroupReconciler::new(&host);

    reconciler.recover_handles().await;

    let handle = reconciler.handle(GroupCategory::Saved).expect("bound");
    assert_eq!(handle, 1);
    assert_eq!(host.members_of(1), vec![10, 11, 12]);
    assert_eq!(host.label_of(2), None, "emptied duplicate disappears");
    assert_eq!(reconciler.handle(GroupCategory::Pinned), None);
}

#[tokio::test]
async fn vanished_handle_rebinds_on_next_add() {
    let host = MockHost::default();
    let mut reconciler = GroupReconciler::new(&host);

    reconciler.add_to_group(1, GroupCategory::Saved).await;
    let first = reconciler.handle(GroupCategory::Saved).expect("bound");
    host.kill_group(first);

    reconciler.add_to_group(2, GroupCategory::Saved).await;
    let second = reconciler.handle(GroupCategory::Saved).expect("rebound");
    assert_ne!(first, second);
    assert_eq!(host.members_of(second), vec![2]);
}

#[tokio::test]
async fn ordering_puts_saved_right_after_pinned() {
    let host = MockHost::default();
    let mut reconciler = GroupReconciler::new(&host);

    reconciler.add_to_group(1, GroupCategory::Pinned).await;
    reconciler.add_to_group(2, GroupCategory::Pinned).await;
    reconciler.add_to_group(3, GroupCategory::Saved).await;

    let pinned = reconciler.handle(GroupCategory::Pinned).expect("pinned");
    let saved = reconciler.handle(GroupCategory::Saved).expect("saved");
    let moves = host.moves();
    let tail = &moves[moves.len() - 2..];
    assert_eq!(tail, [(pinned, 0), (saved, 2)]);
}

#[tokio::test]
async fn orphan_is_evicted_from_managed_group_only() {
    let host = MockHost::default();
    {
        let mut state = host.state.lock().unwrap();
        state.live.insert(7, LiveEntry::new(7, "https://a.com"));
        state.live.insert(8, LiveEntry::new(8, "https://b.com"));
    }
    let mut reconciler = GroupReconciler::new(&host);
    reconciler.add_to_group(7, GroupCategory::Saved).await;
    let handle = reconciler.handle(GroupCategory::Saved).expect("bound");

    // 8 inherited membership from its opener
    host.state.lock().unwrap().membership.insert(8, handle);

    reconciler.reconcile_orphan(7, true).await;
    reconciler.reconcile_orphan(8, false).await;

    assert_eq!(host.members_of(handle), vec![7]);
}
