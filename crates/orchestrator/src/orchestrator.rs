use log::{debug, info, warn};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use url::Url;

use tabmarks_groups::{GroupHost, GroupReconciler};
use tabmarks_index::ReconciliationIndex;
use tabmarks_model::{
    Command, GroupCategory, LiveEntry, LiveId, ProjectedView, SavedId, SavedNode,
};

use crate::debounce::Debouncer;
use crate::events::HostEvent;
use crate::host::SyncHost;
use crate::settings::{Settings, SettingsStore};

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Coalescing window for presentation-facing "state changed" signals.
    pub debounce_window: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(50),
        }
    }
}

/// Single logical worker wiring host notifications into the index and the
/// group reconciler. One handler runs at a time; any handler may suspend
/// at a host call, so every mutation leaves only internally consistent
/// state behind, and structurally ambiguous notifications fall back to a
/// full [`Orchestrator::resync`].
pub struct Orchestrator<H, G: GroupHost, S> {
    host: H,
    groups: GroupReconciler<G>,
    index: ReconciliationIndex,
    store: S,
    settings: Settings,
    root_id: SavedId,
    active_live: Option<LiveId>,
    debouncer: Debouncer,
}

impl<H, G, S> Orchestrator<H, G, S>
where
    H: SyncHost,
    G: GroupHost,
    S: SettingsStore,
{
    pub fn new(
        host: H,
        group_host: G,
        store: S,
        root_id: impl Into<SavedId>,
        config: OrchestratorConfig,
    ) -> Self {
        let root_id = root_id.into();
        Self {
            host,
            groups: GroupReconciler::new(group_host),
            index: ReconciliationIndex::new(root_id.clone()),
            store,
            settings: Settings::default(),
            root_id,
            active_live: None,
            debouncer: Debouncer::new(config.debounce_window),
        }
    }

    /// Startup: load persisted settings, recover group handles, rebuild
    /// the index, and bring group membership back in line with the
    /// recovered association state.
    pub async fn init(&mut self) {
        match self.store.load().await {
            Ok(Some(settings)) => self.settings = settings,
            Ok(None) => info!("no persisted settings, starting fresh"),
            Err(err) => warn!("failed to load settings, starting fresh: {err}"),
        }
        self.groups.recover_handles().await;
        self.resync().await;
        self.reconcile_groups().await;
    }

    /// Full rebuild from current host state. The recovery path for every
    /// incremental operation; invoked whenever structural ambiguity is
    /// suspected.
    pub async fn resync(&mut self) {
        let tree = match self.host.saved_tree(&self.root_id).await {
            Ok(Some(tree)) => tree,
            Ok(None) => {
                warn!("resync: root {} not found", self.root_id);
                return;
            }
            Err(err) => {
                warn!("resync: saved tree unavailable: {err}");
                return;
            }
        };
        let live = self.live_snapshot().await;
        let pinned = self.settings.pinned.clone();
        let root_id = self.root_id.clone();
        self.index.rebuild(&tree, &live, &pinned, &root_id);
        if self.index.pinned_ids() != self.settings.pinned.as_slice() {
            // rebuild pruned stale pinned ids; the pruned list is ours to persist
            self.persist_pinned().await;
        }
        self.active_live = self.host.active_live().await.unwrap_or(None);
        debug!("resync complete: {} entries", self.index.len());
    }

    /// One pass over the live snapshot putting every associated entry in
    /// its category's group and evicting unmanaged inheritors.
    async fn reconcile_groups(&mut self) {
        for live_entry in self.live_snapshot().await {
            match self.index.saved_for_live(live_entry.id).cloned() {
                Some(saved_id) => {
                    let category = self.category_of(&saved_id);
                    self.groups.add_to_group(live_entry.id, category).await;
                }
                None => self.groups.reconcile_orphan(live_entry.id, false).await,
            }
        }
    }

    pub async fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::SavedCreated(node) => {
                let live = self.live_snapshot().await;
                self.index.add_entry(&node, &live);
                let mut created = Vec::new();
                collect_node_ids(&node, &mut created);
                for id in created {
                    if let Some(live_id) = self.index.entry(&id).and_then(|e| e.live_id) {
                        self.groups.add_to_group(live_id, GroupCategory::Saved).await;
                    }
                }
            }
            HostEvent::SavedRemoved { id } => {
                let doomed_live = self.index.subtree_live_ids(&id);
                if self.index.remove_entry(&id) {
                    for live_id in doomed_live {
                        self.groups.remove_from_group(live_id).await;
                    }
                    if self.index.cleanup_pinned() {
                        self.persist_pinned().await;
                    }
                }
            }
            HostEvent::SavedChanged { id, title, url } => {
                self.index.set_title(&id, &title);
                let Some(entry) = self.index.entry(&id) else {
                    return;
                };
                if entry.is_folder {
                    return;
                }
                // title-only change; a leaf never loses its destination
                let Some(url) = url else {
                    return;
                };
                let previous_live = entry.live_id;
                let live = self.live_snapshot().await;
                self.index.update_destination(&id, Some(&url), &live);
                let current_live = self.index.entry(&id).and_then(|e| e.live_id);
                if current_live != previous_live {
                    if let Some(old) = previous_live {
                        let still_associated = self.index.saved_for_live(old).is_some();
                        self.groups.reconcile_orphan(old, still_associated).await;
                    }
                    if let Some(new) = current_live {
                        let category = self.category_of(&id);
                        self.groups.add_to_group(new, category).await;
                    }
                }
            }
            HostEvent::SavedMoved { id } => {
                debug!("saved {id} moved, falling back to resync");
                self.resync().await;
            }
            HostEvent::LiveCreated(live_entry) => {
                let Some(url) = live_entry.url.clone() else {
                    return;
                };
                match self
                    .index
                    .try_associate_by_url(live_entry.id, &url, Some(&live_entry))
                {
                    Some(saved_id) => {
                        let category = self.category_of(&saved_id);
                        self.groups.add_to_group(live_entry.id, category).await;
                    }
                    None => self.groups.reconcile_orphan(live_entry.id, false).await,
                }
            }
            HostEvent::LiveUpdated(live_entry) => {
                let Some(url) = live_entry.url.clone() else {
                    return;
                };
                let before = self.index.saved_for_live(live_entry.id).cloned();
                let after =
                    self.index
                        .handle_navigation(live_entry.id, &url, Some(&live_entry));
                match after {
                    Some(saved_id) if before.as_ref() != Some(&saved_id) => {
                        let category = self.category_of(&saved_id);
                        self.groups.add_to_group(live_entry.id, category).await;
                    }
                    Some(_) => {}
                    None => self.groups.reconcile_orphan(live_entry.id, false).await,
                }
            }
            HostEvent::LiveRemoved { id } => {
                self.index.dissociate_by_live(id);
                if self.active_live == Some(id) {
                    self.active_live = None;
                }
            }
            HostEvent::LiveActivated { id } => {
                self.active_live = Some(id);
            }
        }
    }

    pub async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Pin { saved_id } => {
                if self.index.pin(&saved_id) {
                    self.persist_pinned().await;
                }
                if let Some(live_id) = self.index.entry(&saved_id).and_then(|e| e.live_id) {
                    self.groups.add_to_group(live_id, GroupCategory::Pinned).await;
                }
            }
            Command::Unpin { saved_id } => {
                if self.index.unpin(&saved_id) {
                    self.persist_pinned().await;
                }
                if let Some(live_id) = self.index.entry(&saved_id).and_then(|e| e.live_id) {
                    self.groups.add_to_group(live_id, GroupCategory::Saved).await;
                }
            }
            Command::ReorderPinned { saved_id, to_index } => {
                if self.index.reorder_pinned(&saved_id, to_index) {
                    self.persist_pinned().await;
                }
            }
            Command::OpenSaved { saved_id } => self.open_saved(&saved_id).await,
            Command::SetFolderCollapsed { saved_id, collapsed } => {
                if collapsed {
                    if !self.settings.collapsed.contains(&saved_id) {
                        self.settings.collapsed.push(saved_id);
                    }
                } else {
                    self.settings.collapsed.retain(|id| id != &saved_id);
                }
                self.persist_settings().await;
            }
            Command::MarkOnboarded => {
                self.settings.onboarded = true;
                self.persist_settings().await;
            }
        }
    }

    /// Clicking a saved item always reuses an already-open instance
    /// instead of duplicating it.
    async fn open_saved(&mut self, saved_id: &SavedId) {
        let Some(entry) = self.index.entry(saved_id) else {
            return;
        };
        if let Some(live_id) = entry.live_id {
            if let Err(err) = self.host.focus_live(live_id).await {
                warn!("focus of live {live_id} failed: {err}");
                return;
            }
            self.active_live = Some(live_id);
            return;
        }
        let Some(url) = entry.url.clone() else {
            return;
        };
        match self.host.open_url(&url).await {
            Ok(live_entry) => {
                let live_id = live_entry.id;
                // associate eagerly; the created notification would only
                // re-derive the same match and may lose the race to
                // another destination sharing this URL
                self.index.associate(saved_id, live_id, Some(&live_entry));
                let category = self.category_of(saved_id);
                self.groups.add_to_group(live_id, category).await;
                self.active_live = Some(live_id);
            }
            Err(err) => warn!("open of {saved_id} failed: {err}"),
        }
    }

    /// Fresh projection from current memory; never cached.
    pub async fn project_now(&mut self) -> ProjectedView {
        let live = self.live_snapshot().await;
        self.index.project(self.active_live, &live, presentable)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn index(&self) -> &ReconciliationIndex {
        &self.index
    }

    fn category_of(&self, saved_id: &SavedId) -> GroupCategory {
        if self.index.is_pinned(saved_id) {
            GroupCategory::Pinned
        } else {
            GroupCategory::Saved
        }
    }

    async fn live_snapshot(&self) -> Vec<LiveEntry> {
        match self.host.live_entries().await {
            Ok(live) => live,
            Err(err) => {
                warn!("live entry query failed: {err}");
                Vec::new()
            }
        }
    }

    async fn persist_pinned(&mut self) {
        self.settings.pinned = self.index.pinned_ids().to_vec();
        self.persist_settings().await;
    }

    async fn persist_settings(&mut self) {
        if let Err(err) = self.store.save(&self.settings).await {
            warn!("failed to persist settings: {err}");
        }
    }
}

impl<H, G, S> Orchestrator<H, G, S>
where
    H: SyncHost + 'static,
    G: GroupHost + 'static,
    S: SettingsStore + 'static,
{
    /// Run the event loop on a spawned task. Returns the receiver the
    /// presentation layer watches for debounced view snapshots.
    pub fn spawn(
        mut self,
        mut events: mpsc::Receiver<HostEvent>,
        mut commands: mpsc::Receiver<Command>,
    ) -> watch::Receiver<ProjectedView> {
        let (view_tx, view_rx) = watch::channel(ProjectedView::empty(self.root_id.clone()));
        tokio::spawn(async move {
            self.init().await;
            let view = self.project_now().await;
            let _ = view_tx.send(view);
            loop {
                tokio::select! {
                    maybe_event = events.recv() => {
                        let Some(event) = maybe_event else { break };
                        self.handle_event(event).await;
                        self.debouncer.note_event(Instant::now());
                    }
                    maybe_command = commands.recv() => {
                        let Some(command) = maybe_command else { break };
                        self.handle_command(command).await;
                        self.debouncer.note_event(Instant::now());
                    }
                    () = wait_until(self.debouncer.deadline()) => {
                        if self.debouncer.fire(Instant::now()) {
                            let view = self.project_now().await;
                            let _ = view_tx.send(view);
                        }
                    }
                }
            }
            debug!("orchestrator loop stopped");
        });
        view_rx
    }
}

/// Host classification predicate for unassociated live entries: internal
/// pages and host-pinned entries never surface in the projected view.
fn presentable(live: &LiveEntry) -> bool {
    if live.pinned_by_host {
        return false;
    }
    live.url.as_deref().is_some_and(|raw| {
        Url::parse(raw)
            .map(|url| matches!(url.scheme(), "http" | "https" | "file"))
            .unwrap_or(false)
    })
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => {
            tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        }
        None => std::future::pending().await,
    }
}

fn collect_node_ids(node: &SavedNode, out: &mut Vec<SavedId>) {
    out.push(node.id.clone());
    if let Some(children) = &node.children {
        for child in children {
            collect_node_ids(child, out);
        }
    }
}
