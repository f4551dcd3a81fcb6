use serde::{Deserialize, Serialize};

/// Identifier of a persistent saved entry (host bookmark id).
pub type SavedId = String;

/// Identifier of an ephemeral live entry (host tab id).
pub type LiveId = u64;

/// Identifier of a host-visible visual group.
pub type GroupId = u64;

/// Persistent tree node as reported by the host.
///
/// A node without a destination URL is a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedNode {
    pub id: SavedId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SavedId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SavedNode>>,
}

impl SavedNode {
    /// Leaf node with a destination.
    pub fn leaf(id: impl Into<SavedId>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: Some(url.into()),
            parent_id: None,
            index: None,
            children: None,
        }
    }

    /// Folder node with ordered children.
    pub fn folder(
        id: impl Into<SavedId>,
        title: impl Into<String>,
        children: Vec<SavedNode>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: None,
            parent_id: None,
            index: None,
            children: Some(children),
        }
    }

    pub fn is_folder(&self) -> bool {
        self.url.is_none()
    }
}

/// Saved entry enriched with live-association state. Owned exclusively by
/// the reconciliation index; created on rebuild/add, destroyed on remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedEntry {
    pub id: SavedId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SavedId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    pub is_folder: bool,
    pub is_pinned: bool,
    /// Live entry this saved entry is associated with, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_id: Option<LiveId>,
    /// Snapshot of the associated live entry's current destination. May
    /// diverge from `url` after navigation; presentation layers use the
    /// mismatch as the "navigated away" signal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    pub is_active: bool,
}

impl SavedEntry {
    pub fn from_node(node: &SavedNode) -> Self {
        Self {
            id: node.id.clone(),
            title: node.title.clone(),
            url: node.url.clone(),
            parent_id: node.parent_id.clone(),
            index: node.index,
            is_folder: node.url.is_none(),
            is_pinned: false,
            live_id: None,
            live_url: None,
            favicon: None,
            is_active: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.live_id.is_some()
    }
}

/// Ephemeral live entry snapshot supplied by the host. Never persisted
/// beyond the current in-memory view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveEntry {
    pub id: LiveId,
    /// Absent while the entry is still navigating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Host-visible group membership, if grouped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
    /// Pinned through the host's own UI. Such entries are managed by the
    /// host and never surface as unassociated.
    #[serde(default)]
    pub pinned_by_host: bool,
}

impl LiveEntry {
    pub fn new(id: LiveId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: Some(url.into()),
            title: None,
            favicon: None,
            group: None,
            pinned_by_host: false,
        }
    }
}

/// Read-only partitioned projection of the index state for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedView {
    /// Pinned entries, in pinned order.
    pub pinned: Vec<SavedEntry>,
    /// Flattened saved tree with pinned leaves filtered out; folders are
    /// retained even when empty.
    pub saved: Vec<SavedEntry>,
    /// Live entries with no association, minus host-internal pages.
    pub unassociated: Vec<LiveEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_live: Option<LiveId>,
    pub pinned_ids: Vec<SavedId>,
    pub root_id: SavedId,
}

impl ProjectedView {
    pub fn empty(root_id: impl Into<SavedId>) -> Self {
        Self {
            pinned: Vec::new(),
            saved: Vec::new(),
            unassociated: Vec::new(),
            active_live: None,
            pinned_ids: Vec::new(),
            root_id: root_id.into(),
        }
    }
}
