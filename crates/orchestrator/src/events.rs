use tabmarks_model::{LiveEntry, LiveId, SavedId, SavedNode};

/// Host lifecycle notifications, one variant per notification kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    SavedCreated(SavedNode),
    SavedRemoved {
        id: SavedId,
    },
    /// Title and/or destination changed in place. For a leaf, `url`
    /// carries the full current destination; `None` means a title-only
    /// change, never a cleared destination.
    SavedChanged {
        id: SavedId,
        title: String,
        url: Option<String>,
    },
    /// Moved to a new parent/position. The incremental path cannot know
    /// the new sibling context, so this always triggers a full resync.
    SavedMoved {
        id: SavedId,
    },
    LiveCreated(LiveEntry),
    /// Navigation or metadata update; carries the current snapshot.
    LiveUpdated(LiveEntry),
    LiveRemoved {
        id: LiveId,
    },
    LiveActivated {
        id: LiveId,
    },
}
