use serde::{Deserialize, Serialize};

use crate::entries::SavedId;

/// Commands issued by the presentation layer back into the orchestrator.
///
/// Closed union matched exhaustively; adding an operation is a
/// compile-time-checked change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    Pin { saved_id: SavedId },
    Unpin { saved_id: SavedId },
    ReorderPinned { saved_id: SavedId, to_index: usize },
    /// Focus the already-open live instance, or open one.
    OpenSaved { saved_id: SavedId },
    SetFolderCollapsed { saved_id: SavedId, collapsed: bool },
    MarkOnboarded,
}

/// The two managed visual group categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupCategory {
    Pinned,
    Saved,
}

impl GroupCategory {
    pub const ALL: [GroupCategory; 2] = [GroupCategory::Pinned, GroupCategory::Saved];

    pub fn label(self) -> &'static str {
        match self {
            GroupCategory::Pinned => "Pinned",
            GroupCategory::Saved => "Saved",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            GroupCategory::Pinned => "blue",
            GroupCategory::Saved => "grey",
        }
    }

    pub fn collapsed_by_default(self) -> bool {
        match self {
            GroupCategory::Pinned => false,
            GroupCategory::Saved => true,
        }
    }
}

/// Visual properties re-asserted on a managed group after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupProps {
    pub label: String,
    pub color: String,
    pub collapsed: bool,
}

impl GroupProps {
    pub fn for_category(category: GroupCategory) -> Self {
        Self {
            label: category.label().to_string(),
            color: category.color().to_string(),
            collapsed: category.collapsed_by_default(),
        }
    }
}
