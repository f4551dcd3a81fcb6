use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tabmarks_model::SavedId;

use crate::error::Result;

pub const SETTINGS_SCHEMA_VERSION: u32 = 1;

/// The only core state requiring external persistence: pinned order plus
/// presentation flags (collapsed folders, onboarding).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub schema_version: u32,
    #[serde(default)]
    pub pinned: Vec<SavedId>,
    #[serde(default)]
    pub collapsed: Vec<SavedId>,
    #[serde(default)]
    pub onboarded: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: SETTINGS_SCHEMA_VERSION,
            pinned: Vec::new(),
            collapsed: Vec::new(),
            onboarded: false,
        }
    }
}

/// Simple external key-value persistence for [`Settings`].
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// `None` when nothing has been persisted yet.
    async fn load(&self) -> Result<Option<Settings>>;

    async fn save(&self, settings: &Settings) -> Result<()>;
}

/// JSON file store with atomic tmp-file + rename writes.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn load(&self) -> Result<Option<Settings>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(settings)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
