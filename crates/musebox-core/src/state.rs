//! Persisted daily state: one photo path plus one generated poem, replaced
//! wholesale once per day. Readers only ever see a complete file because
//! writes go through a sibling temp file and an atomic rename.

use crate::error::StateError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyState {
    /// Relative path to the chosen photo inside the photo directory.
    pub photo_path: String,
    /// Generated poem with newlines already normalized to `<br>`.
    pub love_poetry: String,
}

impl DailyState {
    pub fn load(path: &Path) -> Result<Self, StateError> {
        if !path.exists() {
            return Err(StateError::Missing);
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(StateError::Corrupt)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;

        // Whole-file replacement: never leave a reader a partial write.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}
