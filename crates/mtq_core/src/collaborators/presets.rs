//! Saved metadata preset lookup.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use thiserror::Error;

use crate::models::MetadataPreset;

/// Errors from preset persistence.
#[derive(Error, Debug)]
pub enum PresetStoreError {
    #[error("Failed to access preset file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse preset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Lookup of saved metadata presets.
pub trait PresetStore: Send + Sync {
    /// Find a preset by title.
    fn preset_named(&self, name: &str) -> Option<MetadataPreset>;
}

/// Presets held in memory (for tests and embedding).
#[derive(Debug, Default)]
pub struct MemoryPresetStore {
    presets: RwLock<BTreeMap<String, MetadataPreset>>,
}

impl MemoryPresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, preset: MetadataPreset) {
        self.presets.write().insert(preset.title.clone(), preset);
    }
}

impl PresetStore for MemoryPresetStore {
    fn preset_named(&self, name: &str) -> Option<MetadataPreset> {
        self.presets.read().get(name).cloned()
    }
}

/// Presets stored as `<title>.json` files in a directory.
#[derive(Debug)]
pub struct DirectoryPresetStore {
    dir: PathBuf,
    presets: RwLock<BTreeMap<String, MetadataPreset>>,
}

impl DirectoryPresetStore {
    /// Load all presets found in `dir`.
    ///
    /// Unreadable preset files are skipped with a warning; a missing
    /// directory yields an empty store.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let mut presets = BTreeMap::new();

        match fs::read_dir(&dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("json") {
                        continue;
                    }
                    match Self::read_preset(&path) {
                        Ok(preset) => {
                            presets.insert(preset.title.clone(), preset);
                        }
                        Err(e) => {
                            tracing::warn!("Skipping preset {}: {}", path.display(), e);
                        }
                    }
                }
                tracing::debug!("Loaded {} presets from {}", presets.len(), dir.display());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Failed to read preset folder {}: {}", dir.display(), e);
            }
        }

        Self {
            dir,
            presets: RwLock::new(presets),
        }
    }

    fn read_preset(path: &Path) -> Result<MetadataPreset, PresetStoreError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save a preset to disk and make it available for lookup.
    pub fn save(&self, preset: MetadataPreset) -> Result<(), PresetStoreError> {
        fs::create_dir_all(&self.dir)?;

        let file_name: String = preset
            .title
            .chars()
            .map(|c| if c.is_alphanumeric() || c == ' ' || c == '-' { c } else { '_' })
            .collect();
        let path = self.dir.join(format!("{}.json", file_name));
        let json = serde_json::to_string_pretty(&preset)?;

        let temp_file = path.with_extension("json.tmp");
        fs::write(&temp_file, &json)?;
        fs::rename(&temp_file, &path)?;

        self.presets.write().insert(preset.title.clone(), preset);
        Ok(())
    }

    pub fn titles(&self) -> Vec<String> {
        self.presets.read().keys().cloned().collect()
    }
}

impl PresetStore for DirectoryPresetStore {
    fn preset_named(&self, name: &str) -> Option<MetadataPreset> {
        self.presets.read().get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{keys, Metadata};
    use tempfile::tempdir;

    #[test]
    fn directory_store_round_trips_presets() {
        let dir = tempdir().unwrap();
        let store = DirectoryPresetStore::open(dir.path());
        assert!(store.preset_named("Anime").is_none());

        let preset = MetadataPreset::new("Anime", Metadata::new().with_tag(keys::GENRE, "Anime"));
        store.save(preset.clone()).unwrap();

        let reopened = DirectoryPresetStore::open(dir.path());
        assert_eq!(reopened.preset_named("Anime"), Some(preset));
        assert_eq!(reopened.titles(), vec!["Anime".to_string()]);
    }

    #[test]
    fn directory_store_skips_garbage() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        let store = DirectoryPresetStore::open(dir.path());
        assert!(store.titles().is_empty());
    }

    #[test]
    fn memory_store_lookup() {
        let store = MemoryPresetStore::new();
        store.insert(MetadataPreset::new("Kids", Metadata::new()));
        assert!(store.preset_named("Kids").is_some());
        assert!(store.preset_named("Adults").is_none());
    }
}
