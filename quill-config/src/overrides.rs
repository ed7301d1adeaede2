//! Persistence of user keybinding overrides.
//!
//! Overrides live in `~/.config/quill/keybindings.yaml` as a map from
//! command id to chord text. The keybinding registry treats the store as a
//! fire-and-forget collaborator: loads report errors, saves only log them.

use crate::error::ConfigError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Command id → chord text. Ordered so saved files diff cleanly.
pub type OverrideMap = BTreeMap<String, String>;

/// Load/save collaborator for keybinding overrides.
pub trait OverrideStore: std::fmt::Debug {
    /// Read the stored overrides. A missing file is an empty map, not an error.
    fn load(&self) -> Result<OverrideMap, ConfigError>;

    /// Persist the overrides. Failures are logged, never returned.
    fn save(&self, overrides: &OverrideMap);
}

/// YAML wrapper for serialization
#[derive(Debug, Default, Serialize, Deserialize)]
struct OverridesFile {
    #[serde(default)]
    keybindings: OverrideMap,
}

/// Overrides stored in a YAML file.
#[derive(Debug, Clone)]
pub struct YamlOverrideStore {
    path: PathBuf,
    background: bool,
    /// Ticket of the newest save; older background writes are skipped
    latest: Arc<AtomicU64>,
    /// Taken only by save threads, so writes land one at a time
    writer: Arc<Mutex<()>>,
}

impl YamlOverrideStore {
    /// Store that writes on a background thread so saves never block input handling.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            background: true,
            latest: Arc::default(),
            writer: Arc::default(),
        }
    }

    /// Store that writes synchronously. Used by the CLI, which exits right after saving.
    pub fn blocking(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            background: false,
            latest: Arc::default(),
            writer: Arc::default(),
        }
    }

    /// Path of the overrides file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(path: &Path, file: &OverridesFile) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml_ng::to_string(file)?;
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, yaml)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl OverrideStore for YamlOverrideStore {
    fn load(&self) -> Result<OverrideMap, ConfigError> {
        if !self.path.exists() {
            log::debug!("No keybinding overrides file at {:?}", self.path);
            return Ok(OverrideMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        let file: OverridesFile = serde_yaml_ng::from_str(&contents)?;
        log::info!(
            "Loaded {} keybinding overrides from {:?}",
            file.keybindings.len(),
            self.path
        );
        Ok(file.keybindings)
    }

    fn save(&self, overrides: &OverrideMap) {
        let file = OverridesFile {
            keybindings: overrides.clone(),
        };

        if !self.background {
            match Self::write(&self.path, &file) {
                Ok(()) => log::debug!("Saved {} keybinding overrides", file.keybindings.len()),
                Err(e) => log::error!("Failed to save keybinding overrides: {}", e),
            }
            return;
        }

        let ticket = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        let latest = Arc::clone(&self.latest);
        let writer = Arc::clone(&self.writer);
        let path = self.path.clone();
        let spawned = std::thread::Builder::new()
            .name("keybinding-save".into())
            .spawn(move || {
                let _writing = writer.lock();
                if latest.load(Ordering::Acquire) != ticket {
                    log::trace!("Skipping superseded keybinding save {}", ticket);
                    return;
                }
                if let Err(e) = Self::write(&path, &file) {
                    log::error!("Failed to save keybinding overrides: {}", e);
                }
            });
        if let Err(e) = spawned {
            log::error!("Failed to spawn keybinding save thread: {}", e);
        }
    }
}

/// In-memory store. Clones share the record of saves, so a caller can hand
/// one clone to the registry and inspect what was saved through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryOverrideStore {
    initial: OverrideMap,
    fail_load: bool,
    saved: Arc<Mutex<Vec<OverrideMap>>>,
}

impl MemoryOverrideStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose `load` returns `overrides`.
    pub fn with_overrides(overrides: OverrideMap) -> Self {
        Self {
            initial: overrides,
            ..Self::default()
        }
    }

    /// Store whose `load` always fails, for exercising degraded startup.
    pub fn failing() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    /// Number of saves so far.
    pub fn save_count(&self) -> usize {
        self.saved.lock().len()
    }

    /// The most recently saved map.
    pub fn last_saved(&self) -> Option<OverrideMap> {
        self.saved.lock().last().cloned()
    }
}

impl OverrideStore for MemoryOverrideStore {
    fn load(&self) -> Result<OverrideMap, ConfigError> {
        if self.fail_load {
            return Err(ConfigError::Io(std::io::Error::other(
                "override store unavailable",
            )));
        }
        Ok(self.initial.clone())
    }

    fn save(&self, overrides: &OverrideMap) {
        self.saved.lock().push(overrides.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OverrideMap {
        let mut map = OverrideMap::new();
        map.insert("file.save".to_string(), "ctrl+alt+s".to_string());
        map.insert("edit.find".to_string(), "ctrl+shift+f".to_string());
        map
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = YamlOverrideStore::new(dir.path().join("keybindings.yaml"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_blocking_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("keybindings.yaml");
        let store = YamlOverrideStore::blocking(&path);

        store.save(&sample());
        assert!(path.exists());

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("keybindings:"));
        assert!(contents.contains("file.save: ctrl+alt+s"));

        assert_eq!(store.load().unwrap(), sample());
    }

    #[test]
    fn test_background_save_eventually_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keybindings.yaml");
        let store = YamlOverrideStore::new(&path);
        store.save(&sample());

        let mut loaded = OverrideMap::new();
        for _ in 0..200 {
            if let Ok(map) = store.load()
                && !map.is_empty()
            {
                loaded = map;
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_save_during_write_does_not_block_caller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keybindings.yaml");
        let store = YamlOverrideStore::new(&path);

        let mut newer = sample();
        newer.insert("edit.goto_line".to_string(), "f4".to_string());

        // Stand in for a slow write already in flight
        let in_flight = store.writer.lock();
        store.save(&sample());
        store.save(&newer);
        assert!(!path.exists());
        drop(in_flight);

        let mut loaded = OverrideMap::new();
        for _ in 0..200 {
            if let Ok(map) = store.load()
                && map == newer
            {
                loaded = map;
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(loaded, newer);
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keybindings.yaml");
        fs::write(&path, "keybindings: [not, a, map").unwrap();

        let store = YamlOverrideStore::blocking(&path);
        assert!(matches!(store.load(), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_memory_store_shares_saves_between_clones() {
        let store = MemoryOverrideStore::with_overrides(sample());
        let observer = store.clone();

        assert_eq!(store.load().unwrap(), sample());
        store.save(&OverrideMap::new());
        store.save(&sample());

        assert_eq!(observer.save_count(), 2);
        assert_eq!(observer.last_saved(), Some(sample()));
    }

    #[test]
    fn test_failing_memory_store() {
        let store = MemoryOverrideStore::failing();
        assert!(matches!(store.load(), Err(ConfigError::Io(_))));
    }
}
