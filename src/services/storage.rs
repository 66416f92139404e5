use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// String key/value persistence backing the credential store.
///
/// Multi-key writes and removals must be applied as one step: a reader never
/// observes half of a `set_many` or `remove_many`.
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError>;

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError>;

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.set_many(&[(key, value)])
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_many(&[key])
    }
}

/// Process-lifetime storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently held, sorted
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set_many(&self, values: &[(&str, String)]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        for (key, value) in values {
            entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

/// JSON file storage that survives process restarts.
///
/// Every change rewrites the whole map into a sibling temp file and renames
/// it over the original, so the file is never left half-written.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored map; a file that does not parse is deleted and read as empty
    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&contents) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!("Discarding unreadable state file {}: {}", self.path.display(), e);
                if let Err(e) = fs::remove_file(&self.path) {
                    if e.kind() != ErrorKind::NotFound {
                        return Err(e.into());
                    }
                }
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serde_json::to_vec_pretty(map)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&temp_path, &self.path)?;
        debug!("Wrote {} entries to {}", map.len(), self.path.display());
        Ok(())
    }

    fn update<F>(&self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut map = self.read_map()?;
        if apply(&mut map) {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        self.update(|map| {
            for (key, value) in entries {
                map.insert((*key).to_string(), value.clone());
            }
            true
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.update(|map| {
            let mut changed = false;
            for key in keys {
                changed |= map.remove(*key).is_some();
            }
            changed
        })?;
        info!("Removed {} key(s) from {}", keys.len(), self.path.display());
        Ok(())
    }
}
