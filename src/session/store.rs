use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, warn};

use crate::food::types::NutritionRecord;

/// Key under which the latest analysis is stored.
pub const SESSION_KEY: &str = "foodData";

/// Synchronous string key/value storage scoped to one local profile.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> io::Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove_item(&self, key: &str) -> io::Result<()>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        // Write-then-rename so a crash never leaves a half-written record.
        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&staging, value)?;
        fs::rename(&staging, &target)
    }

    fn remove_item(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> io::Result<()> {
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> io::Result<()> {
        self.items.write().remove(key);
        Ok(())
    }
}

/// Single-slot persistence of the most recent NutritionRecord.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn LocalStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn open<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        Ok(Self::new(Arc::new(FileStorage::new(dir)?)))
    }

    /// Overwrites whatever was stored before. Failures are logged, not raised.
    ///
    /// Storage I/O runs on the blocking pool.
    pub async fn save(&self, record: &NutritionRecord) {
        let value = match serde_json::to_string(record) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "failed to serialize food data");
                return;
            }
        };

        let storage = self.storage.clone();
        match task::spawn_blocking(move || storage.set_item(SESSION_KEY, &value)).await {
            Ok(Ok(())) => debug!(food = %record.name, "food data stored"),
            Ok(Err(e)) => warn!(error = %e, "failed to store food data"),
            Err(e) => warn!(error = %e, "food data write task failed"),
        }
    }

    /// Absent or corrupt data is a cache miss. Blocking; called once at startup.
    pub fn load(&self) -> Option<NutritionRecord> {
        let stored = match self.storage.get_item(SESSION_KEY) {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "failed to read stored food data");
                return None;
            }
        };

        match serde_json::from_str(&stored) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "ignoring corrupt stored food data");
                None
            }
        }
    }

    pub async fn clear(&self) {
        let storage = self.storage.clone();
        match task::spawn_blocking(move || storage.remove_item(SESSION_KEY)).await {
            Ok(Ok(())) => debug!("food data cleared"),
            Ok(Err(e)) => warn!(error = %e, "failed to clear stored food data"),
            Err(e) => warn!(error = %e, "food data clear task failed"),
        }
    }
}
