use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::io::backend::{Backend, BackendKind, StorageError};
use crate::io::recovery::atomic_write;
use crate::model::store::TaskMap;

/// Key the whole task map is stored under
pub const TASKS_KEY: &str = "dayplan.tasks";

/// File name of the key-value store
pub const KV_FILE: &str = "local_storage.json";

/// A string-to-string store persisted as one JSON object.
#[derive(Debug, Clone)]
pub struct KvStore {
    path: PathBuf,
}

impl KvStore {
    pub fn new(path: PathBuf) -> Self {
        KvStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value);
        self.write_all(&items)
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(StorageError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let text = serde_json::to_string(items)?;
        let write_error = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        atomic_write(&self.path, text.as_bytes()).map_err(write_error)
    }
}

/// Fallback backend: the task map as a JSON blob under [`TASKS_KEY`].
#[derive(Debug, Clone)]
pub struct KvBackend {
    store: KvStore,
}

impl KvBackend {
    pub fn new(store: KvStore) -> Self {
        KvBackend { store }
    }

    pub fn store(&self) -> &KvStore {
        &self.store
    }
}

impl Backend for KvBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::KeyValue
    }

    fn save(&self, tasks: &TaskMap) -> Result<(), StorageError> {
        let blob = serde_json::to_string(tasks)?;
        self.store.set_item(TASKS_KEY, blob)
    }

    fn load(&self) -> Result<TaskMap, StorageError> {
        match self.store.get_item(TASKS_KEY)? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(TaskMap::new()),
        }
    }
}
