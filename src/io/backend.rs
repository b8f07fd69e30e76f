use std::fmt;
use std::path::PathBuf;

use crate::model::store::{Store, TaskMap};

/// Which medium a backend writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Delimited-text task file
    File,
    /// Key-value store fallback
    KeyValue,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::File => write!(f, "file"),
            BackendKind::KeyValue => write!(f, "kv"),
        }
    }
}

/// Error type for backend reads and writes
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("stored data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("host reported failure: {0}")]
    Host(String),
    #[error("host did not answer in time")]
    HostTimeout,
    #[error("host is gone")]
    HostDisconnected,
}

/// A persistence medium holding the whole task map.
pub trait Backend {
    fn kind(&self) -> BackendKind;

    /// Replace the stored mapping with `tasks`
    fn save(&self, tasks: &TaskMap) -> Result<(), StorageError>;

    /// Read the stored mapping. A missing medium is an empty mapping.
    fn load(&self) -> Result<TaskMap, StorageError>;
}

/// The one backend the application talks to, chosen at startup.
pub struct Gateway {
    backend: Box<dyn Backend>,
}

impl Gateway {
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Gateway { backend }
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Persist the whole store.
    pub fn save(&self, store: &Store) -> Result<(), StorageError> {
        match self.backend.save(store.tasks()) {
            Ok(()) => {
                tracing::debug!(backend = %self.kind(), tasks = store.len(), "saved");
                Ok(())
            }
            Err(e) => {
                tracing::error!(backend = %self.kind(), error = %e, "save failed");
                Err(e)
            }
        }
    }

    /// Load the stored mapping. Never fails: errors yield an empty mapping.
    pub fn load(&self) -> TaskMap {
        match self.backend.load() {
            Ok(tasks) => {
                tracing::info!(backend = %self.kind(), dates = tasks.len(), "loaded");
                tasks
            }
            Err(e) => {
                tracing::warn!(backend = %self.kind(), error = %e, "load failed, starting empty");
                TaskMap::new()
            }
        }
    }
}
