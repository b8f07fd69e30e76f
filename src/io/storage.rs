use std::fs;
use std::path::{Path, PathBuf};

use crate::io::backend::{Backend, BackendKind};
use crate::io::file_backend::FileBackend;
use crate::io::kv_backend::{KV_FILE, KvBackend, KvStore};
use crate::model::config::{BackendSetting, StorageConfig};

/// Resolve the data directory: `DAYPLAN_DIR`, then `$XDG_DATA_HOME/dayplan`,
/// then `~/.local/share/dayplan`.
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DAYPLAN_DIR")
        && !dir.trim().is_empty()
    {
        return PathBuf::from(dir);
    }
    let data_home = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".local").join("share"));
    data_home.join("dayplan")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Where the key-value fallback keeps its data when the data directory is
/// unusable
pub fn fallback_kv_path() -> PathBuf {
    std::env::temp_dir().join("dayplan").join(KV_FILE)
}

/// The persistence medium picked for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Medium {
    /// Task file at this path
    File(PathBuf),
    /// Key-value store file at this path
    KeyValue(PathBuf),
}

impl Medium {
    pub fn kind(&self) -> BackendKind {
        match self {
            Medium::File(_) => BackendKind::File,
            Medium::KeyValue(_) => BackendKind::KeyValue,
        }
    }
}

/// Pick the medium once, at startup.
///
/// `auto` means the task file when the data directory can be created and
/// written, otherwise the key-value store in the temp directory.
pub fn detect_medium(config: &StorageConfig, data_dir: &Path) -> Medium {
    let file = data_dir.join(&config.file);
    match config.backend {
        BackendSetting::File => Medium::File(file),
        BackendSetting::Kv => Medium::KeyValue(data_dir.join(KV_FILE)),
        BackendSetting::Auto => {
            if dir_is_writable(data_dir) {
                Medium::File(file)
            } else {
                tracing::warn!(
                    data_dir = %data_dir.display(),
                    "data directory not writable, using local key-value store"
                );
                Medium::KeyValue(fallback_kv_path())
            }
        }
    }
}

fn dir_is_writable(dir: &Path) -> bool {
    if fs::create_dir_all(dir).is_err() {
        return false;
    }
    tempfile::NamedTempFile::new_in(dir).is_ok()
}

/// Build the direct backend for a medium (no host worker)
pub fn open_backend(medium: &Medium, data_dir: &Path) -> Box<dyn Backend> {
    match medium {
        Medium::File(path) => Box::new(file_backend_at(path, data_dir)),
        Medium::KeyValue(path) => Box::new(KvBackend::new(KvStore::new(path.clone()))),
    }
}

/// File backend for a task file path
pub fn file_backend_at(path: &Path, data_dir: &Path) -> FileBackend {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tasks.csv".to_string());
    let dir = path.parent().unwrap_or(data_dir);
    FileBackend::new(dir, &file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn auto_prefers_file_when_writable() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        let medium = detect_medium(&StorageConfig::default(), &data_dir);
        assert_eq!(medium, Medium::File(data_dir.join("tasks.csv")));
        assert!(data_dir.is_dir());
    }

    #[test]
    fn auto_falls_back_when_dir_cannot_be_created() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let medium = detect_medium(&StorageConfig::default(), &blocker.join("data"));
        assert_eq!(medium, Medium::KeyValue(fallback_kv_path()));
    }

    #[test]
    fn explicit_setting_wins() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig {
            backend: BackendSetting::Kv,
            ..Default::default()
        };
        let medium = detect_medium(&config, dir.path());
        assert_eq!(medium, Medium::KeyValue(dir.path().join(KV_FILE)));
        assert_eq!(medium.kind(), BackendKind::KeyValue);
    }

    #[test]
    fn open_backend_matches_medium() {
        let dir = TempDir::new().unwrap();
        let file = open_backend(&Medium::File(dir.path().join("t.csv")), dir.path());
        assert_eq!(file.kind(), BackendKind::File);
        let kv = open_backend(&Medium::KeyValue(dir.path().join(KV_FILE)), dir.path());
        assert_eq!(kv.kind(), BackendKind::KeyValue);
    }
}
