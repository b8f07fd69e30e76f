use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::io::backend::{Backend, BackendKind, StorageError};
use crate::io::recovery::{
    RecoveryCategory, RecoveryEntry, atomic_write, log_recovery, log_recovery_once,
};
use crate::model::store::TaskMap;
use crate::parse::{parse_task_file, serialize_task_file};

/// Task file on disk, rewritten in full on every save.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    /// Where the recovery log lives
    data_dir: PathBuf,
}

impl FileBackend {
    pub fn new(data_dir: &Path, file_name: &str) -> Self {
        FileBackend {
            path: data_dir.join(file_name),
            data_dir: data_dir.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for FileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    fn save(&self, tasks: &TaskMap) -> Result<(), StorageError> {
        let content = serialize_task_file(tasks);
        let result = fs::create_dir_all(&self.data_dir)
            .and_then(|()| atomic_write(&self.path, content.as_bytes()));
        if let Err(source) = result {
            log_recovery(
                &self.data_dir,
                RecoveryEntry::new(
                    RecoveryCategory::Write,
                    format!("could not write {}: {}", self.path.display(), source),
                    content,
                ),
            );
            return Err(StorageError::Write {
                path: self.path.clone(),
                source,
            });
        }
        Ok(())
    }

    fn load(&self) -> Result<TaskMap, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no task file yet");
                return Ok(TaskMap::new());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let (tasks, dropped) = parse_task_file(&text);
        for record in dropped {
            tracing::warn!(line = record.line, error = %record.error, "skipping malformed record");
            log_recovery_once(
                &self.data_dir,
                RecoveryEntry::new(
                    RecoveryCategory::Parser,
                    format!("line {}: {}", record.line, record.error),
                    record.text,
                ),
            );
        }
        Ok(tasks)
    }
}
