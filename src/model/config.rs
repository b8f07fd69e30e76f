use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Which persistence medium to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendSetting {
    /// Pick the file when the data directory is writable, else the key-value store
    #[default]
    Auto,
    File,
    Kv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendSetting,
    /// Task file name, relative to the data directory
    #[serde(default = "default_file")]
    pub file: String,
    /// Safety save interval for the key-value store
    #[serde(default = "default_autosave_secs")]
    pub autosave_secs: u64,
    /// How long the exit hook waits for the final save
    #[serde(default = "default_exit_grace_ms")]
    pub exit_grace_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            backend: BackendSetting::Auto,
            file: default_file(),
            autosave_secs: default_autosave_secs(),
            exit_grace_ms: default_exit_grace_ms(),
        }
    }
}

impl StorageConfig {
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_secs.max(1))
    }

    pub fn exit_grace(&self) -> Duration {
        Duration::from_millis(self.exit_grace_ms)
    }
}

fn default_file() -> String {
    "tasks.csv".to_string()
}

fn default_autosave_secs() -> u64 {
    30
}

fn default_exit_grace_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Hex overrides for theme slots, e.g. `highlight = "#FB4196"`
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            page_size: default_page_size(),
            colors: HashMap::new(),
        }
    }
}

fn default_page_size() -> usize {
    25
}
