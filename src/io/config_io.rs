use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Error type for config reads and edits
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("config is not valid TOML: {0}")]
    SyntaxError(#[from] toml_edit::TomlError),
    #[error("config key must look like section.name: {0}")]
    BadKey(String),
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

/// Read the config, returning both the parsed config and the raw
/// toml_edit document for formatting-preserving edits. A missing file
/// yields defaults and an empty document.
pub fn read_config(data_dir: &Path) -> Result<(Config, toml_edit::DocumentMut), ConfigError> {
    let path = config_path(data_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(source) => return Err(ConfigError::ReadError { path, source }),
    };
    let config: Config = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Load just the parsed config, falling back to defaults on any error
pub fn load_config_or_default(data_dir: &Path) -> Config {
    match read_config(data_dir) {
        Ok((config, _)) => config,
        Err(e) => {
            tracing::warn!(error = %e, "using default config");
            Config::default()
        }
    }
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let path = config_path(data_dir);
    let write_error = |source| ConfigError::WriteError {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(data_dir).map_err(write_error)?;
    fs::write(&path, doc.to_string()).map_err(write_error)
}

fn split_key(key: &str) -> Result<(&str, &str), ConfigError> {
    match key.split_once('.') {
        Some((section, name)) if !section.is_empty() && !name.is_empty() => Ok((section, name)),
        _ => Err(ConfigError::BadKey(key.to_string())),
    }
}

/// Look up `section.name` in the document as display text.
pub fn get_config_value(doc: &toml_edit::DocumentMut, key: &str) -> Result<Option<String>, ConfigError> {
    let (section, name) = split_key(key)?;
    let value = doc
        .get(section)
        .and_then(|table| table.get(name))
        .and_then(|item| item.as_value())
        .map(|value| match value {
            toml_edit::Value::String(s) => s.value().clone(),
            toml_edit::Value::Integer(n) => n.value().to_string(),
            toml_edit::Value::Boolean(b) => b.value().to_string(),
            toml_edit::Value::Float(f) => f.value().to_string(),
            other => other.to_string().trim().to_string(),
        });
    Ok(value)
}

/// Set `section.name`, inferring integer and boolean values.
///
/// The edited document must still parse as a valid config.
pub fn set_config_value(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    raw: &str,
) -> Result<(), ConfigError> {
    let (section, name) = split_key(key)?;
    if doc.get(section).is_some_and(|item| !item.is_table_like()) {
        return Err(ConfigError::BadKey(key.to_string()));
    }
    if !doc.contains_key(section) {
        doc[section] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let value = if let Ok(n) = raw.parse::<i64>() {
        toml_edit::value(n)
    } else if let Ok(b) = raw.parse::<bool>() {
        toml_edit::value(b)
    } else {
        toml_edit::value(raw)
    };
    doc[section][name] = value;
    toml::from_str::<Config>(&doc.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::BackendSetting;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"# storage settings
[storage]
backend = "file"   # keep the csv
autosave_secs = 30

[ui]
page_size = 10
"#;

    #[test]
    fn missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config.ui.page_size, 25);
        assert!(doc.to_string().is_empty());
    }

    #[test]
    fn round_trip_preserves_formatting() {
        let tmp = TempDir::new().unwrap();
        fs::write(config_path(tmp.path()), SAMPLE).unwrap();
        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config.storage.backend, BackendSetting::File);
        write_config(tmp.path(), &doc).unwrap();
        assert_eq!(fs::read_to_string(config_path(tmp.path())).unwrap(), SAMPLE);
    }

    #[test]
    fn set_infers_types() {
        let mut doc: toml_edit::DocumentMut = SAMPLE.parse().unwrap();
        set_config_value(&mut doc, "ui.page_size", "50").unwrap();
        set_config_value(&mut doc, "storage.backend", "kv").unwrap();
        let config: Config = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.ui.page_size, 50);
        assert_eq!(config.storage.backend, BackendSetting::Kv);
        assert!(doc.to_string().contains("# storage settings"));
    }

    #[test]
    fn set_creates_missing_section() {
        let mut doc = toml_edit::DocumentMut::new();
        set_config_value(&mut doc, "storage.exit_grace_ms", "250").unwrap();
        assert_eq!(
            get_config_value(&doc, "storage.exit_grace_ms").unwrap().as_deref(),
            Some("250")
        );
    }

    #[test]
    fn invalid_value_is_rejected() {
        let mut doc: toml_edit::DocumentMut = SAMPLE.parse().unwrap();
        assert!(matches!(
            set_config_value(&mut doc, "ui.page_size", "lots"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn get_reads_strings_bare() {
        let doc: toml_edit::DocumentMut = SAMPLE.parse().unwrap();
        assert_eq!(get_config_value(&doc, "storage.backend").unwrap().as_deref(), Some("file"));
        assert_eq!(get_config_value(&doc, "ui.missing").unwrap(), None);
        assert!(matches!(get_config_value(&doc, "nodot"), Err(ConfigError::BadKey(_))));
    }
}
