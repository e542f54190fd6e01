//! Application configuration loaded from YAML.

use crate::RuntimeError;
use persistence::{default_storage_dir, SnapshotStore, DEFAULT_KEY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use wellness_engine::DayBoundary;

/// Top-level configuration; every section is optional in the file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub time: TimeConfig,
    pub log: LogConfig,
}

/// Where snapshots live.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: PathBuf,
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(default_storage_dir()),
            key: DEFAULT_KEY.to_string(),
        }
    }
}

/// Calendar-day policy for streaks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub day_boundary: DayBoundary,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parse YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Read and parse the file at `path`.
    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        let text = fs::read_to_string(path).map_err(|source| RuntimeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| RuntimeError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, RuntimeError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Snapshot store described by the storage section.
    pub fn store(&self) -> SnapshotStore {
        SnapshotStore::new(&self.storage.dir, &self.storage.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_yaml("{}").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.storage.key, DEFAULT_KEY);
        assert_eq!(cfg.time.day_boundary, DayBoundary::Local);
        assert_eq!(cfg.log.filter, "info");
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg = AppConfig::from_yaml(
            "storage:\n  dir: /tmp/wellness\ntime:\n  day_boundary: utc\n",
        )
        .unwrap();
        assert_eq!(cfg.storage.dir, PathBuf::from("/tmp/wellness"));
        assert_eq!(cfg.storage.key, DEFAULT_KEY);
        assert_eq!(cfg.time.day_boundary, DayBoundary::Utc);
        assert_eq!(
            cfg.store().path(),
            PathBuf::from("/tmp/wellness").join(format!("{DEFAULT_KEY}.json"))
        );
    }

    #[test]
    fn unknown_boundary_is_an_error() {
        assert!(AppConfig::from_yaml("time:\n  day_boundary: mars\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
        assert_eq!(AppConfig::load_or_default(None).unwrap(), AppConfig::default());
    }
}
