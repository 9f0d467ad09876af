//! Storage layout configuration.
//!
//! ```toml
//! [storage]
//! data_dir = "./data"
//! memory_file = "memories.json"
//! log_file = "logs.jsonl"
//! dataset_file = "training/dataset.jsonl"
//! ```
//!
//! # Environment Variables
//!
//! - `AJAR_DATA_DIR` - Override the data directory

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable overriding the configured data directory.
pub const DATA_DIR_ENV: &str = "AJAR_DATA_DIR";

/// Where the memory collection, transcript log and dataset live.
///
/// Relative file names resolve against the effective data directory;
/// absolute ones are used as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for all persisted state.
    /// Default: `./data`
    pub data_dir: Option<PathBuf>,

    /// JSON array of memory notes.
    pub memory_file: PathBuf,

    /// JSON Lines transcript log.
    pub log_file: PathBuf,

    /// JSON Lines dataset output, regenerated on every build.
    pub dataset_file: PathBuf,

    /// Directory named on the command line. Beats the environment and the
    /// file; never read from or written to TOML.
    #[serde(skip)]
    pub data_dir_override: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            memory_file: PathBuf::from("memories.json"),
            log_file: PathBuf::from("logs.jsonl"),
            dataset_file: PathBuf::from("training").join("dataset.jsonl"),
            data_dir_override: None,
        }
    }
}

impl StorageConfig {
    /// Pin the data directory, ignoring `AJAR_DATA_DIR` and `data_dir`.
    pub fn with_data_dir_override(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir_override = Some(dir.into());
        self
    }

    /// Get the effective data directory.
    ///
    /// Resolution order:
    /// 1. Explicit override (`--data-dir`)
    /// 2. `AJAR_DATA_DIR` environment variable
    /// 3. Configured `data_dir` value
    /// 4. Default: `./data`
    pub fn effective_data_dir(&self) -> PathBuf {
        self.resolve_data_dir(std::env::var(DATA_DIR_ENV).ok())
    }

    fn resolve_data_dir(&self, env_override: Option<String>) -> PathBuf {
        if let Some(dir) = &self.data_dir_override {
            return dir.clone();
        }
        if let Some(dir) = env_override.filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    /// Path of the memory collection.
    pub fn memory_path(&self) -> PathBuf {
        resolve(&self.effective_data_dir(), &self.memory_file)
    }

    /// Path of the transcript log.
    pub fn log_path(&self) -> PathBuf {
        resolve(&self.effective_data_dir(), &self.log_file)
    }

    /// Path of the dataset output.
    pub fn dataset_path(&self) -> PathBuf {
        resolve(&self.effective_data_dir(), &self.dataset_file)
    }

    /// Directory for rolling diagnostic logs.
    pub fn logs_dir(&self) -> PathBuf {
        self.effective_data_dir().join("logs")
    }
}

fn resolve(base: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        base.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.resolve_data_dir(None), PathBuf::from("data"));
        assert_eq!(config.memory_file, PathBuf::from("memories.json"));
        assert_eq!(config.log_file, PathBuf::from("logs.jsonl"));
    }

    #[test]
    fn test_env_override_wins() {
        let config = StorageConfig {
            data_dir: Some(PathBuf::from("/srv/ajar")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_data_dir(Some("/tmp/override".into())),
            PathBuf::from("/tmp/override")
        );
        assert_eq!(
            config.resolve_data_dir(Some(String::new())),
            PathBuf::from("/srv/ajar")
        );
    }

    #[test]
    fn test_explicit_override_beats_env() {
        let config = StorageConfig {
            data_dir: Some(PathBuf::from("/srv/ajar")),
            ..Default::default()
        }
        .with_data_dir_override("/tmp/flag");
        assert_eq!(
            config.resolve_data_dir(Some("/tmp/env".into())),
            PathBuf::from("/tmp/flag")
        );
        assert_eq!(config.memory_path(), PathBuf::from("/tmp/flag/memories.json"));
    }

    #[test]
    fn test_override_not_serialized() {
        let config = StorageConfig::default().with_data_dir_override("/tmp/flag");
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("/tmp/flag"));
    }

    #[test]
    fn test_relative_and_absolute_files() {
        let base = Path::new("/var/lib/ajar");
        assert_eq!(
            resolve(base, Path::new("logs.jsonl")),
            PathBuf::from("/var/lib/ajar/logs.jsonl")
        );
        assert_eq!(
            resolve(base, Path::new("/elsewhere/logs.jsonl")),
            PathBuf::from("/elsewhere/logs.jsonl")
        );
    }

    #[test]
    fn test_parse_partial_section() {
        let config: StorageConfig = toml::from_str(r#"log_file = "transcripts.jsonl""#).unwrap();
        assert_eq!(config.log_file, PathBuf::from("transcripts.jsonl"));
        assert_eq!(config.memory_file, PathBuf::from("memories.json"));
    }
}
