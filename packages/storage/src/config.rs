use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{StorageError, StorageResult};

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Storage configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// Directory holding one file per document
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Copy the previous file to a `.backup` sibling before each save
    #[serde(default = "default_backups")]
    pub backups: bool,

    /// Author stamped on newly created documents
    #[serde(default)]
    pub default_author: String,

    /// File extension for document files
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_root() -> PathBuf {
    PathBuf::from("notes")
}

fn default_backups() -> bool {
    true
}

fn default_extension() -> String {
    "json".to_string()
}

impl StorageConfig {
    /// Config rooted at `root` with everything else defaulted
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load config from a directory
    ///
    /// A relative `root` is resolved against `dir`. Missing files yield the
    /// defaults; unreadable or malformed ones are an error.
    pub fn load(dir: &Path) -> StorageResult<Self> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str::<StorageConfig>(&content)
                .map_err(|e| StorageError::Config(format!("{}: {}", config_path.display(), e)))?
        } else {
            // Return default config if none exists
            StorageConfig::default()
        };

        if config.root.is_relative() {
            config.root = dir.join(&config.root);
        }
        if config.extension.is_empty() || config.extension.contains('.') {
            return Err(StorageError::Config(format!(
                "invalid document extension {:?}",
                config.extension
            )));
        }

        Ok(config)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            backups: default_backups(),
            default_author: String::new(),
            extension: default_extension(),
        }
    }
}
