//! Configuration loading and root folder resolution
//!
//! Resolution priority for the config file:
//! 1. Explicit path (command-line argument)
//! 2. `CELLAR_CONFIG` environment variable
//! 3. Platform config directory (`<config_dir>/cellar/config.toml`)
//! 4. Compiled defaults

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CellarConfig {
    /// Listen address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Data root folder; platform default when unset
    pub root_folder: Option<PathBuf>,
    /// Database file name inside the root folder
    pub database_file: String,
    /// Photo object storage settings
    pub storage: StorageConfig,
}

/// Photo object storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Logical bucket name reported by the health endpoint
    pub bucket: String,
    /// Base URL prefixed to signed media URLs
    pub base_url: String,
    /// Secret used to sign expiring media URLs
    pub secret: String,
}

impl Default for CellarConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5850,
            root_folder: None,
            database_file: "cellar.db".to_string(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "wine-cellar-photos".to_string(),
            base_url: "http://127.0.0.1:5850".to_string(),
            secret: "change-me".to_string(),
        }
    }
}

impl CellarConfig {
    /// Load configuration following the documented priority order.
    ///
    /// A missing config file falls back to defaults; a present but
    /// malformed file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var("CELLAR_CONFIG") {
            return Self::from_file(Path::new(&path));
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Resolved data root folder
    pub fn root_folder(&self) -> PathBuf {
        self.root_folder
            .clone()
            .unwrap_or_else(default_root_folder)
    }

    /// Path of the SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.root_folder().join(&self.database_file)
    }

    /// Directory holding stored photo objects
    pub fn storage_root(&self) -> PathBuf {
        self.root_folder().join("objects")
    }

    /// Create the root folder (and object directory) if missing
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(self.root_folder())?;
        std::fs::create_dir_all(self.storage_root())?;
        Ok(())
    }
}

/// Default configuration file path for the platform
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cellar").join("config.toml"))
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("cellar"))
        .unwrap_or_else(|| PathBuf::from("./cellar_data"))
}
