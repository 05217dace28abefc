//! Configuration management for piiscan.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::types::CollectionName;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default upper bound on the size of a single scanned object (100MB).
pub const DEFAULT_MAX_OBJECT_BYTES: u64 = 100 * 1024 * 1024;

/// Default number of keys returned per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Main application configuration.
///
/// This is loaded from `~/.config/piiscan/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Source and destination collections
    pub collections: CollectionsConfig,
    /// Scanning behavior settings
    pub scanning: ScanningConfig,
    /// Object store settings
    pub store: StoreConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file path.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `PIISCAN_SOURCE`: Override the source collection
    /// - `PIISCAN_DESTINATION`: Override the destination collection
    /// - `PIISCAN_CONCURRENT_SCANS`: Override the number of concurrent scans
    /// - `PIISCAN_MAX_OBJECT_BYTES`: Override the per-object size limit
    /// - `PIISCAN_STORE_ROOT`: Override the filesystem store root
    /// - `PIISCAN_LOG`: Override the log filter
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    ///
    /// Values that fail to parse are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("PIISCAN_SOURCE") {
            tracing::debug!("Override collections.source from env: {}", val);
            self.collections.source = val;
        }

        if let Some(val) = lookup("PIISCAN_DESTINATION") {
            tracing::debug!("Override collections.destination from env: {}", val);
            self.collections.destination = val;
        }

        if let Some(val) = lookup("PIISCAN_CONCURRENT_SCANS") {
            if let Ok(scans) = val.parse() {
                self.scanning.concurrent_scans = scans;
                tracing::debug!("Override scanning.concurrent_scans from env: {}", scans);
            }
        }

        if let Some(val) = lookup("PIISCAN_MAX_OBJECT_BYTES") {
            if let Ok(bytes) = val.parse() {
                self.scanning.max_object_bytes = bytes;
                tracing::debug!("Override scanning.max_object_bytes from env: {}", bytes);
            }
        }

        if let Some(val) = lookup("PIISCAN_STORE_ROOT") {
            tracing::debug!("Override store.root from env: {}", val);
            self.store.root = PathBuf::from(val);
        }

        if let Some(val) = lookup("PIISCAN_LOG") {
            self.logging.filter = val;
        }
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> ConfigResult<()> {
        self.source_collection()?;
        self.destination_collection()?;

        if self.collections.source == self.collections.destination {
            return Err(ConfigError::InvalidValue {
                field: "collections.destination".to_string(),
                reason: "must differ from collections.source".to_string(),
            });
        }

        if self.scanning.concurrent_scans == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanning.concurrent_scans".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.scanning.max_object_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanning.max_object_bytes".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.store.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "store.page_size".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Validated source collection name.
    pub fn source_collection(&self) -> ConfigResult<CollectionName> {
        collection_field("collections.source", &self.collections.source)
    }

    /// Validated destination collection name.
    pub fn destination_collection(&self) -> ConfigResult<CollectionName> {
        collection_field("collections.destination", &self.collections.destination)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit file path.
    pub fn save_to(&self, config_path: &Path) -> ConfigResult<()> {
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/piiscan/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "piiscan", "piiscan").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

fn collection_field(field: &str, value: &str) -> ConfigResult<CollectionName> {
    CollectionName::new(value).map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Source and destination collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionsConfig {
    /// Collection whose objects are scanned
    pub source: String,
    /// Collection that receives one report per scanned object
    pub destination: String,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            source: "random-pii-text".to_string(),
            destination: "pii-scan-output".to_string(),
        }
    }
}

/// Scanning behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Number of objects processed at once (1 = strictly sequential)
    pub concurrent_scans: usize,
    /// Objects larger than this are skipped and reported as failures
    pub max_object_bytes: u64,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            concurrent_scans: 1,
            max_object_bytes: DEFAULT_MAX_OBJECT_BYTES,
        }
    }
}

/// Object store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory of the filesystem store; each collection is a subdirectory
    pub root: PathBuf,
    /// Number of keys per listing page
    pub page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("store"),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,piiscan=debug".to_string(),
        }
    }
}
