//! piiscan Core - Foundation crate for the piiscan workspace.
//!
//! This crate provides shared types, error handling, and configuration
//! management that the other piiscan crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes (`CollectionName`, `ObjectKey`, `RunId`, `Timestamp`)
//!
//! # Example
//!
//! ```rust
//! use piiscan_core::{AppConfig, ObjectKey};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let source = config.source_collection()?;
//!
//! let key = ObjectKey::new("folder/sample.txt")?;
//! assert_eq!(key.report_key().as_str(), "sample_pii_results.txt");
//! println!("scanning {source}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, CollectionsConfig, LoggingConfig, ScanningConfig, StoreConfig};
pub use error::{ConfigError, ConfigResult, PiiScanError, Result};
pub use types::{
    derive_report_key, CollectionName, ObjectKey, RunId, Timestamp, REPORT_EXTENSION,
    REPORT_SUFFIX,
};
