//! piiscan Scanner - Batch PII scanning of object store collections.
//!
//! This crate runs the scanning pipeline: it lists a source collection,
//! fetches each object, finds email addresses, phone numbers and
//! credit-card-like numbers in its text, and writes a plain-text report per
//! object to a destination collection.
//!
//! # Features
//!
//! - Bounded concurrency across objects (sequential by default)
//! - Per-object failure isolation: a bad object is recorded and skipped
//! - Per-object and whole-batch timing
//! - Reports rendered as values, independent of where they are written
//!
//! # Example
//!
//! ```rust,no_run
//! use piiscan_core::CollectionName;
//! use piiscan_scanner::{BatchConfig, BatchDriver};
//! use piiscan_store::FsObjectStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(FsObjectStore::new("/srv/objects"));
//! let config = BatchConfig::new(
//!     CollectionName::new("random-pii-text")?,
//!     CollectionName::new("pii-scan-output")?,
//! )
//! .with_max_concurrent_scans(4);
//!
//! let summary = BatchDriver::new(store, config).run().await?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod error;
pub mod orchestrator;
pub mod report;
pub mod scanner;

// Re-export commonly used types
pub use error::{FailureKind, Result, ScanError};
pub use orchestrator::{BatchConfig, BatchDriver, BatchSummary, ObjectFailure, ObjectOutcome};
pub use report::{format_report, Report};
pub use scanner::{ObjectScanner, ScanResult};
