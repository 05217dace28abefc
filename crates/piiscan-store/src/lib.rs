//! piiscan Store - Object store abstraction for scan sources and reports.
//!
//! The scanning pipeline only talks to the [`ObjectStore`] trait. Two
//! implementations ship with the crate:
//!
//! - [`MemoryObjectStore`] keeps collections in memory (tests, embedding)
//! - [`FsObjectStore`] maps collections to directories under a root
//!
//! Listing is paged; [`ObjectStore::list`] follows continuation tokens so
//! callers always see the whole collection.
//!
//! # Example
//!
//! ```rust
//! use piiscan_core::{CollectionName, ObjectKey};
//! use piiscan_store::{MemoryObjectStore, ObjectStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryObjectStore::new().with_page_size(100);
//! let source = CollectionName::new("random-pii-text")?;
//! store
//!     .insert(&source, &ObjectKey::new("t1.txt")?, "mail me at a@b.com")
//!     .await;
//!
//! for key in store.list(&source).await? {
//!     let text = store.get_content(&source, &key).await?;
//!     println!("{key}: {} chars", text.chars().count());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod filesystem;
pub mod memory;
pub mod store;

// Re-export commonly used types
pub use error::{Result, StoreError};
pub use filesystem::FsObjectStore;
pub use memory::MemoryObjectStore;
pub use store::{ListPage, ObjectStore};
