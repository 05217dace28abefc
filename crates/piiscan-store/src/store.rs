//! Object store trait and listing types.

use crate::error::{Result, StoreError};
use async_trait::async_trait;
use piiscan_core::{CollectionName, ObjectKey};

/// Trait for object stores holding scan sources and reports.
///
/// Implementations should be thread-safe (Send + Sync) so a single store can
/// be shared across concurrent object scans.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of keys in a collection.
    ///
    /// Pass the `next_continuation` of the previous page to get the next one;
    /// `None` starts from the beginning.
    ///
    /// # Errors
    /// Returns error if the collection does not exist or cannot be read.
    async fn list_page(
        &self,
        collection: &CollectionName,
        continuation: Option<&str>,
    ) -> Result<ListPage>;

    /// List every key in a collection, following continuation tokens.
    ///
    /// # Errors
    /// Returns error if any page cannot be listed, or if a page hands back
    /// the continuation token it was requested with.
    async fn list(&self, collection: &CollectionName) -> Result<Vec<ObjectKey>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let page = self.list_page(collection, continuation.as_deref()).await?;
            tracing::debug!(
                "Listed {} keys from {} on {}",
                page.keys.len(),
                collection,
                self.store_id()
            );
            keys.extend(page.keys);

            match page.next_continuation {
                Some(token) if continuation.as_deref() == Some(token.as_str()) => {
                    return Err(StoreError::StalledListing {
                        collection: collection.to_string(),
                        continuation: token,
                    });
                }
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        Ok(keys)
    }

    /// Read an object's full body as text.
    ///
    /// # Errors
    /// Returns error if the object is missing or not valid UTF-8.
    async fn get_content(&self, collection: &CollectionName, key: &ObjectKey) -> Result<String>;

    /// Get an object's declared size in bytes.
    ///
    /// # Errors
    /// Returns error if the object is missing.
    async fn get_size(&self, collection: &CollectionName, key: &ObjectKey) -> Result<u64>;

    /// Write an object, replacing any existing object with the same key.
    ///
    /// # Errors
    /// Returns error if the collection is missing or the write fails.
    async fn put(&self, collection: &CollectionName, key: &ObjectKey, content: String)
        -> Result<()>;

    /// Get the identifier of this store, used in logs.
    fn store_id(&self) -> &str;
}

/// One page of a collection listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    /// Keys on this page, in lexicographic order
    pub keys: Vec<ObjectKey>,

    /// Token for the next page, `None` on the last page
    pub next_continuation: Option<String>,
}

/// Split a sorted key list into the page that follows `continuation`.
///
/// The continuation token is the last key of the previous page, so listing
/// resumes strictly after it.
pub(crate) fn page_after(
    sorted_keys: &[ObjectKey],
    continuation: Option<&str>,
    page_size: usize,
) -> ListPage {
    let start = continuation.map_or(0, |token| {
        sorted_keys.partition_point(|key| key.as_str() <= token)
    });
    let end = start.saturating_add(page_size).min(sorted_keys.len());
    let keys = sorted_keys[start..end].to_vec();

    let next_continuation = if end < sorted_keys.len() {
        keys.last().map(|key| key.as_str().to_string())
    } else {
        None
    };

    ListPage {
        keys,
        next_continuation,
    }
}
