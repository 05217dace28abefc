//! In-memory object store.

use crate::error::{Result, StoreError};
use crate::store::{page_after, ListPage, ObjectStore};
use async_trait::async_trait;
use piiscan_core::config::DEFAULT_PAGE_SIZE;
use piiscan_core::{CollectionName, ObjectKey};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

type Collection = BTreeMap<ObjectKey, Vec<u8>>;

/// Object store that keeps every collection in memory.
///
/// Objects are stored as raw bytes so undecodable bodies can be staged.
#[derive(Debug)]
pub struct MemoryObjectStore {
    collections: RwLock<HashMap<CollectionName, Collection>>,
    page_size: usize,
}

impl MemoryObjectStore {
    /// Create an empty store with the default page size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the number of keys returned per listing page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Create a collection if it doesn't already exist.
    pub async fn create_collection(&self, collection: &CollectionName) {
        self.collections
            .write()
            .await
            .entry(collection.clone())
            .or_default();
    }

    /// Store raw bytes under a key, creating the collection if needed.
    pub async fn insert(
        &self,
        collection: &CollectionName,
        key: &ObjectKey,
        content: impl Into<Vec<u8>>,
    ) {
        self.collections
            .write()
            .await
            .entry(collection.clone())
            .or_default()
            .insert(key.clone(), content.into());
    }

    /// Number of objects in a collection (0 if it doesn't exist).
    pub async fn object_count(&self, collection: &CollectionName) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    async fn read_object(&self, collection: &CollectionName, key: &ObjectKey) -> Result<Vec<u8>> {
        let collections = self.collections.read().await;
        let objects = collections
            .get(collection)
            .ok_or_else(|| collection_not_found(collection))?;

        objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            })
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

fn collection_not_found(collection: &CollectionName) -> StoreError {
    StoreError::CollectionNotFound {
        collection: collection.to_string(),
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_page(
        &self,
        collection: &CollectionName,
        continuation: Option<&str>,
    ) -> Result<ListPage> {
        let collections = self.collections.read().await;
        let objects = collections
            .get(collection)
            .ok_or_else(|| collection_not_found(collection))?;

        let keys: Vec<ObjectKey> = objects.keys().cloned().collect();
        Ok(page_after(&keys, continuation, self.page_size))
    }

    async fn get_content(&self, collection: &CollectionName, key: &ObjectKey) -> Result<String> {
        let bytes = self.read_object(collection, key).await?;
        String::from_utf8(bytes).map_err(|_| StoreError::InvalidUtf8 {
            collection: collection.to_string(),
            key: key.to_string(),
        })
    }

    async fn get_size(&self, collection: &CollectionName, key: &ObjectKey) -> Result<u64> {
        let collections = self.collections.read().await;
        let objects = collections
            .get(collection)
            .ok_or_else(|| collection_not_found(collection))?;

        objects
            .get(key)
            .map(|bytes| bytes.len() as u64)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            })
    }

    async fn put(
        &self,
        collection: &CollectionName,
        key: &ObjectKey,
        content: String,
    ) -> Result<()> {
        let mut collections = self.collections.write().await;
        let objects = collections
            .get_mut(collection)
            .ok_or_else(|| collection_not_found(collection))?;

        objects.insert(key.clone(), content.into_bytes());
        Ok(())
    }

    fn store_id(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(name: &str) -> CollectionName {
        CollectionName::new(name).expect("valid collection name")
    }

    fn key(name: &str) -> ObjectKey {
        ObjectKey::new(name).expect("valid key")
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = MemoryObjectStore::new();
        let out = collection("pii-scan-output");
        store.create_collection(&out).await;

        store
            .put(&out, &key("r.txt"), "héllo".to_string())
            .await
            .expect("put object");

        let content = store.get_content(&out, &key("r.txt")).await.expect("get");
        assert_eq!(content, "héllo");
        let size = store.get_size(&out, &key("r.txt")).await.expect("size");
        assert_eq!(size, "héllo".len() as u64);
    }

    #[tokio::test]
    async fn test_put_into_missing_collection_fails() {
        let store = MemoryObjectStore::new();
        let result = store
            .put(&collection("missing"), &key("r.txt"), String::new())
            .await;
        assert!(matches!(result, Err(StoreError::CollectionNotFound { .. })));
    }

    #[tokio::test]
    async fn test_missing_object() {
        let store = MemoryObjectStore::new();
        let src = collection("random-pii-text");
        store.create_collection(&src).await;

        let result = store.get_content(&src, &key("nope.txt")).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        let result = store.get_size(&src, &key("nope.txt")).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_invalid_utf8() {
        let store = MemoryObjectStore::new();
        let src = collection("random-pii-text");
        store.insert(&src, &key("blob.bin"), vec![0xff, 0xfe, 0x00]).await;

        let result = store.get_content(&src, &key("blob.bin")).await;
        assert!(matches!(result, Err(StoreError::InvalidUtf8 { .. })));
        // Size is still available for undecodable objects
        assert_eq!(store.get_size(&src, &key("blob.bin")).await.expect("size"), 3);
    }

    #[tokio::test]
    async fn test_list_follows_pages() {
        let store = MemoryObjectStore::new().with_page_size(2);
        let src = collection("random-pii-text");
        for name in ["e.txt", "a.txt", "c.txt", "b.txt", "d.txt"] {
            store.insert(&src, &key(name), "x").await;
        }

        let first = store.list_page(&src, None).await.expect("first page");
        assert_eq!(first.keys.len(), 2);
        assert!(first.next_continuation.is_some());

        let all = store.list(&src).await.expect("list all");
        let names: Vec<&str> = all.iter().map(ObjectKey::as_str).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"]);
    }

    #[tokio::test]
    async fn test_list_missing_collection() {
        let store = MemoryObjectStore::new();
        let result = store.list(&collection("missing")).await;
        assert!(matches!(result, Err(StoreError::CollectionNotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_empty_collection() {
        let store = MemoryObjectStore::new();
        let src = collection("random-pii-text");
        store.create_collection(&src).await;

        assert!(store.list(&src).await.expect("list").is_empty());
        assert_eq!(store.object_count(&src).await, 0);
    }
}
