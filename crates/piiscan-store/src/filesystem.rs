//! Filesystem-backed object store.
//!
//! Each collection is a directory under the store root; object keys are the
//! `/`-joined relative paths of the regular files inside it.

use crate::error::{Result, StoreError};
use crate::store::{page_after, ListPage, ObjectStore};
use async_trait::async_trait;
use piiscan_core::config::DEFAULT_PAGE_SIZE;
use piiscan_core::{CollectionName, ObjectKey};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Maximum directory depth walked when listing a collection
const MAX_LIST_DEPTH: usize = 32;

/// Object store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    page_size: usize,
    id: String,
}

impl FsObjectStore {
    /// Create a store rooted at `root` with the default page size.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let id = format!("fs:{}", root.display());
        Self {
            root,
            page_size: DEFAULT_PAGE_SIZE,
            id,
        }
    }

    /// Set the number of keys returned per listing page.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Create the directory backing a collection.
    pub async fn create_collection(&self, collection: &CollectionName) -> Result<()> {
        fs::create_dir_all(self.collection_path(collection)).await?;
        Ok(())
    }

    fn collection_path(&self, collection: &CollectionName) -> PathBuf {
        self.root.join(collection.as_str())
    }

    fn object_path(&self, collection: &CollectionName, key: &ObjectKey) -> PathBuf {
        key.segments()
            .fold(self.collection_path(collection), |path, segment| {
                path.join(segment)
            })
    }

    async fn ensure_collection(&self, collection: &CollectionName) -> Result<PathBuf> {
        let path = self.collection_path(collection);
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_dir() => Ok(path),
            Ok(_) => Err(StoreError::CollectionNotFound {
                collection: collection.to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::CollectionNotFound {
                collection: collection.to_string(),
            }),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn not_found(collection: &CollectionName, key: &ObjectKey) -> StoreError {
        StoreError::NotFound {
            collection: collection.to_string(),
            key: key.to_string(),
        }
    }

    /// Walk a collection and return every key, sorted.
    async fn all_keys(&self, collection: &CollectionName) -> Result<Vec<ObjectKey>> {
        let dir = self.ensure_collection(collection).await?;
        let mut keys = Vec::new();
        walk_collection(&dir, &mut Vec::new(), &mut keys, MAX_LIST_DEPTH).await?;
        keys.sort();
        Ok(keys)
    }
}

/// Recursive walk that boxes the future to handle recursion with depth limiting
fn walk_collection<'a>(
    dir: &'a Path,
    prefix: &'a mut Vec<String>,
    keys: &'a mut Vec<ObjectKey>,
    max_depth: usize,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        if max_depth == 0 {
            debug!("Max depth reached, skipping: {:?}", dir);
            return Ok(());
        }

        let mut entries = fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            // file_type() does not follow symlinks
            let file_type = match entry.file_type().await {
                Ok(t) => t,
                Err(e) => {
                    debug!("Failed to read file type for {:?}: {}", path, e);
                    continue;
                }
            };

            if file_type.is_symlink() {
                debug!("Skipping symlink: {:?}", path);
                continue;
            }

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                warn!("Skipping non UTF-8 file name: {:?}", path);
                continue;
            };

            if file_type.is_dir() {
                prefix.push(name);
                walk_collection(&path, prefix, keys, max_depth - 1).await?;
                prefix.pop();
            } else if file_type.is_file() {
                let joined = if prefix.is_empty() {
                    name
                } else {
                    format!("{}/{}", prefix.join("/"), name)
                };
                match ObjectKey::new(joined) {
                    Ok(key) => keys.push(key),
                    Err(e) => warn!("Skipping {:?}: {}", path, e),
                }
            }
        }

        Ok(())
    })
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn list_page(
        &self,
        collection: &CollectionName,
        continuation: Option<&str>,
    ) -> Result<ListPage> {
        let keys = self.all_keys(collection).await?;
        Ok(page_after(&keys, continuation, self.page_size))
    }

    /// Walks the collection once instead of once per page.
    async fn list(&self, collection: &CollectionName) -> Result<Vec<ObjectKey>> {
        let keys = self.all_keys(collection).await?;
        debug!("Listed {} keys from {} on {}", keys.len(), collection, self.id);
        Ok(keys)
    }

    async fn get_content(&self, collection: &CollectionName, key: &ObjectKey) -> Result<String> {
        self.ensure_collection(collection).await?;
        let bytes = match fs::read(self.object_path(collection, key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Self::not_found(collection, key))
            }
            Err(e) => return Err(StoreError::Io(e)),
        };

        String::from_utf8(bytes).map_err(|_| StoreError::InvalidUtf8 {
            collection: collection.to_string(),
            key: key.to_string(),
        })
    }

    async fn get_size(&self, collection: &CollectionName, key: &ObjectKey) -> Result<u64> {
        self.ensure_collection(collection).await?;
        match fs::metadata(self.object_path(collection, key)).await {
            Ok(metadata) if metadata.is_file() => Ok(metadata.len()),
            Ok(_) => Err(Self::not_found(collection, key)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Self::not_found(collection, key)),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn put(
        &self,
        collection: &CollectionName,
        key: &ObjectKey,
        content: String,
    ) -> Result<()> {
        self.ensure_collection(collection).await?;
        let path = self.object_path(collection, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write to a sibling temp file and rename so readers never see a partial object
        let tmp = path.with_file_name(format!(
            ".{}.{}.partial",
            key.base_name(),
            uuid::Uuid::new_v4()
        ));
        fs::write(&tmp, content).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::Io(e));
        }

        debug!("Wrote {}/{} to {}", collection, key, path.display());
        Ok(())
    }

    fn store_id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn collection(name: &str) -> CollectionName {
        CollectionName::new(name).expect("valid collection name")
    }

    fn key(name: &str) -> ObjectKey {
        ObjectKey::new(name).expect("valid key")
    }

    #[tokio::test]
    async fn test_list_nested_keys() {
        let tmp = TempDir::new().expect("create temp dir");
        let src_dir = tmp.path().join("random-pii-text");
        std::fs::create_dir_all(src_dir.join("folder/deeper")).expect("create dirs");
        std::fs::write(src_dir.join("b.txt"), "b").expect("write");
        std::fs::write(src_dir.join("folder/sample.txt"), "s").expect("write");
        std::fs::write(src_dir.join("folder/deeper/z.txt"), "z").expect("write");

        let store = FsObjectStore::new(tmp.path());
        let keys = store
            .list(&collection("random-pii-text"))
            .await
            .expect("list keys");
        let names: Vec<&str> = keys.iter().map(ObjectKey::as_str).collect();

        assert_eq!(names, vec!["b.txt", "folder/deeper/z.txt", "folder/sample.txt"]);
    }

    #[tokio::test]
    async fn test_list_pages() {
        let tmp = TempDir::new().expect("create temp dir");
        let src_dir = tmp.path().join("random-pii-text");
        std::fs::create_dir_all(&src_dir).expect("create dir");
        for i in 0..7 {
            std::fs::write(src_dir.join(format!("f{i}.txt")), "x").expect("write");
        }

        let store = FsObjectStore::new(tmp.path()).with_page_size(3);
        let src = collection("random-pii-text");

        let first = store.list_page(&src, None).await.expect("first page");
        assert_eq!(first.keys.len(), 3);
        assert_eq!(first.next_continuation.as_deref(), Some("f2.txt"));

        assert_eq!(store.list(&src).await.expect("list").len(), 7);
    }

    #[tokio::test]
    async fn test_list_matches_paged_listing() {
        let tmp = TempDir::new().expect("create temp dir");
        let src_dir = tmp.path().join("random-pii-text");
        std::fs::create_dir_all(src_dir.join("sub")).expect("create dirs");
        for i in 0..5 {
            std::fs::write(src_dir.join(format!("f{i}.txt")), "x").expect("write");
            std::fs::write(src_dir.join("sub").join(format!("g{i}.txt")), "y").expect("write");
        }

        let store = FsObjectStore::new(tmp.path()).with_page_size(3);
        let src = collection("random-pii-text");

        let mut paged = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let page = store
                .list_page(&src, continuation.as_deref())
                .await
                .expect("list page");
            paged.extend(page.keys);
            match page.next_continuation {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        let listed = store.list(&src).await.expect("list");
        assert_eq!(listed.len(), 10);
        assert_eq!(listed, paged);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_skips_symlinks() {
        let tmp = TempDir::new().expect("create temp dir");
        let src_dir = tmp.path().join("random-pii-text");
        std::fs::create_dir_all(&src_dir).expect("create dir");
        std::fs::write(tmp.path().join("outside.txt"), "secret").expect("write");
        std::fs::write(src_dir.join("inside.txt"), "ok").expect("write");
        std::os::unix::fs::symlink(tmp.path().join("outside.txt"), src_dir.join("link.txt"))
            .expect("create symlink");

        let store = FsObjectStore::new(tmp.path());
        let keys = store
            .list(&collection("random-pii-text"))
            .await
            .expect("list keys");

        assert_eq!(keys, vec![key("inside.txt")]);
    }

    #[tokio::test]
    async fn test_missing_collection() {
        let tmp = TempDir::new().expect("create temp dir");
        let store = FsObjectStore::new(tmp.path());

        let result = store.list(&collection("missing")).await;
        assert!(matches!(result, Err(StoreError::CollectionNotFound { .. })));

        let result = store
            .put(&collection("missing"), &key("r.txt"), "x".to_string())
            .await;
        assert!(matches!(result, Err(StoreError::CollectionNotFound { .. })));
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let tmp = TempDir::new().expect("create temp dir");
        let store = FsObjectStore::new(tmp.path());
        let out = collection("pii-scan-output");
        store.create_collection(&out).await.expect("create collection");

        store
            .put(&out, &key("nested/r.txt"), "Emails: []\n".to_string())
            .await
            .expect("put object");

        let content = store
            .get_content(&out, &key("nested/r.txt"))
            .await
            .expect("get content");
        assert_eq!(content, "Emails: []\n");
        assert_eq!(
            store.get_size(&out, &key("nested/r.txt")).await.expect("size"),
            11
        );

        // No temp files are left behind
        let keys = store.list(&out).await.expect("list");
        assert_eq!(keys, vec![key("nested/r.txt")]);
    }

    #[tokio::test]
    async fn test_get_missing_and_invalid_utf8() {
        let tmp = TempDir::new().expect("create temp dir");
        let src_dir = tmp.path().join("random-pii-text");
        std::fs::create_dir_all(&src_dir).expect("create dir");
        std::fs::write(src_dir.join("blob.bin"), [0xffu8, 0xfe]).expect("write");

        let store = FsObjectStore::new(tmp.path());
        let src = collection("random-pii-text");

        let result = store.get_content(&src, &key("absent.txt")).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));

        let result = store.get_content(&src, &key("blob.bin")).await;
        assert!(matches!(result, Err(StoreError::InvalidUtf8 { .. })));
    }
}
