//! Per-object scanning.
//!
//! The `ObjectScanner` fetches one object from the source collection, runs
//! the PII matchers over its text and measures how long that took.

use crate::error::{Result, ScanError};
use piiscan_core::config::DEFAULT_MAX_OBJECT_BYTES;
use piiscan_core::{CollectionName, ObjectKey};
use piiscan_discovery::{MatchSet, PiiKind, PiiPatterns};
use piiscan_store::ObjectStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics derived from scanning one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    object_size: u64,
    extracted_size: usize,
    elapsed: Duration,
}

impl ScanResult {
    /// Build the result for a set of matches; the extracted size is taken from the matches.
    #[must_use]
    pub fn new(object_size: u64, matches: &MatchSet, elapsed: Duration) -> Self {
        Self {
            object_size,
            extracted_size: matches.extracted_size(),
            elapsed,
        }
    }

    /// Declared size of the scanned object in bytes.
    #[must_use]
    pub fn object_size(&self) -> u64 {
        self.object_size
    }

    /// Total character length of every matched string.
    #[must_use]
    pub fn extracted_size(&self) -> usize {
        self.extracted_size
    }

    /// Time spent fetching and matching.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Scans single objects of one source collection.
pub struct ObjectScanner {
    store: Arc<dyn ObjectStore>,
    collection: CollectionName,
    patterns: PiiPatterns,
    max_object_bytes: u64,
}

impl ObjectScanner {
    /// Create a scanner for objects in `collection`.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, collection: CollectionName) -> Self {
        Self {
            store,
            collection,
            patterns: PiiPatterns::new(),
            max_object_bytes: DEFAULT_MAX_OBJECT_BYTES,
        }
    }

    /// Set the largest object size that will be read.
    #[must_use]
    pub fn with_max_object_bytes(mut self, max: u64) -> Self {
        self.max_object_bytes = max;
        self
    }

    /// Fetch one object and find the PII in it.
    ///
    /// The elapsed time in the result covers both the fetch and the match.
    pub async fn scan(&self, target: &ObjectKey) -> Result<(ScanResult, MatchSet)> {
        let started = Instant::now();

        let object_size = self
            .store
            .get_size(&self.collection, target)
            .await
            .map_err(|source| self.retrieval_error(target, source))?;

        // Check size before reading
        if object_size > self.max_object_bytes {
            return Err(ScanError::ObjectTooLarge {
                key: target.clone(),
                size: object_size,
                limit: self.max_object_bytes,
            });
        }

        let text = self
            .store
            .get_content(&self.collection, target)
            .await
            .map_err(|source| self.retrieval_error(target, source))?;

        let matches = self.patterns.find_all(&text);
        let result = ScanResult::new(object_size, &matches, started.elapsed());

        tracing::debug!(
            "Scanned {}/{}: {} matches, {} characters extracted",
            self.collection,
            target,
            matches.total_count(),
            result.extracted_size()
        );
        for kind in PiiKind::ALL {
            let count = matches.count(kind);
            if count > 0 {
                tracing::debug!(
                    "{}/{}: {} x {} (risk: {})",
                    self.collection,
                    target,
                    count,
                    kind.description(),
                    kind.risk_level()
                );
            }
        }

        Ok((result, matches))
    }

    fn retrieval_error(&self, target: &ObjectKey, source: piiscan_store::StoreError) -> ScanError {
        ScanError::Retrieval {
            collection: self.collection.clone(),
            key: target.clone(),
            source,
        }
    }
}
