//! Batch driver for scanning whole collections.
//!
//! This module provides the `BatchDriver` which lists a source collection,
//! scans each object, and writes one report per object to the destination
//! collection. Per-object failures are recorded and never stop the batch;
//! only a failed listing does.

use crate::error::{FailureKind, Result, ScanError};
use crate::report::Report;
use crate::scanner::ObjectScanner;
use futures::stream::{FuturesUnordered, StreamExt};
use piiscan_core::config::DEFAULT_MAX_OBJECT_BYTES;
use piiscan_core::{AppConfig, CollectionName, ConfigResult, ObjectKey, RunId, Timestamp};
use piiscan_store::ObjectStore;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Settings for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Collection whose objects are scanned
    pub source: CollectionName,
    /// Collection receiving the reports
    pub destination: CollectionName,
    /// Maximum objects in flight at once (1 = sequential)
    pub max_concurrent_scans: usize,
    /// Objects larger than this fail with `ObjectTooLarge`
    pub max_object_bytes: u64,
}

impl BatchConfig {
    /// Create a sequential configuration with the default size limit.
    #[must_use]
    pub fn new(source: CollectionName, destination: CollectionName) -> Self {
        Self {
            source,
            destination,
            max_concurrent_scans: 1,
            max_object_bytes: DEFAULT_MAX_OBJECT_BYTES,
        }
    }

    /// Build from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            source: config.source_collection()?,
            destination: config.destination_collection()?,
            max_concurrent_scans: config.scanning.concurrent_scans,
            max_object_bytes: config.scanning.max_object_bytes,
        })
    }

    /// Set the maximum number of concurrent object scans.
    #[must_use]
    pub fn with_max_concurrent_scans(mut self, max: usize) -> Self {
        self.max_concurrent_scans = max;
        self
    }

    /// Set the per-object size limit.
    #[must_use]
    pub fn with_max_object_bytes(mut self, max: u64) -> Self {
        self.max_object_bytes = max;
        self
    }
}

/// An object whose report was written.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectOutcome {
    /// Source object key
    pub key: ObjectKey,
    /// Key of the written report
    pub report_key: ObjectKey,
    /// Declared size of the source object in bytes
    pub object_size: u64,
    /// Total character length of the matched PII
    pub extracted_size: usize,
    /// Number of matches across all categories
    pub pii_count: usize,
    /// Time spent fetching and matching
    pub scan_elapsed: Duration,
    /// Time spent on the whole object, including the report write
    pub elapsed: Duration,
}

/// An object that could not be scanned or whose report could not be written.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectFailure {
    /// Source object key
    pub key: ObjectKey,
    /// Failure class
    pub kind: FailureKind,
    /// Error message
    pub reason: String,
    /// Time spent before the failure
    pub elapsed: Duration,
}

/// Result of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Identifier of this run
    pub run_id: RunId,
    /// Scanned collection
    pub source: CollectionName,
    /// Report collection
    pub destination: CollectionName,
    /// When the run started
    pub started_at: Timestamp,
    /// Objects with a written report, in listing order
    pub succeeded: Vec<ObjectOutcome>,
    /// Objects that failed, in listing order
    pub failed: Vec<ObjectFailure>,
    /// Wall-clock time of the whole batch
    pub total_elapsed: Duration,
}

impl BatchSummary {
    /// Number of objects attempted.
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Number of objects with a written report.
    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    /// Number of failed objects.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// True when no object failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Sum of the per-object times.
    ///
    /// Exceeds `total_elapsed` when objects were processed concurrently.
    #[must_use]
    pub fn cumulative_object_time(&self) -> Duration {
        self.succeeded
            .iter()
            .map(|o| o.elapsed)
            .chain(self.failed.iter().map(|f| f.elapsed))
            .sum()
    }

    /// Total PII matches across all succeeded objects.
    #[must_use]
    pub fn total_pii_count(&self) -> usize {
        self.succeeded.iter().map(|o| o.pii_count).sum()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Scanned {} objects from {} into {}: {} succeeded, {} failed",
            self.processed_count(),
            self.source,
            self.destination,
            self.succeeded_count(),
            self.failed_count()
        )?;
        for outcome in &self.succeeded {
            writeln!(
                f,
                "  ok      {} -> {} ({} matches, {:.4} seconds)",
                outcome.key,
                outcome.report_key,
                outcome.pii_count,
                outcome.elapsed.as_secs_f64()
            )?;
        }
        for failure in &self.failed {
            writeln!(
                f,
                "  failed  {} [{}]: {}",
                failure.key, failure.kind, failure.reason
            )?;
        }
        write!(
            f,
            "total time taken: {:.4} seconds (cumulative per-object time: {:.4} seconds, {} PII matches)",
            self.total_elapsed.as_secs_f64(),
            self.cumulative_object_time().as_secs_f64(),
            self.total_pii_count()
        )
    }
}

type ObjectResult = std::result::Result<ObjectOutcome, ObjectFailure>;

/// Drives batch scans of a source collection into a destination collection.
pub struct BatchDriver {
    store: Arc<dyn ObjectStore>,
    config: BatchConfig,
}

impl BatchDriver {
    /// Create a new batch driver.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, config: BatchConfig) -> Self {
        Self { store, config }
    }

    /// Run a batch over the configured collections.
    pub async fn run(&self) -> Result<BatchSummary> {
        self.run_batch(&self.config.source, &self.config.destination)
            .await
    }

    /// Scan every object in `source` and write reports to `destination`.
    ///
    /// Objects are processed up to `max_concurrent_scans` at a time. The only
    /// error returned is `ScanError::Enumeration`; every per-object failure is
    /// recorded in the summary instead.
    pub async fn run_batch(
        &self,
        source: &CollectionName,
        destination: &CollectionName,
    ) -> Result<BatchSummary> {
        let run_id = RunId::generate();
        let started_at = Timestamp::now();
        let started = Instant::now();

        tracing::info!(
            "Batch {} started: {} -> {} on {}",
            run_id,
            source,
            destination,
            self.store.store_id()
        );

        let keys = self.store.list(source).await.map_err(|source_err| {
            tracing::error!(
                "Batch {} aborted: cannot list {}: {}",
                run_id,
                source,
                source_err
            );
            ScanError::Enumeration {
                collection: source.clone(),
                source: source_err,
            }
        })?;

        tracing::info!("Batch {}: {} objects to scan", run_id, keys.len());

        let scanner = ObjectScanner::new(self.store.clone(), source.clone())
            .with_max_object_bytes(self.config.max_object_bytes);
        let scanner = &scanner;
        let max_in_flight = self.config.max_concurrent_scans.max(1);

        let mut futures = FuturesUnordered::new();
        let mut results: Vec<(usize, ObjectResult)> = Vec::with_capacity(keys.len());

        for (index, key) in keys.into_iter().enumerate() {
            futures.push(async move {
                let result = self.process_object(scanner, destination, key).await;
                (index, result)
            });

            // Respect concurrency limit
            while futures.len() >= max_in_flight {
                if let Some(result) = futures.next().await {
                    results.push(result);
                }
            }
        }

        // Collect remaining results
        while let Some(result) = futures.next().await {
            results.push(result);
        }

        // Completion order depends on concurrency; report in listing order
        results.sort_by_key(|(index, _)| *index);

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (_, result) in results {
            match result {
                Ok(outcome) => succeeded.push(outcome),
                Err(failure) => failed.push(failure),
            }
        }

        let summary = BatchSummary {
            run_id,
            source: source.clone(),
            destination: destination.clone(),
            started_at,
            succeeded,
            failed,
            total_elapsed: started.elapsed(),
        };

        tracing::info!(
            "Batch {} finished: {} succeeded, {} failed",
            summary.run_id,
            summary.succeeded_count(),
            summary.failed_count()
        );
        tracing::info!(
            "total time taken: {:.4} seconds",
            summary.total_elapsed.as_secs_f64()
        );

        Ok(summary)
    }

    /// Scan one object and write its report.
    async fn process_object(
        &self,
        scanner: &ObjectScanner,
        destination: &CollectionName,
        key: ObjectKey,
    ) -> ObjectResult {
        let started = Instant::now();

        match self.scan_and_write(scanner, destination, &key).await {
            Ok(mut outcome) => {
                outcome.elapsed = started.elapsed();
                tracing::info!("scan result uploaded for {}", key.stem());
                tracing::info!("time taken: {:.4} seconds", outcome.elapsed.as_secs_f64());
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!("Skipping {} ({} failure): {}", key, e.kind(), e);
                Err(ObjectFailure {
                    kind: e.kind(),
                    reason: e.to_string(),
                    key,
                    elapsed: started.elapsed(),
                })
            }
        }
    }

    async fn scan_and_write(
        &self,
        scanner: &ObjectScanner,
        destination: &CollectionName,
        key: &ObjectKey,
    ) -> Result<ObjectOutcome> {
        let (result, matches) = scanner.scan(key).await?;
        let (report_key, content) = Report::new(key, &result, &matches).into_parts();

        self.store
            .put(destination, &report_key, content)
            .await
            .map_err(|source| ScanError::Write {
                collection: destination.clone(),
                key: key.clone(),
                report_key: report_key.clone(),
                source,
            })?;

        Ok(ObjectOutcome {
            key: key.clone(),
            report_key,
            object_size: result.object_size(),
            extracted_size: result.extracted_size(),
            pii_count: matches.total_count(),
            scan_elapsed: result.elapsed(),
            elapsed: result.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use piiscan_store::MemoryObjectStore;

    fn collection(name: &str) -> CollectionName {
        CollectionName::new(name).expect("valid collection name")
    }

    fn key(name: &str) -> ObjectKey {
        ObjectKey::new(name).expect("valid key")
    }

    #[test]
    fn test_batch_config_defaults() {
        let config = BatchConfig::new(collection("random-pii-text"), collection("pii-scan-output"));
        assert_eq!(config.max_concurrent_scans, 1);
        assert_eq!(config.max_object_bytes, DEFAULT_MAX_OBJECT_BYTES);
    }

    #[test]
    fn test_batch_config_from_app_config() {
        let mut app = AppConfig::default();
        app.scanning.concurrent_scans = 4;
        app.scanning.max_object_bytes = 2048;

        let config = BatchConfig::from_app_config(&app).expect("valid config");
        assert_eq!(config.source.as_str(), "random-pii-text");
        assert_eq!(config.destination.as_str(), "pii-scan-output");
        assert_eq!(config.max_concurrent_scans, 4);
        assert_eq!(config.max_object_bytes, 2048);

        app.collections.destination = "Not Valid".to_string();
        assert!(BatchConfig::from_app_config(&app).is_err());
    }

    #[tokio::test]
    async fn test_process_object_records_write_target() {
        let store = Arc::new(MemoryObjectStore::new());
        let src = collection("random-pii-text");
        let dst = collection("pii-scan-output");
        store.insert(&src, &key("docs/a.txt"), "ping a@b.com").await;
        store.create_collection(&dst).await;

        let driver = BatchDriver::new(store.clone(), BatchConfig::new(src.clone(), dst.clone()));
        let scanner = ObjectScanner::new(store.clone(), src);

        let outcome = driver
            .process_object(&scanner, &dst, key("docs/a.txt"))
            .await
            .expect("object succeeds");

        assert_eq!(outcome.report_key.as_str(), "a_pii_results.txt");
        assert_eq!(outcome.pii_count, 1);
        assert_eq!(outcome.extracted_size, 7);
        assert!(outcome.elapsed >= outcome.scan_elapsed);
        assert_eq!(store.object_count(&dst).await, 1);
    }

    #[tokio::test]
    async fn test_process_object_write_failure() {
        let store = Arc::new(MemoryObjectStore::new());
        let src = collection("random-pii-text");
        let dst = collection("missing-output");
        store.insert(&src, &key("a.txt"), "ping a@b.com").await;

        let driver = BatchDriver::new(store.clone(), BatchConfig::new(src.clone(), dst.clone()));
        let scanner = ObjectScanner::new(store.clone(), src);

        let failure = driver
            .process_object(&scanner, &dst, key("a.txt"))
            .await
            .expect_err("destination is missing");

        assert_eq!(failure.kind, FailureKind::Write);
        assert!(failure.reason.contains("a_pii_results.txt"));
    }

    #[tokio::test]
    async fn test_summary_display() {
        let store = Arc::new(MemoryObjectStore::new());
        let src = collection("random-pii-text");
        let dst = collection("pii-scan-output");
        store.insert(&src, &key("good.txt"), "a@b.com").await;
        store.insert(&src, &key("bad.bin"), vec![0xffu8]).await;
        store.create_collection(&dst).await;

        let summary = BatchDriver::new(store, BatchConfig::new(src, dst))
            .run()
            .await
            .expect("batch runs");

        let rendered = summary.to_string();
        assert!(rendered.starts_with(
            "Scanned 2 objects from random-pii-text into pii-scan-output: 1 succeeded, 1 failed"
        ));
        assert!(rendered.contains("good.txt -> good_pii_results.txt"));
        assert!(rendered.contains("bad.bin [retrieval]"));
        let last = rendered.lines().last().expect("summary has lines");
        assert!(last.starts_with("total time taken: "));
        assert!(last.contains("cumulative per-object time: "));
        assert!(last.ends_with(", 1 PII matches)"));
        assert_eq!(summary.total_pii_count(), 1);
    }
}
