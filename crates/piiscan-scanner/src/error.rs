use piiscan_core::{CollectionName, ObjectKey};
use piiscan_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to retrieve {collection}/{key}: {source}")]
    Retrieval {
        collection: CollectionName,
        key: ObjectKey,
        #[source]
        source: StoreError,
    },

    #[error("Object {key} is {size} bytes, over the {limit} byte limit")]
    ObjectTooLarge {
        key: ObjectKey,
        size: u64,
        limit: u64,
    },

    #[error("Failed to write report {report_key} for {key} to {collection}: {source}")]
    Write {
        collection: CollectionName,
        key: ObjectKey,
        report_key: ObjectKey,
        #[source]
        source: StoreError,
    },

    #[error("Failed to enumerate collection {collection}: {source}")]
    Enumeration {
        collection: CollectionName,
        #[source]
        source: StoreError,
    },
}

impl ScanError {
    /// Failure class used in batch summaries.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Retrieval { .. } | Self::ObjectTooLarge { .. } => FailureKind::Retrieval,
            Self::Write { .. } => FailureKind::Write,
            Self::Enumeration { .. } => FailureKind::Enumeration,
        }
    }
}

/// Class of a scan failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Source object could not be read or decoded
    Retrieval,
    /// Report could not be written to the destination
    Write,
    /// Source collection could not be listed
    Enumeration,
}

impl FailureKind {
    /// Get the string representation of the failure kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieval => "retrieval",
            Self::Write => "write",
            Self::Enumeration => "enumeration",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
