//! Error types for object store access.

use thiserror::Error;

/// Errors that can occur while talking to an object store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Collection does not exist
    #[error("collection not found: {collection}")]
    CollectionNotFound {
        /// Collection name
        collection: String,
    },

    /// Object does not exist in the collection
    #[error("object not found: {collection}/{key}")]
    NotFound {
        /// Collection name
        collection: String,
        /// Object key
        key: String,
    },

    /// Object body could not be decoded as UTF-8 text
    #[error("object {collection}/{key} is not valid UTF-8 text")]
    InvalidUtf8 {
        /// Collection name
        collection: String,
        /// Object key
        key: String,
    },

    /// Key or continuation token rejected by the store
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// Listing returned the continuation token it was given
    #[error("listing of {collection} stalled at continuation token {continuation}")]
    StalledListing {
        /// Collection name
        collection: String,
        /// Token that did not advance
        continuation: String,
    },

    /// I/O error from the backing storage
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound {
            collection: "random-pii-text".to_string(),
            key: "t1.txt".to_string(),
        };
        assert_eq!(err.to_string(), "object not found: random-pii-text/t1.txt");

        let err = StoreError::InvalidUtf8 {
            collection: "random-pii-text".to_string(),
            key: "blob.bin".to_string(),
        };
        assert!(err.to_string().contains("not valid UTF-8"));

        let err = StoreError::StalledListing {
            collection: "random-pii-text".to_string(),
            continuation: "b.txt".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "listing of random-pii-text stalled at continuation token b.txt"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io_err.into();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
