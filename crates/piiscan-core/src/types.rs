//! Shared types used across piiscan.
//!
//! This module defines the newtypes that identify collections, objects, and
//! batch runs, along with the derivation of report keys from source keys.

use crate::error::PiiScanError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Suffix appended to the extension-stripped base name of a scanned object.
pub const REPORT_SUFFIX: &str = "_pii_results";

/// Extension given to every report object.
pub const REPORT_EXTENSION: &str = "txt";

/// Newtype for batch run identifiers.
///
/// Run IDs are UUID v4 strings generated once per batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Create a new random `RunId` using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for collection (bucket) names with validation.
///
/// Collection names follow bucket naming rules: 3-63 characters of lowercase
/// letters, digits, dots and hyphens, starting and ending with a letter or digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionName(String);

impl CollectionName {
    /// Create a new `CollectionName` from a string.
    ///
    /// # Errors
    /// Returns error if the name doesn't match the required format.
    pub fn new(name: impl Into<String>) -> Result<Self, PiiScanError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<(), PiiScanError> {
        static COLLECTION_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = COLLECTION_REGEX
            .get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$").expect("valid regex"));

        if name.len() < 3 || name.len() > 63 {
            return Err(PiiScanError::Validation(format!(
                "invalid collection name: must be 3-63 characters, got {} characters",
                name.len()
            )));
        }

        if regex.is_match(name) {
            Ok(())
        } else {
            Err(PiiScanError::Validation(format!(
                "invalid collection name: must be lowercase alphanumeric with dots or hyphens, got '{name}'"
            )))
        }
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CollectionName {
    type Error = PiiScanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CollectionName> for String {
    fn from(name: CollectionName) -> Self {
        name.0
    }
}

/// Key of a single object inside a collection.
///
/// Keys are `/`-separated relative paths. Empty segments, `.` and `..`
/// segments, a leading `/` and NUL bytes are rejected so a key can never
/// address anything outside its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a new `ObjectKey` from a string.
    ///
    /// # Errors
    /// Returns error if the key is empty or contains a forbidden segment.
    pub fn new(key: impl Into<String>) -> Result<Self, PiiScanError> {
        let key = key.into();
        Self::validate(&key)?;
        Ok(Self(key))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the `/`-separated segments of the key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// File name portion of the key (text after the last `/`).
    #[must_use]
    pub fn base_name(&self) -> &str {
        base_name(&self.0)
    }

    /// Base name with its final extension removed.
    #[must_use]
    pub fn stem(&self) -> &str {
        strip_extension(self.base_name())
    }

    /// Key under which the scan report for this object is written.
    #[must_use]
    pub fn report_key(&self) -> ObjectKey {
        // The stem of a valid key is a non-empty segment, so the derived key is valid too.
        Self(derive_report_key(&self.0))
    }

    fn validate(key: &str) -> Result<(), PiiScanError> {
        if key.is_empty() {
            return Err(PiiScanError::Validation(
                "invalid object key: must not be empty".to_string(),
            ));
        }
        if key.contains('\0') {
            return Err(PiiScanError::Validation(format!(
                "invalid object key: contains NUL byte: {key:?}"
            )));
        }
        if key.starts_with('/') {
            return Err(PiiScanError::Validation(format!(
                "invalid object key: must be relative, got '{key}'"
            )));
        }
        if let Some(segment) = key
            .split('/')
            .find(|s| s.is_empty() || *s == "." || *s == "..")
        {
            return Err(PiiScanError::Validation(format!(
                "invalid object key: forbidden segment '{segment}' in '{key}'"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ObjectKey {
    type Error = PiiScanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ObjectKey> for String {
    fn from(key: ObjectKey) -> Self {
        key.0
    }
}

/// Derive the report key for a source object key.
///
/// Takes the text after the last `/`, strips the final extension and appends
/// `_pii_results.txt`. A dot that is part of a leading run of dots does not
/// start an extension, so `.env` keeps its name.
///
/// ```
/// use piiscan_core::derive_report_key;
///
/// assert_eq!(derive_report_key("folder/sample.txt"), "sample_pii_results.txt");
/// assert_eq!(derive_report_key("a/b/archive.tar.gz"), "archive.tar_pii_results.txt");
/// ```
#[must_use]
pub fn derive_report_key(source_key: &str) -> String {
    let stem = strip_extension(base_name(source_key));
    format!("{stem}{REPORT_SUFFIX}.{REPORT_EXTENSION}")
}

fn base_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

fn strip_extension(name: &str) -> &str {
    let leading_dots = name.len() - name.trim_start_matches('.').len();
    match name[leading_dots..].rfind('.') {
        Some(idx) => &name[..leading_dots + idx],
        None => name,
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}
