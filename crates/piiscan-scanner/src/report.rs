//! Report rendering.
//!
//! A report is a plain-text value built from one scan; writing it anywhere
//! is the caller's job.

use crate::scanner::ScanResult;
use piiscan_core::ObjectKey;
use piiscan_discovery::{MatchSet, PhoneMatch};

/// Rendered scan report and the key it should be stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    key: ObjectKey,
    content: String,
}

impl Report {
    /// Render the report for `target`.
    #[must_use]
    pub fn new(target: &ObjectKey, result: &ScanResult, matches: &MatchSet) -> Self {
        Self {
            key: target.report_key(),
            content: format_report(result, matches),
        }
    }

    /// Key derived from the scanned object's base name.
    #[must_use]
    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    /// Rendered report text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Split into key and text.
    #[must_use]
    pub fn into_parts(self) -> (ObjectKey, String) {
        (self.key, self.content)
    }
}

/// Render a scan into the six-line report layout.
///
/// Lists use their `Debug` form, so every match appears once per occurrence
/// in matched order. Phone numbers are shown as their component tuples.
#[must_use]
pub fn format_report(result: &ScanResult, matches: &MatchSet) -> String {
    let phones: Vec<(&str, &str, &str, &str)> =
        matches.phones.iter().map(PhoneMatch::groups).collect();

    format!(
        "Emails: {:?}\n\
         Phone Numbers: {:?}\n\
         Credit Card Numbers: {:?}\n\
         Total file size: {} bytes\n\
         Size of extracted PII data: {} bytes\n\
         Time taken to extract PII: {:.4} seconds\n",
        matches.emails,
        phones,
        matches.credit_cards,
        result.object_size(),
        result.extracted_size(),
        result.elapsed().as_secs_f64(),
    )
}
