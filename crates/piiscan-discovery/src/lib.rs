//! piiscan Discovery Module
//!
//! PII pattern matching over text: email addresses, phone numbers and
//! credit-card-like digit runs.

pub mod patterns;

// Re-export main types
pub use patterns::{MatchSet, PhoneMatch, PiiKind, PiiPatterns};
