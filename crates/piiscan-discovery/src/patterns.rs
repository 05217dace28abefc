//! PII pattern matchers
//!
//! Finds email addresses, phone numbers and credit-card-like digit runs in
//! text. Each matcher runs over the full text independently, so a substring
//! may be reported by more than one category.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Compiled regex patterns (initialized once at startup)
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("Email regex is hardcoded and valid")
});

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\+?(\d{1,3}))?[-. (]*(\d{3})[-. )]*(\d{3})[-. ]*(\d{4})\b")
        .expect("Phone regex is hardcoded and valid")
});

// Coarse screen: 13-16 digits with optional space/hyphen separators, no Luhn check.
static CREDIT_CARD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:\d[ -]*?){13,16}\b").expect("Credit card regex is hardcoded and valid")
});

/// Pattern matchers for the supported PII categories
#[derive(Debug, Clone)]
pub struct PiiPatterns {
    email: Regex,
    phone: Regex,
    credit_card: Regex,
}

impl PiiPatterns {
    /// Create a new set of PII pattern matchers
    pub fn new() -> Self {
        Self {
            email: EMAIL_PATTERN.clone(),
            phone: PHONE_PATTERN.clone(),
            credit_card: CREDIT_CARD_PATTERN.clone(),
        }
    }

    /// Check if text contains an email address
    pub fn has_email(&self, text: &str) -> bool {
        self.email.is_match(text)
    }

    /// Check if text contains a phone number
    pub fn has_phone(&self, text: &str) -> bool {
        self.phone.is_match(text)
    }

    /// Check if text contains a credit-card-like number
    pub fn has_credit_card(&self, text: &str) -> bool {
        self.credit_card.is_match(text)
    }

    /// All email addresses in order of appearance
    pub fn find_emails(&self, text: &str) -> Vec<String> {
        self.email
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// All phone numbers in order of appearance, as captured component groups
    pub fn find_phones(&self, text: &str) -> Vec<PhoneMatch> {
        self.phone
            .captures_iter(text)
            .map(|caps| PhoneMatch::from_captures(&caps))
            .collect()
    }

    /// All credit-card-like numbers in order of appearance
    pub fn find_credit_cards(&self, text: &str) -> Vec<String> {
        self.credit_card
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Run every matcher over the text
    pub fn find_all(&self, text: &str) -> MatchSet {
        MatchSet {
            emails: self.find_emails(text),
            phones: self.find_phones(text),
            credit_cards: self.find_credit_cards(text),
        }
    }
}

impl Default for PiiPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Category of PII
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiKind {
    Email,
    Phone,
    CreditCard,
}

impl PiiKind {
    /// Every category, in report order
    pub const ALL: [PiiKind; 3] = [PiiKind::Email, PiiKind::Phone, PiiKind::CreditCard];

    /// Get human-readable description of the PII category
    pub fn description(&self) -> &'static str {
        match self {
            PiiKind::Email => "Email address",
            PiiKind::Phone => "Phone number",
            PiiKind::CreditCard => "Credit card number",
        }
    }

    /// Get risk level for this category of PII
    pub fn risk_level(&self) -> &'static str {
        match self {
            PiiKind::Email => "medium",
            PiiKind::Phone => "medium",
            PiiKind::CreditCard => "critical",
        }
    }
}

/// One phone number occurrence.
///
/// The components mirror the pattern's capture groups: an optional country
/// code (empty when absent) followed by the 3-3-4 digit groups. Separators
/// matched around and between the groups are not kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneMatch {
    pub country_code: String,
    pub area: String,
    pub exchange: String,
    pub line: String,
}

impl PhoneMatch {
    fn from_captures(caps: &Captures<'_>) -> Self {
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str()).to_string();
        Self {
            country_code: group(1),
            area: group(2),
            exchange: group(3),
            line: group(4),
        }
    }

    /// Component tuple `(country_code, area, exchange, line)`
    pub fn groups(&self) -> (&str, &str, &str, &str) {
        (&self.country_code, &self.area, &self.exchange, &self.line)
    }

    /// Combined character length of the four components
    pub fn char_len(&self) -> usize {
        [&self.country_code, &self.area, &self.exchange, &self.line]
            .iter()
            .map(|part| part.chars().count())
            .sum()
    }
}

/// Matches found in one text, per category, in order of appearance.
///
/// Repeated occurrences are kept once per occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSet {
    pub emails: Vec<String>,
    pub phones: Vec<PhoneMatch>,
    pub credit_cards: Vec<String>,
}

impl MatchSet {
    /// Number of matches in one category
    pub fn count(&self, kind: PiiKind) -> usize {
        match kind {
            PiiKind::Email => self.emails.len(),
            PiiKind::Phone => self.phones.len(),
            PiiKind::CreditCard => self.credit_cards.len(),
        }
    }

    /// Number of matches across all categories
    pub fn total_count(&self) -> usize {
        PiiKind::ALL.iter().map(|kind| self.count(*kind)).sum()
    }

    /// True when no category has a match
    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// Sum of the character lengths of every reported string.
    ///
    /// Phones count their components, so the size is independent of the
    /// separators around a number.
    pub fn extracted_size(&self) -> usize {
        let emails: usize = self.emails.iter().map(|s| s.chars().count()).sum();
        let phones: usize = self.phones.iter().map(PhoneMatch::char_len).sum();
        let cards: usize = self.credit_cards.iter().map(|s| s.chars().count()).sum();
        emails + phones + cards
    }
}
