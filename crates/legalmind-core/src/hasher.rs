//! Content hasher
//!
//! Fingerprints contract text so that re-uploads of the same document map to
//! the same cache key.
//!
//! Normalization:
//! - every run of Unicode whitespace (spaces, tabs, CR/LF, NBSP...) becomes one ASCII space
//! - leading and trailing whitespace is dropped
//! - case is preserved (defined terms in contracts are case-significant)
//!
//! The fingerprint is the lowercase hex SHA-256 of the normalized UTF-8 bytes.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length of a hex-encoded SHA-256 digest
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Deterministic digest of normalized text, used as the dedup key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for tables and log lines
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Rejected fingerprint string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid fingerprint '{0}': expected 64 lowercase hex characters")]
pub struct ParseFingerprintError(String);

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == FINGERPRINT_HEX_LEN
            && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(ParseFingerprintError(s.to_string()))
        }
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = ParseFingerprintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Fingerprint> for String {
    fn from(fp: Fingerprint) -> Self {
        fp.0
    }
}

/// Collapse whitespace runs and trim
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Fingerprint already-normalized text
pub fn fingerprint_normalized(normalized: &str) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    Fingerprint(hex::encode(hasher.finalize()))
}

/// Normalize then fingerprint
pub fn fingerprint(text: &str) -> Fingerprint {
    fingerprint_normalized(&normalize(text))
}
