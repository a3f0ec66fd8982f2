//! Paste keys and the schemes that derive them.
//!
//! Digest keys are the lowercase hex MD5 of the payload, either truncated to
//! [`SHORT_DIGEST_LEN`] characters or kept at the full [`FULL_DIGEST_LEN`].
//! Counter keys are decimal integers assigned by the store at insert time.

use std::fmt;
use std::str::FromStr;

use md5::{Digest, Md5};
use thiserror::Error;

/// Length of a truncated digest key.
pub const SHORT_DIGEST_LEN: usize = 7;

/// Length of a full MD5 digest key (128 bits, hex encoded).
pub const FULL_DIGEST_LEN: usize = 32;

/// Longest decimal representation of a `u64`.
const MAX_COUNTER_LEN: usize = 20;

/// Errors produced when validating a public identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("empty identifier")]
    Empty,

    #[error("identifier '{0}' is not lowercase hexadecimal")]
    InvalidHex(String),

    #[error("identifier '{0}' is not a decimal number")]
    InvalidDecimal(String),

    #[error("identifier is {len} characters long, at most {max} allowed")]
    TooLong { len: usize, max: usize },

    #[error("unknown key scheme '{0}'")]
    UnknownScheme(String),
}

/// How keys are assigned to payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyScheme {
    /// First 7 hex characters of the payload's MD5.
    ShortDigest,
    /// All 32 hex characters of the payload's MD5.
    FullDigest,
    /// Sequential integer assigned by the store.
    Counter,
}

impl KeyScheme {
    /// Stable name, used in configuration and in the store metadata.
    pub fn name(&self) -> &'static str {
        match self {
            KeyScheme::ShortDigest => "short",
            KeyScheme::FullDigest => "full",
            KeyScheme::Counter => "counter",
        }
    }

    /// Whether keys are derived from content (and therefore deduplicate).
    pub fn is_digest(&self) -> bool {
        !matches!(self, KeyScheme::Counter)
    }

    /// Length of the keys this scheme derives, if fixed.
    pub fn digest_len(&self) -> Option<usize> {
        match self {
            KeyScheme::ShortDigest => Some(SHORT_DIGEST_LEN),
            KeyScheme::FullDigest => Some(FULL_DIGEST_LEN),
            KeyScheme::Counter => None,
        }
    }

    /// Derive the key for `payload`.
    ///
    /// Returns `None` for [`KeyScheme::Counter`]: counter keys are a side
    /// effect of storage and only the store can assign them.
    pub fn derive(&self, payload: &[u8]) -> Option<PasteKey> {
        let len = self.digest_len()?;
        let mut hex = hex::encode(Md5::digest(payload));
        hex.truncate(len);
        Some(PasteKey(hex))
    }

    /// Validate a public identifier against this scheme's key pattern.
    ///
    /// Digest schemes accept `[0-9a-f]+` up to 32 characters. The counter
    /// scheme accepts `[0-9]+` that fits in a `u64`, normalising leading
    /// zeros away.
    pub fn parse_key(&self, identifier: &str) -> Result<PasteKey, KeyError> {
        if identifier.is_empty() {
            return Err(KeyError::Empty);
        }

        match self {
            KeyScheme::ShortDigest | KeyScheme::FullDigest => {
                if identifier.len() > FULL_DIGEST_LEN {
                    return Err(KeyError::TooLong {
                        len: identifier.len(),
                        max: FULL_DIGEST_LEN,
                    });
                }
                if !identifier
                    .bytes()
                    .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
                {
                    return Err(KeyError::InvalidHex(identifier.to_string()));
                }
                Ok(PasteKey(identifier.to_string()))
            }
            KeyScheme::Counter => {
                if !identifier.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(KeyError::InvalidDecimal(identifier.to_string()));
                }
                let trimmed = identifier.trim_start_matches('0');
                if trimmed.len() > MAX_COUNTER_LEN {
                    return Err(KeyError::TooLong {
                        len: trimmed.len(),
                        max: MAX_COUNTER_LEN,
                    });
                }
                let id: u64 = if trimmed.is_empty() {
                    0
                } else {
                    trimmed
                        .parse()
                        .map_err(|_| KeyError::InvalidDecimal(identifier.to_string()))?
                };
                Ok(PasteKey::from_counter(id))
            }
        }
    }
}

impl fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeyScheme {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(KeyScheme::ShortDigest),
            "full" => Ok(KeyScheme::FullDigest),
            "counter" => Ok(KeyScheme::Counter),
            other => Err(KeyError::UnknownScheme(other.to_string())),
        }
    }
}

/// A validated public identifier for a stored paste.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PasteKey(String);

impl PasteKey {
    /// Key for a store-assigned counter value.
    pub fn from_counter(id: u64) -> Self {
        Self(id.to_string())
    }

    /// Numeric value of a counter key, `None` for digest keys that do not
    /// happen to be all digits.
    pub fn counter_value(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the key as raw bytes, the form digest keys are stored under.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PasteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PasteKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
