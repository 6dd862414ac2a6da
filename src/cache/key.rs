//! Cache key derivation
//!
//! A key is the SHA256 of `language:suffix:code`. Language and suffix take
//! part in the hash, so the same code cached for two languages (or with two
//! suffixes) lands in two different entries.

use crate::error::{SandcacheError, SandcacheResult};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a hex-encoded key
pub const KEY_LEN: usize = 64;

/// Hex-encoded SHA256 identifying a cached entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Full hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 hex chars, used in log lines
    pub fn short(&self) -> &str {
        &self.0[..8]
    }

    /// File name of the entry for this key
    pub fn entry_name(&self, suffix: &str) -> String {
        format!("{}{}", self.0, suffix)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derive the cache key for a piece of code
pub fn derive(code: &str, language: &str, suffix: &str) -> CacheKey {
    let mut hasher = Sha256::new();
    hasher.update(language.as_bytes());
    hasher.update(b":");
    hasher.update(suffix.as_bytes());
    hasher.update(b":");
    hasher.update(code.as_bytes());

    CacheKey(hex::encode(hasher.finalize()))
}

/// Reject suffixes that would place an entry outside the cache root
pub fn validate_suffix(suffix: &str) -> SandcacheResult<()> {
    if suffix.contains('/') || suffix.contains('\\') {
        return Err(SandcacheError::invalid_suffix(
            suffix,
            "must not contain path separators",
        ));
    }
    if suffix.contains("..") {
        return Err(SandcacheError::invalid_suffix(suffix, "must not contain '..'"));
    }
    if suffix.contains('\0') {
        return Err(SandcacheError::invalid_suffix(suffix, "must not contain NUL"));
    }
    Ok(())
}
