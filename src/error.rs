//! Error types for sandcache
//!
//! All modules use `SandcacheResult<T>` as their return type. Cache misses
//! and expired entries are not errors; they surface as `Ok(None)`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sandcache operations
pub type SandcacheResult<T> = Result<T, SandcacheError>;

/// All errors that can occur in sandcache
#[derive(Error, Debug)]
pub enum SandcacheError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigValue { key: String, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Cache errors
    #[error("Code cache is disabled")]
    CacheDisabled,

    #[error("Invalid file suffix {suffix:?}: {reason}")]
    InvalidSuffix { suffix: String, reason: String },

    #[error("Code not cached for language {language}")]
    NotCached { language: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl SandcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an invalid suffix error
    pub fn invalid_suffix(suffix: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSuffix {
            suffix: suffix.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CacheDisabled => Some("Run: sandcache config set cache.enabled true"),
            Self::InvalidSuffix { .. } => Some("Use a plain extension such as .py or .cpp"),
            Self::NotCached { .. } => Some("Run: sandcache put <LANGUAGE> to populate the cache"),
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied => {
                Some("Check permissions on the cache root or pass --root")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SandcacheError::CacheDisabled;
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn error_hint() {
        let err = SandcacheError::CacheDisabled;
        assert_eq!(
            err.hint(),
            Some("Run: sandcache config set cache.enabled true")
        );
    }

    #[test]
    fn io_error_hint_depends_on_kind() {
        let err = SandcacheError::io(
            "writing entry",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.hint().is_some());
        assert!(err.to_string().contains("writing entry"));

        let err = SandcacheError::io(
            "writing entry",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(err.hint().is_none());
    }
}
