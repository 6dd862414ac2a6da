//! Configuration schema for sandcache
//!
//! Configuration is stored at `~/.config/sandcache/config.toml`

use crate::error::{SandcacheError, SandcacheResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Code cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Code cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the code cache (default: true)
    pub enabled: bool,

    /// Cache root directory (default: `<tmp>/sandbox_code_cache`)
    pub root: Option<PathBuf>,

    /// Maximum total cache size in MB before eviction runs
    pub max_size_mb: u64,

    /// Entries older than this many seconds are expired on lookup
    pub ttl_secs: u64,

    /// Eviction removes entries until usage drops to this percent of the limit
    pub evict_to_percent: u8,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: None,
            max_size_mb: 1024,
            ttl_secs: 86_400,
            evict_to_percent: 80,
        }
    }
}

impl CacheConfig {
    /// Default cache root under the system temp directory
    pub fn default_root() -> PathBuf {
        std::env::temp_dir().join("sandbox_code_cache")
    }

    /// Resolved cache root
    pub fn root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(Self::default_root)
    }

    /// Eviction ceiling in bytes
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }

    /// Entry time-to-live
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Check values that would make the cache unusable
    pub fn validate(&self) -> SandcacheResult<()> {
        if self.max_size_mb == 0 {
            return Err(SandcacheError::ConfigValue {
                key: "cache.max_size_mb".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if !(1..=100).contains(&self.evict_to_percent) {
            return Err(SandcacheError::ConfigValue {
                key: "cache.evict_to_percent".to_string(),
                reason: format!("{} is outside 1..=100", self.evict_to_percent),
            });
        }
        Ok(())
    }
}
