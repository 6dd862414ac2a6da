//! Cache usage reporting
//!
//! Size formatting, usage status relative to the configured limit, and the
//! records returned by stats, listing, and eviction.

use serde::Serialize;
use std::path::PathBuf;
use std::time::SystemTime;

/// Format bytes as human-readable size (e.g., "1.5 GB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Cache size status relative to configured limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSizeStatus {
    /// Under 80% of limit
    Ok,
    /// Between 80% and 100% of limit
    Warning,
    /// Over the limit, next write triggers eviction
    Exceeded,
}

impl CacheSizeStatus {
    /// Determine status based on current size and limit
    pub fn from_usage(current_bytes: u64, limit_bytes: u64) -> Self {
        if limit_bytes == 0 {
            return Self::Ok;
        }
        let percent = Self::percentage(current_bytes, limit_bytes);
        if percent > 100.0 {
            Self::Exceeded
        } else if percent >= 80.0 {
            Self::Warning
        } else {
            Self::Ok
        }
    }

    /// Get percentage of limit used
    pub fn percentage(current_bytes: u64, limit_bytes: u64) -> f64 {
        if limit_bytes == 0 {
            return 0.0;
        }
        (current_bytes as f64 / limit_bytes as f64) * 100.0
    }
}

impl std::fmt::Display for CacheSizeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Warning => write!(f, "warning"),
            Self::Exceeded => write!(f, "exceeded"),
        }
    }
}

/// Aggregate cache statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of entries under the root
    pub entry_count: usize,
    /// Sum of entry sizes
    pub total_size_bytes: u64,
    /// Eviction ceiling
    pub ceiling_bytes: u64,
    /// Cache root directory
    pub root: PathBuf,
}

impl CacheStats {
    /// Usage status against the ceiling
    pub fn status(&self) -> CacheSizeStatus {
        CacheSizeStatus::from_usage(self.total_size_bytes, self.ceiling_bytes)
    }

    /// Percentage of the ceiling in use
    pub fn usage_percent(&self) -> f64 {
        CacheSizeStatus::percentage(self.total_size_bytes, self.ceiling_bytes)
    }
}

/// One cached file as seen on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// File name (`{key}{suffix}`)
    pub name: String,
    /// Full path
    pub path: PathBuf,
    /// Size in bytes
    pub size_bytes: u64,
    /// Last access, taken from the file mtime
    pub last_access: SystemTime,
}

/// Outcome of one eviction pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvictionReport {
    /// Entries found under the root
    pub scanned: usize,
    /// Entries deleted
    pub removed: usize,
    /// Entries left alone because they were locked, pinned or just accessed
    pub skipped: usize,
    /// Entries whose deletion failed
    pub failed: usize,
    /// Size before the pass
    pub size_before: u64,
    /// Bytes released by this pass
    pub freed_bytes: u64,
    /// Size after the pass
    pub size_after: u64,
}

impl EvictionReport {
    /// Whether the pass deleted anything
    pub fn evicted(&self) -> bool {
        self.removed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_bytes(1536 * 1024 * 1024), "1.5 GB");
    }

    #[test]
    fn size_status_thresholds() {
        assert_eq!(CacheSizeStatus::from_usage(0, 1000), CacheSizeStatus::Ok);
        assert_eq!(CacheSizeStatus::from_usage(799, 1000), CacheSizeStatus::Ok);
        assert_eq!(CacheSizeStatus::from_usage(800, 1000), CacheSizeStatus::Warning);
        assert_eq!(CacheSizeStatus::from_usage(1000, 1000), CacheSizeStatus::Warning);
        assert_eq!(CacheSizeStatus::from_usage(1001, 1000), CacheSizeStatus::Exceeded);
        assert_eq!(CacheSizeStatus::from_usage(5, 0), CacheSizeStatus::Ok);
    }

    #[test]
    fn stats_usage() {
        let stats = CacheStats {
            entry_count: 2,
            total_size_bytes: 500,
            ceiling_bytes: 1000,
            root: PathBuf::from("/tmp/cache"),
        };
        assert_eq!(stats.status(), CacheSizeStatus::Ok);
        assert!((stats.usage_percent() - 50.0).abs() < f64::EPSILON);
    }
}
