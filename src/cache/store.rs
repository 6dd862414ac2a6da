//! Disk-backed code cache
//!
//! Entries live as `{key}{suffix}` files directly under the cache root. The
//! file's mtime is the entry's recency: it drives TTL expiry on lookup and
//! least-recently-used ordering during eviction. There is no index; `stat` is
//! the only source of truth, so TTL precision is bounded by filesystem
//! timestamp granularity and clock skew.

use crate::cache::clock::{Clock, SystemClock};
use crate::cache::key::{self, CacheKey};
use crate::cache::locks::{EntryLocks, PinGuard};
use crate::cache::usage::{format_bytes, CacheStats, EntryInfo, EvictionReport};
use crate::config::CacheConfig;
use crate::error::{SandcacheError, SandcacheResult};
use parking_lot::Mutex;
use std::fs::{self, FileTimes, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Prefix of in-flight writes; such files are not entries
const PARTIAL_PREFIX: &str = ".partial-";

/// Mode of entry files, readable by every user
#[cfg(unix)]
const ENTRY_MODE: u32 = 0o644;

/// Runtime settings for a [`CodeCache`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Root of the flat entry namespace
    pub root: PathBuf,
    /// Eviction ceiling
    pub max_size_bytes: u64,
    /// Entry time-to-live
    pub ttl: Duration,
    /// Eviction floor as percent of the ceiling
    pub evict_to_percent: u8,
}

impl CacheSettings {
    /// Settings with default limits rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::from(&CacheConfig::default())
        }
    }

    /// Size eviction drives the cache down to
    pub fn floor_bytes(&self) -> u64 {
        let floor = u128::from(self.max_size_bytes) * u128::from(self.evict_to_percent) / 100;
        floor as u64
    }
}

impl From<&CacheConfig> for CacheSettings {
    fn from(config: &CacheConfig) -> Self {
        Self {
            root: config.root(),
            max_size_bytes: config.max_size_bytes(),
            ttl: config.ttl(),
            evict_to_percent: config.evict_to_percent,
        }
    }
}

/// A cached file held in use by the caller
///
/// The entry is neither expired nor evicted while the checkout is alive.
#[derive(Debug)]
pub struct Checkout {
    path: PathBuf,
    key: CacheKey,
    was_hit: bool,
    _pin: PinGuard,
}

impl Checkout {
    /// Path of the cached file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Key of the cached file
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Whether the file already existed
    pub fn was_hit(&self) -> bool {
        self.was_hit
    }
}

/// Content-addressed cache of code files
#[derive(Debug)]
pub struct CodeCache {
    settings: CacheSettings,
    clock: Arc<dyn Clock>,
    locks: EntryLocks,
    eviction_pass: Mutex<()>,
}

impl CodeCache {
    /// Open a cache, creating the root directory if needed
    pub fn new(settings: CacheSettings) -> SandcacheResult<Self> {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Open a cache with a custom time source
    pub fn with_clock(settings: CacheSettings, clock: Arc<dyn Clock>) -> SandcacheResult<Self> {
        fs::create_dir_all(&settings.root).map_err(|e| {
            SandcacheError::io(
                format!("creating cache root {}", settings.root.display()),
                e,
            )
        })?;

        debug!(
            "Code cache at {} (limit {}, ttl {}s)",
            settings.root.display(),
            format_bytes(settings.max_size_bytes),
            settings.ttl.as_secs()
        );

        Ok(Self {
            settings,
            clock,
            locks: EntryLocks::new(),
            eviction_pass: Mutex::new(()),
        })
    }

    /// Build the shared cache handle from configuration
    ///
    /// Returns `None` when caching is disabled; callers then write code to
    /// scratch files themselves.
    pub fn from_config(config: &CacheConfig) -> SandcacheResult<Option<Arc<Self>>> {
        if !config.enabled {
            debug!("Code cache disabled by configuration");
            return Ok(None);
        }
        config.validate()?;
        Ok(Some(Arc::new(Self::new(CacheSettings::from(config))?)))
    }

    /// Settings this cache runs with
    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.settings.root
    }

    /// Derive the key for a piece of code
    pub fn derive(&self, code: &str, language: &str, suffix: &str) -> CacheKey {
        key::derive(code, language, suffix)
    }

    /// Return the entry's path if it exists and has not expired
    ///
    /// A hit refreshes the entry's recency. An expired entry is deleted and
    /// reported as absent.
    pub fn lookup(&self, key: &CacheKey, suffix: &str) -> SandcacheResult<Option<PathBuf>> {
        key::validate_suffix(suffix)?;
        let name = key.entry_name(suffix);
        let _guard = self.locks.lock(&name);
        self.lookup_locked(key, &name)
    }

    /// Write the entry if missing, otherwise refresh its recency
    pub fn store(&self, key: &CacheKey, suffix: &str, code: &str) -> SandcacheResult<PathBuf> {
        key::validate_suffix(suffix)?;
        let name = key.entry_name(suffix);
        let guard = self.locks.lock(&name);
        let (path, created) = self.store_locked(key, &name, code)?;
        if created {
            // Still holding our own lock, so the new entry survives this pass
            self.evict_if_over_limit();
        }
        drop(guard);
        Ok(path)
    }

    /// Return a cached file for the code, writing it on a miss
    ///
    /// The flag is `true` when an existing, unexpired entry was reused.
    pub fn get_or_create(
        &self,
        code: &str,
        language: &str,
        suffix: &str,
    ) -> SandcacheResult<(PathBuf, bool)> {
        let checkout = self.checkout(code, language, suffix)?;
        Ok((checkout.path.clone(), checkout.was_hit))
    }

    /// Like [`get_or_create`](Self::get_or_create), keeping the entry pinned
    /// until the returned checkout is dropped
    pub fn checkout(&self, code: &str, language: &str, suffix: &str) -> SandcacheResult<Checkout> {
        key::validate_suffix(suffix)?;
        let key = key::derive(code, language, suffix);
        let name = key.entry_name(suffix);
        let guard = self.locks.lock(&name);

        if let Some(path) = self.lookup_locked(&key, &name)? {
            return Ok(Checkout {
                path,
                key,
                was_hit: true,
                _pin: self.locks.pin(&name),
            });
        }

        let (path, created) = self.store_locked(&key, &name, code)?;
        let pin = self.locks.pin(&name);
        if created {
            debug!("Cached {} code file (hash: {}...)", language, key.short());
            self.evict_if_over_limit();
        }
        drop(guard);

        Ok(Checkout {
            path,
            key,
            was_hit: false,
            _pin: pin,
        })
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        self.settings.root.join(name)
    }

    fn lookup_locked(&self, key: &CacheKey, name: &str) -> SandcacheResult<Option<PathBuf>> {
        let path = self.entry_path(name);

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Cache miss (hash: {}...)", key.short());
                return Ok(None);
            }
            Err(e) => {
                return Err(SandcacheError::io(
                    format!("reading metadata of {}", path.display()),
                    e,
                ))
            }
        };

        let last_access = metadata.modified().map_err(|e| {
            SandcacheError::io(format!("reading mtime of {}", path.display()), e)
        })?;
        let age = self
            .clock
            .now()
            .duration_since(last_access)
            .unwrap_or(Duration::ZERO);

        if age < self.settings.ttl {
            self.touch(&path)?;
            debug!("Cache hit (hash: {}...)", key.short());
            return Ok(Some(path));
        }

        if self.locks.is_pinned(name) {
            // The following store refreshes it in place
            debug!("Cache entry expired but in use (hash: {}...)", key.short());
            return Ok(None);
        }

        debug!("Cache entry expired (hash: {}...)", key.short());
        match fs::remove_file(&path) {
            Ok(()) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SandcacheError::io(
                format!("removing expired entry {}", path.display()),
                e,
            )),
        }
    }

    /// Returns the entry path and whether a new file was written
    fn store_locked(
        &self,
        key: &CacheKey,
        name: &str,
        code: &str,
    ) -> SandcacheResult<(PathBuf, bool)> {
        let path = self.entry_path(name);

        match fs::metadata(&path) {
            Ok(_) => {
                self.touch(&path)?;
                debug!("Entry already cached (hash: {}...)", key.short());
                return Ok((path, false));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(SandcacheError::io(
                    format!("reading metadata of {}", path.display()),
                    e,
                ))
            }
        }

        let root = &self.settings.root;
        fs::create_dir_all(root).map_err(|e| {
            SandcacheError::io(format!("creating cache root {}", root.display()), e)
        })?;

        let mut partial = tempfile::Builder::new()
            .prefix(PARTIAL_PREFIX)
            .tempfile_in(root)
            .map_err(|e| {
                SandcacheError::io(format!("creating temporary file in {}", root.display()), e)
            })?;
        partial
            .write_all(code.as_bytes())
            .map_err(|e| SandcacheError::io(format!("writing entry {}", path.display()), e))?;
        partial
            .as_file()
            .set_times(self.file_times())
            .map_err(|e| SandcacheError::io(format!("stamping entry {}", path.display()), e))?;
        // Entries are run by sandboxes that may use another uid
        #[cfg(unix)]
        partial
            .as_file()
            .set_permissions(fs::Permissions::from_mode(ENTRY_MODE))
            .map_err(|e| SandcacheError::io(format!("setting mode of {}", path.display()), e))?;

        match partial.persist_noclobber(&path) {
            Ok(_) => Ok((path, true)),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                // Another process wrote the same content first
                self.touch(&path)?;
                Ok((path, false))
            }
            Err(e) => Err(SandcacheError::io(
                format!("publishing entry {}", path.display()),
                e.error,
            )),
        }
    }

    fn file_times(&self) -> FileTimes {
        let now = self.clock.now();
        FileTimes::new().set_accessed(now).set_modified(now)
    }

    fn touch(&self, path: &Path) -> SandcacheResult<()> {
        let mut options = OpenOptions::new();
        // Unix only needs ownership to set times; Windows needs write access
        #[cfg(unix)]
        options.read(true);
        #[cfg(not(unix))]
        options.append(true);
        options
            .open(path)
            .and_then(|file| file.set_times(self.file_times()))
            .map_err(|e| SandcacheError::io(format!("touching {}", path.display()), e))
    }

    /// Scan regular files directly under the root
    ///
    /// A missing root is an empty cache. Files that vanish or cannot be
    /// stat'ed mid-scan are skipped.
    fn scan(&self) -> SandcacheResult<Vec<EntryInfo>> {
        let root = &self.settings.root;
        let dir = match fs::read_dir(root) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SandcacheError::io(
                    format!("reading cache root {}", root.display()),
                    e,
                ))
            }
        };

        let mut entries = Vec::new();
        for dirent in dir {
            let dirent = match dirent {
                Ok(dirent) => dirent,
                Err(e) => {
                    warn!("Skipping unreadable cache entry: {}", e);
                    continue;
                }
            };

            let name = dirent.file_name().to_string_lossy().into_owned();
            if name.starts_with(PARTIAL_PREFIX) {
                continue;
            }

            let metadata = match dirent.metadata() {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!("Skipping cache entry {}: {}", name, e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            entries.push(EntryInfo {
                name,
                path: dirent.path(),
                size_bytes: metadata.len(),
                last_access: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }

        Ok(entries)
    }

    /// Evict least-recently-used entries once the cache is over its limit
    ///
    /// Best effort: failures on individual files are logged and skipped.
    /// Entries that are locked or pinned by other callers are left alone.
    /// Passes run one at a time; a caller arriving mid-pass waits and then
    /// rescans, so writes the running pass did not see are still counted.
    pub fn evict_if_over_limit(&self) -> EvictionReport {
        let mut report = EvictionReport::default();

        // Passes only try_lock entries, so waiting here cannot deadlock
        let _pass = self.eviction_pass.lock();

        let mut entries = match self.scan() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cache eviction skipped: {}", e);
                return report;
            }
        };

        let ceiling = self.settings.max_size_bytes;
        let floor = self.settings.floor_bytes();
        let mut current_size: u64 = entries.iter().map(|e| e.size_bytes).sum();
        report.scanned = entries.len();
        report.size_before = current_size;

        if current_size <= ceiling {
            report.size_after = current_size;
            return report;
        }

        info!(
            "Cache size ({}) exceeds limit ({}), cleaning up...",
            format_bytes(current_size),
            format_bytes(ceiling)
        );

        entries.sort_by(|a, b| {
            a.last_access
                .cmp(&b.last_access)
                .then_with(|| a.name.cmp(&b.name))
        });

        for entry in entries {
            if current_size <= floor {
                break;
            }

            let Some(_guard) = self.locks.try_lock(&entry.name) else {
                report.skipped += 1;
                continue;
            };
            if self.locks.is_pinned(&entry.name) {
                report.skipped += 1;
                continue;
            }

            // A hit may have refreshed the entry since the scan
            match fs::metadata(&entry.path).and_then(|m| m.modified()) {
                Ok(modified) if modified != entry.last_access => {
                    report.skipped += 1;
                    continue;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    current_size = current_size.saturating_sub(entry.size_bytes);
                    continue;
                }
                _ => {}
            }

            match fs::remove_file(&entry.path) {
                Ok(()) => {
                    current_size = current_size.saturating_sub(entry.size_bytes);
                    report.removed += 1;
                    report.freed_bytes += entry.size_bytes;
                    debug!("Removed cache entry: {}", entry.name);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    current_size = current_size.saturating_sub(entry.size_bytes);
                }
                Err(e) => {
                    report.failed += 1;
                    warn!("Failed to remove cache entry {}: {}", entry.name, e);
                }
            }
        }

        report.size_after = current_size;
        info!(
            "Evicted {} cache entries ({} freed, {} remaining)",
            report.removed,
            format_bytes(report.freed_bytes),
            format_bytes(current_size)
        );

        report
    }

    /// Entry count and total size
    pub fn stats(&self) -> SandcacheResult<CacheStats> {
        let entries = self.scan()?;
        Ok(CacheStats {
            entry_count: entries.len(),
            total_size_bytes: entries.iter().map(|e| e.size_bytes).sum(),
            ceiling_bytes: self.settings.max_size_bytes,
            root: self.settings.root.clone(),
        })
    }

    /// All entries, least recently used first
    pub fn entries(&self) -> SandcacheResult<Vec<EntryInfo>> {
        let mut entries = self.scan()?;
        entries.sort_by(|a, b| {
            a.last_access
                .cmp(&b.last_access)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(entries)
    }

    /// Remove everything under the root and recreate it empty
    pub fn clear(&self) -> SandcacheResult<()> {
        let root = &self.settings.root;
        match fs::remove_dir_all(root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(SandcacheError::io(
                    format!("removing cache root {}", root.display()),
                    e,
                ))
            }
        }

        fs::create_dir_all(root).map_err(|e| {
            SandcacheError::io(format!("creating cache root {}", root.display()), e)
        })?;

        info!("Code cache cleared");
        Ok(())
    }
}
