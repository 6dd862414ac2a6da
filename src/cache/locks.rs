//! Per-entry locks and pins
//!
//! Every decision to return or delete an entry is taken while holding that
//! entry's lock. Locks are created on demand and dropped from the table once
//! nobody holds or waits on them.
//!
//! A pin marks an entry as in use by a caller that already has its path.
//! Pinned entries are never deleted by expiry or eviction.

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::collections::HashMap;
use std::sync::Arc;

type LockTable = HashMap<String, Arc<Mutex<()>>>;
type PinTable = HashMap<String, usize>;

/// Lock and pin registry keyed by entry file name
#[derive(Debug, Default)]
pub struct EntryLocks {
    locks: Mutex<LockTable>,
    pins: Arc<Mutex<PinTable>>,
}

impl EntryLocks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    /// Block until the entry's lock is held
    pub fn lock(&self, name: &str) -> EntryGuard<'_> {
        let handle = self.handle(name);
        EntryGuard {
            guard: Some(handle.lock_arc()),
            name: name.to_string(),
            owner: self,
        }
    }

    /// Take the entry's lock only if nobody holds it
    pub fn try_lock(&self, name: &str) -> Option<EntryGuard<'_>> {
        let handle = self.handle(name);
        match handle.try_lock_arc() {
            Some(guard) => Some(EntryGuard {
                guard: Some(guard),
                name: name.to_string(),
                owner: self,
            }),
            None => {
                drop(handle);
                self.prune(name);
                None
            }
        }
    }

    /// Pin an entry until the returned guard is dropped
    pub fn pin(&self, name: &str) -> PinGuard {
        *self.pins.lock().entry(name.to_string()).or_insert(0) += 1;
        PinGuard {
            name: name.to_string(),
            pins: Arc::clone(&self.pins),
        }
    }

    /// Whether any pin on the entry is alive
    pub fn is_pinned(&self, name: &str) -> bool {
        self.pins.lock().contains_key(name)
    }

    /// Number of lock handles currently tracked
    pub fn tracked(&self) -> usize {
        self.locks.lock().len()
    }

    fn prune(&self, name: &str) {
        let mut locks = self.locks.lock();
        // The table's own reference is the only one left
        if locks.get(name).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(name);
        }
    }
}

/// Held lock on one entry
pub struct EntryGuard<'a> {
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
    name: String,
    owner: &'a EntryLocks,
}

impl std::fmt::Debug for EntryGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryGuard").field("name", &self.name).finish()
    }
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.owner.prune(&self.name);
    }
}

/// Keeps an entry pinned while alive
#[derive(Debug)]
pub struct PinGuard {
    name: String,
    pins: Arc<Mutex<PinTable>>,
}

impl Drop for PinGuard {
    fn drop(&mut self) {
        let mut pins = self.pins.lock();
        if let Some(count) = pins.get_mut(&self.name) {
            *count -= 1;
            if *count == 0 {
                pins.remove(&self.name);
            }
        }
    }
}
