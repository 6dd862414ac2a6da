//! Content-addressed cache for code files
//!
//! Code about to be compiled or executed is written once to a file named
//! after the SHA256 of `language:suffix:code` and reused on every later
//! request for the same triple, so re-running the same program with
//! different inputs skips the write.
//!
//! # Entry Lifecycle
//!
//! | Event | Effect |
//! |-------|--------|
//! | Miss | File written atomically, eviction may run |
//! | Hit | mtime refreshed |
//! | Duplicate store | mtime refreshed, content untouched |
//! | Lookup past TTL | File deleted, reported as miss |
//! | Cache over limit | Least recently used files deleted down to the floor |
//!
//! # Concurrency
//!
//! Within one process, every return-or-delete decision for an entry is made
//! under that entry's lock, and entries held through a [`Checkout`] are
//! never deleted. Nothing coordinates separate processes sharing a root.

pub mod clock;
pub mod key;
pub mod locks;
pub mod store;
pub mod usage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{derive, CacheKey};
pub use store::{CacheSettings, Checkout, CodeCache};
pub use usage::{format_bytes, CacheSizeStatus, CacheStats, EntryInfo, EvictionReport};
