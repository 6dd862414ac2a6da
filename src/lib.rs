//! sandcache - Content-addressed code cache for sandboxes
//!
//! Maps (code, language, suffix) to a file on disk, writing it on first use
//! and reusing it afterwards, with TTL expiry and size-bounded LRU eviction.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;

pub use cache::{CacheKey, CacheSettings, Checkout, CodeCache};
pub use error::{SandcacheError, SandcacheResult};
