//! Offline cache worker.
//!
//! A background task that answers first-party GET requests network-first and
//! falls back to responses stored in versioned SQLite partitions when the
//! network fails. See [`OfflineCache`] for the policy and [`CacheHandle`] for
//! the message interface.

mod handle;
mod worker;

pub use handle::CacheHandle;
pub use worker::{cache_names, CacheError, CachedResponse, OfflineCache};
