//! Eviction Notifier Module
//!
//! Callback interface fired when the store drops an entry on its own, either
//! to stay within capacity or because its TTL ran out. Explicit deletes and
//! flushes are not evictions and never reach the handler.

use std::fmt;

use tracing::debug;

// == Eviction Reason ==
/// Why an entry was evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictionReason {
    /// Pushed out of a full cache as the least recently used entry
    LruEviction,
    /// Found expired on access
    TtlEviction,
}

impl fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionReason::LruEviction => f.write_str("LRUEviction"),
            EvictionReason::TtlEviction => f.write_str("TTLEviction"),
        }
    }
}

// == Eviction Handler ==
/// Observer invoked synchronously, before the evicted entry is dropped.
///
/// Handlers run while the caller holds the cache lock, so they must be fast
/// and must not block. Hand work off to a channel if it is expensive.
pub trait EvictionHandler: Send {
    fn handle_eviction(&mut self, key: &str, value: &[u8], reason: EvictionReason);
}

impl<F> EvictionHandler for F
where
    F: FnMut(&str, &[u8], EvictionReason) + Send,
{
    fn handle_eviction(&mut self, key: &str, value: &[u8], reason: EvictionReason) {
        self(key, value, reason)
    }
}

// == Tracing Handler ==
/// Handler that records every eviction as a debug event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEvictionHandler;

impl EvictionHandler for TracingEvictionHandler {
    fn handle_eviction(&mut self, key: &str, value: &[u8], reason: EvictionReason) {
        debug!(key, bytes = value.len(), %reason, "cache entry evicted");
    }
}
