//! Cache Module
//!
//! Provides in-memory caching with LRU eviction, lazy TTL expiration and
//! CAS versioning.

pub mod codec;
mod entry;
mod eviction;
mod lru;
mod store;


// Re-export public types
pub use codec::{decode_counter, encode_counter, CounterError};
pub use entry::CacheEntry;
pub use eviction::{EvictionHandler, EvictionReason, TracingEvictionHandler};
pub use lru::{LruList, NodeId};
pub use store::{CacheStore, CounterUpdate};
