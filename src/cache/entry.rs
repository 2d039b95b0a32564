//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and CAS support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The key this entry is indexed under
    pub key: String,
    /// The stored bytes
    pub value: Vec<u8>,
    /// CAS version assigned by the last successful mutation
    pub cas: u64,
    /// Time to live, `Duration::ZERO` = no expiration
    pub ttl: Duration,
    /// When the current value was stored
    pub created_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    pub fn new(key: String, value: Vec<u8>, ttl: Duration, cas: u64) -> Self {
        Self {
            key,
            value,
            cas,
            ttl,
            created_at: Instant::now(),
        }
    }

    // == Store ==
    /// Overwrites the value and TTL in place and restarts the TTL clock.
    pub fn store(&mut self, value: Vec<u8>, ttl: Duration, cas: u64) {
        self.value = value;
        self.ttl = ttl;
        self.cas = cas;
        self.created_at = Instant::now();
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry with a TTL is expired as soon as its age reaches the TTL.
    /// Entries with a zero TTL never expire.
    pub fn is_expired(&self) -> bool {
        !self.ttl.is_zero() && self.created_at.elapsed() >= self.ttl
    }
}
