//! Cache Store Module
//!
//! Main cache engine combining a key index with an LRU list, lazy TTL
//! expiration and CAS versioning.
//!
//! The store does no locking of its own. Every method takes `&mut self`,
//! reads included, since reads move entries in the recency list and may
//! drop expired ones. Callers that share a store wrap it in a lock and may
//! hold that lock across several calls to make them atomic.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::cache::codec::{decode_counter, encode_counter};
use crate::cache::{CacheEntry, EvictionHandler, EvictionReason, LruList, NodeId};
use crate::error::{CacheError, Result};

// == Counter Update ==
/// Outcome of an INCREMENT or DECREMENT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterUpdate {
    /// Counter value after the update
    pub value: u64,
    /// CAS version assigned by the update
    pub cas: u64,
}

// == Cache Store ==
/// LRU + TTL + CAS cache storage.
pub struct CacheStore {
    /// Recency list owning the entries
    order: LruList<CacheEntry>,
    /// Key to list node
    index: HashMap<String, NodeId>,
    /// Maximum number of entries, 0 = unbounded
    max_entries: usize,
    /// Last CAS version handed out
    cas_counter: u64,
    /// Observer for LRU and TTL evictions
    eviction_handler: Option<Box<dyn EvictionHandler>>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `max_entries` entries.
    ///
    /// A `max_entries` of 0 disables LRU eviction entirely.
    pub fn new(max_entries: usize) -> Self {
        Self {
            order: LruList::new(),
            index: HashMap::new(),
            max_entries,
            cas_counter: 0,
            eviction_handler: None,
        }
    }

    /// Attaches a handler called on every LRU or TTL eviction.
    pub fn with_eviction_handler(mut self, handler: impl EvictionHandler + 'static) -> Self {
        self.eviction_handler = Some(Box::new(handler));
        self
    }

    // == Set ==
    /// Unconditionally stores a value and returns its new CAS version.
    ///
    /// Overwriting keeps the key's slot and moves it to the front. Inserting
    /// a new key into a full cache evicts the least recently used entry.
    pub fn set(&mut self, key: &str, value: Vec<u8>, ttl: Duration) -> u64 {
        let cas = self.next_cas();

        if let Some(&id) = self.index.get(key) {
            self.order.move_to_front(id);
            if let Some(entry) = self.order.get_mut(id) {
                entry.store(value, ttl, cas);
            }
            return cas;
        }

        let id = self
            .order
            .push_front(CacheEntry::new(key.to_string(), value, ttl, cas));
        self.index.insert(key.to_string(), id);

        while self.max_entries != 0 && self.order.len() > self.max_entries {
            match self.order.back() {
                Some(oldest) => self.evict(oldest, EvictionReason::LruEviction),
                None => break,
            }
        }

        cas
    }

    // == Add ==
    /// Stores the value only if the key is not already present.
    pub fn add(&mut self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<u64> {
        if self.live_node(key).is_some() {
            return Err(CacheError::AlreadyExists(key.to_string()));
        }
        Ok(self.set(key, value, ttl))
    }

    // == Replace ==
    /// Stores the value only if the key is already present.
    pub fn replace(&mut self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<u64> {
        self.require(key)?;
        Ok(self.set(key, value, ttl))
    }

    // == Cas ==
    /// Compare-and-swap: stores the value only if the key exists and its
    /// current CAS version equals `expected`.
    ///
    /// A version mismatch is reported as `AlreadyExists`.
    pub fn cas(
        &mut self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
        expected: u64,
    ) -> Result<u64> {
        let id = self.require(key)?;
        let current = self.order.get(id).map(|entry| entry.cas);
        if current != Some(expected) {
            return Err(CacheError::AlreadyExists(key.to_string()));
        }
        Ok(self.set(key, value, ttl))
    }

    // == Get ==
    /// Retrieves a value by key, marking it most recently used.
    pub fn get(&mut self, key: &str) -> Result<&[u8]> {
        self.gets(key).map(|(value, _)| value)
    }

    // == Gets ==
    /// Retrieves a value together with its CAS version, marking it most
    /// recently used.
    pub fn gets(&mut self, key: &str) -> Result<(&[u8], u64)> {
        let id = self.require(key)?;
        self.order.move_to_front(id);
        self.order
            .get(id)
            .map(|entry| (entry.value.as_slice(), entry.cas))
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    // == Touch ==
    /// Re-arms the TTL and bumps recency and CAS without changing the value.
    pub fn touch(&mut self, key: &str, ttl: Duration) -> Result<u64> {
        let id = self.require(key)?;
        let cas = self.next_cas();
        self.order.move_to_front(id);
        if let Some(entry) = self.order.get_mut(id) {
            let value = std::mem::take(&mut entry.value);
            entry.store(value, ttl, cas);
        }
        Ok(cas)
    }

    // == Append ==
    /// Appends `suffix` to the stored value and re-stores it with `ttl`.
    pub fn append(&mut self, key: &str, suffix: &[u8], ttl: Duration) -> Result<u64> {
        let mut value = self.current_value(key)?;
        value.extend_from_slice(suffix);
        Ok(self.set(key, value, ttl))
    }

    // == Prepend ==
    /// Prepends `prefix` to the stored value and re-stores it with `ttl`.
    pub fn prepend(&mut self, key: &str, prefix: &[u8], ttl: Duration) -> Result<u64> {
        let current = self.current_value(key)?;
        let mut value = Vec::with_capacity(prefix.len() + current.len());
        value.extend_from_slice(prefix);
        value.extend_from_slice(&current);
        Ok(self.set(key, value, ttl))
    }

    // == Increment ==
    /// Adds `amount` to a stored counter, wrapping on overflow.
    pub fn increment(&mut self, key: &str, amount: u64) -> Result<CounterUpdate> {
        self.update_counter(key, |n| n.wrapping_add(amount))
    }

    // == Decrement ==
    /// Subtracts `amount` from a stored counter, wrapping below zero.
    pub fn decrement(&mut self, key: &str, amount: u64) -> Result<CounterUpdate> {
        self.update_counter(key, |n| n.wrapping_sub(amount))
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    ///
    /// Deleting is not an eviction, so the eviction handler is not called.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.index.remove(key) {
            Some(id) => {
                self.order.remove(id);
                true
            }
            None => false,
        }
    }

    // == Flush All ==
    /// Drops every entry without notifying the eviction handler.
    ///
    /// CAS versions keep counting from where they were.
    pub fn flush_all(&mut self) {
        self.order.clear();
        self.index.clear();
    }

    // == Length ==
    /// Returns the number of stored entries, expired-but-unvisited included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the capacity bound, 0 = unbounded.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Keys from most to least recently used. Does not touch anything.
    pub fn keys(&self) -> Vec<&str> {
        self.order.iter().map(|entry| entry.key.as_str()).collect()
    }

    fn next_cas(&mut self) -> u64 {
        self.cas_counter += 1;
        self.cas_counter
    }

    /// Looks up a live entry without touching its recency.
    ///
    /// An entry found expired is evicted with `TtlEviction` and treated as
    /// missing.
    fn live_node(&mut self, key: &str) -> Option<NodeId> {
        let id = *self.index.get(key)?;
        let expired = self.order.get(id).map_or(true, CacheEntry::is_expired);
        if expired {
            self.evict(id, EvictionReason::TtlEviction);
            return None;
        }
        Some(id)
    }

    fn require(&mut self, key: &str) -> Result<NodeId> {
        self.live_node(key).ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    fn current_value(&mut self, key: &str) -> Result<Vec<u8>> {
        let id = self.require(key)?;
        self.order
            .get(id)
            .map(|entry| entry.value.clone())
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    fn update_counter(
        &mut self,
        key: &str,
        apply: impl FnOnce(u64) -> u64,
    ) -> Result<CounterUpdate> {
        let id = self.require(key)?;
        let current = match self.order.get(id) {
            Some(entry) => decode_counter(&entry.value).map_err(|source| CacheError::Decode {
                key: key.to_string(),
                source,
            })?,
            None => return Err(CacheError::NotFound(key.to_string())),
        };

        let value = apply(current);
        let cas = self.next_cas();
        self.order.move_to_front(id);
        if let Some(entry) = self.order.get_mut(id) {
            let ttl = entry.ttl;
            entry.store(encode_counter(value), ttl, cas);
        }
        Ok(CounterUpdate { value, cas })
    }

    /// Notifies the handler, then unlinks and drops the entry.
    fn evict(&mut self, id: NodeId, reason: EvictionReason) {
        if let Some(entry) = self.order.get(id) {
            debug!(key = %entry.key, %reason, "evicting cache entry");
            if let Some(handler) = self.eviction_handler.as_mut() {
                handler.handle_eviction(&entry.key, &entry.value, reason);
            }
        }
        if let Some(entry) = self.order.remove(id) {
            self.index.remove(&entry.key);
        }
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.len())
            .field("max_entries", &self.max_entries)
            .field("cas_counter", &self.cas_counter)
            .field("eviction_handler", &self.eviction_handler.is_some())
            .finish()
    }
}
