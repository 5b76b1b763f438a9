//! Keyed read cache with expiry and bounded capacity.
//!
//! [`TtlCache`] is a plain single-owner structure; callers that share one
//! across tasks wrap it in a lock.
//!
//! A caller that fills a miss outside the lock takes a [`CacheGeneration`]
//! with the miss and stores through [`TtlCache::insert_if_unchanged`], so a
//! value loaded before an invalidation is never cached after it.

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Snapshot of a cache's invalidation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeneration(u64);

/// Cache whose entries expire a fixed time after insertion.
///
/// Expired entries are dropped when read. When full, an insert first purges
/// every expired entry and then evicts the entry closest to expiry.
#[derive(Debug)]
pub struct TtlCache<K, V, C> {
    entries: HashMap<K, CacheEntry<V>>,
    ttl: TimeDelta,
    capacity: NonZeroUsize,
    clock: Arc<C>,
    generation: u64,
}

impl<K, V, C> TtlCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new(ttl: TimeDelta, capacity: NonZeroUsize, clock: Arc<C>) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.get()),
            ttl,
            capacity,
            clock,
            generation: 0,
        }
    }

    /// Returns the current invalidation generation.
    #[must_use]
    pub const fn generation(&self) -> CacheGeneration {
        CacheGeneration(self.generation)
    }

    /// Returns a copy of the live value for `key`.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let now = self.clock.utc();
        let expired = self.entries.get(key).map(|entry| entry.expires_at <= now)?;
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert(&mut self, key: K, value: V) {
        let now = self.clock.utc();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity.get() {
            self.purge_expired(now);
            if self.entries.len() >= self.capacity.get() {
                self.evict_soonest();
            }
        }
        let expires_at = now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Stores `value` only when no invalidation happened since `seen` was
    /// taken. Returns whether the value was stored.
    pub fn insert_if_unchanged(&mut self, key: K, value: V, seen: CacheGeneration) -> bool {
        if seen != self.generation() {
            return false;
        }
        self.insert(key, value);
        true
    }

    /// Removes `key` and returns its value, live or not.
    pub fn invalidate(&mut self, key: &K) -> Option<V> {
        self.bump_generation();
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Removes every entry whose key and value satisfy `predicate`.
    pub fn invalidate_where(&mut self, mut predicate: impl FnMut(&K, &V) -> bool) {
        self.bump_generation();
        self.entries.retain(|key, entry| !predicate(key, &entry.value));
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.bump_generation();
        self.entries.clear();
    }

    /// Returns the number of stored entries, including expired ones not yet
    /// purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    const fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) {
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    fn evict_soonest(&mut self) {
        let soonest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.expires_at)
            .map(|(key, _)| key.clone());
        if let Some(key) = soonest {
            self.entries.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests;
