/*!
 * Memory Cache
 * Concurrent byte-accounted key/value store used as the built-in caching layer
 */

use super::traits::{CacheSizeStats, EvictableCache};
use crate::core::errors::EvictionResult;
use crate::core::types::Bytes;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Concurrent cache of byte values with a soft entry limit
///
/// Inserting past the limit drops an arbitrary existing entry. Cloning shares
/// the underlying storage.
#[derive(Clone)]
pub struct MemoryCache {
    name: Arc<str>,
    entries: Arc<DashMap<String, Arc<[u8]>, RandomState>>,
    size_bytes: Arc<AtomicU64>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(name: &str, max_entries: usize) -> Self {
        Self {
            name: Arc::from(name),
            entries: Arc::new(DashMap::with_hasher(RandomState::new())),
            size_bytes: Arc::new(AtomicU64::new(0)),
            max_entries,
        }
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<Arc<[u8]>>) -> Option<Arc<[u8]>> {
        let key = key.into();
        let value = value.into();

        if self.max_entries > 0
            && self.entries.len() >= self.max_entries
            && !self.entries.contains_key(&key)
        {
            let victim = self.entries.iter().next().map(|entry| entry.key().clone());
            if let Some(victim) = victim {
                self.remove(&victim);
            }
        }

        self.size_bytes
            .fetch_add(value.len() as Bytes, Ordering::Relaxed);
        let previous = self.entries.insert(key, value);
        if let Some(old) = &previous {
            self.size_bytes.fetch_sub(old.len() as Bytes, Ordering::Relaxed);
        }
        previous
    }

    pub fn get(&self, key: &str) -> Option<Arc<[u8]>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, key: &str) -> Option<Arc<[u8]>> {
        let (_, value) = self.entries.remove(key)?;
        self.size_bytes.fetch_sub(value.len() as Bytes, Ordering::Relaxed);
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn size_bytes(&self) -> Bytes {
        self.size_bytes.load(Ordering::Relaxed)
    }
}

impl EvictableCache for MemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    fn size_stats(&self) -> EvictionResult<CacheSizeStats> {
        Ok(CacheSizeStats {
            entry_count: self.len(),
            size_bytes: self.size_bytes(),
        })
    }

    fn clear(&self) -> EvictionResult<()> {
        // Remove key by key so the byte counter stays exact under concurrent inserts
        let keys: Vec<String> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        for key in keys {
            self.remove(&key);
        }
        debug!(cache = %self.name, "memory cache cleared");
        Ok(())
    }

    fn supports_selective_removal(&self) -> bool {
        true
    }

    fn remove_fraction(&self, fraction: f64) -> EvictionResult<usize> {
        let fraction = fraction.clamp(0.0, 1.0);
        let target = (self.len() as f64 * fraction).ceil() as usize;

        // Collect first: removing while iterating would deadlock on the shard lock
        let victims: Vec<String> = self
            .entries
            .iter()
            .take(target)
            .map(|entry| entry.key().clone())
            .collect();

        let removed = victims
            .iter()
            .filter(|key| self.remove(key).is_some())
            .count();
        debug!(cache = %self.name, removed, "memory cache partially evicted");
        Ok(removed)
    }
}
