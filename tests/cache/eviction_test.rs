/*!
 * Cache Eviction Tests
 * Level-driven eviction against the built-in cache and contract-only caches
 */

use memory_coordinator::cache::{CacheSizeStats, EvictionConfig};
use memory_coordinator::{
    CacheEvictionStrategy, CleanupError, EvictableCache, EvictionError, EvictionResult, MemoryCache,
    PressureLevel,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

fn filled(entries: usize, bytes_each: usize) -> MemoryCache {
    let cache = MemoryCache::new("pages", 0);
    for i in 0..entries {
        cache.insert(format!("page-{i}"), vec![0u8; bytes_each]);
    }
    cache
}

/// Clear-only cache backed by a plain vector
struct ClearOnly {
    entries: Mutex<Vec<Vec<u8>>>,
    fail_stats: bool,
    fail_clear: bool,
    /// Entries a clear leaves behind, like a store with pinned pages
    retained_on_clear: usize,
}

impl ClearOnly {
    fn new(entries: usize) -> Self {
        Self {
            entries: Mutex::new(vec![vec![0u8; 10]; entries]),
            fail_stats: false,
            fail_clear: false,
            retained_on_clear: 0,
        }
    }
}

impl EvictableCache for ClearOnly {
    fn name(&self) -> &str {
        "clear-only"
    }

    fn size_stats(&self) -> EvictionResult<CacheSizeStats> {
        if self.fail_stats {
            return Err(EvictionError::Stats {
                cache: self.name().into(),
                reason: "backend offline".into(),
            });
        }
        let entries = self.entries.lock();
        Ok(CacheSizeStats {
            entry_count: entries.len(),
            size_bytes: entries.iter().map(|e| e.len() as u64).sum(),
        })
    }

    fn clear(&self) -> EvictionResult<()> {
        if self.fail_clear {
            return Err(EvictionError::Clear {
                cache: self.name().into(),
                reason: "read-only".into(),
            });
        }
        self.entries.lock().truncate(self.retained_on_clear);
        Ok(())
    }
}

#[test]
fn test_critical_clears_and_reports_prior_count() {
    let cache = filled(40, 100);
    let result = CacheEvictionStrategy::default().evict(&cache, PressureLevel::Critical);

    assert!(result.success);
    assert_eq!(result.entries_removed, 40);
    // half of what is left once the cache is empty
    assert_eq!(result.bytes_freed, 0);
    assert!(cache.is_empty());
    assert_eq!(cache.size_bytes(), 0);
}

#[test]
fn test_high_is_a_full_clear() {
    let cache = filled(10, 100);
    let result = CacheEvictionStrategy::default().evict(&cache, PressureLevel::High);

    assert!(result.success);
    assert_eq!(result.entries_removed, 10);
    assert!(cache.is_empty());
}

#[test]
fn test_medium_removes_a_quarter() {
    let cache = filled(40, 100);
    let result = CacheEvictionStrategy::default().evict(&cache, PressureLevel::Medium);

    assert!(result.success);
    assert_eq!(result.entries_removed, 10);
    assert_eq!(cache.len(), 30);
    assert_eq!(result.bytes_freed, 1500);
}

#[test]
fn test_bytes_estimate_uses_size_after_eviction() {
    let mut cache = ClearOnly::new(6);
    cache.retained_on_clear = 2;
    let result = CacheEvictionStrategy::default().evict(&cache, PressureLevel::Critical);

    assert!(result.success);
    assert_eq!(result.entries_removed, 6);
    assert_eq!(cache.entries.lock().len(), 2);
    assert_eq!(result.bytes_freed, 10);
}

#[test]
fn test_low_leaves_cache_alone() {
    let cache = filled(5, 10);
    let result = CacheEvictionStrategy::default().evict(&cache, PressureLevel::Low);

    assert!(result.success);
    assert_eq!(result.entries_removed, 0);
    assert_eq!(cache.len(), 5);
}

#[test]
fn test_medium_without_selective_removal_is_noop() {
    let cache = ClearOnly::new(8);
    let result = CacheEvictionStrategy::default().evict(&cache, PressureLevel::Medium);

    assert!(result.success);
    assert_eq!(result.entries_removed, 0);
    assert_eq!(cache.entries.lock().len(), 8);
}

#[test]
fn test_stats_failure_is_unsuccessful() {
    let mut cache = ClearOnly::new(3);
    cache.fail_stats = true;
    let result = CacheEvictionStrategy::default().evict(&cache, PressureLevel::Critical);

    assert!(!result.success);
    assert!(matches!(
        result.error,
        Some(CleanupError::Eviction(EvictionError::Stats { .. }))
    ));
    assert_eq!(cache.entries.lock().len(), 3);
}

#[test]
fn test_clear_failure_is_unsuccessful() {
    let mut cache = ClearOnly::new(3);
    cache.fail_clear = true;
    let result = CacheEvictionStrategy::default().evict(&cache, PressureLevel::Critical);

    assert!(!result.success);
    assert!(matches!(
        result.error,
        Some(CleanupError::Eviction(EvictionError::Clear { .. }))
    ));
}

#[test]
fn test_recommendations_for_full_clear_only_cache() {
    let strategy = CacheEvictionStrategy::new(EvictionConfig {
        max_entries: 10,
        max_size_bytes: 1_000_000,
    });
    let recs = strategy.recommend(&ClearOnly::new(10));

    assert!(recs.iter().any(|r| r.starts_with("near capacity")));
    assert!(recs.iter().any(|r| r.contains("LRU")));
}

#[test]
fn test_recommendations_degrade_on_stats_failure() {
    let mut cache = ClearOnly::new(10);
    cache.fail_stats = true;
    assert!(CacheEvictionStrategy::default().recommend(&cache).is_empty());
}
