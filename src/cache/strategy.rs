/*!
 * Cache Eviction Strategy
 *
 * Translates a pressure level into an eviction percentage for one cache:
 *
 * | Level    | Target | Action                                   |
 * |----------|--------|------------------------------------------|
 * | Low      | 0%     | none                                     |
 * | Medium   | 25%    | selective removal, or a logged no-op     |
 * | High     | 50%    | full clear                               |
 * | Critical | 100%   | full clear                               |
 *
 * Any target at or above 50% is a full clear, since many storage engines only
 * expose `clear`. Reported byte counts are estimates (half of the size the
 * cache reports once eviction is done) and must be treated as advisory.
 */

use super::traits::{CacheSizeStats, EvictableCache};
use crate::component::{CleanupResult, PressureResponse};
use crate::core::limits::{
    DEFAULT_CACHE_MAX_BYTES, DEFAULT_CACHE_MAX_ENTRIES, FULL_CLEAR_PERCENT, LARGE_ENTRY_BYTES,
};
use crate::core::types::Bytes;
use crate::pressure::PressureLevel;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Capacity the recommendations are measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictionConfig {
    pub max_entries: usize,
    pub max_size_bytes: Bytes,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            max_size_bytes: DEFAULT_CACHE_MAX_BYTES,
        }
    }
}

/// Level-driven eviction policy
#[derive(Debug, Clone, Default)]
pub struct CacheEvictionStrategy {
    config: EvictionConfig,
}

/// Advisory bytes-freed figure: half of the size observed after eviction
fn estimate_bytes_freed(after: &CacheSizeStats) -> Bytes {
    after.size_bytes / 2
}

fn ratio(value: f64, capacity: f64) -> f64 {
    if capacity <= 0.0 {
        0.0
    } else {
        value / capacity
    }
}

impl CacheEvictionStrategy {
    pub fn new(config: EvictionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvictionConfig {
        &self.config
    }

    /// Evict from `cache` according to `level`
    pub fn evict(&self, cache: &dyn EvictableCache, level: PressureLevel) -> CleanupResult {
        let start = Instant::now();
        let name = cache.name();
        let percent = level.eviction_percent();

        if percent == 0 {
            debug!(cache = name, %level, "no eviction needed");
            return CleanupResult::succeeded(name, PressureResponse::none(), start.elapsed());
        }

        let before = match cache.size_stats() {
            Ok(stats) => stats,
            Err(e) => {
                error!(
                    cache = name,
                    %level,
                    error = %e,
                    "eviction aborted: size stats unavailable"
                );
                return CleanupResult::failed(name, e.into(), start.elapsed());
            }
        };

        if percent >= FULL_CLEAR_PERCENT {
            return match cache.clear().and_then(|()| cache.size_stats()) {
                Ok(after) => {
                    let response = PressureResponse {
                        bytes_freed: estimate_bytes_freed(&after),
                        entries_removed: before.entry_count,
                    };
                    info!(
                        cache = name,
                        %level,
                        entries_removed = response.entries_removed,
                        bytes_freed_estimate = response.bytes_freed,
                        "cache cleared"
                    );
                    CleanupResult::succeeded(name, response, start.elapsed())
                }
                Err(e) => {
                    error!(cache = name, %level, error = %e, "cache clear failed");
                    CleanupResult::failed(name, e.into(), start.elapsed())
                }
            };
        }

        if !cache.supports_selective_removal() {
            info!(
                cache = name,
                %level,
                percent,
                "partial eviction skipped: cache has no selective removal"
            );
            return CleanupResult::succeeded(name, PressureResponse::none(), start.elapsed());
        }

        let removed = cache
            .remove_fraction(percent as f64 / 100.0)
            .and_then(|removed| cache.size_stats().map(|after| (removed, after)));
        match removed {
            Ok((removed, after)) => {
                let response = PressureResponse {
                    bytes_freed: estimate_bytes_freed(&after),
                    entries_removed: removed,
                };
                info!(
                    cache = name,
                    %level,
                    percent,
                    entries_removed = removed,
                    bytes_freed_estimate = response.bytes_freed,
                    "partial eviction complete"
                );
                CleanupResult::succeeded(name, response, start.elapsed())
            }
            Err(e) => {
                error!(cache = name, %level, error = %e, "partial eviction failed");
                CleanupResult::failed(name, e.into(), start.elapsed())
            }
        }
    }

    /// Qualitative sizing advice for `cache`; read-only
    ///
    /// A stats failure degrades to an empty list.
    pub fn recommend(&self, cache: &dyn EvictableCache) -> Vec<String> {
        match cache.size_stats() {
            Ok(stats) => self.recommend_for(&stats, cache.supports_selective_removal()),
            Err(e) => {
                warn!(cache = cache.name(), error = %e, "cannot build cache recommendations");
                Vec::new()
            }
        }
    }

    fn recommend_for(&self, stats: &CacheSizeStats, selective: bool) -> Vec<String> {
        let mut recommendations = Vec::new();
        let entry_ratio = ratio(stats.entry_count as f64, self.config.max_entries as f64);
        let size_ratio = ratio(stats.size_bytes as f64, self.config.max_size_bytes as f64);

        if entry_ratio >= 0.9 {
            recommendations.push(format!(
                "near capacity: {} of {} entries in use; evict proactively",
                stats.entry_count, self.config.max_entries
            ));
        } else if entry_ratio >= 0.75 {
            recommendations.push(format!(
                "approaching entry capacity ({:.0}% used)",
                entry_ratio * 100.0
            ));
        }

        if size_ratio >= 0.9 {
            recommendations.push(format!(
                "near byte capacity: {} of {} bytes in use",
                stats.size_bytes, self.config.max_size_bytes
            ));
        } else if size_ratio >= 0.75 {
            recommendations.push(format!(
                "approaching byte capacity ({:.0}% used)",
                size_ratio * 100.0
            ));
        }

        if !selective && (entry_ratio >= 0.5 || size_ratio >= 0.5) {
            recommendations.push(
                "consider an LRU policy so medium pressure can evict partially instead of skipping"
                    .to_string(),
            );
        }

        let average = stats.average_entry_bytes();
        if average >= LARGE_ENTRY_BYTES {
            recommendations.push(format!(
                "large average entry size ({} bytes); consider compressing or storing by reference",
                average
            ));
        }

        recommendations
    }
}
