/*!
 * Cache Eviction Contract
 * What the eviction strategy needs from a cache storage engine
 */

use crate::core::errors::{EvictionError, EvictionResult};
use crate::core::types::Bytes;
use serde::{Deserialize, Serialize};

/// Size statistics reported by a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheSizeStats {
    pub entry_count: usize,
    pub size_bytes: Bytes,
}

impl CacheSizeStats {
    pub fn average_entry_bytes(&self) -> Bytes {
        if self.entry_count == 0 {
            0
        } else {
            self.size_bytes / self.entry_count as Bytes
        }
    }
}

/// Cache storage engine interface
pub trait EvictableCache: Send + Sync {
    fn name(&self) -> &str;

    fn size_stats(&self) -> EvictionResult<CacheSizeStats>;

    /// Remove every entry
    fn clear(&self) -> EvictionResult<()>;

    /// Whether `remove_fraction` is implemented
    fn supports_selective_removal(&self) -> bool {
        false
    }

    /// Remove roughly `fraction` (0.0-1.0) of the entries, returning how many
    fn remove_fraction(&self, _fraction: f64) -> EvictionResult<usize> {
        Err(EvictionError::Unsupported(self.name().to_string()))
    }
}
