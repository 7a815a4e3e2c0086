/*!
 * Cache Component
 * Adapts a cache and its eviction strategy into a cleanup participant
 */

use super::strategy::CacheEvictionStrategy;
use super::traits::EvictableCache;
use crate::component::{priority, MemoryAware, PressureResponse};
use crate::core::errors::ComponentResult;
use crate::core::types::{Bytes, Priority};
use crate::pressure::PressureLevel;
use futures::future::BoxFuture;
use std::sync::Arc;

pub struct CacheComponent {
    cache: Arc<dyn EvictableCache>,
    strategy: CacheEvictionStrategy,
    priority: Priority,
}

impl CacheComponent {
    pub fn new(cache: Arc<dyn EvictableCache>, strategy: CacheEvictionStrategy) -> Self {
        Self {
            cache,
            strategy,
            priority: priority::NORMAL,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sizing advice for the wrapped cache
    pub fn recommendations(&self) -> Vec<String> {
        self.strategy.recommend(self.cache.as_ref())
    }
}

impl MemoryAware for CacheComponent {
    fn name(&self) -> &str {
        self.cache.name()
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn estimated_usage_bytes(&self) -> Option<Bytes> {
        self.cache.size_stats().ok().map(|stats| stats.size_bytes)
    }

    fn respond_to_pressure(
        &self,
        level: PressureLevel,
    ) -> BoxFuture<'_, ComponentResult<PressureResponse>> {
        Box::pin(async move {
            self.strategy
                .evict(self.cache.as_ref(), level)
                .into_response()
        })
    }
}
