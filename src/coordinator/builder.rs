/*!
 * Coordinator Builder
 * Builder pattern for MemoryCoordinator construction
 */

use super::config::CoordinatorConfig;
use super::manager::{CoordinatorInner, MemoryCoordinator};
use crate::cache::{CacheComponent, CacheEvictionStrategy, EvictableCache};
use crate::component::MemoryAware;
use crate::pressure::PressureSource;
use crate::profiler::{ProfilerComponent, UsageProfiler};
use std::sync::Arc;
use tracing::debug;

/// Builder for MemoryCoordinator
///
/// Caches and the profiler given here become built-in components, registered
/// when the coordinator is initialized.
#[derive(Default)]
pub struct CoordinatorBuilder {
    config: Option<CoordinatorConfig>,
    source: Option<Arc<dyn PressureSource>>,
    caches: Vec<Arc<dyn EvictableCache>>,
    profiler: Option<UsageProfiler>,
    components: Vec<Arc<dyn MemoryAware>>,
}

impl CoordinatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Subscribe to `source` on initialize
    pub fn with_source(mut self, source: Arc<dyn PressureSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Add a cache, evicted with the configured capacity
    pub fn with_cache(mut self, cache: Arc<dyn EvictableCache>) -> Self {
        self.caches.push(cache);
        self
    }

    /// Add the profiler; it monitors from initialize until shutdown
    pub fn with_profiler(mut self, profiler: UsageProfiler) -> Self {
        self.profiler = Some(profiler);
        self
    }

    /// Add any component to register on initialize
    pub fn with_component(mut self, component: Arc<dyn MemoryAware>) -> Self {
        self.components.push(component);
        self
    }

    pub fn build(self) -> MemoryCoordinator {
        let config = self.config.unwrap_or_default();

        let mut builtins: Vec<Arc<dyn MemoryAware>> = self
            .caches
            .into_iter()
            .map(|cache| {
                let strategy = CacheEvictionStrategy::new(config.cache);
                Arc::new(CacheComponent::new(cache, strategy)) as Arc<dyn MemoryAware>
            })
            .collect();
        if let Some(profiler) = &self.profiler {
            builtins.push(Arc::new(ProfilerComponent::new(profiler.clone())));
        }
        builtins.extend(self.components);

        debug!(
            builtins = builtins.len(),
            has_source = self.source.is_some(),
            has_profiler = self.profiler.is_some(),
            "memory coordinator built"
        );

        MemoryCoordinator::from_inner(CoordinatorInner::new(
            config,
            self.source,
            builtins,
            self.profiler,
        ))
    }
}
