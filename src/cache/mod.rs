/*!
 * Cache Module
 * Eviction contract, level-driven eviction strategy, and the built-in cache
 */

pub mod component;
pub mod store;
pub mod strategy;
pub mod traits;

pub use component::CacheComponent;
pub use store::MemoryCache;
pub use strategy::{CacheEvictionStrategy, EvictionConfig};
pub use traits::{CacheSizeStats, EvictableCache};
