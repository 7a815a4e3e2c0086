/*!
 * Memory Coordinator Library
 * Adaptive memory pressure coordination exposed as a library
 *
 * A pressure source reports Low/Medium/High/Critical levels; the coordinator
 * asks registered components to release memory in priority order, tracks
 * ephemeral objects weakly, and tightens its periodic cleanup cadence as
 * pressure rises.
 */

pub mod cache;
pub mod component;
pub mod coordinator;
pub mod core;
pub mod monitoring;
pub mod pressure;
pub mod profiler;
pub mod tracking;

// Re-exports
pub use cache::{CacheComponent, CacheEvictionStrategy, EvictableCache, MemoryCache};
pub use component::{priority, CleanupReport, CleanupResult, MemoryAware, PressureResponse};
pub use coordinator::{CoordinatorConfig, CoordinatorStats, MemoryCoordinator};
pub use crate::core::errors::*;
pub use crate::core::id::TrackingId;
pub use monitoring::init_tracing;
pub use pressure::{
    ManualPressureSource, PollingConfig, PollingPressureSource, PressureInfo, PressureLevel,
    PressureListener, PressureSource, ProcfsProbe, StaticProbe, UsageProbe, UsageReading,
};
pub use profiler::{ProfilerComponent, ProfilerSummary, Trend, UsageProfiler};
pub use tracking::TrackingStats;
