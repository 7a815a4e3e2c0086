/*!
 * memcoord - Memory Coordinator Daemon
 *
 * Wires the host's memory counters into a coordinator:
 * - procfs usage probe feeding a polling pressure source
 * - an in-memory cache as the built-in evictable component
 * - the usage profiler for trend and leak reporting
 */

use anyhow::Context;
use memory_coordinator::{
    init_tracing, CoordinatorConfig, MemoryCache, MemoryCoordinator, PollingConfig,
    PollingPressureSource, ProcfsProbe, UsageProfiler,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const STATS_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = CoordinatorConfig::from_env();
    config
        .validate()
        .context("invalid MEMCOORD_* configuration")?;
    info!(
        tracking_enabled = config.tracking_enabled,
        history_size = config.history_size,
        "memcoord starting"
    );

    let probe = Arc::new(ProcfsProbe::new());
    let source = Arc::new(PollingPressureSource::new(probe.clone(), PollingConfig::default()));
    let cache = Arc::new(MemoryCache::new("memcoord-cache", config.cache.max_entries));
    let profiler = UsageProfiler::with_history_size(probe, config.history_size);

    let coordinator = MemoryCoordinator::builder()
        .with_config(config)
        .with_source(source)
        .with_cache(cache)
        .with_profiler(profiler.clone())
        .build();
    coordinator
        .initialize()
        .context("failed to initialize memory coordinator")?;

    info!("memcoord running - press Ctrl+C to exit");

    let mut stats_tick = tokio::time::interval(STATS_INTERVAL);
    stats_tick.tick().await;
    loop {
        tokio::select! {
            _ = stats_tick.tick() => {
                let stats = coordinator.stats();
                let summary = profiler.summary();
                info!(
                    level = %stats.pressure_level,
                    components = stats.components.len(),
                    tracked = stats.tracking.tracked,
                    component_bytes = stats.estimated_component_bytes(),
                    heap_bytes = summary.latest_heap_bytes,
                    trend = %summary.trend,
                    "coordinator stats"
                );
                if summary.potential_leak {
                    warn!(samples = summary.samples, "sustained heap growth, possible leak");
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl+C")?;
                break;
            }
        }
    }

    info!("shutdown signal received");
    if let Some(report) = coordinator.shutdown().await {
        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            bytes_freed = report.bytes_freed,
            "final cleanup complete"
        );
    }
    Ok(())
}
