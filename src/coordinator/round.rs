/*!
 * Cleanup Rounds
 *
 * A round asks a priority-ordered slice of the registry to release memory.
 *
 * ## Selection
 *
 * The registry is kept in descending priority order. Only components that
 * report `can_cleanup` are eligible; of those, the level's fraction (rounded
 * up) is taken from the low-priority tail and processed lowest priority first:
 *
 * | Level    | Fraction |
 * |----------|----------|
 * | Low      | 0%       |
 * | Medium   | 30%      |
 * | High     | 70%      |
 * | Critical | 100%     |
 *
 * ## Dispatch
 *
 * Components are awaited one at a time. A failure, timeout or panic is
 * recorded against that component and the round moves on.
 */

use crate::component::{CleanupReport, CleanupResult, MemoryAware};
use crate::core::errors::CleanupError;
use crate::monitoring::RoundSpan;
use crate::pressure::PressureLevel;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn, Instrument};

/// How many of `eligible` components a round at `level` processes
#[inline]
pub fn selection_count(eligible: usize, level: PressureLevel) -> usize {
    (eligible * level.cleanup_percent()).div_ceil(100)
}

/// Pick the components a round at `level` should process, in processing order
///
/// `registry` must be sorted by descending priority.
pub fn select_for_round(
    registry: &[Arc<dyn MemoryAware>],
    level: PressureLevel,
) -> Vec<Arc<dyn MemoryAware>> {
    let eligible: Vec<&Arc<dyn MemoryAware>> =
        registry.iter().filter(|c| c.can_cleanup()).collect();
    let count = selection_count(eligible.len(), level);

    eligible
        .into_iter()
        .rev()
        .take(count)
        .map(Arc::clone)
        .collect()
}

/// Per-round dispatch settings
#[derive(Debug, Clone, Copy)]
pub struct DispatchOptions {
    pub slow_threshold: Duration,
    pub timeout: Option<Duration>,
}

async fn dispatch_one(
    component: &dyn MemoryAware,
    level: PressureLevel,
    options: DispatchOptions,
) -> CleanupResult {
    let name = component.name();
    let start = Instant::now();

    // Deferred so a panic raised before the future is returned is caught too
    let response = AssertUnwindSafe(async move { component.respond_to_pressure(level).await })
        .catch_unwind();

    let outcome = match options.timeout {
        Some(limit) => match tokio::time::timeout(limit, response).await {
            Ok(caught) => caught,
            Err(_) => Ok(Err(CleanupError::Timeout {
                component: name.to_string(),
                timeout_ms: limit.as_millis() as u64,
            })),
        },
        None => response.await,
    }
    .unwrap_or_else(|payload| Err(CleanupError::panicked(name, payload.as_ref())));
    let duration = start.elapsed();

    if duration > options.slow_threshold {
        warn!(
            component = name,
            duration_ms = duration.as_millis() as u64,
            "slow pressure response"
        );
    }

    match outcome {
        Ok(response) => {
            debug!(
                component = name,
                priority = component.priority(),
                bytes_freed = response.bytes_freed,
                entries_removed = response.entries_removed,
                "component cleaned up"
            );
            CleanupResult::succeeded(name, response, duration)
        }
        Err(e) => {
            error!(component = name, error = %e, "component cleanup failed");
            CleanupResult::failed(name, e, duration)
        }
    }
}

/// Run `components` in order and aggregate their results
pub async fn run_round(
    components: Vec<Arc<dyn MemoryAware>>,
    level: PressureLevel,
    options: DispatchOptions,
) -> CleanupReport {
    let span = RoundSpan::new(level, components.len());
    let start = Instant::now();

    let results = async {
        let mut results = Vec::with_capacity(components.len());
        for component in &components {
            results.push(dispatch_one(component.as_ref(), level, options).await);
        }
        results
    }
    .instrument(span.span().clone())
    .await;

    let report = CleanupReport::new(level, results, start.elapsed());
    span.record_outcome(report.processed(), report.failed);

    if report.processed() > 0 {
        info!(
            trace_id = span.trace_id(),
            %level,
            succeeded = report.succeeded,
            failed = report.failed,
            bytes_freed = report.bytes_freed,
            duration_ms = report.duration.as_millis() as u64,
            "cleanup round complete"
        );
    } else {
        debug!(%level, "cleanup round selected no components");
    }
    report
}
