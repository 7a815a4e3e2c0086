/*!
 * Usage Profiler
 *
 * Periodic memory snapshots in a bounded rolling history.
 *
 * ## States
 *
 * - **Idle**: snapshots only on demand
 * - **Monitoring**: a background task snapshots on an interval
 *
 * `start_monitoring` records an "initial" snapshot, `stop_monitoring` a
 * "final" one followed by a summary log line. The history is a ring buffer,
 * so the oldest samples are overwritten once it is full.
 */

use super::analysis::{classify_trend, detect_leak};
use super::types::{MemoryDataPoint, ProfilerState, ProfilerSummary, Trend};
use crate::core::limits::DEFAULT_HISTORY_SIZE;
use crate::pressure::{UsageProbe, UsageReading};
use parking_lot::Mutex;
use ringbuf::{traits::*, HeapRb};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct ProfilerInner {
    probe: Arc<dyn UsageProbe>,
    history: Mutex<HeapRb<MemoryDataPoint>>,
    /// Present while Monitoring
    task: Mutex<Option<JoinHandle<()>>>,
    next_id: AtomicU64,
    history_size: usize,
}

impl ProfilerInner {
    fn snapshot(&self, tag: Option<String>) -> MemoryDataPoint {
        let reading = self.probe.read().unwrap_or_else(|e| {
            warn!(error = %e, "memory usage unavailable, recording zeroed snapshot");
            UsageReading::default()
        });

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let point = MemoryDataPoint::from_reading(id, tag, &reading);
        self.history.lock().push_overwrite(point.clone());
        debug!(
            snapshot_id = id,
            tag = point.tag.as_deref().unwrap_or(""),
            rss_bytes = point.rss_bytes,
            heap_used_bytes = point.heap_used_bytes,
            "memory snapshot taken"
        );
        point
    }

    fn heap_series(&self) -> Vec<u64> {
        self.history
            .lock()
            .iter()
            .map(|point| point.heap_used_bytes)
            .collect()
    }
}

/// Memory usage profiler
///
/// Cloning shares history and monitoring state.
#[derive(Clone)]
pub struct UsageProfiler {
    inner: Arc<ProfilerInner>,
}

impl UsageProfiler {
    pub fn new(probe: Arc<dyn UsageProbe>) -> Self {
        Self::with_history_size(probe, DEFAULT_HISTORY_SIZE)
    }

    pub fn with_history_size(probe: Arc<dyn UsageProbe>, history_size: usize) -> Self {
        let history_size = history_size.max(1);
        Self {
            inner: Arc::new(ProfilerInner {
                probe,
                history: Mutex::new(HeapRb::new(history_size)),
                task: Mutex::new(None),
                next_id: AtomicU64::new(1),
                history_size,
            }),
        }
    }

    pub fn state(&self) -> ProfilerState {
        if self.inner.task.lock().is_some() {
            ProfilerState::Monitoring
        } else {
            ProfilerState::Idle
        }
    }

    /// Record a snapshot now; valid in either state
    pub fn take_snapshot(&self, tag: Option<&str>) -> MemoryDataPoint {
        self.inner.snapshot(tag.map(str::to_string))
    }

    /// Idle → Monitoring. Returns false if already monitoring or no runtime is available
    pub fn start_monitoring(&self, interval: Duration) -> bool {
        let mut task = self.inner.task.lock();
        if task.is_some() {
            info!("profiler already monitoring, ignoring start");
            return false;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "cannot start profiler monitoring outside a tokio runtime");
                return false;
            }
        };

        self.inner.snapshot(Some("initial".to_string()));

        let weak: Weak<ProfilerInner> = Arc::downgrade(&self.inner);
        *task = Some(runtime.spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(inner) => {
                        inner.snapshot(None);
                    }
                    None => break,
                }
            }
        }));

        info!(
            interval_ms = interval.as_millis() as u64,
            history_size = self.inner.history_size,
            "profiler monitoring started"
        );
        true
    }

    /// Monitoring → Idle. Returns the summary, or `None` if not monitoring
    pub fn stop_monitoring(&self) -> Option<ProfilerSummary> {
        let handle = self.inner.task.lock().take();
        let Some(handle) = handle else {
            debug!("profiler not monitoring, ignoring stop");
            return None;
        };
        handle.abort();

        self.inner.snapshot(Some("final".to_string()));
        let summary = self.summary();
        info!(
            samples = summary.samples,
            latest_heap_bytes = summary.latest_heap_bytes,
            peak_heap_bytes = summary.peak_heap_bytes,
            trend = %summary.trend,
            potential_leak = summary.potential_leak,
            "profiler monitoring stopped"
        );
        Some(summary)
    }

    /// History, oldest first
    pub fn history(&self) -> Vec<MemoryDataPoint> {
        self.inner.history.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.history.lock().occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn history_size(&self) -> usize {
        self.inner.history_size
    }

    /// Approximate bytes held by the history itself
    pub fn footprint_bytes(&self) -> u64 {
        (self.len() * std::mem::size_of::<MemoryDataPoint>()) as u64
    }

    pub fn trend(&self) -> Trend {
        classify_trend(&self.inner.heap_series())
    }

    /// Leak heuristic over the latest samples; see [`detect_leak`]
    pub fn detect_leak(&self) -> bool {
        detect_leak(&self.inner.heap_series())
    }

    pub fn summary(&self) -> ProfilerSummary {
        let history = self.inner.history.lock();
        let series: Vec<u64> = history.iter().map(|p| p.heap_used_bytes).collect();
        ProfilerSummary {
            samples: series.len(),
            latest_heap_bytes: series.last().copied().unwrap_or(0),
            peak_heap_bytes: series.iter().copied().max().unwrap_or(0),
            peak_rss_bytes: history.iter().map(|p| p.rss_bytes).max().unwrap_or(0),
            trend: classify_trend(&series),
            potential_leak: detect_leak(&series),
        }
    }

    /// Drop the oldest samples until at most `keep` remain; returns how many were dropped
    pub fn compact(&self, keep: usize) -> usize {
        let mut history = self.inner.history.lock();
        let mut dropped = 0;
        while history.occupied_len() > keep {
            if history.try_pop().is_none() {
                break;
            }
            dropped += 1;
        }
        dropped
    }

    pub fn clear(&self) -> usize {
        let mut history = self.inner.history.lock();
        let removed = history.occupied_len();
        *history = HeapRb::new(self.inner.history_size);
        removed
    }
}

impl Drop for ProfilerInner {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
