/*!
 * Polling Pressure Source
 * Samples a usage probe on an interval and emits smoothed level changes
 */

use super::level::{PressureInfo, PressureLevel};
use super::probe::UsageProbe;
use super::source::{ListenerSet, PressureListener, PressureSource};
use crate::core::id::ListenerId;
use crate::core::limits::{DEFAULT_MONOTONIC_WINDOW, DEFAULT_SAMPLE_INTERVAL};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Polling and smoothing configuration
#[derive(Debug, Clone, Copy)]
pub struct PollingConfig {
    /// Polling cadence
    pub sample_interval: Duration,
    /// Minimum time a level must persist before being lowered
    pub monotonic_window: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            monotonic_window: DEFAULT_MONOTONIC_WINDOW,
        }
    }
}

/// Debounces downgrades: raises apply at once, drops only after the window
#[derive(Debug, Clone, Copy)]
struct PressureSmoother {
    last: PressureLevel,
    last_change: Instant,
    monotonic_window: Duration,
}

impl PressureSmoother {
    fn new(monotonic_window: Duration) -> Self {
        Self {
            last: PressureLevel::Low,
            last_change: Instant::now(),
            monotonic_window,
        }
    }

    fn filter(&mut self, next: PressureLevel, now: Instant) -> PressureLevel {
        if next > self.last {
            self.last = next;
            self.last_change = now;
            return next;
        }

        if next < self.last && now.duration_since(self.last_change) < self.monotonic_window {
            return self.last;
        }

        if next != self.last {
            self.last_change = now;
        }
        self.last = next;
        next
    }
}

struct PollingShared {
    probe: Arc<dyn UsageProbe>,
    listeners: ListenerSet,
    smoother: Mutex<PressureSmoother>,
    /// Last emitted level; `u8::MAX` until the first emission
    emitted: AtomicU8,
}

impl PollingShared {
    fn sample(&self) -> Option<PressureLevel> {
        let reading = match self.probe.read() {
            Ok(reading) => reading,
            Err(e) => {
                warn!(error = %e, "pressure sample failed");
                return None;
            }
        };

        let info = PressureInfo::from_bytes(
            reading
                .system_total_bytes
                .saturating_sub(reading.system_available_bytes),
            reading.system_total_bytes,
        );
        let level = self
            .smoother
            .lock()
            .filter(PressureLevel::classify(info.usage_ratio), Instant::now());

        let previous = self.emitted.swap(level.rank(), Ordering::AcqRel);
        if previous != level.rank() {
            debug!(%level, usage_ratio = info.usage_ratio, "pressure level changed");
            self.listeners.notify(level, &info);
        }
        Some(level)
    }
}

/// Pressure source backed by a polled [`UsageProbe`]
pub struct PollingPressureSource {
    shared: Arc<PollingShared>,
    config: PollingConfig,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PollingPressureSource {
    pub fn new(probe: Arc<dyn UsageProbe>, config: PollingConfig) -> Self {
        Self {
            shared: Arc::new(PollingShared {
                probe,
                listeners: ListenerSet::new(),
                smoother: Mutex::new(PressureSmoother::new(config.monotonic_window)),
                emitted: AtomicU8::new(u8::MAX),
            }),
            config,
            task: Mutex::new(None),
        }
    }

    /// Take one sample immediately, notifying listeners on change
    pub fn sample_now(&self) -> Option<PressureLevel> {
        self.shared.sample()
    }

    pub fn is_monitoring(&self) -> bool {
        self.task.lock().is_some()
    }
}

impl PressureSource for PollingPressureSource {
    fn add_listener(&self, listener: Arc<dyn PressureListener>) -> ListenerId {
        self.shared.listeners.add(listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.listeners.remove(id)
    }

    fn start_monitoring(&self) {
        let mut task = self.task.lock();
        if task.is_some() {
            debug!("polling pressure source already monitoring");
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "cannot start pressure polling outside a tokio runtime");
                return;
            }
        };

        let shared = Arc::clone(&self.shared);
        let period = self.config.sample_interval;
        *task = Some(runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                shared.sample();
            }
        }));

        info!(
            interval_ms = period.as_millis() as u64,
            "pressure polling started"
        );
    }

    fn stop_monitoring(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
            info!("pressure polling stopped");
        }
    }

    fn current_level(&self) -> PressureLevel {
        match self.shared.emitted.load(Ordering::Acquire) {
            u8::MAX => PressureLevel::Low,
            rank => PressureLevel::from_rank(rank),
        }
    }
}

impl Drop for PollingPressureSource {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().take() {
            handle.abort();
        }
    }
}
