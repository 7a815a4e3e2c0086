/*!
 * Memory Coordinator
 *
 * Central hub between a pressure source and the registered components.
 *
 * ## Lifecycle
 *
 * `initialize` subscribes to the source, registers the built-in components,
 * and starts the adaptive cleanup timer. `shutdown` reverses all of that and
 * runs one final Critical round against every component. Both are idempotent.
 * `reset` returns a shut-down instance to its constructed state.
 *
 * ## Locking
 *
 * The component registry and tracked-object registry are held only long
 * enough to copy or mutate them; no lock is held across an await, so
 * overlapping rounds are tolerated.
 */

use super::builder::CoordinatorBuilder;
use super::config::CoordinatorConfig;
use super::round::{run_round, select_for_round, DispatchOptions};
use super::stats::{ComponentStats, CoordinatorStats};
use super::task::{CleanupTask, TickFn};
use crate::component::{priority, CleanupReport, MemoryAware};
use crate::core::errors::{CoordinatorError, CoordinatorResult};
use crate::core::id::{ListenerId, TrackingId};
use crate::core::types::Priority;
use crate::pressure::{PressureInfo, PressureLevel, PressureListener, PressureSource};
use crate::profiler::UsageProfiler;
use crate::tracking::TrackedObjectRegistry;
use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Categories reported by the emergency sweep
const EMERGENCY_CATEGORY_LIMIT: usize = 5;

struct RegisteredComponent {
    component: Arc<dyn MemoryAware>,
    /// Clamped at registration
    priority: Priority,
}

pub(super) struct CoordinatorInner {
    config: CoordinatorConfig,
    source: Option<Arc<dyn PressureSource>>,
    builtins: Vec<Arc<dyn MemoryAware>>,
    profiler: Option<UsageProfiler>,

    components: RwLock<Vec<RegisteredComponent>>,
    tracked: Mutex<TrackedObjectRegistry>,
    level: AtomicU8,

    initialized: AtomicBool,
    shut_down: AtomicBool,
    runtime: Mutex<Option<Handle>>,
    listener_id: Mutex<Option<ListenerId>>,
    task: Mutex<Option<CleanupTask>>,
}

/// Forwards source notifications without keeping the coordinator alive
struct PressureBridge {
    inner: Weak<CoordinatorInner>,
}

impl PressureListener for PressureBridge {
    fn on_pressure_changed(&self, level: PressureLevel, info: &PressureInfo) {
        if let Some(inner) = self.inner.upgrade() {
            inner.handle_pressure(level, info);
        }
    }
}

impl CoordinatorInner {
    pub(super) fn new(
        config: CoordinatorConfig,
        source: Option<Arc<dyn PressureSource>>,
        builtins: Vec<Arc<dyn MemoryAware>>,
        profiler: Option<UsageProfiler>,
    ) -> Self {
        Self {
            config,
            source,
            builtins,
            profiler,
            components: RwLock::new(Vec::new()),
            tracked: Mutex::new(TrackedObjectRegistry::new()),
            level: AtomicU8::new(PressureLevel::Low.rank()),
            initialized: AtomicBool::new(false),
            shut_down: AtomicBool::new(false),
            runtime: Mutex::new(None),
            listener_id: Mutex::new(None),
            task: Mutex::new(None),
        }
    }

    #[inline]
    fn level(&self) -> PressureLevel {
        PressureLevel::from_rank(self.level.load(Ordering::Acquire))
    }

    #[inline]
    fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            slow_threshold: self.config.slow_component_threshold,
            timeout: self.config.component_timeout,
        }
    }

    fn purge_dead(&self) -> usize {
        let purged = self.tracked.lock().purge_dead();
        if purged > 0 {
            debug!(purged, "swept dead tracked objects");
        }
        purged
    }

    fn register(&self, component: Arc<dyn MemoryAware>) -> bool {
        if self.is_shut_down() {
            warn!(
                component = component.name(),
                "coordinator shut down, rejecting registration"
            );
            return false;
        }

        let declared = component.priority();
        let priority = priority::clamp(declared);
        if priority != declared {
            warn!(
                component = component.name(),
                declared, priority, "component priority clamped"
            );
        }

        let mut components = self.components.write();
        if components
            .iter()
            .any(|entry| entry.component.name() == component.name())
        {
            warn!(
                component = component.name(),
                "component already registered, ignoring"
            );
            return false;
        }

        debug!(component = component.name(), priority, "component registered");
        components.push(RegisteredComponent { component, priority });
        // stable: equal priorities keep registration order
        components.sort_by(|a, b| b.priority.cmp(&a.priority));
        true
    }

    fn snapshot(&self) -> Vec<Arc<dyn MemoryAware>> {
        self.components
            .read()
            .iter()
            .map(|entry| Arc::clone(&entry.component))
            .collect()
    }

    fn runtime(&self) -> Option<Handle> {
        self.runtime
            .lock()
            .clone()
            .or_else(|| Handle::try_current().ok())
    }

    fn handle_pressure(self: &Arc<Self>, level: PressureLevel, info: &PressureInfo) {
        if self.is_shut_down() {
            debug!(%level, "pressure notification after shutdown ignored");
            return;
        }

        let previous = PressureLevel::from_rank(self.level.swap(level.rank(), Ordering::AcqRel));
        if previous != level {
            info!(
                %previous,
                %level,
                usage_ratio = info.usage_ratio,
                "memory pressure changed"
            );
        }

        self.purge_dead();

        if level.requires_action() {
            match self.runtime() {
                Some(runtime) => {
                    let inner = Arc::clone(self);
                    runtime.spawn(async move {
                        if inner.is_shut_down() {
                            return;
                        }
                        inner.cleanup_round(level).await;
                    });
                }
                None => warn!(%level, "no tokio runtime available, cleanup round skipped"),
            }
        }

        if let Some(task) = self.task.lock().as_ref() {
            task.update_interval(self.config.interval_for(level));
        }
    }

    /// Purge dead entries, then report the surviving categories at warn
    fn emergency_sweep(&self) {
        let stats = {
            let mut tracked = self.tracked.lock();
            tracked.purge_dead();
            tracked.stats()
        };
        if stats.tracked == 0 {
            return;
        }

        for (category, count) in stats.largest_categories(EMERGENCY_CATEGORY_LIMIT) {
            warn!(category, count, "tracked objects surviving critical pressure");
        }
        warn!(
            tracked = stats.tracked,
            alive = stats.alive,
            categories = stats.categories.len(),
            "emergency sweep complete"
        );
    }

    async fn cleanup_round(&self, level: PressureLevel) -> CleanupReport {
        let selected = select_for_round(&self.snapshot(), level);
        if level == PressureLevel::Critical {
            self.emergency_sweep();
        }
        run_round(selected, level, self.dispatch_options()).await
    }

    async fn periodic_tick(&self) {
        if self.is_shut_down() {
            return;
        }
        self.purge_dead();
        self.cleanup_round(self.level()).await;
    }

    fn spawn_task(self: &Arc<Self>, runtime: &Handle) -> CleanupTask {
        let weak = Arc::downgrade(self);
        let tick: TickFn = Box::new(move || {
            let inner = weak.upgrade()?;
            let work: BoxFuture<'static, ()> = Box::pin(async move { inner.periodic_tick().await });
            Some(work)
        });
        CleanupTask::spawn(runtime, self.config.interval_for(self.level()), tick)
    }

    fn unsubscribe(&self) {
        if let Some(source) = &self.source {
            if let Some(id) = self.listener_id.lock().take() {
                source.remove_listener(id);
            }
            source.stop_monitoring();
        }
        if let Some(profiler) = &self.profiler {
            profiler.stop_monitoring();
        }
    }

    fn clear_registries(&self) {
        self.components.write().clear();
        self.tracked.lock().clear();
    }
}

impl Drop for CoordinatorInner {
    fn drop(&mut self) {
        // the bridge holds only a weak handle; detach it so the source stops calling it
        if let (Some(source), Some(id)) = (&self.source, self.listener_id.get_mut().take()) {
            source.remove_listener(id);
        }
    }
}

/// Adaptive memory pressure coordinator
///
/// Cheap to clone; all clones share state. Construct one per process with
/// [`MemoryCoordinator::builder`] and pass clones to whoever registers
/// components or tracks objects.
#[derive(Clone)]
pub struct MemoryCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl Default for MemoryCoordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

impl MemoryCoordinator {
    /// Coordinator without a pressure source or built-in components
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::builder().with_config(config).build()
    }

    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }

    pub(super) fn from_inner(inner: CoordinatorInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Subscribe to the pressure source, register built-ins, and start the timer
    ///
    /// Must be called from within a tokio runtime. A second call is a logged no-op.
    pub fn initialize(&self) -> CoordinatorResult<()> {
        let inner = &self.inner;
        if inner.is_shut_down() {
            return Err(CoordinatorError::ShutDown);
        }

        let runtime = Handle::try_current()
            .map_err(|e| CoordinatorError::RuntimeUnavailable(e.to_string()))?;

        if inner.initialized.swap(true, Ordering::AcqRel) {
            warn!("coordinator already initialized, ignoring");
            return Ok(());
        }

        *inner.runtime.lock() = Some(runtime.clone());

        for component in &inner.builtins {
            inner.register(Arc::clone(component));
        }

        if let Some(source) = &inner.source {
            let bridge = Arc::new(PressureBridge {
                inner: Arc::downgrade(inner),
            });
            *inner.listener_id.lock() = Some(source.add_listener(bridge));
            inner
                .level
                .store(source.current_level().rank(), Ordering::Release);
            source.start_monitoring();
        }

        if let Some(profiler) = &inner.profiler {
            profiler.start_monitoring(inner.config.profiler_interval);
        }

        let task = inner.spawn_task(&runtime);
        let interval = task.interval();
        *inner.task.lock() = Some(task);

        info!(
            components = inner.components.read().len(),
            tracking_enabled = inner.config.tracking_enabled,
            has_source = inner.source.is_some(),
            interval_ms = interval.as_millis() as u64,
            "memory coordinator initialized"
        );
        Ok(())
    }

    /// Add a component. Returns false for duplicate names or after shutdown
    pub fn register_component(&self, component: Arc<dyn MemoryAware>) -> bool {
        self.inner.register(component)
    }

    pub fn unregister_component(&self, name: &str) -> bool {
        let mut components = self.inner.components.write();
        let before = components.len();
        components.retain(|entry| entry.component.name() != name);
        let removed = components.len() != before;
        if removed {
            debug!(component = name, "component unregistered");
        }
        removed
    }

    /// Start tracking `object` without extending its lifetime
    ///
    /// `None` when tracking is disabled or the instance is already tracked.
    pub fn track<T>(&self, object: &Arc<T>, category: &str) -> Option<TrackingId>
    where
        T: Any + Send + Sync,
    {
        if !self.inner.config.tracking_enabled {
            return None;
        }
        self.inner.tracked.lock().track(object, category)
    }

    pub fn untrack<T: ?Sized>(&self, object: &Arc<T>) -> bool {
        if !self.inner.config.tracking_enabled {
            return false;
        }
        self.inner.tracked.lock().untrack(object)
    }

    /// Remove entries whose objects have been dropped
    pub fn sweep(&self) -> usize {
        self.inner.purge_dead()
    }

    pub fn pressure_level(&self) -> PressureLevel {
        self.inner.level()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::Acquire)
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.is_shut_down()
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn component_count(&self) -> usize {
        self.inner.components.read().len()
    }

    /// Registered component names in descending priority order
    pub fn component_names(&self) -> Vec<String> {
        self.inner
            .components
            .read()
            .iter()
            .map(|entry| entry.component.name().to_string())
            .collect()
    }

    pub fn stats(&self) -> CoordinatorStats {
        let inner = &self.inner;
        let components = inner
            .components
            .read()
            .iter()
            .map(|entry| ComponentStats {
                name: entry.component.name().to_string(),
                priority: entry.priority,
                can_cleanup: entry.component.can_cleanup(),
                estimated_usage_bytes: entry.component.estimated_usage_bytes(),
            })
            .collect();

        CoordinatorStats {
            initialized: self.is_initialized(),
            shut_down: inner.is_shut_down(),
            tracking_enabled: inner.config.tracking_enabled,
            pressure_level: inner.level(),
            tracking: inner.tracked.lock().stats(),
            components,
            cleanup_interval: inner.task.lock().as_ref().map(CleanupTask::interval),
        }
    }

    /// Sweep dead references, then run a round at `level` or the last known level
    pub async fn force_cleanup(&self, level: Option<PressureLevel>) -> CleanupReport {
        let level = level.unwrap_or_else(|| self.inner.level());
        if self.inner.is_shut_down() {
            debug!(%level, "forced cleanup after shutdown ignored");
            return CleanupReport::empty(level);
        }
        self.inner.purge_dead();
        self.inner.cleanup_round(level).await
    }

    /// Stop everything and run a final Critical round against every component
    ///
    /// Components are asked regardless of priority or `can_cleanup`, lowest
    /// priority first. Returns `None` when there was nothing to shut down.
    pub async fn shutdown(&self) -> Option<CleanupReport> {
        let inner = &self.inner;
        if !inner.initialized.load(Ordering::Acquire) {
            debug!("coordinator not initialized, shutdown is a no-op");
            return None;
        }
        if inner.shut_down.swap(true, Ordering::AcqRel) {
            debug!("coordinator already shut down");
            return None;
        }

        info!("memory coordinator shutting down");

        let task = inner.task.lock().take();
        if let Some(task) = task {
            task.shutdown().await;
        }
        inner.unsubscribe();

        let mut everyone = inner.snapshot();
        everyone.reverse();
        inner.emergency_sweep();
        let report = run_round(everyone, PressureLevel::Critical, inner.dispatch_options()).await;

        inner.clear_registries();
        inner.initialized.store(false, Ordering::Release);

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            bytes_freed = report.bytes_freed,
            "memory coordinator shut down"
        );
        Some(report)
    }

    /// Return to the constructed state so the instance can be initialized again
    pub fn reset(&self) {
        let inner = &self.inner;
        drop(inner.task.lock().take());
        inner.unsubscribe();
        inner.clear_registries();
        *inner.runtime.lock() = None;
        inner.level.store(PressureLevel::Low.rank(), Ordering::Release);
        inner.initialized.store(false, Ordering::Release);
        inner.shut_down.store(false, Ordering::Release);
        debug!("memory coordinator reset");
    }
}

impl PressureListener for MemoryCoordinator {
    /// Record the level, sweep, and schedule a round without waiting for it
    fn on_pressure_changed(&self, level: PressureLevel, info: &PressureInfo) {
        self.inner.handle_pressure(level, info);
    }
}
