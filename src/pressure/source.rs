/*!
 * Pressure Sources
 * Listener contract between platform samplers and the coordinator
 */

use super::level::{PressureInfo, PressureLevel};
use crate::core::id::{ListenerId, ListenerIdGenerator};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Receiver of pressure-level changes
///
/// Implementations are invoked from the source's monitoring path and must
/// return quickly; long work belongs on a spawned task.
pub trait PressureListener: Send + Sync {
    fn on_pressure_changed(&self, level: PressureLevel, info: &PressureInfo);
}

/// Platform memory-pressure source interface
pub trait PressureSource: Send + Sync {
    /// Subscribe a listener; the returned id is used to unsubscribe
    fn add_listener(&self, listener: Arc<dyn PressureListener>) -> ListenerId;

    /// Unsubscribe a listener. Returns false if it was not subscribed
    fn remove_listener(&self, id: ListenerId) -> bool;

    /// Begin sampling and emitting notifications
    fn start_monitoring(&self);

    /// Stop sampling; no notifications are emitted afterwards
    fn stop_monitoring(&self);

    /// Last level observed by the source
    fn current_level(&self) -> PressureLevel {
        PressureLevel::Low
    }
}

/// Listener registry shared by source implementations
#[derive(Default)]
pub struct ListenerSet {
    ids: ListenerIdGenerator,
    listeners: RwLock<Vec<(ListenerId, Arc<dyn PressureListener>)>>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<dyn PressureListener>) -> ListenerId {
        let id = self.ids.next();
        self.listeners.write().push((id, listener));
        debug!(listener = %id, "pressure listener added");
        id
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        let removed = listeners.len() != before;
        if removed {
            debug!(listener = %id, "pressure listener removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a notification to every listener, returning how many were notified
    ///
    /// The listener list is copied first so callbacks may add or remove
    /// listeners without deadlocking.
    pub fn notify(&self, level: PressureLevel, info: &PressureInfo) -> usize {
        let snapshot: Vec<Arc<dyn PressureListener>> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &snapshot {
            listener.on_pressure_changed(level, info);
        }
        snapshot.len()
    }
}

/// In-process source driven by explicit `emit` calls
///
/// Hosts that already receive pressure signals (an OS callback, a supervisor
/// message) forward them through this source.
#[derive(Default)]
pub struct ManualPressureSource {
    listeners: ListenerSet,
    monitoring: AtomicBool,
    level: AtomicU8,
}

impl ManualPressureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a level change. Dropped while monitoring is stopped
    pub fn emit(&self, level: PressureLevel, info: PressureInfo) -> usize {
        if !self.monitoring.load(Ordering::Acquire) {
            debug!(%level, "pressure emit ignored: monitoring stopped");
            return 0;
        }
        self.level.store(level.rank(), Ordering::Release);
        self.listeners.notify(level, &info)
    }

    /// Emit a level derived from a usage ratio
    pub fn emit_ratio(&self, usage_ratio: f64) -> usize {
        self.emit(
            PressureLevel::classify(usage_ratio),
            PressureInfo::from_ratio(usage_ratio),
        )
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring.load(Ordering::Acquire)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl PressureSource for ManualPressureSource {
    fn add_listener(&self, listener: Arc<dyn PressureListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn start_monitoring(&self) {
        if !self.monitoring.swap(true, Ordering::AcqRel) {
            info!("manual pressure source monitoring started");
        }
    }

    fn stop_monitoring(&self) {
        if self.monitoring.swap(false, Ordering::AcqRel) {
            info!("manual pressure source monitoring stopped");
        }
    }

    fn current_level(&self) -> PressureLevel {
        PressureLevel::from_rank(self.level.load(Ordering::Acquire))
    }
}
