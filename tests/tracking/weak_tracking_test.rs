/*!
 * Weak Tracking Tests
 * Tracked objects through the coordinator: dedup, sweeps, and lifetimes
 */

use memory_coordinator::tracking::TrackedObjectRegistry;
use memory_coordinator::{
    CoordinatorConfig, MemoryCoordinator, PressureInfo, PressureLevel, PressureListener,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct Session {
    _buffer: Vec<u8>,
}

fn session() -> Arc<Session> {
    Arc::new(Session {
        _buffer: vec![0; 128],
    })
}

#[test]
fn test_tracking_same_instance_twice() {
    let coordinator = MemoryCoordinator::default();
    let object = session();

    assert!(coordinator.track(&object, "sessions").is_some());
    assert!(coordinator.track(&object, "sessions").is_none());

    let stats = coordinator.stats().tracking;
    assert_eq!(stats.tracked, 1);
    assert_eq!(stats.categories.get("sessions"), Some(&1));
}

#[test]
fn test_tracking_does_not_extend_lifetime() {
    let coordinator = MemoryCoordinator::default();
    let object = session();
    coordinator.track(&object, "sessions");

    assert_eq!(Arc::strong_count(&object), 1);
    let weak = Arc::downgrade(&object);
    drop(object);
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_sweep_removes_dropped_object() {
    let mut registry = TrackedObjectRegistry::new();
    let kept = session();
    let dropped = session();
    registry.track(&kept, "sessions");
    let id = registry.track(&dropped, "sessions").unwrap();
    assert_eq!(registry.category_count("sessions"), 2);

    drop(dropped);
    assert_eq!(registry.purge_dead(), 1);

    assert!(!registry.contains_id(id));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.reverse_len(), 1);
    assert_eq!(registry.category_count("sessions"), 1);
}

#[test]
fn test_pressure_notification_sweeps() {
    let coordinator = MemoryCoordinator::default();
    let object = session();
    coordinator.track(&object, "sessions");
    drop(object);

    assert_eq!(coordinator.stats().tracking.pending_sweep(), 1);
    coordinator.on_pressure_changed(PressureLevel::Low, &PressureInfo::from_ratio(0.1));

    let stats = coordinator.stats().tracking;
    assert_eq!(stats.tracked, 0);
    assert!(stats.categories.get("sessions").is_none());
}

#[test]
fn test_untrack() {
    let coordinator = MemoryCoordinator::default();
    let object = session();
    coordinator.track(&object, "sessions");

    assert!(coordinator.untrack(&object));
    assert!(!coordinator.untrack(&object));
    assert_eq!(coordinator.stats().tracking.tracked, 0);
}

#[tokio::test]
async fn test_critical_round_sweeps_and_keeps_survivors() {
    let coordinator = MemoryCoordinator::new(CoordinatorConfig::testing());
    let survivors: Vec<_> = (0..3).map(|_| session()).collect();
    for object in &survivors {
        coordinator.track(object, "sessions");
    }
    let buffer = Arc::new(vec![0u8; 64]);
    coordinator.track(&buffer, "buffers");
    drop(buffer);

    coordinator.force_cleanup(Some(PressureLevel::Critical)).await;

    let stats = coordinator.stats().tracking;
    assert_eq!(stats.tracked, 3);
    assert_eq!(stats.alive, 3);
    assert_eq!(stats.largest_categories(5), vec![("sessions", 3)]);
}

#[test]
fn test_sweep_returns_count() {
    let coordinator = MemoryCoordinator::default();
    for _ in 0..4 {
        let object = session();
        coordinator.track(&object, "ephemeral");
    }
    assert_eq!(coordinator.sweep(), 4);
    assert_eq!(coordinator.sweep(), 0);
}
