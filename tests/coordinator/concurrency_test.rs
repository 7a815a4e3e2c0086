/*!
 * Concurrency Tests
 * Shutdown and registration racing in-flight cleanup rounds
 */

use crate::common::{call_log, called_names, CallLog, Recording};
use memory_coordinator::{
    CoordinatorConfig, ManualPressureSource, MemoryCoordinator, PressureInfo, PressureLevel,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const DEADLINE: Duration = Duration::from_secs(5);

/// Wait until `name` has been asked to clean up at least `calls` times
async fn wait_for_calls(log: &CallLog, name: &str, calls: usize) {
    timeout(DEADLINE, async {
        while called_names(log).iter().filter(|n| *n == name).count() < calls {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("component was never called");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_during_pressure_round() {
    let log = call_log();
    let source = Arc::new(ManualPressureSource::new());
    let coordinator = MemoryCoordinator::builder()
        .with_config(CoordinatorConfig::testing())
        .with_source(source.clone())
        .with_component(Recording::new("hot", 90, &log).shared())
        .with_component(
            Recording::new("sluggish", 10, &log)
                .slow(Duration::from_millis(200))
                .shared(),
        )
        .build();
    coordinator.initialize().unwrap();

    source.emit(PressureLevel::Critical, PressureInfo::from_ratio(0.97));
    wait_for_calls(&log, "sluggish", 1).await;

    // the pressure round is parked inside "sluggish"
    let report = timeout(DEADLINE, coordinator.shutdown())
        .await
        .expect("shutdown deadlocked against an in-flight round")
        .unwrap();

    assert_eq!(report.component_names(), vec!["sluggish", "hot"]);
    assert_eq!(report.failed, 0);
    assert_eq!(coordinator.component_count(), 0);
    assert!(coordinator.is_shut_down());
    assert_eq!(source.listener_count(), 0);

    // the pressure round still finishes against its own snapshot
    wait_for_calls(&log, "hot", 2).await;
    assert_eq!(coordinator.component_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_during_forced_round() {
    let log = call_log();
    let coordinator = MemoryCoordinator::new(CoordinatorConfig::testing());
    coordinator.initialize().unwrap();
    coordinator.register_component(
        Recording::new("sluggish", 10, &log)
            .slow(Duration::from_millis(200))
            .shared(),
    );

    let forced = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.force_cleanup(Some(PressureLevel::High)).await })
    };
    wait_for_calls(&log, "sluggish", 1).await;

    let shutdown = timeout(DEADLINE, coordinator.shutdown())
        .await
        .expect("shutdown deadlocked against an in-flight round");
    let forced = timeout(DEADLINE, forced)
        .await
        .expect("forced round never finished")
        .unwrap();

    assert_eq!(shutdown.unwrap().succeeded, 1);
    assert_eq!(forced.component_names(), vec!["sluggish"]);
    assert_eq!(forced.succeeded, 1);
    assert_eq!(coordinator.component_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_registration_during_round() {
    let log = call_log();
    let coordinator = MemoryCoordinator::default();
    coordinator.register_component(
        Recording::new("sluggish", 10, &log)
            .slow(Duration::from_millis(100))
            .shared(),
    );

    let round = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.force_cleanup(Some(PressureLevel::Critical)).await })
    };
    wait_for_calls(&log, "sluggish", 1).await;

    let registrar = {
        let coordinator = coordinator.clone();
        let log = log.clone();
        tokio::spawn(async move {
            (0..10)
                .map(|i| Recording::new(&format!("late-{i}"), 50, &log).shared())
                .filter(|component| coordinator.register_component(Arc::clone(component)))
                .count()
        })
    };

    let registered = timeout(DEADLINE, registrar).await.unwrap().unwrap();
    let report = timeout(DEADLINE, round).await.unwrap().unwrap();

    assert_eq!(registered, 10);
    // the in-flight round only sees the registry as it was when it started
    assert_eq!(report.component_names(), vec!["sluggish"]);
    assert_eq!(coordinator.component_count(), 11);

    let names = coordinator.component_names();
    assert_eq!(names.first().map(String::as_str), Some("late-0"));
    assert_eq!(names.last().map(String::as_str), Some("sluggish"));

    let report = coordinator.force_cleanup(Some(PressureLevel::Critical)).await;
    assert_eq!(report.processed(), 11);
}
