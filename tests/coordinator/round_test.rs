/*!
 * Cleanup Round Tests
 * Selection counts, processing order, and failure isolation
 */

use crate::common::{call_log, called_names, Recording};
use memory_coordinator::coordinator::{select_for_round, selection_count};
use memory_coordinator::{CleanupError, MemoryAware, MemoryCoordinator, PressureLevel};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn five_components(coordinator: &MemoryCoordinator, log: &crate::common::CallLog) {
    for (name, priority) in [("A", 90), ("B", 70), ("C", 50), ("D", 30), ("E", 10)] {
        coordinator.register_component(Recording::new(name, priority, log).shared());
    }
}

#[tokio::test]
async fn test_low_round_processes_nothing() {
    let log = call_log();
    let coordinator = MemoryCoordinator::default();
    five_components(&coordinator, &log);

    let report = coordinator.force_cleanup(Some(PressureLevel::Low)).await;
    assert_eq!(report.processed(), 0);
    assert!(log.lock().is_empty());
}

#[tokio::test]
async fn test_high_round_spares_highest_priority() {
    let log = call_log();
    let coordinator = MemoryCoordinator::default();
    five_components(&coordinator, &log);

    let report = coordinator.force_cleanup(Some(PressureLevel::High)).await;

    assert_eq!(report.component_names(), vec!["E", "D", "C", "B"]);
    assert_eq!(called_names(&log), vec!["E", "D", "C", "B"]);
    assert_eq!(report.succeeded, 4);
    assert_eq!(report.bytes_freed, 400);
}

#[tokio::test]
async fn test_medium_round_rounds_up() {
    let log = call_log();
    let coordinator = MemoryCoordinator::default();
    five_components(&coordinator, &log);

    let report = coordinator.force_cleanup(Some(PressureLevel::Medium)).await;
    assert_eq!(report.component_names(), vec!["E", "D"]);
}

#[tokio::test]
async fn test_failure_does_not_stop_round() {
    let log = call_log();
    let coordinator = MemoryCoordinator::default();
    coordinator.register_component(Recording::new("first", 10, &log).shared());
    coordinator.register_component(Recording::new("broken", 20, &log).failing().shared());
    coordinator.register_component(Recording::new("last", 30, &log).shared());

    let report = coordinator.force_cleanup(Some(PressureLevel::Critical)).await;

    assert_eq!(called_names(&log), vec!["first", "broken", "last"]);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].component_name, "broken");
    assert!(matches!(
        failures[0].error,
        Some(CleanupError::Failed { .. })
    ));
}

#[tokio::test]
async fn test_panicking_component_does_not_stop_round() {
    let log = call_log();
    let coordinator = MemoryCoordinator::default();
    coordinator.register_component(Recording::new("first", 10, &log).shared());
    coordinator.register_component(Recording::new("unstable", 20, &log).panicking().shared());
    coordinator.register_component(Recording::new("last", 30, &log).shared());

    let report = coordinator.force_cleanup(Some(PressureLevel::Critical)).await;

    assert_eq!(called_names(&log), vec!["first", "unstable", "last"]);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 1);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures[0].component_name, "unstable");
    match &failures[0].error {
        Some(CleanupError::Panicked { component, message }) => {
            assert_eq!(component, "unstable");
            assert_eq!(message, "unstable lost its backing store");
        }
        other => panic!("expected a panic failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ineligible_components_skipped() {
    let log = call_log();
    let coordinator = MemoryCoordinator::default();
    coordinator.register_component(Recording::new("pinned", 5, &log).pinned().shared());
    coordinator.register_component(Recording::new("loose", 50, &log).shared());

    let report = coordinator.force_cleanup(Some(PressureLevel::Critical)).await;
    assert_eq!(report.component_names(), vec!["loose"]);
}

#[tokio::test]
async fn test_force_cleanup_defaults_to_last_level() {
    let log = call_log();
    let coordinator = MemoryCoordinator::default();
    five_components(&coordinator, &log);

    // no pressure seen yet: Low
    let report = coordinator.force_cleanup(None).await;
    assert_eq!(report.level, PressureLevel::Low);
    assert_eq!(report.processed(), 0);
}

#[test]
fn test_selection_counts() {
    assert_eq!(selection_count(10, PressureLevel::Medium), 3);
    assert_eq!(selection_count(10, PressureLevel::High), 7);
    assert_eq!(selection_count(3, PressureLevel::High), 3);
}

proptest! {
    #[test]
    fn prop_round_size_matches_level(priorities in proptest::collection::vec(0u8..=100, 0..40)) {
        let log = call_log();
        let mut registry: Vec<Arc<dyn MemoryAware>> = priorities
            .iter()
            .enumerate()
            .map(|(i, p)| Recording::new(&format!("c{i}"), *p, &log).shared())
            .collect();
        registry.sort_by(|a, b| b.priority().cmp(&a.priority()));
        let n = registry.len();

        for (level, percent) in [
            (PressureLevel::Low, 0usize),
            (PressureLevel::Medium, 30),
            (PressureLevel::High, 70),
            (PressureLevel::Critical, 100),
        ] {
            let selected = select_for_round(&registry, level);
            prop_assert_eq!(selected.len(), (n * percent + 99) / 100);

            // lowest priority first, never skipping a lower one
            let selected_priorities: Vec<u8> = selected.iter().map(|c| c.priority()).collect();
            prop_assert!(selected_priorities.windows(2).all(|w| w[0] <= w[1]));
            if let Some(max_selected) = selected_priorities.last() {
                let min_spared = registry[..n - selected.len()]
                    .iter()
                    .map(|c| c.priority())
                    .min()
                    .unwrap_or(u8::MAX);
                prop_assert!(*max_selected <= min_spared);
            }
        }
    }
}
