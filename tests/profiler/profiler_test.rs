/*!
 * Usage Profiler Tests
 * Trend, leak heuristic, and history behaviour over scripted readings
 */

use memory_coordinator::profiler::{ProfilerState, Trend};
use memory_coordinator::{
    MemoryAware, PressureLevel, ProbeError, ProfilerComponent, StaticProbe, UsageProfiler,
    UsageReading,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn heap(bytes: u64) -> Result<UsageReading, ProbeError> {
    Ok(UsageReading {
        rss_bytes: bytes + 1_000,
        heap_used_bytes: bytes,
        heap_capacity_bytes: bytes * 2,
        ..Default::default()
    })
}

fn profiler_over(series: &[u64]) -> UsageProfiler {
    let probe = StaticProbe::scripted(series.iter().map(|b| heap(*b)).collect());
    let profiler = UsageProfiler::new(Arc::new(probe));
    for _ in series {
        profiler.take_snapshot(None);
    }
    profiler
}

#[test]
fn test_trend_on_five_points() {
    assert_eq!(profiler_over(&[100, 120, 140, 160, 180]).trend(), Trend::Increasing);
    assert_eq!(profiler_over(&[180, 160, 140, 120, 100]).trend(), Trend::Decreasing);
    assert_eq!(profiler_over(&[100, 100, 100, 100, 100]).trend(), Trend::Stable);
}

#[test]
fn test_short_history_is_stable() {
    assert_eq!(profiler_over(&[100, 500, 900]).trend(), Trend::Stable);
}

#[test]
fn test_leak_heuristic() {
    // 8 of 9 pairs increasing
    assert!(profiler_over(&[10, 11, 12, 13, 14, 15, 16, 17, 16, 18]).detect_leak());
    // 5 of 9 pairs increasing
    assert!(!profiler_over(&[10, 11, 10, 11, 10, 11, 10, 11, 11, 12]).detect_leak());
}

#[test]
fn test_summary() {
    let profiler = profiler_over(&[100, 300, 200]);
    let summary = profiler.summary();

    assert_eq!(summary.samples, 3);
    assert_eq!(summary.latest_heap_bytes, 200);
    assert_eq!(summary.peak_heap_bytes, 300);
    assert_eq!(summary.peak_rss_bytes, 1_300);
    assert!(!summary.potential_leak);
}

#[test]
fn test_history_drops_oldest() {
    let probe = StaticProbe::scripted((1..=12).map(heap).collect());
    let profiler = UsageProfiler::with_history_size(Arc::new(probe), 10);
    for _ in 0..12 {
        profiler.take_snapshot(None);
    }

    let history = profiler.history();
    assert_eq!(history.len(), 10);
    assert_eq!(history[0].heap_used_bytes, 3);
    assert!(history.windows(2).all(|w| w[0].id < w[1].id));
}

#[test]
fn test_clear() {
    let profiler = profiler_over(&[1, 2, 3]);
    assert_eq!(profiler.clear(), 3);
    assert!(profiler.is_empty());
}

#[tokio::test]
async fn test_component_records_pressure() {
    let profiler = profiler_over(&[10; 12]);
    let component = ProfilerComponent::new(profiler.clone());

    let response = component
        .respond_to_pressure(PressureLevel::Critical)
        .await
        .unwrap();

    assert_eq!(response.entries_removed, 3);
    let history = profiler.history();
    assert_eq!(history.len(), 10);
    assert_eq!(history.last().unwrap().tag.as_deref(), Some("pressure:critical"));
}

#[tokio::test(start_paused = true)]
async fn test_monitoring_snapshots_on_interval() {
    let profiler = UsageProfiler::new(Arc::new(StaticProbe::new(heap(64).unwrap())));
    assert!(profiler.start_monitoring(Duration::from_secs(60)));
    assert_eq!(profiler.len(), 1);

    tokio::time::sleep(Duration::from_secs(185)).await;
    assert_eq!(profiler.len(), 4);

    let summary = profiler.stop_monitoring().unwrap();
    assert_eq!(summary.samples, 5);
    assert_eq!(profiler.state(), ProfilerState::Idle);
}
