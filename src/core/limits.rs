/*!
 * Limits and Constants
 *
 * Centralized location for thresholds, intervals, and policy fractions.
 * Organized by subsystem for discoverability.
 */

use std::time::Duration;

// =============================================================================
// PRESSURE THRESHOLDS
// =============================================================================

/// Usage ratio below which pressure is Low
pub const MEDIUM_PRESSURE_RATIO: f64 = 0.70;

/// Usage ratio below which pressure is Medium
pub const HIGH_PRESSURE_RATIO: f64 = 0.85;

/// Usage ratio at or above which pressure is Critical
pub const CRITICAL_PRESSURE_RATIO: f64 = 0.95;

// =============================================================================
// CLEANUP ROUND POLICY
// =============================================================================

/// Percentage of eligible components processed per level (Low, Medium, High, Critical)
pub const MEDIUM_CLEANUP_PERCENT: usize = 30;
pub const HIGH_CLEANUP_PERCENT: usize = 70;
pub const CRITICAL_CLEANUP_PERCENT: usize = 100;

/// Highest priority a component may declare
pub const MAX_PRIORITY: u8 = 100;

/// Component responses slower than this are logged as warnings
pub const DEFAULT_SLOW_COMPONENT_THRESHOLD: Duration = Duration::from_secs(1);

/// Rounds slower than this log a warning from their span
pub const SLOW_ROUND_THRESHOLD: Duration = Duration::from_millis(100);

// =============================================================================
// ADAPTIVE CLEANUP INTERVALS
// =============================================================================

pub const LOW_CLEANUP_INTERVAL: Duration = Duration::from_secs(10 * 60);
pub const MEDIUM_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const HIGH_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);
pub const CRITICAL_CLEANUP_INTERVAL: Duration = Duration::from_secs(30);

// =============================================================================
// CACHE EVICTION
// =============================================================================

/// Eviction percentages per level (Low, Medium, High, Critical)
pub const MEDIUM_EVICTION_PERCENT: u8 = 25;
pub const HIGH_EVICTION_PERCENT: u8 = 50;
pub const CRITICAL_EVICTION_PERCENT: u8 = 100;

/// At or above this percentage eviction is a full clear
pub const FULL_CLEAR_PERCENT: u8 = 50;

/// Default entry capacity used for cache recommendations
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

/// Default byte capacity used for cache recommendations (64MB)
pub const DEFAULT_CACHE_MAX_BYTES: u64 = 64 * 1024 * 1024;

/// Average entry size above which large-entry advice is given (256KB)
pub const LARGE_ENTRY_BYTES: u64 = 256 * 1024;

// =============================================================================
// PROFILER
// =============================================================================

/// Default rolling history size
pub const DEFAULT_HISTORY_SIZE: usize = 100;

/// Default snapshot interval while monitoring
pub const DEFAULT_PROFILER_INTERVAL: Duration = Duration::from_secs(60);

/// Samples considered by trend classification
pub const TREND_WINDOW: usize = 5;

/// Relative change that counts as a trend (10%)
pub const TREND_THRESHOLD: f64 = 0.10;

/// Samples considered by the leak heuristic
pub const LEAK_WINDOW: usize = 10;

/// Fraction of increasing pairs that flags a potential leak
pub const LEAK_INCREASE_RATIO: f64 = 0.70;

// =============================================================================
// PRESSURE SOURCES
// =============================================================================

/// Default polling cadence for sampled pressure sources
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Minimum time a level must persist before being lowered
pub const DEFAULT_MONOTONIC_WINDOW: Duration = Duration::from_secs(3);
