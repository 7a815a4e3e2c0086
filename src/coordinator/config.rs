/*!
 * Coordinator Configuration
 *
 * Defaults live in `core::limits`. Durations serialize as integers: cleanup
 * intervals and component thresholds in milliseconds, the profiler interval
 * in seconds.
 */

use crate::cache::EvictionConfig;
use crate::core::errors::{CoordinatorError, CoordinatorResult};
use crate::core::limits::{
    CRITICAL_CLEANUP_INTERVAL, DEFAULT_HISTORY_SIZE, DEFAULT_PROFILER_INTERVAL,
    DEFAULT_SLOW_COMPONENT_THRESHOLD, HIGH_CLEANUP_INTERVAL, LOW_CLEANUP_INTERVAL,
    MEDIUM_CLEANUP_INTERVAL,
};
use crate::core::serde::{serde_as, skip_serializing_none, DurationMilliSeconds, DurationSeconds};
use crate::pressure::PressureLevel;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Periodic cleanup cadence per pressure level
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupIntervals {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub low: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub medium: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub high: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub critical: Duration,
}

impl Default for CleanupIntervals {
    fn default() -> Self {
        Self {
            low: LOW_CLEANUP_INTERVAL,
            medium: MEDIUM_CLEANUP_INTERVAL,
            high: HIGH_CLEANUP_INTERVAL,
            critical: CRITICAL_CLEANUP_INTERVAL,
        }
    }
}

impl CleanupIntervals {
    #[inline]
    pub fn for_level(&self, level: PressureLevel) -> Duration {
        match level {
            PressureLevel::Low => self.low,
            PressureLevel::Medium => self.medium,
            PressureLevel::High => self.high,
            PressureLevel::Critical => self.critical,
        }
    }
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// When false, `track`/`untrack` are no-ops
    pub tracking_enabled: bool,
    pub intervals: CleanupIntervals,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub profiler_interval: Duration,
    pub history_size: usize,
    /// Capacity the built-in cache is measured against
    pub cache: EvictionConfig,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub slow_component_threshold: Duration,
    /// Abandon a component response after this long; unbounded when unset
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    pub component_timeout: Option<Duration>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            tracking_enabled: true,
            intervals: CleanupIntervals::default(),
            profiler_interval: DEFAULT_PROFILER_INTERVAL,
            history_size: DEFAULT_HISTORY_SIZE,
            cache: EvictionConfig::default(),
            slow_component_threshold: DEFAULT_SLOW_COMPONENT_THRESHOLD,
            component_timeout: None,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment override");
            None
        }
    }
}

fn env_flag(key: &str) -> Option<bool> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!(key, value = %raw, "ignoring unparsable environment flag");
            None
        }
    }
}

impl CoordinatorConfig {
    /// Defaults overridden by `MEMCOORD_*` environment variables
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(enabled) = env_flag("MEMCOORD_TRACKING") {
            config.tracking_enabled = enabled;
        }
        if let Some(size) = env_parse::<usize>("MEMCOORD_HISTORY_SIZE") {
            config.history_size = size;
        }
        if let Some(secs) = env_parse::<u64>("MEMCOORD_PROFILER_INTERVAL_SECS") {
            config.profiler_interval = Duration::from_secs(secs);
        }
        if let Some(entries) = env_parse::<usize>("MEMCOORD_CACHE_MAX_ENTRIES") {
            config.cache.max_entries = entries;
        }
        if let Some(bytes) = env_parse::<u64>("MEMCOORD_CACHE_MAX_BYTES") {
            config.cache.max_size_bytes = bytes;
        }

        config
    }

    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json(json: &str) -> CoordinatorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Short intervals for tests
    pub fn testing() -> Self {
        Self {
            intervals: CleanupIntervals {
                low: Duration::from_millis(400),
                medium: Duration::from_millis(200),
                high: Duration::from_millis(100),
                critical: Duration::from_millis(50),
            },
            profiler_interval: Duration::from_secs(1),
            history_size: 20,
            slow_component_threshold: Duration::from_millis(50),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CoordinatorResult<()> {
        if self.history_size == 0 {
            return Err(CoordinatorError::Config("history_size must be > 0".into()));
        }
        if self.profiler_interval.is_zero() {
            return Err(CoordinatorError::Config("profiler_interval must be > 0".into()));
        }
        let intervals = &self.intervals;
        if PressureLevel::ALL
            .iter()
            .any(|level| intervals.for_level(*level).is_zero())
        {
            return Err(CoordinatorError::Config("cleanup intervals must be > 0".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn interval_for(&self, level: PressureLevel) -> Duration {
        self.intervals.for_level(level)
    }
}
