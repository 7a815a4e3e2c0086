/*!
 * Pressure Levels
 * Ordinal classification of memory scarcity
 */

use crate::core::limits::{
    CRITICAL_CLEANUP_PERCENT, CRITICAL_EVICTION_PERCENT, CRITICAL_PRESSURE_RATIO,
    HIGH_CLEANUP_PERCENT, HIGH_EVICTION_PERCENT, HIGH_PRESSURE_RATIO, MEDIUM_CLEANUP_PERCENT,
    MEDIUM_EVICTION_PERCENT, MEDIUM_PRESSURE_RATIO,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Memory pressure levels
///
/// Variants are declared in ascending severity, so the derived `Ord` is the
/// ordinal comparison used for "worse than before" decisions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PressureLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl PressureLevel {
    pub const ALL: [PressureLevel; 4] = [
        PressureLevel::Low,
        PressureLevel::Medium,
        PressureLevel::High,
        PressureLevel::Critical,
    ];

    /// Classify a usage ratio; out-of-range values clamp to the nearest level
    pub fn classify(usage_ratio: f64) -> Self {
        let ratio = if usage_ratio.is_nan() {
            0.0
        } else {
            usage_ratio.clamp(0.0, 1.0)
        };

        if ratio >= CRITICAL_PRESSURE_RATIO {
            PressureLevel::Critical
        } else if ratio >= HIGH_PRESSURE_RATIO {
            PressureLevel::High
        } else if ratio >= MEDIUM_PRESSURE_RATIO {
            PressureLevel::Medium
        } else {
            PressureLevel::Low
        }
    }

    /// Upper usage-ratio bound of this level (exclusive except for Critical)
    pub fn threshold(self) -> f64 {
        match self {
            PressureLevel::Low => MEDIUM_PRESSURE_RATIO,
            PressureLevel::Medium => HIGH_PRESSURE_RATIO,
            PressureLevel::High => CRITICAL_PRESSURE_RATIO,
            PressureLevel::Critical => 1.0,
        }
    }

    /// Whether this level should trigger an immediate cleanup round
    #[inline]
    pub fn requires_action(self) -> bool {
        matches!(self, PressureLevel::High | PressureLevel::Critical)
    }

    pub fn description(self) -> &'static str {
        match self {
            PressureLevel::Low => "Memory usage is normal",
            PressureLevel::Medium => "Memory usage is elevated; background cleanup recommended",
            PressureLevel::High => {
                "Memory usage is high; low-priority components should release memory"
            }
            PressureLevel::Critical => {
                "Memory is nearly exhausted; all components must release memory"
            }
        }
    }

    /// Percentage of cleanup-eligible components processed in a round
    pub fn cleanup_percent(self) -> usize {
        match self {
            PressureLevel::Low => 0,
            PressureLevel::Medium => MEDIUM_CLEANUP_PERCENT,
            PressureLevel::High => HIGH_CLEANUP_PERCENT,
            PressureLevel::Critical => CRITICAL_CLEANUP_PERCENT,
        }
    }

    /// Percentage of cache entries targeted by eviction
    pub fn eviction_percent(self) -> u8 {
        match self {
            PressureLevel::Low => 0,
            PressureLevel::Medium => MEDIUM_EVICTION_PERCENT,
            PressureLevel::High => HIGH_EVICTION_PERCENT,
            PressureLevel::Critical => CRITICAL_EVICTION_PERCENT,
        }
    }

    /// Ordinal rank (0 = Low)
    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u8) -> Self {
        match rank {
            0 => PressureLevel::Low,
            1 => PressureLevel::Medium,
            2 => PressureLevel::High,
            _ => PressureLevel::Critical,
        }
    }
}

impl fmt::Display for PressureLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PressureLevel::Low => write!(f, "LOW"),
            PressureLevel::Medium => write!(f, "MEDIUM"),
            PressureLevel::High => write!(f, "HIGH"),
            PressureLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Usage details delivered with a pressure notification
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PressureInfo {
    pub usage_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u64>,
}

impl PressureInfo {
    pub fn from_ratio(usage_ratio: f64) -> Self {
        Self {
            usage_ratio,
            used_bytes: None,
            total_bytes: None,
        }
    }

    /// Build from byte counts; a zero total yields a zero ratio
    pub fn from_bytes(used: u64, total: u64) -> Self {
        let usage_ratio = if total == 0 {
            0.0
        } else {
            used as f64 / total as f64
        };
        Self {
            usage_ratio,
            used_bytes: Some(used),
            total_bytes: Some(total),
        }
    }
}
