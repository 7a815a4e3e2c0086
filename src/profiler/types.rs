/*!
 * Profiler Types
 */

use crate::core::types::Bytes;
use crate::pressure::UsageReading;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampMilliSeconds};
use std::fmt;
use std::time::SystemTime;

/// One recorded memory sample
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDataPoint {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde_as(as = "TimestampMilliSeconds<i64>")]
    pub timestamp: SystemTime,
    pub rss_bytes: Bytes,
    pub heap_used_bytes: Bytes,
    pub heap_capacity_bytes: Bytes,
    pub external_bytes: Bytes,
}

impl MemoryDataPoint {
    pub fn from_reading(id: u64, tag: Option<String>, reading: &UsageReading) -> Self {
        Self {
            id,
            tag,
            timestamp: SystemTime::now(),
            rss_bytes: reading.rss_bytes,
            heap_used_bytes: reading.heap_used_bytes,
            heap_capacity_bytes: reading.heap_capacity_bytes,
            external_bytes: reading.external_bytes,
        }
    }
}

/// Directional classification of recent heap usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Trend::Increasing => write!(f, "increasing"),
            Trend::Decreasing => write!(f, "decreasing"),
            Trend::Stable => write!(f, "stable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilerState {
    Idle,
    Monitoring,
}

/// Digest of the profiler history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilerSummary {
    pub samples: usize,
    pub latest_heap_bytes: Bytes,
    pub peak_heap_bytes: Bytes,
    pub peak_rss_bytes: Bytes,
    pub trend: Trend,
    pub potential_leak: bool,
}
