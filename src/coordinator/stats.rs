/*!
 * Coordinator Statistics
 * Serializable point-in-time view of the coordinator
 */

use crate::core::serde::{serde_as, skip_serializing_none, DurationMilliSeconds};
use crate::core::types::{Bytes, Priority};
use crate::pressure::PressureLevel;
use crate::tracking::TrackingStats;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Advisory view of one registered component
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStats {
    pub name: String,
    pub priority: Priority,
    pub can_cleanup: bool,
    pub estimated_usage_bytes: Option<Bytes>,
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorStats {
    pub initialized: bool,
    pub shut_down: bool,
    pub tracking_enabled: bool,
    pub pressure_level: PressureLevel,
    pub tracking: TrackingStats,
    /// In descending priority order
    pub components: Vec<ComponentStats>,
    /// Active periodic cleanup interval, absent when no timer runs
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    pub cleanup_interval: Option<Duration>,
}

impl CoordinatorStats {
    /// Sum of the usage components chose to report
    pub fn estimated_component_bytes(&self) -> Bytes {
        self.components
            .iter()
            .filter_map(|c| c.estimated_usage_bytes)
            .sum()
    }

    pub fn component_names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }
}
