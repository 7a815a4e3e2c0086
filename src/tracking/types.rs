/*!
 * Tracking Types
 */

use crate::core::serde::is_zero_usize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of tracked-object bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingStats {
    /// Entries currently in the registry, including ones awaiting a sweep
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub tracked: usize,
    /// Entries whose object is still alive
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub alive: usize,
    /// Intended entries per category
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, usize>,
}

impl TrackingStats {
    /// Entries that are dead but not yet swept
    pub fn pending_sweep(&self) -> usize {
        self.tracked.saturating_sub(self.alive)
    }

    /// Categories ordered by descending count
    pub fn largest_categories(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut categories: Vec<(&str, usize)> = self
            .categories
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        categories.truncate(limit);
        categories
    }
}
