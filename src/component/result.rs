/*!
 * Cleanup Results
 * Per-component cleanup records and per-round aggregates
 */

use super::traits::PressureResponse;
use crate::core::errors::CleanupError;
use crate::core::serde::{is_zero_u64, is_zero_usize, serde_as, DurationMicroSeconds};
use crate::core::types::Bytes;
use crate::pressure::PressureLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of one component's cleanup attempt
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupResult {
    pub component_name: String,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub bytes_freed: Bytes,
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub entries_removed: usize,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<CleanupError>,
    #[serde_as(as = "DurationMicroSeconds<u64>")]
    pub duration: Duration,
}

impl CleanupResult {
    pub fn succeeded(
        name: impl Into<String>,
        response: PressureResponse,
        duration: Duration,
    ) -> Self {
        Self {
            component_name: name.into(),
            bytes_freed: response.bytes_freed,
            entries_removed: response.entries_removed,
            success: true,
            error: None,
            duration,
        }
    }

    pub fn failed(name: impl Into<String>, error: CleanupError, duration: Duration) -> Self {
        Self {
            component_name: name.into(),
            bytes_freed: 0,
            entries_removed: 0,
            success: false,
            error: Some(error),
            duration,
        }
    }

    /// Collapse back into the component-facing outcome
    pub fn into_response(self) -> Result<PressureResponse, CleanupError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(PressureResponse {
                bytes_freed: self.bytes_freed,
                entries_removed: self.entries_removed,
            }),
        }
    }
}

/// Aggregate of one cleanup round
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupReport {
    pub level: PressureLevel,
    pub results: Vec<CleanupResult>,
    pub succeeded: usize,
    pub failed: usize,
    /// Advisory sum of what components reported
    pub bytes_freed: Bytes,
    #[serde_as(as = "DurationMicroSeconds<u64>")]
    pub duration: Duration,
}

impl CleanupReport {
    pub fn new(level: PressureLevel, results: Vec<CleanupResult>, duration: Duration) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        let bytes_freed = results.iter().map(|r| r.bytes_freed).sum();
        Self {
            level,
            failed: results.len() - succeeded,
            succeeded,
            bytes_freed,
            results,
            duration,
        }
    }

    /// Report for a round that processed nothing
    pub fn empty(level: PressureLevel) -> Self {
        Self::new(level, Vec::new(), Duration::ZERO)
    }

    pub fn processed(&self) -> usize {
        self.results.len()
    }

    /// Component names in the order they were processed
    pub fn component_names(&self) -> Vec<&str> {
        self.results
            .iter()
            .map(|r| r.component_name.as_str())
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CleanupResult> {
        self.results.iter().filter(|r| !r.success)
    }
}
