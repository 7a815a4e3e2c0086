/*!
 * Memory-Aware Component Contract
 * Capability interface for cleanup participants
 */

use crate::core::errors::ComponentResult;
use crate::core::types::{Bytes, Priority};
use crate::pressure::PressureLevel;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// What a component reports after responding to pressure
///
/// Both figures are advisory; zero means "not reported".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PressureResponse {
    pub bytes_freed: Bytes,
    pub entries_removed: usize,
}

impl PressureResponse {
    pub fn freed(bytes_freed: Bytes) -> Self {
        Self {
            bytes_freed,
            entries_removed: 0,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

/// Cleanup participant interface
///
/// Components are dispatched as `Arc<dyn MemoryAware>`. The coordinator never
/// decides what a component frees, only whether, in what order, and how
/// aggressively it is asked to.
pub trait MemoryAware: Send + Sync {
    /// Stable identity used for deduplication, logging, and attribution
    fn name(&self) -> &str;

    /// 0-100; higher-priority components are the last to be asked
    fn priority(&self) -> Priority;

    /// Components returning false are skipped by regular cleanup rounds
    fn can_cleanup(&self) -> bool {
        true
    }

    /// Advisory memory footprint, `None` when unknown
    fn estimated_usage_bytes(&self) -> Option<Bytes> {
        None
    }

    /// Release memory appropriate to `level`
    fn respond_to_pressure(
        &self,
        level: PressureLevel,
    ) -> BoxFuture<'_, ComponentResult<PressureResponse>>;
}
