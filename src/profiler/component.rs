/*!
 * Profiler Component
 * Lets the profiler record pressure transitions and give back its own history
 */

use super::profiler::UsageProfiler;
use super::types::MemoryDataPoint;
use crate::component::{priority, MemoryAware, PressureResponse};
use crate::core::errors::ComponentResult;
use crate::core::limits::LEAK_WINDOW;
use crate::core::types::{Bytes, Priority};
use crate::pressure::PressureLevel;
use futures::future::BoxFuture;
use tracing::debug;

pub const PROFILER_COMPONENT_NAME: &str = "usage-profiler";

pub struct ProfilerComponent {
    profiler: UsageProfiler,
}

impl ProfilerComponent {
    pub fn new(profiler: UsageProfiler) -> Self {
        Self { profiler }
    }

    pub fn profiler(&self) -> &UsageProfiler {
        &self.profiler
    }
}

impl MemoryAware for ProfilerComponent {
    fn name(&self) -> &str {
        PROFILER_COMPONENT_NAME
    }

    fn priority(&self) -> Priority {
        priority::BACKGROUND
    }

    fn estimated_usage_bytes(&self) -> Option<Bytes> {
        Some(self.profiler.footprint_bytes())
    }

    fn respond_to_pressure(
        &self,
        level: PressureLevel,
    ) -> BoxFuture<'_, ComponentResult<PressureResponse>> {
        Box::pin(async move {
            let tag = format!("pressure:{}", level.to_string().to_lowercase());
            self.profiler.take_snapshot(Some(&tag));

            if level < PressureLevel::Critical {
                return Ok(PressureResponse::none());
            }

            // keep enough samples for leak detection to stay meaningful
            let dropped = self.profiler.compact(LEAK_WINDOW);
            debug!(dropped, "profiler history compacted");
            Ok(PressureResponse {
                bytes_freed: (dropped * std::mem::size_of::<MemoryDataPoint>()) as Bytes,
                entries_removed: dropped,
            })
        })
    }
}
