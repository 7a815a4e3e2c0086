/*!
 * Profiler Module
 * Rolling memory usage history with trend and leak analysis
 */

pub mod analysis;
pub mod component;
#[allow(clippy::module_inception)]
pub mod profiler;
pub mod types;

pub use analysis::{classify_trend, detect_leak};
pub use component::{ProfilerComponent, PROFILER_COMPONENT_NAME};
pub use profiler::UsageProfiler;
pub use types::{MemoryDataPoint, ProfilerState, ProfilerSummary, Trend};
