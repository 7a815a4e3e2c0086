/*!
 * Pressure Module
 * Level classification, pressure sources, and platform usage probes
 */

pub mod level;
pub mod polling;
pub mod probe;
pub mod source;

pub use level::{PressureInfo, PressureLevel};
pub use polling::{PollingConfig, PollingPressureSource};
pub use probe::{ProcfsProbe, StaticProbe, UsageProbe, UsageReading};
pub use source::{ListenerSet, ManualPressureSource, PressureListener, PressureSource};
