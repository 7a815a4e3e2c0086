/*!
 * Component Module
 * Cleanup participant contract, priorities, and cleanup results
 */

pub mod priority;
pub mod result;
pub mod traits;

pub use result::{CleanupReport, CleanupResult};
pub use traits::{MemoryAware, PressureResponse};
