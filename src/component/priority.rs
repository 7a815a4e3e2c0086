/*!
 * Component Priorities
 * Named priority levels; higher values survive cleanup longer
 */

use crate::core::limits::MAX_PRIORITY;
use crate::core::types::Priority;

pub const CRITICAL: Priority = 100;
pub const HIGH: Priority = 80;
pub const NORMAL: Priority = 50;
pub const LOW: Priority = 20;
pub const BACKGROUND: Priority = 10;

/// Clamp a declared priority into the valid range
#[inline]
pub fn clamp(priority: Priority) -> Priority {
    priority.min(MAX_PRIORITY)
}
