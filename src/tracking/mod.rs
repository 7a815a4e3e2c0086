/*!
 * Tracking Module
 * Weak, category-accounted tracking of ephemeral objects
 */

pub mod registry;
pub mod types;

pub use registry::{AnyObject, TrackedObjectRegistry};
pub use types::TrackingStats;
