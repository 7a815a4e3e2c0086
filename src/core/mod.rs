/*!
 * Core Module
 * Fundamental types, limits, identifiers, and error handling
 */

pub mod errors;
pub mod id;
pub mod limits;
pub mod serde;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use id::{ListenerId, ListenerIdGenerator, TrackingId};
pub use types::*;
