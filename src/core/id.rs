/*!
 * ID Generation
 * Type-safe identifiers for tracked objects and pressure listeners
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Identifier handed out when an object is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(Uuid);

impl TrackingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle returned by a pressure source when a listener subscribes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Monotonic generator for listener handles
///
/// Cloning shares the underlying counter.
#[derive(Debug, Clone)]
pub struct ListenerIdGenerator {
    counter: Arc<AtomicU64>,
}

impl ListenerIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(1)),
        }
    }

    #[inline]
    pub fn next(&self) -> ListenerId {
        ListenerId(self.counter.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ListenerIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
