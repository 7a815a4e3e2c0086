/*!
 * Shared test components
 */

#![allow(dead_code)]

use futures::future::BoxFuture;
use memory_coordinator::{
    CleanupError, ComponentResult, MemoryAware, PressureLevel, PressureResponse,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Order in which components were asked to clean up, with the level they saw
pub type CallLog = Arc<Mutex<Vec<(String, PressureLevel)>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn called_names(log: &CallLog) -> Vec<String> {
    log.lock().iter().map(|(name, _)| name.clone()).collect()
}

/// Component that records each call and frees a fixed amount
pub struct Recording {
    name: String,
    priority: u8,
    can_cleanup: bool,
    fail: bool,
    panic: bool,
    delay: Duration,
    bytes: u64,
    log: CallLog,
}

impl Recording {
    pub fn new(name: &str, priority: u8, log: &CallLog) -> Self {
        Self {
            name: name.to_string(),
            priority,
            can_cleanup: true,
            fail: false,
            panic: false,
            delay: Duration::ZERO,
            bytes: 100,
            log: Arc::clone(log),
        }
    }

    pub fn pinned(mut self) -> Self {
        self.can_cleanup = false;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic = true;
        self
    }

    /// Hold each response for `delay` before finishing
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn shared(self) -> Arc<dyn MemoryAware> {
        Arc::new(self)
    }
}

impl MemoryAware for Recording {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn can_cleanup(&self) -> bool {
        self.can_cleanup
    }

    fn estimated_usage_bytes(&self) -> Option<u64> {
        Some(self.bytes)
    }

    fn respond_to_pressure(
        &self,
        level: PressureLevel,
    ) -> BoxFuture<'_, ComponentResult<PressureResponse>> {
        Box::pin(async move {
            self.log.lock().push((self.name.clone(), level));
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.panic {
                panic!("{} lost its backing store", self.name);
            }
            if self.fail {
                return Err(CleanupError::failed(&self.name, "simulated failure"));
            }
            Ok(PressureResponse::freed(self.bytes))
        })
    }
}

/// Yield until spawned rounds have had a chance to run
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
}
