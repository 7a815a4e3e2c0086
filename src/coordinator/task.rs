/*!
 * Cleanup Task - Adaptive Periodic Cleanup
 *
 * Background task that runs a cleanup tick on an interval chosen by the
 * current pressure level. The interval is swapped through a command channel;
 * the underlying timer restarts only when the requested interval differs
 * from the active one.
 */

use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Work performed on each tick; `None` stops the task
pub type TickFn = Box<dyn FnMut() -> Option<BoxFuture<'static, ()>> + Send>;

/// Control messages for the cleanup task
#[derive(Debug, Clone)]
pub enum CleanupCommand {
    /// Replace the tick interval
    UpdateInterval(Duration),
    /// Stop the task
    Shutdown,
}

/// Handle to the cleanup background task
pub struct CleanupTask {
    command_tx: mpsc::UnboundedSender<CleanupCommand>,
    handle: Option<tokio::task::JoinHandle<()>>,
    current: Mutex<Duration>,
}

fn ticker(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

impl CleanupTask {
    /// Spawn on `runtime`; the first tick fires one `period` from now
    pub fn spawn(runtime: &tokio::runtime::Handle, period: Duration, tick: TickFn) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let handle = runtime.spawn(run_cleanup_loop(period, tick, command_rx));

        info!(interval_ms = period.as_millis() as u64, "cleanup task spawned");

        Self {
            command_tx,
            handle: Some(handle),
            current: Mutex::new(period),
        }
    }

    pub fn interval(&self) -> Duration {
        *self.current.lock()
    }

    /// Request a new interval. Returns false when it matches the active one
    pub fn update_interval(&self, period: Duration) -> bool {
        let mut current = self.current.lock();
        if *current == period {
            return false;
        }
        *current = period;
        let _ = self.command_tx.send(CleanupCommand::UpdateInterval(period));
        true
    }

    /// Stop the task and wait for an in-flight tick to finish
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(CleanupCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "cleanup task shutdown error");
            } else {
                debug!("cleanup task shutdown complete");
            }
        }
    }
}

async fn run_cleanup_loop(
    period: Duration,
    mut tick: TickFn,
    mut command_rx: mpsc::UnboundedReceiver<CleanupCommand>,
) {
    let mut interval = ticker(period);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match tick() {
                    Some(work) => work.await,
                    None => {
                        debug!("cleanup target dropped, stopping task");
                        break;
                    }
                }
            }

            cmd = command_rx.recv() => {
                match cmd {
                    Some(CleanupCommand::UpdateInterval(period)) => {
                        info!(interval_ms = period.as_millis() as u64, "cleanup interval updated");
                        interval = ticker(period);
                    }
                    Some(CleanupCommand::Shutdown) | None => {
                        debug!("cleanup task shutting down");
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for CleanupTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.command_tx.send(CleanupCommand::Shutdown);
            handle.abort();
        }
    }
}
