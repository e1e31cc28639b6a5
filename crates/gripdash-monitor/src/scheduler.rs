//! Repeating poll timers.
//!
//! One tokio task per poll kind. Ticks are suppressed before any network
//! call when the view is hidden, and the auto-refresh timer additionally
//! skips while the Modbus link is known down so a dead link is not flooded
//! with doomed bulk reads.
//!
//! Stopping a timer aborts the task but does not cancel a call already in
//! flight; the pending flags in the cache are the "still relevant?" guard.
//! A real cancellation token would be a strict improvement, but it changes
//! observable timing, so the flag model is kept deliberately.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::StatusCache;

/// The repeating checks the dashboard runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollKind {
    /// Device link status, default every 3 s.
    Connection,
    /// Modbus health probe, default every 10 s.
    ModbusHealth,
    /// Indicator digital-output read, default every 5 s.
    DigitalOutput,
    /// Full-status refresh, off by default (interval 0).
    AutoRefresh,
}

/// Owns the repeating timers; all of them die with the scheduler.
pub struct PollScheduler {
    cache: Arc<StatusCache>,
    tasks: Mutex<HashMap<PollKind, JoinHandle<()>>>,
}

impl PollScheduler {
    pub fn new(cache: Arc<StatusCache>) -> Self {
        Self {
            cache,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Start the repeating timer for `kind`, replacing any running one.
    ///
    /// An interval of zero cancels the existing timer and starts nothing,
    /// so toggling auto-refresh off can never leave a stale timer running.
    /// The first tick fires one full interval after start.
    pub fn start<F, Fut>(&self, kind: PollKind, interval: Duration, tick: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send,
    {
        self.stop(kind);

        if interval.is_zero() {
            info!(?kind, "timer disabled");
            return;
        }

        let cache = Arc::clone(&self.cache);
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval's first tick completes immediately; swallow it so
            // the cadence matches "every `interval` after start".
            timer.tick().await;

            loop {
                timer.tick().await;

                if !cache.visible() {
                    continue;
                }
                if kind == PollKind::AutoRefresh && !cache.modbus_connected() {
                    debug!("auto refresh tick skipped, modbus link down");
                    continue;
                }

                tick().await;
            }
        });

        info!(?kind, ?interval, "timer started");
        // A concurrent start for the same kind can land between stop() and
        // here; the displaced timer must be aborted, not just dropped.
        if let Some(old) = self.tasks.lock().insert(kind, handle) {
            old.abort();
        }
    }

    /// Stop the timer for `kind`, if running. Idempotent.
    pub fn stop(&self, kind: PollKind) {
        if let Some(handle) = self.tasks.lock().remove(&kind) {
            handle.abort();
            info!(?kind, "timer stopped");
        }
    }

    pub fn is_running(&self, kind: PollKind) -> bool {
        self.tasks.lock().contains_key(&kind)
    }

    /// Cancel every timer. Called on teardown; also runs on drop.
    pub fn shutdown(&self) {
        for (_, handle) in self.tasks.lock().drain() {
            handle.abort();
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
