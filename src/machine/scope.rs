//! Per-phase resource scope: disposers and timers.
//!
//! Every phase gets a fresh scope when it becomes active. Disposers and
//! timers registered through the handler context belong to that scope and
//! are torn down in one `drain` call before the next phase's handler runs:
//! timers are cancelled first (none may fire mid-drain), then disposers run
//! in strict reverse-registration order, each isolated so a failing cleanup
//! never blocks the rest.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Cancellation handle for a scoped timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TimerId(Uuid);

/// Runtime statistics for one phase activation.
///
/// Tracks when the phase became active and how many disposers and timers
/// its handler registered.
#[derive(Clone, Debug, Serialize)]
pub struct PhaseStats {
    /// When the phase became active.
    pub started_at: DateTime<Utc>,
    /// Number of disposers registered during the activation.
    pub disposers: usize,
    /// Number of timers scheduled during the activation.
    pub timers: usize,
}

enum Disposer {
    Callback(Box<dyn FnOnce() + Send>),
    CancelTimer(TimerId),
}

/// Resource scope for the currently active phase.
pub(crate) struct PhaseScope {
    disposers: Vec<Disposer>,
    timers: HashMap<TimerId, JoinHandle<()>>,
    // Shared with spawned timer tasks; drain flips it before aborting so a
    // timer racing the abort still refuses to fire.
    cancelled: Arc<AtomicBool>,
    started_at: DateTime<Utc>,
    disposer_count: usize,
    timer_count: usize,
}

impl PhaseScope {
    pub(crate) fn new() -> Self {
        Self {
            disposers: Vec::new(),
            timers: HashMap::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
            started_at: Utc::now(),
            disposer_count: 0,
            timer_count: 0,
        }
    }

    /// Start a new activation: stamp the start time and reset counters.
    /// Must be called after `drain`.
    pub(crate) fn begin(&mut self) {
        self.started_at = Utc::now();
        self.disposer_count = 0;
        self.timer_count = 0;
    }

    /// Append a cleanup callback. No dedup; the same callback may be
    /// registered more than once and will run once per registration.
    pub(crate) fn add_disposer(&mut self, disposer: Box<dyn FnOnce() + Send>) {
        self.disposer_count += 1;
        self.disposers.push(Disposer::Callback(disposer));
    }

    /// Schedule `handler` to run after `after`, scoped to this phase.
    ///
    /// A disposer cancelling the timer is registered automatically, so no
    /// timer outlives the phase that created it.
    pub(crate) fn set_timeout(
        &mut self,
        after: Duration,
        handler: Box<dyn FnOnce() + Send>,
    ) -> TimerId {
        let id = TimerId(Uuid::new_v4());
        let cancelled = Arc::clone(&self.cancelled);

        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if !cancelled.load(Ordering::SeqCst) {
                handler();
            }
        });

        self.timers.insert(id, task);
        self.disposers.push(Disposer::CancelTimer(id));
        self.timer_count += 1;
        id
    }

    /// Tear down the scope: cancel every pending timer, then run disposers
    /// in reverse-registration order. Disposer panics are logged, never
    /// propagated.
    pub(crate) fn drain(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        for task in self.timers.values() {
            task.abort();
        }

        let pending = self.disposers.len();
        if pending > 0 {
            debug!(disposers = pending, "draining phase scope");
        }

        while let Some(disposer) = self.disposers.pop() {
            match disposer {
                Disposer::CancelTimer(id) => {
                    self.timers.remove(&id);
                }
                Disposer::Callback(callback) => {
                    if catch_unwind(AssertUnwindSafe(callback)).is_err() {
                        warn!("disposer panicked; continuing drain");
                    }
                }
            }
        }

        self.timers.clear();
        // Fresh cancellation generation for the next phase's timers.
        self.cancelled = Arc::new(AtomicBool::new(false));
    }

    /// Statistics for the current activation.
    pub(crate) fn stats(&self) -> PhaseStats {
        PhaseStats {
            started_at: self.started_at,
            disposers: self.disposer_count,
            timers: self.timer_count,
        }
    }
}

impl Drop for PhaseScope {
    fn drop(&mut self) {
        // A dropped machine must not leave timers running.
        self.cancelled.store(true, Ordering::SeqCst);
        for task in self.timers.values() {
            task.abort();
        }
    }
}
