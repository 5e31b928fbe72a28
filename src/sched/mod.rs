// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Request scheduling for the external version-control tool.
//!
//! ```text
//! acquire(task, key?)
//!        |
//!        |  key registered?  --yes-->  append waiter, no new run
//!        v
//!   FIFO queue --> worker: one task in flight, ever
//!                      |
//!                      v
//!              settle trigger + waiters
//!              (registration removed first)
//! ```
//!
//! The tool corrupts its working copy when two invocations overlap, so all
//! accepted tasks — keyed or not — execute strictly one at a time in
//! arrival order. A coalescing key marks "the same logical operation":
//! callers sharing a key while a run for it is registered receive that
//! single run's outcome instead of scheduling their own.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{GateError, GateResult, Result, SharedFailure};

pub mod single_flight;
pub mod throttle;


pub use single_flight::SingleFlight;
pub use throttle::Throttler;

/// Outcome of a settled task, cloneable for fan-out to every waiter.
pub(crate) type Outcome<T> = std::result::Result<T, SharedFailure>;

/// One accepted execution waiting its turn on the global chain.
struct QueuedRun<T> {
    task: BoxFuture<'static, Result<T>>,
    key: Option<String>,
    trigger: oneshot::Sender<Outcome<T>>,
}

/// Per-key coalescing state.
///
/// At most one registration exists per key at any instant: created when the
/// first caller for the key arrives, removed only when that run settles.
struct KeyRegistration<T> {
    waiters: Vec<oneshot::Sender<Outcome<T>>>,
}

/// Serializing scheduler with per-key request coalescing.
///
/// All tasks execute on a single global chain in arrival order. Keyed calls
/// that arrive while a run for the same key is queued or executing are
/// coalesced onto it. Different keys still serialize against each other —
/// the tool must never see overlapping invocations regardless of key.
///
/// Queued and in-flight tasks are not cancellable; [`shutdown`] stops the
/// worker between runs and settles pending callers with
/// [`GateError::Closed`].
///
/// [`shutdown`]: RequestScheduler::shutdown
pub struct RequestScheduler<T: Clone + Send + 'static> {
    queue: mpsc::UnboundedSender<QueuedRun<T>>,
    registrations: Arc<Mutex<HashMap<String, KeyRegistration<T>>>>,
    cancel: CancellationToken,
}

impl<T: Clone + Send + 'static> RequestScheduler<T> {
    /// Creates a scheduler and spawns its worker.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        let (queue, runs) = mpsc::unbounded_channel();
        let registrations = Arc::new(Mutex::new(HashMap::new()));
        let cancel = CancellationToken::new();
        tokio::spawn(worker(runs, Arc::clone(&registrations), cancel.clone()));
        Self {
            queue,
            registrations,
            cancel,
        }
    }

    /// Schedules `task` on the global chain and waits for its outcome.
    ///
    /// Without a key, every call gets its own execution. With a key, the
    /// first caller triggers an execution and later callers arriving while
    /// that key is registered share its outcome; a fresh cycle only begins
    /// once the prior one has settled and cleared its registration.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Upstream`] with the task's rejection (shared by
    /// every coalesced caller), or [`GateError::Closed`] if the scheduler
    /// was shut down before the task settled.
    pub async fn acquire<F>(&self, task: F, key: Option<&str>) -> GateResult<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let (trigger, settled) = oneshot::channel();

        match key {
            Some(key) => {
                let trigger = {
                    let mut regs = self
                        .registrations
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    if let Some(reg) = regs.get_mut(key) {
                        reg.waiters.push(trigger);
                        None
                    } else {
                        regs.insert(
                            key.to_string(),
                            KeyRegistration {
                                waiters: Vec::new(),
                            },
                        );
                        Some(trigger)
                    }
                };
                match trigger {
                    Some(trigger) => {
                        let run = QueuedRun {
                            task: task.boxed(),
                            key: Some(key.to_string()),
                            trigger,
                        };
                        if self.queue.send(run).is_err() {
                            self.registrations
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .remove(key);
                            return Err(GateError::Closed);
                        }
                    }
                    None => debug!(key, "coalesced onto registered run"),
                }
            }
            None => {
                let run = QueuedRun {
                    task: task.boxed(),
                    key: None,
                    trigger,
                };
                if self.queue.send(run).is_err() {
                    return Err(GateError::Closed);
                }
            }
        }

        match settled.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(failure)) => Err(GateError::Upstream(failure)),
            Err(_) => Err(GateError::Closed),
        }
    }

    /// Stops the worker after the in-flight run (if any) settles.
    ///
    /// Pending callers are settled with [`GateError::Closed`].
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl<T: Clone + Send + 'static> Default for RequestScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains the global chain one run at a time.
async fn worker<T: Clone + Send + 'static>(
    mut runs: mpsc::UnboundedReceiver<QueuedRun<T>>,
    registrations: Arc<Mutex<HashMap<String, KeyRegistration<T>>>>,
    cancel: CancellationToken,
) {
    loop {
        let run = tokio::select! {
            () = cancel.cancelled() => break,
            run = runs.recv() => match run {
                Some(run) => run,
                None => break,
            },
        };

        let outcome = run.task.await.map_err(SharedFailure::from);

        match run.key {
            None => {
                let _ = run.trigger.send(outcome);
            }
            Some(key) => {
                // The registration must be gone before any caller observes
                // the outcome: a waiter continuation that re-acquires the
                // same key then starts a fresh cycle instead of attaching
                // to a settled one.
                let waiters = registrations
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&key)
                    .map(|reg| reg.waiters)
                    .unwrap_or_default();
                trace!(key = %key, waiters = waiters.len(), "settling coalesced run");
                let _ = run.trigger.send(outcome.clone());
                for waiter in waiters {
                    let _ = waiter.send(outcome.clone());
                }
            }
        }
    }

    // Dropping queued runs and registered waiters closes their channels,
    // settling pending callers with GateError::Closed.
    runs.close();
    while runs.try_recv().is_ok() {}
    registrations
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
    debug!("request scheduler worker stopped");
}
