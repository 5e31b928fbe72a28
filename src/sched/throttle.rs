// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Trailing-edge coalescing wrapper around an async function.
//!
//! ```text
//! Idle --call--> Running --settles, nothing queued--> Idle
//! Running --call--> Queued (args stored)
//! Queued  --call--> Queued (args replaced, last writer wins)
//! Queued  --settles--> Running (exactly one run, latest args)
//! ```
//!
//! At most one execution is ever in flight. A burst of calls collapses to
//! the in-flight run plus at most one trailing run that captures the most
//! recent arguments at the moment the in-flight run finished.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::oneshot;
use tracing::trace;

use crate::error::{GateError, GateResult};

type ThrottledFn<A, T> = dyn Fn(A) -> BoxFuture<'static, T> + Send + Sync;

/// Call arguments and waiters queued for the next run.
struct QueuedCall<A, T> {
    latest_args: A,
    waiters: Vec<oneshot::Sender<T>>,
}

enum ThrottleState<A, T> {
    Idle,
    /// A run is in flight; `queued` holds at most one trailing call.
    Engaged { queued: Option<QueuedCall<A, T>> },
}

/// Trailing-edge throttle over one async function.
///
/// Cloning shares the wrapped function and its state.
pub struct Throttler<A, T> {
    func: Arc<ThrottledFn<A, T>>,
    state: Arc<Mutex<ThrottleState<A, T>>>,
}

impl<A, T> Clone for Throttler<A, T> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A, T> Throttler<A, T>
where
    A: Send + 'static,
    T: Clone + Send + 'static,
{
    /// Wraps `func` for trailing-edge coalescing.
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self {
            func: Arc::new(move |args| func(args).boxed()),
            state: Arc::new(Mutex::new(ThrottleState::Idle)),
        }
    }

    /// Invokes the wrapped function through the throttle.
    ///
    /// Registration is eager: by the time this returns, the call is either
    /// driving a fresh run or queued behind the in-flight one, so the
    /// returned future may be dropped by fire-and-forget callers without
    /// losing the trigger.
    ///
    /// A call landing in the Idle state settles with its own run's output.
    /// A call landing while a run is in flight replaces any previously
    /// queued arguments and settles with the *next* run's output, shared
    /// with every other caller in the same window.
    ///
    /// # Errors
    ///
    /// The returned future yields [`GateError::Closed`] if the runtime tore
    /// the driver task down before the run settled.
    pub fn call(&self, args: A) -> impl Future<Output = GateResult<T>> + Send + use<A, T> {
        let (tx, rx) = oneshot::channel();

        let started = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match &mut *state {
                ThrottleState::Idle => {
                    *state = ThrottleState::Engaged { queued: None };
                    Some((args, vec![tx]))
                }
                ThrottleState::Engaged { queued } => {
                    match queued.as_mut() {
                        Some(call) => {
                            // Last writer wins.
                            call.latest_args = args;
                            call.waiters.push(tx);
                        }
                        None => {
                            *queued = Some(QueuedCall {
                                latest_args: args,
                                waiters: vec![tx],
                            });
                        }
                    }
                    None
                }
            }
        };

        if let Some((args, waiters)) = started {
            self.spawn_driver(args, waiters);
        } else {
            trace!("throttled call queued behind in-flight run");
        }

        async move { rx.await.map_err(|_| GateError::Closed) }
    }

    /// Runs the wrapped function, then chains trailing runs until the
    /// queued slot is empty.
    fn spawn_driver(&self, args: A, waiters: Vec<oneshot::Sender<T>>) {
        let func = Arc::clone(&self.func);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut args = args;
            let mut waiters = waiters;
            loop {
                let output = (func)(args).await;
                for waiter in waiters.drain(..) {
                    let _ = waiter.send(output.clone());
                }

                let next = {
                    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                    match &mut *state {
                        ThrottleState::Engaged { queued } => {
                            let next = queued.take();
                            if next.is_none() {
                                *state = ThrottleState::Idle;
                            }
                            next
                        }
                        ThrottleState::Idle => None,
                    }
                };
                match next {
                    Some(call) => {
                        args = call.latest_args;
                        waiters = call.waiters;
                    }
                    None => break,
                }
            }
        });
    }
}
