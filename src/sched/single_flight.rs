// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-key single-flight execution, parallel across keys.
//!
//! ```text
//! run("a", f)  --+           run("b", g)
//!                |  in flight     |
//! run("a", h) --+--> shares f's   +--> runs concurrently
//!                    outcome           with "a"
//! ```
//!
//! This is a different policy from the request scheduler: there is no
//! global serialization here. It fits operations that are naturally
//! parallelizable per key but wasteful to duplicate for the same key.
//! The two components share no state or ordering.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::oneshot;
use tracing::trace;

use crate::error::{GateError, GateResult, Result, SharedFailure};

use super::Outcome;

type InFlight<T> = Shared<BoxFuture<'static, Outcome<T>>>;

/// Single-flight deduplicator keyed by an opaque string.
///
/// Cloning shares the in-flight map.
pub struct SingleFlight<T: Clone + Send + Sync + 'static> {
    inflight: Arc<Mutex<HashMap<String, InFlight<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> Clone for SingleFlight<T> {
    fn clone(&self) -> Self {
        Self {
            inflight: Arc::clone(&self.inflight),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> SingleFlight<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of keys currently in flight.
    ///
    /// # Panics
    ///
    /// Never panics; a poisoned lock is recovered.
    #[must_use]
    pub fn inflight_keys(&self) -> usize {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Runs `task` under `key`, or joins the in-flight run for that key.
    ///
    /// Distinct keys execute concurrently. A call whose key has a run in
    /// flight does not start a second execution; it receives the in-flight
    /// run's eventual outcome. Once a run settles the key is free and the
    /// next call starts fresh.
    ///
    /// The execution is spawned, so abandoning the returned future does not
    /// stall other callers joined on the same key.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Upstream`] with the task's rejection, shared by
    /// every joined caller.
    pub async fn run<F>(&self, key: &str, task: F) -> GateResult<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let shared = {
            let mut inflight = self
                .inflight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = inflight.get(key) {
                trace!(key, "joined in-flight run");
                existing.clone()
            } else {
                let (tx, rx) = oneshot::channel();
                let shared: InFlight<T> = rx
                    .map(|settled| {
                        settled.unwrap_or_else(|_| {
                            Err(SharedFailure::new(anyhow::anyhow!(
                                "single-flight run dropped before settling"
                            )))
                        })
                    })
                    .boxed()
                    .shared();
                inflight.insert(key.to_string(), shared.clone());

                let map = Arc::clone(&self.inflight);
                let key = key.to_string();
                tokio::spawn(async move {
                    let outcome = task.await.map_err(SharedFailure::from);
                    // Free the key before waiters observe the outcome so a
                    // continuation re-running the key starts fresh.
                    map.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .remove(&key);
                    let _ = tx.send(outcome);
                });
                shared
            }
        };

        match shared.await {
            Ok(value) => Ok(value),
            Err(failure) => Err(GateError::Upstream(failure)),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}
