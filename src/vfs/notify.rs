// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Batched, focus-aware change notifications.
//!
//! ```text
//! root_changed(root)
//!      |  insert into dirty set
//!      v
//! Throttler (trailing edge) --> notify pass:
//!      wait for focus
//!      scan live cache entries
//!      batch resources under any dirty root
//!      emit one event, advance last-modified stamp
//!      clear dirty set
//! ```
//!
//! The pass runs on its own task (the throttler's driver), so waiting for
//! focus never blocks scheduler activity.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, trace};

use crate::error::GateResult;
use crate::sched::Throttler;

use super::{ContentCache, ResourceId};

/// Tracks whether the consuming UI is focused.
///
/// Change passes suspend while unfocused and resume on the focus-regained
/// signal; dirty roots keep accumulating meanwhile.
pub struct FocusGate {
    focused: watch::Sender<bool>,
}

impl FocusGate {
    /// Creates a gate with the given initial focus state.
    #[must_use]
    pub fn new(initially_focused: bool) -> Self {
        Self {
            focused: watch::Sender::new(initially_focused),
        }
    }

    /// Records a focus change signal.
    pub fn set_focused(&self, focused: bool) {
        self.focused.send_replace(focused);
    }

    /// Current focus state.
    #[must_use]
    pub fn is_focused(&self) -> bool {
        *self.focused.borrow()
    }

    /// Suspends until focused. Returns immediately if already focused.
    pub async fn wait_focused(&self) {
        let mut focused = self.focused.subscribe();
        // The sender lives in self, so the channel cannot close under us.
        let _ = focused.wait_for(|focused| *focused).await;
    }
}

type Subscribers = Arc<Mutex<Vec<flume::Sender<Vec<ResourceId>>>>>;

/// Turns "a repository root changed" signals into batched content-change
/// events for every affected cached resource.
pub struct ChangePipeline {
    dirty_roots: Arc<Mutex<HashSet<PathBuf>>>,
    notifier: Throttler<(), ()>,
    subscribers: Subscribers,
    focus: Arc<FocusGate>,
}

impl ChangePipeline {
    /// Creates a pipeline scanning `cache` and gating on `focus`.
    #[must_use]
    pub fn new(cache: Arc<ContentCache>, focus: Arc<FocusGate>) -> Self {
        let dirty_roots: Arc<Mutex<HashSet<PathBuf>>> = Arc::new(Mutex::new(HashSet::new()));
        let subscribers: Subscribers = Arc::new(Mutex::new(Vec::new()));

        let notifier = {
            let cache = Arc::clone(&cache);
            let focus = Arc::clone(&focus);
            let dirty_roots = Arc::clone(&dirty_roots);
            let subscribers = Arc::clone(&subscribers);
            Throttler::new(move |()| {
                notify_pass(
                    Arc::clone(&cache),
                    Arc::clone(&focus),
                    Arc::clone(&dirty_roots),
                    Arc::clone(&subscribers),
                )
            })
        };

        Self {
            dirty_roots,
            notifier,
            subscribers,
            focus,
        }
    }

    /// Registers a subscriber. Each delivered message is one batch of
    /// affected resources from a single notification pass.
    #[must_use]
    pub fn subscribe(&self) -> flume::Receiver<Vec<ResourceId>> {
        let (tx, rx) = flume::unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// The focus gate this pipeline suspends on.
    #[must_use]
    pub fn focus(&self) -> &FocusGate {
        &self.focus
    }

    /// Marks `root` dirty and triggers a throttled notification pass.
    ///
    /// Bookkeeping is synchronous; the returned future completes when the
    /// pass covering this signal has run, and may be dropped by
    /// fire-and-forget callers.
    ///
    /// # Errors
    ///
    /// The returned future yields [`crate::error::GateError::Closed`] if
    /// the runtime tore the notifier down before the pass settled.
    pub fn root_changed(&self, root: &Path) -> impl Future<Output = GateResult<()>> + Send + use<> {
        trace!(root = %root.display(), "root marked dirty");
        self.dirty_roots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(root.to_path_buf());
        self.notifier.call(())
    }
}

/// One notification pass: the body of the throttled notifier.
async fn notify_pass(
    cache: Arc<ContentCache>,
    focus: Arc<FocusGate>,
    dirty_roots: Arc<Mutex<HashSet<PathBuf>>>,
    subscribers: Subscribers,
) {
    focus.wait_focused().await;

    let roots: Vec<PathBuf> = dirty_roots
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .cloned()
        .collect();

    let affected: Vec<ResourceId> = cache
        .live_resources()
        .into_iter()
        .filter(|resource| roots.iter().any(|root| resource.path().starts_with(root)))
        .collect();

    if affected.is_empty() {
        trace!(roots = roots.len(), "no cached resources under dirty roots");
    } else {
        cache.touch_last_modified();
        debug!(resources = affected.len(), "emitting content change batch");
        subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|subscriber| subscriber.send(affected.clone()).is_ok());
    }

    dirty_roots
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}
