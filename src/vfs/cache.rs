// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bounded bookkeeping of served virtual resources.
//!
//! ```text
//! record(resource)  --> upsert { resource, last_access = now }
//!
//! every sweep_interval:
//!   keep entry if pinned (content currently displayed)
//!             or age < ttl
//!   else drop silently
//! ```
//!
//! Eviction emits no delete event: a consumer can still hold a resource
//! identifier that is no longer tracked here, and a re-request after
//! eviction may briefly serve content that predates an underlying change.
//! Known gap, kept deliberately.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::ResourceId;

/// Answers "is this resource currently open/displayed?" during a sweep.
pub type PinQuery = Arc<dyn Fn(&ResourceId) -> bool + Send + Sync>;

struct CacheEntry {
    resource: ResourceId,
    last_access: Instant,
}

/// TTL + pin evicted map of served resource identifiers.
///
/// Also owns the gate-wide last-modified stamp, advanced by the change
/// pipeline and served by synthesized `stat` metadata.
pub struct ContentCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    last_modified: Mutex<SystemTime>,
}

impl ContentCache {
    /// Creates a cache whose unpinned entries survive `ttl` without access.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            last_modified: Mutex::new(SystemTime::now()),
        }
    }

    /// Upserts `resource`, refreshing its last-access timestamp.
    pub fn record(&self, resource: &ResourceId) {
        let key = resource.canonical();
        trace!(resource = %key, "recording served resource");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                key,
                CacheEntry {
                    resource: resource.clone(),
                    last_access: Instant::now(),
                },
            );
    }

    /// Drops every entry that is neither pinned nor younger than the TTL.
    ///
    /// Returns the number of evicted entries. Eviction is silent — no
    /// delete event is emitted for dropped entries.
    pub fn sweep(&self, is_pinned: &dyn Fn(&ResourceId) -> bool) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| {
            is_pinned(&entry.resource) || now.duration_since(entry.last_access) < self.ttl
        });
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, live = entries.len(), "swept content cache");
        }
        evicted
    }

    /// Snapshot of every live resource.
    #[must_use]
    pub fn live_resources(&self) -> Vec<ResourceId> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|entry| entry.resource.clone())
            .collect()
    }

    /// Whether `resource` is currently tracked.
    #[must_use]
    pub fn contains(&self, resource: &ResourceId) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&resource.canonical())
    }

    /// Number of tracked entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The gate-wide last-modified stamp.
    #[must_use]
    pub fn last_modified(&self) -> SystemTime {
        *self
            .last_modified
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Advances the last-modified stamp to now.
    pub(crate) fn touch_last_modified(&self) {
        *self
            .last_modified
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = SystemTime::now();
    }

    /// Spawns the periodic eviction sweep.
    ///
    /// Runs until `cancel` is triggered. `is_pinned` exempts resources
    /// whose content is currently open or displayed.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        every: Duration,
        is_pinned: PinQuery,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval fires immediately; skip the startup tick.
            ticker.tick().await;
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        cache.sweep(is_pinned.as_ref());
                    }
                }
            }
            debug!("cache sweeper stopped");
        })
    }
}
