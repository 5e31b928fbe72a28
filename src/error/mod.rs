// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!                GateError
//!                    |
//!     +---------+----+-----+---------+
//!     v         v          v         v
//!  NotFound  Unsupported  Upstream  Closed
//!  (miss)    (read-only)  (Shared   (torn
//!                          Failure)  down)
//!
//!  AccessorError: the repository-accessor boundary
//!    NoSuchPath  -> mapped to GateError::NotFound
//!    Upstream    -> propagated unchanged
//!
//!  SharedFailure wraps Arc<anyhow::Error> so one task
//!  rejection can settle every coalesced waiter identically.
//! ```

use std::sync::Arc;

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`GateError`].
pub type GateResult<T> = std::result::Result<T, GateError>;

/// Top-level error type for gate operations.
#[derive(Debug, Error)]
pub enum GateError {
    /// Requested historical path does not exist at the given revision.
    ///
    /// This is a recoverable miss, not a failure: callers treat it the way
    /// a filesystem treats a missing file.
    #[error("no content for '{path}' at revision {revision}")]
    NotFound {
        /// Revision the lookup targeted.
        revision: String,
        /// Path that has no content at that revision.
        path: String,
    },

    /// Write-shaped operation invoked on the read-only virtual view.
    ///
    /// Always surfaced, never retried.
    #[error("unsupported operation on read-only view: {0}")]
    Unsupported(&'static str),

    /// Accessor or tool failure that does not match a recognizable miss.
    ///
    /// Propagated unchanged, never reinterpreted.
    #[error("upstream failure: {0}")]
    Upstream(#[from] SharedFailure),

    /// The scheduling component was torn down while a caller waited.
    #[error("scheduler is shut down")]
    Closed,
}

impl GateError {
    /// Create a [`GateError::NotFound`] for a revision/path pair.
    pub fn not_found(revision: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotFound {
            revision: revision.into(),
            path: path.into(),
        }
    }

    /// Whether this error is a normal miss rather than a failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A task rejection that can be delivered to every coalesced waiter.
///
/// `anyhow::Error` is not `Clone`; the scheduler, throttler and
/// single-flight map all need to hand the *same* reason to an arbitrary
/// number of callers, so the error is shared behind an `Arc`.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct SharedFailure(Arc<anyhow::Error>);

impl SharedFailure {
    /// Wrap an error for fan-out to multiple waiters.
    #[must_use]
    pub fn new(err: anyhow::Error) -> Self {
        Self(Arc::new(err))
    }

    /// Borrow the underlying error.
    #[must_use]
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }
}

impl From<anyhow::Error> for SharedFailure {
    fn from(err: anyhow::Error) -> Self {
        Self::new(err)
    }
}

/// Errors produced by a repository accessor implementation.
#[derive(Debug, Error)]
pub enum AccessorError {
    /// The path does not exist at the requested revision.
    ///
    /// The resolver maps this to [`GateError::NotFound`]; every other
    /// accessor failure passes through as [`GateError::Upstream`].
    #[error("no such path '{path}' at revision {revision}")]
    NoSuchPath {
        /// Revision the lookup targeted.
        revision: String,
        /// Path missing at that revision.
        path: String,
    },

    /// Any other accessor or tool-process failure.
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl AccessorError {
    /// Create a [`AccessorError::NoSuchPath`] for a revision/path pair.
    pub fn no_such_path(revision: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NoSuchPath {
            revision: revision.into(),
            path: path.into(),
        }
    }
}
