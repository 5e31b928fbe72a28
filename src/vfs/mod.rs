// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only virtual views of historical repository content.
//!
//! ```text
//! ResourceId ("src/lib.rs @ r42", plain or diff-baseline)
//!      |
//!      v
//! ContentResolver::read
//!      |  records in                 root change signals
//!      v                                    |
//! ContentCache  <---- scan ----  ChangePipeline (throttled,
//!  TTL + pin sweep                focus-aware, batched events)
//! ```
//!
//! Everything here is a historical view: write-shaped operations fail with
//! [`crate::error::GateError::Unsupported`], and `stat` metadata is
//! synthesized rather than read from a real filesystem.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::repo::Revision;

pub mod cache;
pub mod notify;
pub mod resolver;


pub use cache::{ContentCache, PinQuery};
pub use notify::{ChangePipeline, FocusGate};
pub use resolver::ContentResolver;

/// What a resource identifier points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Plain file content at a revision.
    AtRevision,
    /// The diff baseline for the path at a revision.
    DiffBaseline,
}

/// Identifier of one served virtual resource.
///
/// Structurally equal identifiers share one canonical form, so redundant
/// requests collapse onto a single cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    path: PathBuf,
    revision: Revision,
    kind: ResourceKind,
}

impl ResourceId {
    /// Identifier for plain content at a revision.
    pub fn at_revision(path: impl Into<PathBuf>, revision: Revision) -> Self {
        Self {
            path: path.into(),
            revision,
            kind: ResourceKind::AtRevision,
        }
    }

    /// Identifier for the diff baseline at a revision.
    pub fn diff_baseline(path: impl Into<PathBuf>, revision: Revision) -> Self {
        Self {
            path: path.into(),
            revision,
            kind: ResourceKind::DiffBaseline,
        }
    }

    /// Target path inside a working copy.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Target revision.
    #[must_use]
    pub const fn revision(&self) -> &Revision {
        &self.revision
    }

    /// Plain or diff-baseline.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Canonical string form used as the cache key.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self.kind {
            ResourceKind::AtRevision => format!("{}@{}", self.path.display(), self.revision),
            ResourceKind::DiffBaseline => {
                format!("{}@{}#baseline", self.path.display(), self.revision)
            }
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Synthesized metadata for a virtual resource.
///
/// `modified` is the gate-wide last-modified stamp, not filesystem mtime:
/// historical content has no real file behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Content length in bytes.
    pub size: u64,
    /// Gate-wide last-modified stamp at read time.
    pub modified: SystemTime,
}
