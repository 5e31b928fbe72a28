// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository accessor boundary.
//!
//! ```text
//! RepositoryAccessor (consumed)
//!   read_at(rev, path)       -> bytes | NoSuchPath | Upstream
//!   diff_baseline(rev, path) -> Content | Unmodified | Added
//!
//! RootRegistry (owned)
//!   which working copy owns a path? (longest prefix wins)
//! ```
//!
//! This crate never constructs tool command lines or parses tool output;
//! implementors of [`RepositoryAccessor`] do that behind this seam.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use futures_util::future::BoxFuture;

use crate::error::AccessorError;

#[cfg(test)]
mod tests;

/// Result type for accessor operations.
pub type AccessorResult<T> = std::result::Result<T, AccessorError>;

/// An opaque revision identifier understood by the external tool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    /// Wrap a revision string.
    pub fn new(revision: impl Into<String>) -> Self {
        Self(revision.into())
    }

    /// The revision as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Revision {
    fn from(revision: &str) -> Self {
        Self::new(revision)
    }
}

/// Outcome of a diff-baseline lookup.
///
/// The accessor resolves renames before answering, so `Content` bytes are
/// served verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaselineContent {
    /// Explicit baseline content.
    Content(Vec<u8>),
    /// The path is unmodified relative to the working copy; read the plain
    /// content at the same revision instead.
    Unmodified,
    /// The path is newly added; the baseline is empty so a diff view shows
    /// the whole current content as added.
    Added,
}

/// Read-only access to historical repository content.
///
/// Implementations drive the external tool (and are therefore expected to
/// route their invocations through the request scheduler); this crate only
/// consumes the results.
pub trait RepositoryAccessor: Send + Sync {
    /// Read file content at a revision.
    ///
    /// Fails with [`AccessorError::NoSuchPath`] when the path does not
    /// exist at that revision.
    fn read_at<'a>(
        &'a self,
        revision: &'a Revision,
        path: &'a Path,
    ) -> BoxFuture<'a, AccessorResult<Vec<u8>>>;

    /// Look up the diff baseline for a path at a revision.
    fn diff_baseline<'a>(
        &'a self,
        revision: &'a Revision,
        path: &'a Path,
    ) -> BoxFuture<'a, AccessorResult<BaselineContent>>;
}

/// Registry of open working-copy roots.
///
/// Roots are opaque path prefixes; ownership is decided by the longest
/// matching prefix so nested working copies resolve to the inner one.
#[derive(Debug, Default)]
pub struct RootRegistry {
    roots: Mutex<Vec<PathBuf>>,
}

impl RootRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a working-copy root. Re-adding an existing root is a no-op.
    pub fn add_root(&self, root: &Path) {
        let mut roots = self.roots.lock().unwrap_or_else(PoisonError::into_inner);
        if !roots.iter().any(|known| known == root) {
            roots.push(root.to_path_buf());
        }
    }

    /// Removes a working-copy root. Unknown roots are ignored.
    pub fn remove_root(&self, root: &Path) {
        self.roots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|known| known != root);
    }

    /// The root owning `path`, if any: the longest registered prefix.
    #[must_use]
    pub fn owning_root(&self, path: &Path) -> Option<PathBuf> {
        self.roots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .cloned()
    }

    /// Snapshot of all registered roots.
    #[must_use]
    pub fn roots(&self) -> Vec<PathBuf> {
        self.roots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
