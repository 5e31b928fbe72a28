// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only resolution of virtual resource content.
//!
//! ```text
//! read(resource)
//!   owning root?  --none-->  NotFound
//!   record in cache
//!   diff baseline:  Content    -> bytes verbatim
//!                   Added      -> empty bytes
//!                   Unmodified -> plain read below
//!   plain read:     NoSuchPath -> NotFound
//!                   other      -> Upstream, unchanged
//! ```

use std::sync::Arc;

use tracing::trace;

use crate::error::{AccessorError, GateError, GateResult, SharedFailure};
use crate::repo::{BaselineContent, RepositoryAccessor, RootRegistry};

use super::{ContentCache, FileStat, ResourceId, ResourceKind};

/// Serves historical and diff-baseline file content.
///
/// This is a read-only view: every mutation-shaped operation fails with
/// [`GateError::Unsupported`].
pub struct ContentResolver {
    accessor: Arc<dyn RepositoryAccessor>,
    cache: Arc<ContentCache>,
    roots: Arc<RootRegistry>,
}

impl ContentResolver {
    /// Creates a resolver over `accessor` for the working copies in
    /// `roots`, recording served resources in `cache`.
    #[must_use]
    pub fn new(
        accessor: Arc<dyn RepositoryAccessor>,
        cache: Arc<ContentCache>,
        roots: Arc<RootRegistry>,
    ) -> Self {
        Self {
            accessor,
            cache,
            roots,
        }
    }

    /// Reads the content behind `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::NotFound`] when no registered root owns the
    /// path or the path has no content at the revision, and
    /// [`GateError::Upstream`] for any other accessor failure, unchanged.
    pub async fn read(&self, resource: &ResourceId) -> GateResult<Vec<u8>> {
        if self.roots.owning_root(resource.path()).is_none() {
            return Err(GateError::not_found(
                resource.revision().as_str(),
                resource.path().display().to_string(),
            ));
        }

        // Bookkeeping happens before resolution so even a miss counts as a
        // served resource for change tracking.
        self.cache.record(resource);

        match resource.kind() {
            ResourceKind::DiffBaseline => {
                let baseline = self
                    .accessor
                    .diff_baseline(resource.revision(), resource.path())
                    .await
                    .map_err(map_accessor_error)?;
                match baseline {
                    BaselineContent::Content(bytes) => Ok(bytes),
                    BaselineContent::Added => {
                        trace!(resource = %resource, "newly added; empty baseline");
                        Ok(Vec::new())
                    }
                    BaselineContent::Unmodified => self.read_plain(resource).await,
                }
            }
            ResourceKind::AtRevision => self.read_plain(resource).await,
        }
    }

    /// Synthesized metadata for `resource`.
    ///
    /// Size comes from the content; the modified stamp is the gate-wide
    /// last-modified time, not filesystem metadata.
    ///
    /// # Errors
    ///
    /// Same failures as [`read`](Self::read).
    pub async fn stat(&self, resource: &ResourceId) -> GateResult<FileStat> {
        let content = self.read(resource).await?;
        Ok(FileStat {
            size: content.len() as u64,
            modified: self.cache.last_modified(),
        })
    }

    /// Unsupported: the view is read-only.
    ///
    /// # Errors
    ///
    /// Always [`GateError::Unsupported`].
    pub fn write(&self, _resource: &ResourceId, _content: &[u8]) -> GateResult<()> {
        Err(GateError::Unsupported("write"))
    }

    /// Unsupported: the view is read-only.
    ///
    /// # Errors
    ///
    /// Always [`GateError::Unsupported`].
    pub fn delete(&self, _resource: &ResourceId) -> GateResult<()> {
        Err(GateError::Unsupported("delete"))
    }

    /// Unsupported: the view is read-only.
    ///
    /// # Errors
    ///
    /// Always [`GateError::Unsupported`].
    pub fn rename(&self, _from: &ResourceId, _to: &ResourceId) -> GateResult<()> {
        Err(GateError::Unsupported("rename"))
    }

    /// Unsupported: the view is read-only.
    ///
    /// # Errors
    ///
    /// Always [`GateError::Unsupported`].
    pub fn create_dir(&self, _resource: &ResourceId) -> GateResult<()> {
        Err(GateError::Unsupported("create_dir"))
    }

    /// Unsupported: historical views have no directory listings.
    ///
    /// # Errors
    ///
    /// Always [`GateError::Unsupported`].
    pub fn read_dir(&self, _resource: &ResourceId) -> GateResult<Vec<ResourceId>> {
        Err(GateError::Unsupported("read_dir"))
    }

    async fn read_plain(&self, resource: &ResourceId) -> GateResult<Vec<u8>> {
        self.accessor
            .read_at(resource.revision(), resource.path())
            .await
            .map_err(map_accessor_error)
    }
}

/// A recognizable miss becomes `NotFound`; everything else passes through.
fn map_accessor_error(err: AccessorError) -> GateError {
    match err {
        AccessorError::NoSuchPath { revision, path } => GateError::NotFound { revision, path },
        AccessorError::Upstream(err) => GateError::Upstream(SharedFailure::new(err)),
    }
}
