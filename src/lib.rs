// revgate: serialized gateway to a version-control working copy
//
// SPDX-FileCopyrightText: 2026 revgate contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!     invokers (status / log / diff requests)
//!                      |
//!                      v
//!          ,--------------------------,
//!          |          sched           |
//!          |  RequestScheduler (FIFO) |
//!          |  Throttler  SingleFlight |
//!          '------------+-------------'
//!                       |
//!                       v
//!          ,--------------------------,
//!          |          repo            |
//!          |  RepositoryAccessor      |
//!          |  RootRegistry            |
//!          '------+------------+------'
//!                 |            |
//!                 v            v
//!        external VCS     vfs (read-only views)
//!        tool process     ContentCache
//!                         ChangePipeline
//!                         ContentResolver
//!
//!   +------------------------------------------+
//!   |  foundation    error, logging, config    |
//!   +------------------------------------------+
//! ```
//!
//! The external version-control tool is stateful and unsafe to invoke
//! concurrently against one working copy. Everything in `sched` exists to
//! uphold a single guarantee: at no point are two tool invocations in
//! flight at once. `vfs` serves historical and diff-baseline file content
//! on top of that, with bounded bookkeeping and batched change events.

pub mod config;
pub mod error;
pub mod logging;
pub mod repo;
pub mod sched;
pub mod vfs;
