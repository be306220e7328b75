// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! In-memory authoritative stores for processes, task assignments, and
//! per-process mailboxes.
//!
//! The dispatcher guarantees one handler at a time, but the spawn helper
//! and the per-agent event pumps read concurrently, so every store is
//! internally synchronized.

mod mailboxes;
mod processes;
mod tasks;

pub use mailboxes::MailboxRepository;
pub use processes::ProcessRepository;
pub use tasks::TaskRepository;

use thiserror::Error;

/// Storage failures.
///
/// The in-memory stores never fail to write; the fallible signature exists
/// so handlers wrap storage problems uniformly if a durable backend is ever
/// swapped in.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage io: {0}")]
    Io(String),
}
