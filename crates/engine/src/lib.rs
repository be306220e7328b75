// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! foreman-engine: the orchestration core.
//!
//! Owns authoritative process and task state, serializes every state change
//! through a command-dispatch pipeline, enforces the implement/review/commit
//! phase machine, mediates inter-agent messaging through per-process
//! mailboxes, and manages agent lifecycles.

pub mod config;
pub mod dispatch;
pub mod enforcer;
mod engine;
pub mod error;
mod handlers;
pub mod outcome;
pub mod prompts;
pub mod registry;
mod signal;
pub mod store;

pub use config::EngineConfig;
pub use dispatch::{command_channel, CommandSubmitter, Dispatcher};
pub use enforcer::{TurnEnforcer, REQUIRED_TOOLS};
pub use engine::{Engine, EngineBuilder};
pub use error::EngineError;
pub use outcome::Outcome;
pub use registry::AgentRegistry;
pub use store::{MailboxRepository, ProcessRepository, StoreError, TaskRepository};

#[cfg(test)]
mod test_helpers;
