// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Managed process entity: role, status machine, and bookkeeping fields.

use crate::id::{ProcessId, TaskId};
use crate::metrics::TurnMetrics;
use crate::phase::Phase;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known id of the singleton coordinator process.
pub const COORDINATOR_ID: &str = "coordinator";

/// Role of a managed process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The distinguished agent that decomposes goals and assigns tasks.
    Coordinator,
    /// A task-executing agent.
    Worker,
    /// A non-task agent subscribing to internal channels.
    Observer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Coordinator => "coordinator",
            Role::Worker => "worker",
            Role::Observer => "observer",
        };
        write!(f, "{}", name)
    }
}

/// Lifecycle status of a managed process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    /// Created, agent not yet started.
    Pending,
    /// Idle and able to receive a message.
    Ready,
    /// A message was delivered; a turn is in progress.
    Working,
    /// Suspended by the user; resumable.
    Paused,
    /// Terminated but resumable.
    Stopped,
    /// Permanently removed from service (terminal).
    Retired,
    /// Turn failure (terminal).
    Failed,
}

impl ProcessStatus {
    /// Terminal statuses are never left again, except `failed -> retired`
    /// which is permitted so a failed worker can be replaced.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessStatus::Retired | ProcessStatus::Failed)
    }

    /// The status transition table. Retirement from any non-terminal status
    /// (and from `failed`) is handled by the caller, not listed here.
    pub fn can_transition_to(self, to: ProcessStatus) -> bool {
        use ProcessStatus::*;
        matches!(
            (self, to),
            (Pending, Ready)
                | (Pending, Working)
                | (Ready, Working)
                | (Working, Ready)
                | (Ready, Paused)
                | (Working, Paused)
                | (Paused, Ready)
                | (Ready, Stopped)
                | (Working, Stopped)
                | (Stopped, Ready)
                | (Working, Failed)
        )
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessStatus::Pending => "pending",
            ProcessStatus::Ready => "ready",
            ProcessStatus::Working => "working",
            ProcessStatus::Paused => "paused",
            ProcessStatus::Stopped => "stopped",
            ProcessStatus::Retired => "retired",
            ProcessStatus::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// A managed agent process.
///
/// Rows are created by spawn and retained forever; retirement marks the
/// terminal status but keeps the row for history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub id: ProcessId,
    pub role: Role,
    pub status: ProcessStatus,
    /// Workers start in `idle`; other roles carry no phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    /// Current task assignment, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    /// Agent-reported session identifier, captured on the first successful turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub created_at_ms: u64,
    pub last_activity_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retired_at_ms: Option<u64>,
    /// Monotonic: once true, never false again.
    #[serde(default)]
    pub has_completed_turn: bool,
    /// Latest turn metrics snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<TurnMetrics>,
}

impl Process {
    /// Create a fresh process row in `pending` status.
    pub fn new(id: ProcessId, role: Role, now_ms: u64) -> Self {
        Self {
            id,
            role,
            status: ProcessStatus::Pending,
            phase: (role == Role::Worker).then_some(Phase::Idle),
            task_id: None,
            session_id: None,
            created_at_ms: now_ms,
            last_activity_at_ms: now_ms,
            retired_at_ms: None,
            has_completed_turn: false,
            metrics: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_retired(&self) -> bool {
        self.status == ProcessStatus::Retired
    }

    /// A worker's phase, defaulting to idle for rows that predate phase tracking.
    pub fn phase_or_idle(&self) -> Phase {
        self.phase.unwrap_or(Phase::Idle)
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
