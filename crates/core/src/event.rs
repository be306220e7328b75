// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Domain events emitted by handlers for the UI stream.
//!
//! Events are immutable records; handlers return them in order and the
//! dispatcher publishes them to subscribers in that order.

use crate::id::{ProcessId, TaskId};
use crate::mailbox::Sender;
use crate::metrics::TurnMetrics;
use crate::phase::Phase;
use crate::process::{ProcessStatus, Role};
use serde::{Deserialize, Serialize};

/// An event for the UI stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new process was created.
    ProcessSpawned { id: ProcessId, role: Role },
    /// A process changed status (and possibly phase / task binding).
    StatusChanged {
        id: ProcessId,
        status: ProcessStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phase: Option<Phase>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
    },
    /// A message was delivered; a turn started.
    Working { id: ProcessId },
    /// The process finished its turn and can receive again.
    Ready { id: ProcessId },
    /// A message was handed to the process.
    Incoming { id: ProcessId, message: String, sender: Sender },
    /// The pending-queue size changed.
    QueueChanged { id: ProcessId, size: usize },
    /// Token usage for the completed turn.
    TokenUsage { id: ProcessId, metrics: TurnMetrics },
    /// A turn or spawn failure.
    ProcessError { id: ProcessId, error: String },
    /// A message addressed to the human operator.
    UserNotification {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<TaskId>,
    },
    /// Free-form agent output.
    Output { id: ProcessId, output: String },
}

impl Event {
    /// Short human-readable summary for log lines.
    pub fn log_summary(&self) -> String {
        match self {
            Event::ProcessSpawned { id, role } => format!("spawned {} ({})", id, role),
            Event::StatusChanged { id, status, phase, .. } => match phase {
                Some(phase) => format!("{} -> {} ({})", id, status, phase),
                None => format!("{} -> {}", id, status),
            },
            Event::Working { id } => format!("{} working", id),
            Event::Ready { id } => format!("{} ready", id),
            Event::Incoming { id, sender, .. } => format!("{} <- {}", id, sender),
            Event::QueueChanged { id, size } => format!("{} queue={}", id, size),
            Event::TokenUsage { id, metrics } => {
                format!("{} tokens={}", id, metrics.total_tokens())
            }
            Event::ProcessError { id, error } => format!("{} error: {}", id, error),
            Event::UserNotification { message, .. } => format!("notify: {}", message),
            Event::Output { id, .. } => format!("{} output", id),
        }
    }

    /// The process this event concerns, if any.
    pub fn process_id(&self) -> Option<&ProcessId> {
        match self {
            Event::ProcessSpawned { id, .. }
            | Event::StatusChanged { id, .. }
            | Event::Working { id }
            | Event::Ready { id }
            | Event::Incoming { id, .. }
            | Event::QueueChanged { id, .. }
            | Event::TokenUsage { id, .. }
            | Event::ProcessError { id, .. }
            | Event::Output { id, .. } => Some(id),
            Event::UserNotification { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
