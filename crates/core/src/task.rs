// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Task assignment entity and its review-cycle status machine.

use crate::id::{ProcessId, TaskId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review-cycle status of a task assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Implementation in progress (initial state, and again after denial).
    Implementing,
    /// Implementation reported complete; a review is pending or running.
    InReview,
    /// Review approved; awaiting the commit go-ahead.
    Approved,
    /// Review denied; feedback must be addressed.
    Denied,
    /// Commit in progress.
    Committing,
}

impl TaskStatus {
    pub fn can_transition_to(self, to: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, to),
            (Implementing, InReview)
                | (InReview, Approved)
                | (InReview, Denied)
                | (Denied, Implementing)
                | (Approved, Committing)
                | (Committing, Implementing)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStatus::Implementing => "implementing",
            TaskStatus::InReview => "in_review",
            TaskStatus::Approved => "approved",
            TaskStatus::Denied => "denied",
            TaskStatus::Committing => "committing",
        };
        write!(f, "{}", name)
    }
}

/// A unit of work and the processes attached to it.
///
/// Processes are referenced by id only; there are no back-pointers. The
/// reviewer field is cleared on denial so the coordinator can re-assign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub task_id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementer: Option<ProcessId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<ProcessId>,
    pub status: TaskStatus,
    pub started_at_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_started_at_ms: Option<u64>,
}

impl TaskAssignment {
    /// Create a fresh assignment in `implementing` status.
    pub fn new(task_id: TaskId, implementer: ProcessId, now_ms: u64) -> Self {
        Self {
            task_id,
            implementer: Some(implementer),
            reviewer: None,
            status: TaskStatus::Implementing,
            started_at_ms: now_ms,
            review_started_at_ms: None,
        }
    }

    pub fn is_implementer(&self, id: &ProcessId) -> bool {
        self.implementer.as_ref() == Some(id)
    }

    pub fn is_reviewer(&self, id: &ProcessId) -> bool {
        self.reviewer.as_ref() == Some(id)
    }

    /// Drop any implementer/reviewer reference to the given process.
    pub fn clear_process(&mut self, id: &ProcessId) {
        if self.is_implementer(id) {
            self.implementer = None;
        }
        if self.is_reviewer(id) {
            self.reviewer = None;
        }
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
