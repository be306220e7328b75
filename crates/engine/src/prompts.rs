// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

//! Prompt templates enqueued by the workflow and lifecycle handlers.
//!
//! Everything a worker or coordinator is asked to do arrives as a mailbox
//! message; these are the fixed wordings.

use foreman_core::{ProcessId, ReviewKind, TaskId};

/// Prompt delivered to a worker when a task is assigned to it.
pub fn task_assignment(task_id: &TaskId, summary: &str) -> String {
    format!(
        "You are assigned task {task_id}: {summary}\n\
         Implement the task. When done, call report_implementation_complete \
         with a summary of what you changed."
    )
}

/// Prompt delivered to a reviewer.
pub fn review_assignment(
    task_id: &TaskId,
    implementer: &ProcessId,
    kind: ReviewKind,
) -> String {
    let lead = match kind {
        ReviewKind::Standard => "Review the implementation of",
        ReviewKind::FollowUp => "Re-review the updated implementation of",
    };
    format!(
        "{lead} task {task_id} by {implementer}. Examine the changes and call \
         report_review_verdict with approved or denied plus your comments."
    )
}

/// Prompt delivered to the implementer once its approved work may land.
pub fn commit_approval(task_id: &TaskId) -> String {
    format!(
        "Task {task_id} is approved. Commit your work now, then call \
         report_implementation_complete to confirm the commit."
    )
}

/// Prompt delivered to the implementer when a review was denied.
pub fn review_feedback(task_id: &TaskId, feedback: &str) -> String {
    format!(
        "Review feedback for task {task_id}:\n{feedback}\n\
         Address the feedback, then call report_implementation_complete again."
    )
}

/// Message for the coordinator when a worker ran out of context.
pub fn context_exhausted(worker: &ProcessId, task_id: Option<&TaskId>) -> String {
    let task = match task_id {
        Some(id) => format!("task {}", id),
        None => "no assigned task".to_string(),
    };
    format!(
        "WORKER CONTEXT EXHAUSTED: {worker} ({task}) ran out of context and \
         has been marked failed. Use replace_worker to spawn a replacement \
         and re-assign its work."
    )
}

/// Handoff note posted to the message log before a coordinator is replaced.
pub fn coordinator_handoff(reason: &str) -> String {
    format!(
        "Coordinator handoff: the current coordinator is being replaced \
         ({reason}). Summarize in-flight tasks and worker assignments for \
         your successor."
    )
}

/// Startup prompt for a replacement coordinator.
pub fn coordinator_replacement() -> String {
    "You are taking over as coordinator. Read the handoff notes in the \
     message log before acting, then resume coordinating the in-flight \
     tasks."
        .to_string()
}
